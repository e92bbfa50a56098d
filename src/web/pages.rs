// src/web/pages.rs
//! Server-rendered pages: landing page and the job grid

use rocket::response::content::RawHtml;
use rocket::State;

use crate::app_log;
use crate::core::Database;
use crate::grid::{ControlSet, RenderedControl};
use crate::utils::{html_escape, truncate_chars};
use crate::web::handlers::job_handlers::{job_row, DEFAULT_PAGE_SIZE};
use crate::web::types::JobRow;

const GRID_COLUMNS: [&str; 6] = [
    "Job Title",
    "Company Name",
    "Location",
    "Work Type",
    "Work Arrangement",
    "Posting Date",
];

const GRID_SCRIPT: &str = r#"
function pageId() {
  let id = sessionStorage.getItem('seeklyzer-page');
  if (!id) {
    id = crypto.randomUUID();
    sessionStorage.setItem('seeklyzer-page', id);
  }
  return id;
}

async function gridAction(button) {
  const response = await fetch('/api/grid/actions', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({
      job_id: button.dataset.jobId,
      control: button.dataset.control,
      control_set: button.dataset.controlSet,
      conversation_id: pageId()
    })
  });
  const body = await response.json();
  if (!body.success) {
    document.getElementById('details').textContent = body.error;
    return;
  }
  if (body.data.navigate_to) {
    window.open(body.data.navigate_to, '_blank');
  }
  const selected = body.data.state.selected_row;
  if (selected) {
    document.getElementById('details').textContent = JSON.stringify(selected.row, null, 2);
  }
}
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Seeklyzer - {}</title>
</head>
<body>
<nav><a href="/">Seeklyzer</a> | <a href="/">Home</a> | <a href="/jobs">Job Finder</a></nav>
{}
</body>
</html>"#,
        html_escape(title),
        body
    )
}

pub fn home_page() -> String {
    layout(
        "Home",
        r#"<main>
<h1>Welcome to Seeklyzer</h1>
<p>Your intelligent job search companion. Find roles that truly fit your skills and aspirations.</p>
<ul>
<li><a href="/jobs">Job Finder</a>: browse preprocessed Seek listings, open them on Seek or view their details.</li>
<li>Resume tool: format your resume and match it against listings through <code>/api/resume</code>.</li>
</ul>
</main>"#,
    )
}

fn render_control(control: &RenderedControl) -> String {
    format!(
        r#"<button type="button" data-job-id="{}" data-control="{}" data-control-set="{}" onclick="gridAction(this)">{}</button>"#,
        html_escape(&control.job_id),
        control.id.slug(),
        ControlSet::Combined.slug(),
        html_escape(control.label)
    )
}

fn render_row(job: &JobRow) -> String {
    let mut cells = String::new();
    for column in GRID_COLUMNS {
        let value = job
            .row
            .get(column)
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        cells.push_str(&format!("<td>{}</td>", html_escape(&truncate_chars(value, 80))));
    }

    let controls: String = job.controls.iter().map(render_control).collect();
    format!("<tr>{}<td>{}</td></tr>", cells, controls)
}

pub fn jobs_page(rows: &[JobRow], total: i64) -> String {
    let header: String = GRID_COLUMNS
        .iter()
        .map(|column| format!("<th>{}</th>", column))
        .collect();
    let body: String = rows.iter().map(render_row).collect();

    layout(
        "Job Finder",
        &format!(
            r#"<main>
<h1>Job Finder</h1>
<p>Showing {} of {} jobs</p>
<table id="jobs">
<thead><tr>{}<th>Actions</th></tr></thead>
<tbody>{}</tbody>
</table>
<h2>Details</h2>
<pre id="details">Select a job to see its details.</pre>
</main>
<script>{}</script>"#,
            rows.len(),
            total,
            header,
            body,
            GRID_SCRIPT
        ),
    )
}

pub async fn home_page_handler() -> RawHtml<String> {
    RawHtml(home_page())
}

pub async fn jobs_page_handler(db: &State<Database>) -> RawHtml<String> {
    let repo = db.jobs();
    let (jobs, total) = match (repo.list(DEFAULT_PAGE_SIZE, 0).await, repo.count().await) {
        (Ok(jobs), Ok(total)) => (jobs, total),
        (Err(e), _) | (_, Err(e)) => {
            app_log!(error, "Failed to load jobs for grid page: {:#}", e);
            (Vec::new(), 0)
        }
    };

    let rows: Vec<JobRow> = jobs.iter().map(job_row).collect();
    RawHtml(jobs_page(&rows, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::record::sample_record;
    use crate::jobs::StoredJob;

    #[test]
    fn test_jobs_page_renders_combined_controls() {
        let mut record = sample_record("12345", "Engineer <Rust>");
        record.company_name = "Tom & Co".to_string();
        let job = StoredJob {
            record,
            extracted_details: None,
            embedded_at: None,
        };

        let html = jobs_page(&[job_row(&job)], 1);

        assert!(html.contains("Showing 1 of 1 jobs"));
        assert!(html.contains("Engineer &lt;Rust&gt;"));
        assert!(html.contains("Tom &amp; Co"));
        assert!(html.contains(r#"data-job-id="12345" data-control="show-details""#));
        assert!(html.contains(r#"data-control="open-listing" data-control-set="combined""#));
        assert!(html.find("show-details") < html.find("open-listing"));
    }

    #[test]
    fn test_home_page_links_to_grid() {
        assert!(home_page().contains(r#"<a href="/jobs">Job Finder</a>"#));
    }
}
