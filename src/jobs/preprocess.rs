// src/jobs/preprocess.rs
//! Step 1b: clean flattened listings into grid rows

use scraper::Html;
use std::collections::HashSet;

use super::fetcher::SeekListing;
use super::record::JobRecord;
use crate::app_log;
use crate::utils::{normalize_whitespace, title_case};

const HIGHLIGHT_LIMIT: usize = 3;

pub fn preprocess(listings: Vec<SeekListing>) -> Vec<JobRecord> {
    app_log!(info, "Preprocessing {} job listings", listings.len());

    let mut seen = HashSet::new();
    let records: Vec<JobRecord> = listings
        .into_iter()
        .filter(|listing| !listing.is_featured)
        .filter(|listing| seen.insert(listing.id.clone()))
        .map(to_record)
        .collect();

    app_log!(info, "Preprocessed {} job records", records.len());
    records
}

fn to_record(listing: SeekListing) -> JobRecord {
    let description = format!(
        "{} | {} | {}",
        listing.teaser,
        highlights(&listing.bullet_points),
        html_to_text(&listing.content)
    );

    JobRecord {
        job_title: job_title(&listing.title, &listing.role_id),
        job_id: listing.id,
        company_name: listing.company_name,
        work_type: listing.work_type,
        work_arrangement: listing.work_arrangement,
        location: format!(
            "{} - {}",
            listing.location_label, listing.location_country_code
        ),
        posting_date: listing.listing_date,
        job_url: listing.url,
        job_description: normalize_whitespace(&description),
    }
}

/// `"{title} | {Role}"` unless the title already names the role
pub fn job_title(title: &str, role_id: &str) -> String {
    let role = title_case(&role_id.replace('-', " "));

    if title_case(title).contains(&role) {
        title.to_string()
    } else {
        format!("{} | {}", title, role)
    }
}

pub fn highlights(bullet_points: &[String]) -> String {
    bullet_points
        .iter()
        .take(HIGHLIGHT_LIMIT)
        .filter(|point| !point.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Text nodes of an HTML fragment joined by three spaces
pub fn html_to_text(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(content);
    fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join("   ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fetcher::sample_item;
    use serde_json::json;

    fn listing(id: &str) -> SeekListing {
        SeekListing::from_item(&sample_item(json!(id), "Rust developer")).unwrap()
    }

    #[test]
    fn test_job_title_appends_missing_role() {
        assert_eq!(
            job_title("Rust developer", "software-engineer"),
            "Rust developer | Software Engineer"
        );
        assert_eq!(
            job_title("senior software engineer", "software-engineer"),
            "senior software engineer"
        );
        assert_eq!(job_title("Analyst", ""), "Analyst");
    }

    #[test]
    fn test_highlights_skip_empty_and_cap_at_three() {
        let points: Vec<String> = ["a", "", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(highlights(&points), "a; c");
        assert_eq!(highlights(&[]), "");
    }

    #[test]
    fn test_html_to_text() {
        let text = html_to_text("<p>Build <b>services</b></p><ul><li>Rust</li></ul>");
        assert_eq!(normalize_whitespace(&text), "Build services Rust");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_preprocess_filters_featured_and_duplicates() {
        let mut featured = listing("2");
        featured.is_featured = true;
        let mut duplicate = listing("1");
        duplicate.title = "Second copy".to_string();

        let records = preprocess(vec![listing("1"), featured, duplicate, listing("3")]);

        let ids: Vec<&str> = records.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(records[0].job_title, "Rust developer | Software Engineer");
    }

    #[test]
    fn test_preprocess_builds_columns() {
        let record = preprocess(vec![listing("1")]).remove(0);

        assert_eq!(record.company_name, "Acme Pty Ltd");
        assert_eq!(record.location, "Sydney NSW - AU");
        assert_eq!(record.work_arrangement, "Hybrid");
        assert_eq!(
            record.job_description,
            "Join our team | Great pay; Flexible hours | Build services Rust"
        );
    }
}
