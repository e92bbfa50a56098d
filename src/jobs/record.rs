// src/jobs/record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grid::RowRecord;

/// One preprocessed job posting. Serde names are the grid/CSV column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRecord {
    #[serde(rename = "Job Id")]
    pub job_id: String,
    #[serde(rename = "Job Title")]
    pub job_title: String,
    #[serde(rename = "Company Name")]
    pub company_name: String,
    #[serde(rename = "Work Type")]
    pub work_type: String,
    #[serde(rename = "Work Arrangement")]
    pub work_arrangement: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Posting Date")]
    pub posting_date: String,
    #[serde(rename = "Job Url")]
    pub job_url: String,
    #[serde(rename = "Job Description")]
    pub job_description: String,
}

/// A job row as stored, with the pipeline's later additions
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredJob {
    #[sqlx(flatten)]
    pub record: JobRecord,
    pub extracted_details: Option<String>,
    pub embedded_at: Option<DateTime<Utc>>,
}

impl StoredJob {
    pub fn extracted(&self) -> Option<ExtractedJobDetails> {
        self.extracted_details
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// Grid row: every column plus "Extracted Details" once available
    pub fn to_row_record(&self) -> RowRecord {
        let mut row = match serde_json::to_value(&self.record) {
            Ok(Value::Object(map)) => RowRecord::from(map),
            _ => RowRecord::new(),
        };

        if let Some(details) = self.extracted() {
            if let Ok(value) = serde_json::to_value(details) {
                row = row.with("Extracted Details", value);
            }
        }

        row
    }
}

/// Structured job requirements produced by the extraction step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedJobDetails {
    pub title: String,
    pub skills: Skills,
    pub experience: Experience,
    pub education: Education,
    pub certifications: Vec<String>,
    pub other_requirements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub required: Vec<String>,
    pub preferred: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub years: Option<f64>,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: Option<String>,
    pub field: Option<String>,
}

#[cfg(test)]
pub(crate) fn sample_record(job_id: &str, title: &str) -> JobRecord {
    JobRecord {
        job_id: job_id.to_string(),
        job_title: title.to_string(),
        company_name: "Acme Pty Ltd".to_string(),
        work_type: "Full time".to_string(),
        work_arrangement: "Hybrid".to_string(),
        location: "Sydney NSW - AU".to_string(),
        posting_date: "2025-04-01T00:00:00Z".to_string(),
        job_url: format!("https://www.seek.com.au/job/{}", job_id),
        job_description: format!("{} role | Rust; Tokio | Build services", title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_record_uses_column_names() {
        let stored = StoredJob {
            record: sample_record("12345", "Engineer"),
            extracted_details: None,
            embedded_at: None,
        };
        let row = stored.to_row_record();

        assert_eq!(row.job_id(), "12345");
        assert_eq!(row.get("Job Title").and_then(|v| v.as_str()), Some("Engineer"));
        assert!(row.get("Extracted Details").is_none());
    }

    #[test]
    fn row_record_includes_extracted_details() {
        let stored = StoredJob {
            record: sample_record("1", "Engineer"),
            extracted_details: Some(
                r#"{"title":"Engineer","skills":{"required":["Rust"],"preferred":[]}}"#
                    .to_string(),
            ),
            embedded_at: None,
        };

        let details = stored.extracted().unwrap();
        assert_eq!(details.skills.required, vec!["Rust"]);
        assert_eq!(details.experience.years, None);

        let row = stored.to_row_record();
        assert_eq!(
            row.get("Extracted Details")
                .and_then(|v| v.pointer("/skills/required/0"))
                .and_then(|v| v.as_str()),
            Some("Rust")
        );
    }
}
