// src/jobs/outputs.rs
//! Flat-file exports of the preprocessed rows

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::record::JobRecord;
use crate::app_log;
use crate::core::FsOps;

pub const OUTPUT_STEM: &str = "preprocessed_seek_jobs";

#[derive(Debug, Clone)]
pub struct SavedOutputs {
    pub csv_path: PathBuf,
    pub jsonl_path: PathBuf,
}

/// Write `preprocessed_seek_jobs.csv` and `.jsonl` into `dir`
pub async fn save_outputs(records: &[JobRecord], dir: &Path) -> Result<SavedOutputs> {
    app_log!(info, "Saving {} records as CSV and JSON lines", records.len());

    let csv_path = dir.join(format!("{}.csv", OUTPUT_STEM));
    let jsonl_path = dir.join(format!("{}.jsonl", OUTPUT_STEM));

    FsOps::write_file_safe(&csv_path, &to_csv(records)?).await?;
    FsOps::write_file_safe(&jsonl_path, &to_json_lines(records)?).await?;

    Ok(SavedOutputs {
        csv_path,
        jsonl_path,
    })
}

pub fn to_csv(records: &[JobRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write CSV row for job {}", record.job_id))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn to_json_lines(records: &[JobRecord]) -> Result<String> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
