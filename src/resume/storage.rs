// src/resume/storage.rs

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use super::EmptyResume;
use crate::core::FsOps;

/// `resume_<YYYYmmdd_HHMMSS>.txt` for the given local time
pub fn download_filename(now: DateTime<Local>) -> String {
    FsOps::timestamped_file_name("resume", "txt", now.naive_local().and_utc())
}

/// Write the formatted resume into `dir` under a timestamped name
pub async fn save_resume(dir: &Path, text: &str, now: DateTime<Local>) -> Result<PathBuf> {
    if text.trim().is_empty() {
        return Err(EmptyResume.into());
    }

    let path = dir.join(download_filename(now));
    FsOps::write_file_safe(&path, text).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 17, 9, 30, 1).unwrap()
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(download_filename(at()), "resume_20250517_093001.txt");
    }

    #[tokio::test]
    async fn test_save_resume_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("formatted_resumes_files");

        let path = save_resume(&target, "JANE DOE", at()).await.unwrap();

        assert_eq!(path, target.join("resume_20250517_093001.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "JANE DOE");
    }

    #[tokio::test]
    async fn test_save_rejects_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_resume(dir.path(), "", at()).await.unwrap_err();
        assert!(err.downcast_ref::<EmptyResume>().is_some());
    }
}
