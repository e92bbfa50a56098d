// src/resume/mod.rs
//! Resume cleanup, formatting, storage and job fit

pub mod compatibility;
pub mod formatter;
pub mod storage;

pub use compatibility::{job_posting_text, FitAssessment, FitAssessor};
pub use formatter::{between_dividers, normalize_resume_text, FormattedResume, ResumeFormatter};
pub use storage::{download_filename, save_resume};

/// No resume text to work with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyResume;

impl std::fmt::Display for EmptyResume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("No resume text available")
    }
}

impl std::error::Error for EmptyResume {}
