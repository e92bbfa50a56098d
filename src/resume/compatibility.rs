// src/resume/compatibility.rs
//! Resume-to-job fit analysis

use anyhow::Result;
use serde::Serialize;

use super::EmptyResume;
use crate::app_log;
use crate::jobs::StoredJob;
use crate::llm::prompts::{job_fit_prompt, FIT_SYSTEM_PROMPT};
use crate::llm::ChatCompletion;

#[derive(Debug, Clone, Serialize)]
pub struct FitAssessment {
    pub job_id: String,
    pub job_title: String,
    pub analysis: String,
}

/// Plain-text posting handed to the model, with extracted requirements when known
pub fn job_posting_text(job: &StoredJob) -> String {
    let record = &job.record;
    let mut text = format!(
        "Title: {}\nCompany: {}\nLocation: {}\nWork type: {} ({})\n\n{}",
        record.job_title,
        record.company_name,
        record.location,
        record.work_type,
        record.work_arrangement,
        record.job_description
    );

    if let Some(details) = job.extracted() {
        if !details.skills.required.is_empty() {
            text.push_str(&format!(
                "\n\nRequired skills: {}",
                details.skills.required.join(", ")
            ));
        }
        if !details.skills.preferred.is_empty() {
            text.push_str(&format!(
                "\nPreferred skills: {}",
                details.skills.preferred.join(", ")
            ));
        }
    }

    text
}

pub struct FitAssessor<C> {
    chat: C,
}

impl<C: ChatCompletion> FitAssessor<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    pub async fn assess(&self, resume: &str, job: &StoredJob) -> Result<FitAssessment> {
        if resume.trim().is_empty() {
            return Err(EmptyResume.into());
        }

        app_log!(info, "Assessing resume fit for job {}", job.record.job_id);
        let analysis = self
            .chat
            .complete(FIT_SYSTEM_PROMPT, &job_fit_prompt(&job_posting_text(job), resume))
            .await?;

        Ok(FitAssessment {
            job_id: job.record.job_id.clone(),
            job_title: job.record.job_title.clone(),
            analysis,
        })
    }
}
