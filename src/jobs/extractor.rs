// src/jobs/extractor.rs
//! Step 2: structured requirements from job descriptions

use anyhow::{Context, Result};

use super::record::ExtractedJobDetails;
use crate::llm::prompts::{job_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use crate::llm::ChatCompletion;

pub struct DetailsExtractor<C> {
    chat: C,
}

impl<C: ChatCompletion> DetailsExtractor<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    pub async fn extract(&self, job_description: &str) -> Result<ExtractedJobDetails> {
        let reply = self
            .chat
            .complete(EXTRACTION_SYSTEM_PROMPT, &job_extraction_prompt(job_description))
            .await?;

        parse_extracted_details(&reply)
    }
}

/// Decode the JSON object in a model reply, tolerating code fences and prose
pub fn parse_extracted_details(reply: &str) -> Result<ExtractedJobDetails> {
    let start = reply.find('{').context("No JSON object in model reply")?;
    let end = reply.rfind('}').context("No JSON object in model reply")?;
    if end < start {
        anyhow::bail!("No JSON object in model reply");
    }

    serde_json::from_str(&reply[start..=end]).context("Model reply is not valid job details JSON")
}
