// src/resume/formatter.rs
//! Resume text cleanup and LLM formatting

use anyhow::Result;
use serde::Serialize;
use std::time::Instant;

use super::EmptyResume;
use crate::app_log;
use crate::llm::prompts::{resume_format_prompt, RESUME_END, RESUME_START, RESUME_SYSTEM_PROMPT};
use crate::llm::ChatCompletion;
use crate::utils::normalize_whitespace;

/// Parse step: the client's extracted text with whitespace runs collapsed
pub fn normalize_resume_text(raw: &str) -> String {
    normalize_whitespace(raw)
}

/// Text between the resume dividers, or `None` when either is missing
pub fn between_dividers(reply: &str) -> Option<&str> {
    if !reply.contains(RESUME_END) {
        return None;
    }
    let (_, after_start) = reply.split_once(RESUME_START)?;
    // An end divider placed before the start one leaves everything after the start.
    let inner = after_start
        .split_once(RESUME_END)
        .map_or(after_start, |(inner, _)| inner);
    Some(inner.trim())
}

#[derive(Debug, Clone, Serialize)]
pub struct FormattedResume {
    pub text: String,
    pub duration_secs: f64,
    pub dividers_found: bool,
}

pub struct ResumeFormatter<C> {
    chat: C,
}

impl<C: ChatCompletion> ResumeFormatter<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    pub async fn format(&self, raw_text: &str) -> Result<FormattedResume> {
        if raw_text.trim().is_empty() {
            return Err(EmptyResume.into());
        }

        app_log!(info, "Formatting {} characters of resume text", raw_text.len());
        let started = Instant::now();

        let reply = self
            .chat
            .complete(RESUME_SYSTEM_PROMPT, &resume_format_prompt(raw_text))
            .await?;
        let duration_secs = started.elapsed().as_secs_f64();

        let formatted = match between_dividers(&reply) {
            Some(inner) => FormattedResume {
                text: inner.to_string(),
                duration_secs,
                dividers_found: true,
            },
            None => {
                app_log!(warn, "Resume dividers not found in model reply");
                FormattedResume {
                    text: reply,
                    duration_secs,
                    dividers_found: false,
                }
            }
        };

        app_log!(
            info,
            "Formatted resume ({} chars) in {:.2} seconds",
            formatted.text.len(),
            duration_secs
        );
        Ok(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoChat(String);

    impl ChatCompletion for EchoChat {
        async fn complete(&self, system: &str, _user: &str) -> Result<String> {
            assert_eq!(system, RESUME_SYSTEM_PROMPT);
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_normalize_resume_text() {
        assert_eq!(
            normalize_resume_text("  Jane   Doe\n\n Rust\tEngineer "),
            "Jane Doe Rust Engineer"
        );
    }

    #[test]
    fn test_between_dividers() {
        assert_eq!(
            between_dividers("intro ---RESUME-START---\n Jane \n---RESUME-END--- outro"),
            Some("Jane")
        );
        assert_eq!(between_dividers("---RESUME-START--- no end"), None);
        assert_eq!(between_dividers("---RESUME-END--- ---RESUME-START---"), Some(""));
        assert_eq!(
            between_dividers("---RESUME-END---\n---RESUME-START---\nJANE DOE\n"),
            Some("JANE DOE")
        );
        assert_eq!(between_dividers("no dividers at all"), None);
    }

    #[tokio::test]
    async fn test_format_extracts_between_dividers() {
        let formatter = ResumeFormatter::new(EchoChat(
            "Sure!\n---RESUME-START---\nJANE DOE\n- Rust\n---RESUME-END---".to_string(),
        ));
        let formatted = formatter.format("jane doe rust").await.unwrap();
        assert_eq!(formatted.text, "JANE DOE\n- Rust");
        assert!(formatted.dividers_found);
    }

    #[tokio::test]
    async fn test_format_falls_back_to_full_reply() {
        let formatter = ResumeFormatter::new(EchoChat("JANE DOE".to_string()));
        let formatted = formatter.format("jane doe").await.unwrap();
        assert_eq!(formatted.text, "JANE DOE");
        assert!(!formatted.dividers_found);
    }

    #[tokio::test]
    async fn test_format_rejects_empty_text() {
        let formatter = ResumeFormatter::new(EchoChat(String::new()));
        let err = formatter.format("   ").await.unwrap_err();
        assert!(err.downcast_ref::<EmptyResume>().is_some());
    }
}
