// src/llm/chat.rs
//! OpenAI-compatible chat completions (xAI by default)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;

use super::MissingApiKey;
use crate::app_log;
use crate::core::{ServiceClient, ServiceConfig};

const TEMPERATURE: f32 = 0.0;
const MAX_TOKENS: u32 = 4096;

/// Anything that turns a system + user message pair into a reply
pub trait ChatCompletion {
    fn complete(&self, system: &str, user: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct ChatClient {
    client: ServiceClient,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = config
            .xai_api_key
            .clone()
            .ok_or(MissingApiKey("XAI_API_KEY"))?;

        let client =
            ServiceClient::new(&config.xai_api_url, config.timeout_seconds)?.with_api_key(api_key);

        Ok(Self {
            client,
            model: config.xai_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatCompletion for ChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        app_log!(info, "Sending chat completion to {} ({} chars)", self.model, user.len());

        let response: ChatResponse = self
            .client
            .post_json("/chat/completions", &request)
            .await
            .context("Chat completion request failed")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion returned no content")?;

        app_log!(info, "Received chat completion ({} chars)", content.len());
        Ok(content)
    }
}
