// src/llm/mod.rs
//! Clients for the chat, embedding and vector store services

pub mod chat;
pub mod embeddings;
pub mod prompts;
pub mod vector_store;

pub use chat::{ChatClient, ChatCompletion};
pub use embeddings::{Embedder, EmbeddingClient};
pub use vector_store::{Collection, QueryMatch, UpsertBatch, VectorStoreClient};

/// A service was used without its API key configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingApiKey(pub &'static str);

impl std::fmt::Display for MissingApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not set", self.0)
    }
}

impl std::error::Error for MissingApiKey {}
