//! Seeklyzer: job search and resume compatibility service.

pub mod core;
pub mod grid;
pub mod jobs;
pub mod llm;
pub mod pipeline_cli;
pub mod resume;
pub mod utils;
pub mod web;

// Declared last: modules reach `app_log!` through `use crate::app_log;`.
mod macros;

pub use web::start_web_server;
