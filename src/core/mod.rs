// src/core/mod.rs
//! Shared services: configuration, storage, filesystem and HTTP plumbing

pub mod config_manager;
pub mod database;
pub mod fs_ops;
pub mod service_client;

pub use config_manager::{ConfigManager, EnvironmentConfig, ServiceConfig};
pub use database::{Database, JobRepository};
pub use fs_ops::FsOps;
pub use service_client::ServiceClient;
