// src/core/fs_ops.rs
//! File system operations shared by the pipeline and resume tooling

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write file, creating the parent directory first
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        app_log!(info, "Written file: {}", path.display());
        Ok(())
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    /// `<prefix>_<YYYYmmdd_HHMMSS>.<extension>`
    pub fn timestamped_file_name(prefix: &str, extension: &str, at: DateTime<Utc>) -> String {
        format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), extension)
    }
}
