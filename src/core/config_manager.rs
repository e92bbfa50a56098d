// src/core/config_manager.rs
//! Configuration: per-environment paths from config.yaml, service endpoints
//! and keys from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app_log;
use crate::core::FsOps;

const DEFAULT_PORT: u16 = 8050;
const DEFAULT_DATASET_URL: &str =
    "https://api.apify.com/v2/datasets/JjAzvUEH4pSeV294Q/items?clean=true&format=json";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub data_path: PathBuf,
    pub database_path: PathBuf,
    pub preprocessed_path: PathBuf,
    pub resumes_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub xai_api_key: Option<String>,
    pub xai_api_url: String,
    pub xai_model: String,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub embedding_model: String,
    pub chroma_url: String,
    pub chroma_collection: String,
    pub jobs_dataset_url: String,
    pub timeout_seconds: u64,
}

impl ConfigManager {
    /// Load all configuration for the current environment
    pub fn load() -> Result<Self> {
        let environment_name = Self::environment_name();
        app_log!(info, "Loading configuration for environment: {}", environment_name);

        let base_dir = if environment_name == "production" {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        let environment =
            Self::load_environment(&environment_name, Path::new("config.yaml"), &base_dir)?;
        let service = ServiceConfig::from_lookup(|name| std::env::var(name).ok())?;
        let port = Self::parse_port(std::env::var("ROCKET_PORT").ok().as_deref())?;

        Ok(Self {
            environment_name,
            environment,
            service,
            port,
        })
    }

    pub fn from_parts(environment: EnvironmentConfig, service: ServiceConfig) -> Self {
        Self {
            environment_name: "local".to_string(),
            environment,
            service,
            port: DEFAULT_PORT,
        }
    }

    fn environment_name() -> String {
        std::env::var("SEEKLYZER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_environment(
        environment_name: &str,
        config_path: &Path,
        base_dir: &Path,
    ) -> Result<EnvironmentConfig> {
        let environment = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::parse_environment(&content, environment_name)?
        } else {
            app_log!(
                info,
                "{} not found, using default paths",
                config_path.display()
            );
            EnvironmentConfig::default()
        };

        Ok(environment.resolved(base_dir))
    }

    /// Pick the section for `environment_name` out of config.yaml content
    pub fn parse_environment(content: &str, environment_name: &str) -> Result<EnvironmentConfig> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment_name {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn parse_port(value: Option<&str>) -> Result<u16> {
        match value {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number")),
            None => Ok(DEFAULT_PORT),
        }
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.environment.data_path).await?;
        FsOps::ensure_dir_exists(&self.environment.preprocessed_path).await?;
        FsOps::ensure_dir_exists(&self.environment.resumes_path).await?;

        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }

        Ok(())
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data"),
            database_path: PathBuf::from("data/seeklyzer.db"),
            preprocessed_path: PathBuf::from("data/preprocessed_seek_jobs_files"),
            resumes_path: PathBuf::from("data/formatted_resumes_files"),
        }
    }
}

impl EnvironmentConfig {
    /// Make every relative path absolute against `base_dir`
    pub fn resolved(self, base_dir: &Path) -> Self {
        Self {
            data_path: FsOps::normalize_path(base_dir, &self.data_path),
            database_path: FsOps::normalize_path(base_dir, &self.database_path),
            preprocessed_path: FsOps::normalize_path(base_dir, &self.preprocessed_path),
            resumes_path: FsOps::normalize_path(base_dir, &self.resumes_path),
        }
    }
}

impl ServiceConfig {
    /// Build from a variable lookup, `std::env::var` in production
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let timeout_seconds = match lookup("SERVICE_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .context("SERVICE_TIMEOUT_SECS must be a number of seconds")?,
            None => 120,
        };

        Ok(Self {
            xai_api_key: non_empty("XAI_API_KEY"),
            xai_api_url: var_or("XAI_API_URL", "https://api.x.ai/v1"),
            xai_model: var_or("XAI_MODEL", "grok-3-mini-beta"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_api_url: var_or("OPENAI_API_URL", "https://api.openai.com/v1"),
            embedding_model: var_or("EMBEDDING_MODEL", "text-embedding-ada-002"),
            chroma_url: var_or("CHROMA_URL", "http://localhost:8000"),
            chroma_collection: var_or("CHROMA_COLLECTION", "seek_jobs"),
            jobs_dataset_url: var_or("JOBS_DATASET_URL", DEFAULT_DATASET_URL),
            timeout_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONFIG_YAML: &str = r#"
local:
  data_path: data
  database_path: data/local.db
  preprocessed_path: data/pre
  resumes_path: data/resumes
production:
  data_path: /srv/data
  database_path: /srv/data/prod.db
  preprocessed_path: /srv/data/pre
  resumes_path: /srv/data/resumes
"#;

    #[test]
    fn test_parse_environment_sections() {
        let local = ConfigManager::parse_environment(CONFIG_YAML, "local").unwrap();
        assert_eq!(local.database_path, PathBuf::from("data/local.db"));

        let production = ConfigManager::parse_environment(CONFIG_YAML, "production").unwrap();
        assert_eq!(production.database_path, PathBuf::from("/srv/data/prod.db"));

        let unknown = ConfigManager::parse_environment(CONFIG_YAML, "staging").unwrap();
        assert_eq!(unknown, local);
    }

    #[test]
    fn test_resolved_keeps_absolute_paths() {
        let production = ConfigManager::parse_environment(CONFIG_YAML, "production")
            .unwrap()
            .resolved(Path::new("/base"));
        assert_eq!(production.data_path, PathBuf::from("/srv/data"));

        let local = EnvironmentConfig::default().resolved(Path::new("/base"));
        assert_eq!(local.resumes_path, PathBuf::from("/base/data/formatted_resumes_files"));
    }

    #[test]
    fn test_service_config_defaults_and_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("XAI_API_KEY", "xai-key"),
            ("OPENAI_API_KEY", "  "),
            ("CHROMA_URL", "http://chroma:8000"),
        ]);
        let config =
            ServiceConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.xai_api_key.as_deref(), Some("xai-key"));
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.chroma_url, "http://chroma:8000");
        assert_eq!(config.xai_model, "grok-3-mini-beta");
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = ServiceConfig::from_lookup(|name| {
            (name == "SERVICE_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(ConfigManager::parse_port(None).unwrap(), 8050);
        assert_eq!(ConfigManager::parse_port(Some("9000")).unwrap(), 9000);
        assert!(ConfigManager::parse_port(Some("http")).is_err());
    }
}
