// src/pipeline_cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app_log;
use crate::core::{ConfigManager, Database};
use crate::jobs::{JobPipeline, PipelineStatus, PipelineStep, StepReport};

#[derive(Parser, Debug)]
#[command(name = "seeklyzer")]
#[command(about = "Job search and resume compatibility service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Start the web server (default)
    Serve,
    /// Run ingestion steps without the server
    Pipeline {
        #[command(subcommand)]
        step: PipelineCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum PipelineCommand {
    /// Fetch listings, preprocess them and store the results
    Fetch,
    /// Extract structured details from stored job descriptions
    Extract {
        /// Process at most this many jobs
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Embed stored jobs into the vector store
    Vectorize,
    /// Fetch, extract and vectorize in order
    RunAll {
        #[arg(long)]
        limit: Option<i64>,
    },
}

pub async fn handle_pipeline_command(config: &ConfigManager, command: PipelineCommand) -> Result<()> {
    let db = Database::new(&config.environment.database_path).await?;
    let pipeline = JobPipeline::new(config, &db);

    match command {
        PipelineCommand::Fetch => print_report(&pipeline.fetch().await?),
        PipelineCommand::Extract { limit } => {
            let stored = db.jobs().count().await?;
            if stored == 0 {
                anyhow::bail!("No jobs stored yet; run `seeklyzer pipeline fetch` first");
            }
            print_report(&pipeline.extract(limit).await?);
        }
        PipelineCommand::Vectorize => print_report(&pipeline.vectorize().await?),
        PipelineCommand::RunAll { limit } => {
            let status = PipelineStatus::new();
            for step in [
                PipelineStep::Fetch,
                PipelineStep::Extract,
                PipelineStep::Vectorize,
            ] {
                print_report(&pipeline.run(&status, step, limit).await?);
            }
        }
    }

    Ok(())
}

fn print_report(report: &StepReport) {
    app_log!(
        info,
        "Step '{}' completed successfully in {:.2} seconds",
        report.step.as_str(),
        report.duration_secs
    );
    for line in &report.output {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EnvironmentConfig, ServiceConfig};

    #[test]
    fn test_serve_is_the_default() {
        let cli = Cli::try_parse_from(["seeklyzer"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_parse_pipeline_steps() {
        let cli = Cli::try_parse_from(["seeklyzer", "pipeline", "extract", "--limit", "10"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Pipeline {
                step: PipelineCommand::Extract { limit: Some(10) }
            })
        );

        let cli = Cli::try_parse_from(["seeklyzer", "pipeline", "run-all"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Pipeline {
                step: PipelineCommand::RunAll { limit: None }
            })
        );

        assert!(Cli::try_parse_from(["seeklyzer", "pipeline", "scrape"]).is_err());
    }

    #[tokio::test]
    async fn test_extract_needs_stored_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let environment = EnvironmentConfig::default().resolved(dir.path());
        let config =
            ConfigManager::from_parts(environment, ServiceConfig::from_lookup(|_| None).unwrap());

        let err = handle_pipeline_command(&config, PipelineCommand::Extract { limit: None })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No jobs stored yet"));
    }
}
