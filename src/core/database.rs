// src/core/database.rs
//! SQLite storage for preprocessed job postings

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

use crate::app_log;
use crate::core::FsOps;
use crate::jobs::{ExtractedJobDetails, JobRecord, StoredJob};

const JOB_COLUMNS: &str = "job_id, job_title, company_name, work_type, work_arrangement, \
     location, posting_date, job_url, job_description, extracted_details, embedded_at";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        app_log!(
            info,
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database, single connection so every query sees the same data
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn jobs(&self) -> JobRepository<'_> {
        JobRepository::new(&self.pool)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY NOT NULL,
                job_title TEXT NOT NULL,
                company_name TEXT NOT NULL,
                work_type TEXT NOT NULL,
                work_arrangement TEXT NOT NULL,
                location TEXT NOT NULL,
                posting_date TEXT NOT NULL,
                job_url TEXT NOT NULL,
                job_description TEXT NOT NULL,
                extracted_details TEXT,
                embedded_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_posting_date ON jobs(posting_date);")
            .execute(&self.pool)
            .await?;

        app_log!(info, "Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh postings. Extraction and embedding state survive a refresh
    /// unless the description changed.
    pub async fn upsert_many(&self, records: &[JobRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO jobs (job_id, job_title, company_name, work_type, work_arrangement,
                                  location, posting_date, job_url, job_description,
                                  created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(job_id) DO UPDATE SET
                    job_title = excluded.job_title,
                    company_name = excluded.company_name,
                    work_type = excluded.work_type,
                    work_arrangement = excluded.work_arrangement,
                    location = excluded.location,
                    posting_date = excluded.posting_date,
                    job_url = excluded.job_url,
                    extracted_details = CASE
                        WHEN jobs.job_description = excluded.job_description
                        THEN jobs.extracted_details ELSE NULL END,
                    embedded_at = CASE
                        WHEN jobs.job_description = excluded.job_description
                        THEN jobs.embedded_at ELSE NULL END,
                    job_description = excluded.job_description,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&record.job_id)
            .bind(&record.job_title)
            .bind(&record.company_name)
            .bind(&record.work_type)
            .bind(&record.work_arrangement)
            .bind(&record.location)
            .bind(&record.posting_date)
            .bind(&record.job_url)
            .bind(&record.job_description)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to store job {}", record.job_id))?;
        }

        tx.commit().await?;
        app_log!(info, "Stored {} jobs", records.len());
        Ok(records.len())
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Newest postings first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<StoredJob>> {
        let jobs = sqlx::query_as::<_, StoredJob>(&format!(
            "SELECT {} FROM jobs ORDER BY posting_date DESC, job_id ASC LIMIT ? OFFSET ?",
            JOB_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(jobs)
    }

    /// Jobs not yet in the vector store, or whose description changed since
    pub async fn pending_embedding(&self) -> Result<Vec<StoredJob>> {
        let jobs = sqlx::query_as::<_, StoredJob>(&format!(
            "SELECT {} FROM jobs WHERE embedded_at IS NULL ORDER BY job_id ASC",
            JOB_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(jobs)
    }

    pub async fn get(&self, job_id: &str) -> Result<Option<StoredJob>> {
        let job = sqlx::query_as::<_, StoredJob>(&format!(
            "SELECT {} FROM jobs WHERE job_id = ?",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(job)
    }

    /// Jobs with a description but no extracted details yet
    pub async fn pending_extraction(&self, limit: Option<i64>) -> Result<Vec<StoredJob>> {
        let jobs = sqlx::query_as::<_, StoredJob>(&format!(
            r#"
            SELECT {} FROM jobs
            WHERE extracted_details IS NULL AND TRIM(job_description) != ''
            ORDER BY job_id ASC
            LIMIT ?
            "#,
            JOB_COLUMNS
        ))
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.pool)
        .await?;

        Ok(jobs)
    }

    pub async fn set_extracted_details(
        &self,
        job_id: &str,
        details: &ExtractedJobDetails,
    ) -> Result<bool> {
        let json = serde_json::to_string(details).context("Failed to serialize job details")?;

        let result = sqlx::query(
            "UPDATE jobs SET extracted_details = ?, updated_at = ? WHERE job_id = ?",
        )
        .bind(json)
        .bind(Utc::now())
        .bind(job_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_embedded(&self, job_ids: &[String]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut updated = 0;

        for job_id in job_ids {
            let result = sqlx::query("UPDATE jobs SET embedded_at = ? WHERE job_id = ?")
                .bind(now)
                .bind(job_id)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }
}
