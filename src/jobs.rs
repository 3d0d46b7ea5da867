//! In-memory job records.
//!
//! The store is owned by the pipeline and lives as long as the process; nothing
//! is persisted across restarts. Each job is only ever updated by the task that
//! runs its steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, DubError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of a job as returned by status queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// 0-100
    pub progress: u8,
    pub message: String,
    pub result_location: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Concurrency-safe map of job id to job record
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queued job
    pub async fn create(&self) -> Job {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            progress: 0,
            message: "Queued for processing...".to_string(),
            result_location: None,
            created_at: now,
            updated_at: now,
        };

        self.jobs.write().await.insert(job.id, job.clone());
        job
    }

    pub async fn get(&self, id: Uuid) -> Result<Job> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DubError::JobNotFound(id))
    }

    /// Record a processing step
    pub async fn update_progress<S: Into<String>>(&self, id: Uuid, progress: u8, message: S) -> Result<()> {
        self.modify(id, |job| {
            job.status = JobStatus::Processing;
            job.progress = progress.min(100);
            job.message = message.into();
        })
        .await
    }

    pub async fn complete<S: Into<String>>(&self, id: Uuid, message: S, result_location: PathBuf) -> Result<()> {
        self.modify(id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.message = message.into();
            job.result_location = Some(result_location);
        })
        .await
    }

    /// Mark failed; progress keeps the value the job had reached
    pub async fn fail<S: Into<String>>(&self, id: Uuid, message: S) -> Result<()> {
        self.modify(id, |job| {
            job.status = JobStatus::Failed;
            job.message = message.into();
        })
        .await
    }

    pub async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        jobs
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn modify<F>(&self, id: Uuid, update: F) -> Result<()>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(DubError::JobNotFound(id))?;
        update(job);
        job.updated_at = Utc::now();
        Ok(())
    }
}
