//! Job trait and envelope.

use crate::error::{JobError, JobResult};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Creates a new random job ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the job ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job execution context.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Job ID.
    pub job_id: JobId,

    /// Current attempt number (1-based).
    pub attempt: u32,

    /// Maximum attempts allowed.
    pub max_attempts: u32,

    /// Queue name.
    pub queue: String,

    /// Job started executing at this time.
    pub started_at: DateTime<Utc>,

    /// Worker ID processing this job.
    pub worker_id: String,
}

impl JobContext {
    /// Returns true if this is the last attempt.
    #[must_use]
    pub const fn is_last_attempt(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Returns remaining attempts.
    #[must_use]
    pub const fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempt)
    }
}

/// A typed job payload.
///
/// Jobs carry data only. The code that runs them is registered on the
/// [`WorkerPool`](crate::WorkerPool) per job name, so handlers can capture
/// their own dependencies.
pub trait Job: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Unique name for this job type.
    const NAME: &'static str;

    /// Default queue for this job type.
    const QUEUE: &'static str = "default";

    /// Redeliveries after the first attempt.
    const MAX_RETRIES: u32 = 2;

    /// Job timeout in seconds.
    const TIMEOUT_SECS: u64 = 60;
}

/// Serialized job envelope stored in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    /// Job ID.
    pub id: JobId,

    /// Job type name.
    pub name: String,

    /// Queue name.
    pub queue: String,

    /// Serialized job payload.
    pub payload: String,

    /// Deliveries so far.
    pub attempt: u32,

    /// Deliveries allowed before dead-lettering.
    pub max_attempts: u32,

    /// Job timeout in seconds.
    pub timeout_secs: u64,

    /// When the job was created.
    pub created_at: DateTime<Utc>,

    /// Error from last failed attempt.
    pub last_error: Option<String>,
}

impl JobData {
    /// Creates a new envelope from a job instance.
    pub fn new<J: Job>(job: &J) -> JobResult<Self> {
        Ok(Self {
            id: JobId::new(),
            name: J::NAME.to_string(),
            queue: J::QUEUE.to_string(),
            payload: serde_json::to_string(job)?,
            attempt: 0,
            max_attempts: J::MAX_RETRIES + 1,
            timeout_secs: J::TIMEOUT_SECS,
            created_at: Utc::now(),
            last_error: None,
        })
    }

    /// Routes the job to another queue.
    #[must_use]
    pub fn on_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Overrides the delivery limit. At least one delivery is always allowed.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Overrides the execution timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Deserializes the job payload.
    pub fn deserialize<J: Job>(&self) -> JobResult<J> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    /// Increments the attempt counter.
    pub fn increment_attempt(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }

    /// Returns true once no further delivery is allowed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Records the error of the last attempt.
    pub fn set_error(&mut self, error: &JobError) {
        self.last_error = Some(error.to_string());
    }

    /// Returns the execution timeout, or `fallback` when none is set.
    #[must_use]
    pub fn timeout_or(&self, fallback: Duration) -> Duration {
        if self.timeout_secs == 0 {
            fallback
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Creates the execution context for one delivery.
    #[must_use]
    pub fn to_context(&self, worker_id: &str) -> JobContext {
        JobContext {
            job_id: self.id.clone(),
            attempt: self.attempt,
            max_attempts: self.max_attempts,
            queue: self.queue.clone(),
            started_at: Utc::now(),
            worker_id: worker_id.to_string(),
        }
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> JobResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> JobResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
