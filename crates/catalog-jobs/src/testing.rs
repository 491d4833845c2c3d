//! In-memory queue used by unit tests.

use crate::error::{JobError, JobResult};
use crate::job::{JobData, JobId};
use crate::queue::{FailOutcome, JobQueue};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

#[derive(Default)]
struct State {
    jobs: HashMap<String, JobData>,
    pending: HashMap<String, VecDeque<String>>,
    processing: HashMap<String, Vec<String>>,
    dlq: HashMap<String, Vec<String>>,
    active: HashMap<String, String>,
    alive: HashSet<String>,
    completed: Vec<JobData>,
    broken: bool,
}

/// Single-process stand-in for the Redis queue with the same state machine.
#[derive(Default)]
pub struct MemoryQueue {
    state: Mutex<State>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail.
    pub fn broken() -> Self {
        let queue = Self::default();
        queue.state.lock().broken = true;
        queue
    }

    pub fn completed(&self) -> Vec<JobData> {
        self.state.lock().completed.clone()
    }

    pub fn dead_letters(&self, queue: &str) -> Vec<JobData> {
        let state = self.state.lock();
        state
            .dlq
            .get(queue)
            .into_iter()
            .flatten()
            .filter_map(|id| state.jobs.get(id).cloned())
            .collect()
    }

    pub fn in_flight(&self, queue: &str) -> usize {
        self.state.lock().processing.get(queue).map_or(0, Vec::len)
    }

    /// Leaves a job in flight with no owning worker, as a crash mid-claim would.
    pub fn strand(&self, job: JobData) {
        let mut state = self.state.lock();
        let id = job.id.to_string();
        state.processing.entry(job.queue.clone()).or_default().push(id.clone());
        state.jobs.insert(id, job);
    }

    fn check(state: &State) -> JobResult<()> {
        if state.broken {
            return Err(JobError::Worker("queue unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn push(&self, job: JobData) -> JobResult<JobId> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let id = job.id.clone();
        state
            .pending
            .entry(job.queue.clone())
            .or_default()
            .push_front(id.to_string());
        state.jobs.insert(id.to_string(), job);
        Ok(id)
    }

    async fn dequeue(&self, queue: &str, worker_id: &str) -> JobResult<Option<JobData>> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let Some(id) = state.pending.get_mut(queue).and_then(VecDeque::pop_back) else {
            return Ok(None);
        };
        let Some(job) = state.jobs.get_mut(&id) else {
            return Ok(None);
        };
        job.increment_attempt();
        let job = job.clone();
        if job.attempt > job.max_attempts {
            state.dlq.entry(queue.to_string()).or_default().push(id);
            return Ok(None);
        }
        state.processing.entry(queue.to_string()).or_default().push(id.clone());
        state.active.insert(id, worker_id.to_string());
        Ok(Some(job))
    }

    async fn complete(&self, job: &JobData) -> JobResult<()> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let id = job.id.to_string();
        if let Some(list) = state.processing.get_mut(&job.queue) {
            list.retain(|x| x != &id);
        }
        state.active.remove(&id);
        state.jobs.remove(&id);
        state.completed.push(job.clone());
        Ok(())
    }

    async fn fail(&self, job: &JobData, error: &JobError) -> JobResult<FailOutcome> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let id = job.id.to_string();
        let mut job = job.clone();
        job.set_error(error);
        let retry = !job.is_exhausted() && error.is_retryable();

        if let Some(list) = state.processing.get_mut(&job.queue) {
            list.retain(|x| x != &id);
        }
        state.active.remove(&id);
        let queue = job.queue.clone();
        state.jobs.insert(id.clone(), job);

        if retry {
            state.pending.entry(queue).or_default().push_front(id);
            Ok(FailOutcome::Retried)
        } else {
            state.dlq.entry(queue).or_default().push(id);
            Ok(FailOutcome::DeadLettered)
        }
    }

    async fn recover_stale(&self, queue: &str) -> JobResult<u64> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let in_flight = state.processing.remove(queue).unwrap_or_default();
        let mut kept = Vec::new();
        let mut recovered = 0;
        for id in in_flight {
            let owner_alive = state
                .active
                .get(&id)
                .is_some_and(|worker| state.alive.contains(worker));
            if owner_alive {
                kept.push(id);
            } else {
                state.active.remove(&id);
                state.pending.entry(queue.to_string()).or_default().push_back(id);
                recovered += 1;
            }
        }
        state.processing.insert(queue.to_string(), kept);
        Ok(recovered)
    }

    async fn heartbeat(&self, worker_id: &str, _ttl: Duration) -> JobResult<()> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        state.alive.insert(worker_id.to_string());
        Ok(())
    }

    async fn queue_length(&self, queue: &str) -> JobResult<u64> {
        let state = self.state.lock();
        Self::check(&state)?;
        Ok(state.pending.get(queue).map_or(0, |l| l.len() as u64))
    }

    async fn dead_letter_length(&self, queue: &str) -> JobResult<u64> {
        let state = self.state.lock();
        Self::check(&state)?;
        Ok(state.dlq.get(queue).map_or(0, |l| l.len() as u64))
    }

    async fn health_check(&self) -> JobResult<()> {
        Self::check(&self.state.lock())
    }
}
