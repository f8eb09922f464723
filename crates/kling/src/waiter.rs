//! Completion waiter: poll a task until it is terminal or the deadline passes.
//!
//! All decisions live in [`PollLoop`], a synchronous state machine fed one
//! observation at a time. [`wait`] and [`wait_blocking`] are the two front
//! ends; they differ only in how they fetch and how they sleep.
//!
//! ```text
//! Polling ──succeeded──▶ Succeeded (Ok(task))
//!    │ ──failed─────────▶ Failed    (Err(TaskFailed))
//!    │ ──deadline───────▶ TimedOut  (Err(Timeout))
//!    │ ──fetch error────▶ Errored   (error propagated as-is)
//!    └─◀── sleep ── submitted / running
//! ```

use std::time::Duration;

use kling_proto::{KlingError, Result, Task, TaskStatus};
use tracing::{debug, info, warn};

use crate::accessor::{AsyncTaskAccessor, TaskAccessor};
use crate::config::{DEFAULT_POLL_INTERVAL_SECONDS, DEFAULT_POLL_TIMEOUT_SECONDS};

/// Cadence and budget for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl WaitOptions {
    /// `poll_interval` must be non-zero. A `timeout` of `None` or zero
    /// means wait without a deadline.
    pub fn new(poll_interval: Duration, timeout: Option<Duration>) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(KlingError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            poll_interval,
            timeout: timeout.filter(|t| !t.is_zero()),
        })
    }

    /// Builds options from seconds. Non-positive timeouts mean unbounded.
    pub fn from_secs_f64(poll_interval: f64, timeout: f64) -> Result<Self> {
        if !poll_interval.is_finite() || poll_interval <= 0.0 {
            return Err(KlingError::Config(format!(
                "poll interval must be a positive number of seconds, got {poll_interval}"
            )));
        }
        if timeout.is_nan() {
            return Err(KlingError::Config("timeout must be a number".to_string()));
        }
        let poll_interval = Duration::try_from_secs_f64(poll_interval)
            .map_err(|e| KlingError::Config(format!("invalid poll interval: {e}")))?;
        // A positive timeout too small to represent still gets a deadline.
        let timeout = if timeout > 0.0 {
            Duration::try_from_secs_f64(timeout)
                .ok()
                .map(|t| t.max(Duration::from_nanos(1)))
        } else {
            None
        };
        Self::new(poll_interval, timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// `None` when the wait is unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs_f64(DEFAULT_POLL_INTERVAL_SECONDS),
            timeout: Some(Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECONDS)),
        }
    }
}

/// What the front end should do after an observation.
#[derive(Debug)]
pub enum PollStep<R> {
    /// The task succeeded; return it.
    Finished(Task<R>),
    /// Still in flight; sleep this long, then fetch again.
    Sleep(Duration),
}

/// The polling state machine shared by both execution models.
#[derive(Debug, Clone)]
pub struct PollLoop {
    task_id: String,
    options: WaitOptions,
    attempts: u64,
}

impl PollLoop {
    pub fn new(task_id: impl Into<String>, options: WaitOptions) -> Self {
        Self {
            task_id: task_id.into(),
            options,
            attempts: 0,
        }
    }

    /// Number of observations fed so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Feeds one fetched task, observed `elapsed` after the wait started.
    ///
    /// The deadline is checked before any sleep is scheduled, and the sleep
    /// is clamped to the remaining budget so the last fetch lands on the
    /// deadline rather than past it.
    pub fn observe<R>(&mut self, task: Task<R>, elapsed: Duration) -> Result<PollStep<R>> {
        self.attempts = self.attempts.saturating_add(1);
        let status = task.status();
        debug!(
            task_id = %self.task_id,
            %status,
            attempt = self.attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            "Polled task"
        );

        match status {
            TaskStatus::Succeeded => {
                info!(task_id = %self.task_id, attempts = self.attempts, "Task succeeded");
                Ok(PollStep::Finished(task))
            }
            TaskStatus::Failed => {
                let message = task.error_message().unwrap_or("task failed").to_string();
                warn!(task_id = %self.task_id, %message, "Task failed");
                Err(KlingError::TaskFailed {
                    task_id: self.task_id.clone(),
                    message,
                })
            }
            TaskStatus::Submitted | TaskStatus::Running => match self.options.timeout {
                Some(timeout) if elapsed >= timeout => {
                    warn!(
                        task_id = %self.task_id,
                        attempts = self.attempts,
                        timeout_secs = timeout.as_secs_f64(),
                        "Task did not complete before the deadline"
                    );
                    Err(KlingError::Timeout {
                        task_id: self.task_id.clone(),
                        timeout,
                        elapsed,
                        last_status: status,
                    })
                }
                Some(timeout) => Ok(PollStep::Sleep(
                    self.options.poll_interval.min(timeout - elapsed),
                )),
                None => Ok(PollStep::Sleep(self.options.poll_interval)),
            },
        }
    }
}

/// Waits for a task, blocking the calling thread between polls.
pub fn wait_blocking<A>(
    accessor: &A,
    task_id: &str,
    options: &WaitOptions,
) -> Result<Task<A::Output>>
where
    A: TaskAccessor + ?Sized,
{
    let started = std::time::Instant::now();
    let mut poll = PollLoop::new(task_id, *options);
    loop {
        let task = accessor.fetch(task_id)?;
        match poll.observe(task, started.elapsed())? {
            PollStep::Finished(task) => return Ok(task),
            PollStep::Sleep(pause) => std::thread::sleep(pause),
        }
    }
}

/// Waits for a task, yielding to the runtime between polls.
///
/// Dropping the returned future abandons the wait; no further fetches are
/// made and nothing is returned.
pub async fn wait<A>(accessor: &A, task_id: &str, options: &WaitOptions) -> Result<Task<A::Output>>
where
    A: AsyncTaskAccessor + ?Sized,
{
    let started = tokio::time::Instant::now();
    let mut poll = PollLoop::new(task_id, *options);
    loop {
        let task = accessor.fetch(task_id).await?;
        match poll.observe(task, started.elapsed())? {
            PollStep::Finished(task) => return Ok(task),
            PollStep::Sleep(pause) => tokio::time::sleep(pause).await,
        }
    }
}
