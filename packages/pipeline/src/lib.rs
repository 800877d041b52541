// ABOUTME: Change dispatch and durable job processing for Lumora
// ABOUTME: Events map to queued jobs; the runner claims and executes them with retries

pub mod dispatcher;
pub mod jobs;
pub mod queue;
pub mod runner;

pub use dispatcher::{job_for_event, ChangeDispatcher};
pub use jobs::{Job, JobRecord, JobStatus};
pub use queue::{JobQueue, QueueError, SqliteJobQueue};
pub use runner::{JobError, JobRunner, RunnerConfig};
