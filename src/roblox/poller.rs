// Fixed-interval, deadline-bounded polling of an asset operation

use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::client::{AssetsClient, OperationStatus};
use crate::config::PollingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(3))
    }
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self::new(config.timeout(), config.interval())
    }
}

#[derive(Debug)]
pub enum PollOutcome {
    Done(OperationStatus),
    /// Deadline passed; carries the last payload that decoded, if any
    TimedOut { last_payload: Option<Value> },
}

/// Query the operation every `interval` until it reports `done` or
/// `timeout` has elapsed. Failed requests are logged and skipped; the
/// interval stays the same no matter how many fail.
pub async fn poll_operation(
    client: &AssetsClient,
    api_key: &str,
    operation_id: &str,
    settings: &PollSettings,
) -> PollOutcome {
    let start = Instant::now();
    let mut last_payload = None;
    let mut attempts: u32 = 0;

    while start.elapsed() < settings.timeout {
        attempts += 1;
        match client.get_operation(api_key, operation_id).await {
            Ok(status) if status.done => {
                info!(
                    operation_id = %operation_id,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Operation finished"
                );
                return PollOutcome::Done(status);
            }
            Ok(status) => {
                debug!(
                    operation_id = %operation_id,
                    path = status.path.as_deref().unwrap_or_default(),
                    attempts,
                    "Operation still running"
                );
                last_payload = Some(status.raw);
            }
            Err(e) => {
                warn!(operation_id = %operation_id, attempts, error = %e, "Error while polling operation");
            }
        }

        sleep(settings.interval).await;
    }

    warn!(
        operation_id = %operation_id,
        attempts,
        timeout_secs = settings.timeout.as_secs_f64(),
        "Gave up waiting for operation"
    );
    PollOutcome::TimedOut { last_payload }
}
