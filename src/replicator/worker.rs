use crate::replicator::ReplicaClient;
use crate::types::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Performs exactly one replicate call against one follower.
#[derive(Clone)]
pub struct ReplicationWorker {
    client: Arc<dyn ReplicaClient>,
    timeout: Duration,
}

impl ReplicationWorker {
    pub fn new(client: Arc<dyn ReplicaClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Waits `delay`, then sends the write.
    ///
    /// The simulated delay is part of the attempt's network time, so the
    /// timeout bounds the delay and the call together.
    pub async fn run(
        &self,
        target: FollowerTarget,
        request: Arc<WriteRequest>,
        delay: Duration,
    ) -> ReplicationAttempt {
        let started = Instant::now();

        let attempt = async {
            tokio::time::sleep(delay).await;
            self.client.replicate(&target, &request).await
        };

        let outcome = match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(())) => AttemptOutcome::Success,
            Ok(Err(e)) => AttemptOutcome::FailureError(e.to_string()),
            Err(_) => AttemptOutcome::FailureTimeout,
        };

        let elapsed = started.elapsed();
        match &outcome {
            AttemptOutcome::Success => {
                debug!(
                    "Replicated {} key={} to {} in {:?}",
                    request.id, request.key, target, elapsed
                );
            }
            AttemptOutcome::FailureTimeout => {
                warn!(
                    "Replication of {} to {} timed out after {:?}",
                    request.id, target, self.timeout
                );
            }
            AttemptOutcome::FailureError(reason) => {
                warn!("Replication of {} to {} failed: {}", request.id, target, reason);
            }
        }

        ReplicationAttempt {
            request_id: request.id.clone(),
            follower: target,
            delay,
            elapsed,
            outcome,
        }
    }
}
