use crate::replicator::{BackgroundTasks, DelayModel, ReplicationWorker};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Fans one write out to every configured follower.
///
/// The coordinator makes no quorum decision and never cancels a worker: each
/// launched attempt runs to completion (or its own timeout) inside the shared
/// [`BackgroundTasks`] group, whether or not anyone still reads its outcome.
pub struct ReplicationCoordinator {
    followers: Arc<[FollowerTarget]>,
    worker: ReplicationWorker,
    delays: Arc<DelayModel>,
    tasks: BackgroundTasks,
}

impl ReplicationCoordinator {
    pub fn new(
        followers: Vec<FollowerTarget>,
        worker: ReplicationWorker,
        delays: DelayModel,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            followers: followers.into(),
            worker,
            delays: Arc::new(delays),
            tasks,
        }
    }

    pub fn followers(&self) -> &[FollowerTarget] {
        &self.followers
    }

    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    pub fn replicate(&self, request: Arc<WriteRequest>) -> OutcomeStream {
        let (tx, rx) = mpsc::unbounded_channel();

        for target in self.followers.iter().cloned() {
            // Sampled here, in launch order, so seeded runs are reproducible.
            let delay = self.delays.sample();
            let worker = self.worker.clone();
            let request = request.clone();
            let tx = tx.clone();

            self.tasks.spawn(async move {
                let attempt = worker.run(target, request, delay).await;
                if tx.send(attempt).is_err() {
                    debug!("Outcome arrived after the quorum decision was made");
                }
            });
        }

        OutcomeStream::new(rx, self.followers.len())
    }
}

/// Attempt outcomes for one write, yielded in completion order.
pub struct OutcomeStream {
    rx: mpsc::UnboundedReceiver<ReplicationAttempt>,
    total: usize,
}

impl OutcomeStream {
    pub fn new(rx: mpsc::UnboundedReceiver<ReplicationAttempt>, total: usize) -> Self {
        Self { rx, total }
    }

    /// Number of attempts that were launched.
    pub fn total(&self) -> usize {
        self.total
    }

    /// `None` once every worker has reported and dropped its sender.
    pub async fn next(&mut self) -> Option<ReplicationAttempt> {
        self.rx.recv().await
    }
}
