use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Supervised group for replication work that outlives the request that started it.
///
/// Finished tasks are reaped whenever the group is touched; `drain` awaits
/// whatever is still running and aborts it once the grace period elapses.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    inner: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut set = self.lock();
        reap(&mut set);
        set.spawn(task);
    }

    pub fn in_flight(&self) -> usize {
        let mut set = self.lock();
        reap(&mut set);
        set.len()
    }

    /// Waits for every task spawned so far. Returns how many had to be aborted.
    pub async fn drain(&self, grace: Duration) -> usize {
        let mut set = std::mem::take(&mut *self.lock());
        if set.is_empty() {
            return 0;
        }

        info!("Draining {} background replication task(s)", set.len());
        let finished = tokio::time::timeout(grace, async {
            while let Some(result) = set.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        error!("Replication task panicked: {}", e);
                    }
                }
            }
        })
        .await;

        if finished.is_err() {
            let remaining = set.len();
            warn!("Aborting {} replication task(s) after {:?}", remaining, grace);
            set.shutdown().await;
            return remaining;
        }

        0
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn reap(set: &mut JoinSet<()>) {
    while let Some(result) = set.try_join_next() {
        if let Err(e) = result {
            if e.is_panic() {
                error!("Replication task panicked: {}", e);
            }
        }
    }
}
