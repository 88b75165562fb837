#![allow(dead_code)]

use async_trait::async_trait;
use quorumkv::*;
use std::collections::HashMap;
use std::time::Duration;

/// In-memory followers keyed by URL, each with a fixed network latency.
pub struct MockCluster {
    followers: HashMap<String, MockFollower>,
    urls: Vec<String>,
}

#[derive(Clone)]
pub struct MockFollower {
    pub store: Store,
    latency: Duration,
    fail: bool,
}

impl MockCluster {
    pub fn with_latencies(latencies_ms: &[u64]) -> Self {
        let mut followers = HashMap::new();
        let mut urls = Vec::new();
        for (i, ms) in latencies_ms.iter().enumerate() {
            let url = format!("http://follower-{}", i + 1);
            followers.insert(
                url.clone(),
                MockFollower {
                    store: Store::new(),
                    latency: Duration::from_millis(*ms),
                    fail: false,
                },
            );
            urls.push(url);
        }
        Self { followers, urls }
    }

    /// Makes the follower at `index` answer with a 503 after its latency.
    pub fn failing(mut self, index: usize) -> Self {
        let url = self.urls[index].clone();
        if let Some(f) = self.followers.get_mut(&url) {
            f.fail = true;
        }
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.clone()
    }

    pub fn store(&self, index: usize) -> Store {
        self.followers[&self.urls[index]].store.clone()
    }

    pub fn leader_config(&self, quorum: usize, timeout_ms: u64) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.role = Role::Leader;
        config.followers = self.urls();
        config.write_quorum = quorum;
        config.replication.min_delay_ms = 0;
        config.replication.max_delay_ms = 0;
        config.replication.timeout_ms = timeout_ms;
        config
    }
}

#[async_trait]
impl ReplicaClient for MockCluster {
    async fn replicate(
        &self,
        target: &FollowerTarget,
        request: &WriteRequest,
    ) -> Result<(), ReplicationError> {
        let follower = self
            .followers
            .get(&target.url)
            .ok_or_else(|| ReplicationError::Transport(format!("unknown follower {}", target)))?;

        tokio::time::sleep(follower.latency).await;
        if follower.fail {
            return Err(ReplicationError::Status(503));
        }

        follower
            .store
            .put(&request.key, request.value.clone())
            .map_err(|e| ReplicationError::Transport(e.to_string()))
    }
}
