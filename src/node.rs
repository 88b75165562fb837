use crate::config::NodeConfig;
use crate::error::{ConfigError, KvError};
use crate::replicator::*;
use crate::store::Store;
use crate::types::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// What the leader tells the client about one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    QuorumMet(QuorumDecision),
    QuorumFailed(QuorumDecision),
    /// Leader without followers: the write only exists locally.
    LocalOnly,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, WriteOutcome::QuorumFailed(_))
    }

    pub fn decision(&self) -> Option<&QuorumDecision> {
        match self {
            WriteOutcome::QuorumMet(d) | WriteOutcome::QuorumFailed(d) => Some(d),
            WriteOutcome::LocalOnly => None,
        }
    }
}

/// One leader or follower process worth of state.
pub struct KvNode {
    role: Role,
    store: Store,
    replication: Option<LeaderReplication>,
    tasks: BackgroundTasks,
    shutdown_grace: Duration,
}

struct LeaderReplication {
    coordinator: ReplicationCoordinator,
    gate: QuorumGate,
}

impl KvNode {
    pub fn follower() -> Self {
        Self {
            role: Role::Follower,
            store: Store::new(),
            replication: None,
            tasks: BackgroundTasks::new(),
            shutdown_grace: Duration::from_secs(5),
        }
    }

    /// Builds a leader after validating its quorum against the follower set.
    pub fn leader(
        config: &NodeConfig,
        client: Arc<dyn ReplicaClient>,
        delays: DelayModel,
    ) -> Result<Self, ConfigError> {
        let mut config = config.clone();
        config.role = Role::Leader;
        config.validate()?;

        let followers = config.follower_targets()?;
        let tasks = BackgroundTasks::new();
        let worker = ReplicationWorker::new(client, config.replication.timeout());
        let coordinator =
            ReplicationCoordinator::new(followers, worker, delays, tasks.clone());
        let gate = QuorumGate::new(config.write_quorum)
            .with_deadline(config.replication.write_deadline());

        info!(
            "Leader configured with {} follower(s), write quorum {}",
            coordinator.followers().len(),
            gate.required()
        );

        Ok(Self {
            role: Role::Leader,
            store: Store::new(),
            replication: Some(LeaderReplication { coordinator, gate }),
            tasks,
            shutdown_grace: config.shutdown_grace(),
        })
    }

    /// Builds the node described by `config`, replicating over HTTP when it is a leader.
    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        match config.role {
            Role::Follower => {
                let mut node = Self::follower();
                node.shutdown_grace = config.shutdown_grace();
                Ok(node)
            }
            Role::Leader => {
                let settings = &config.replication;
                let delays = DelayModel::uniform(
                    settings.min_delay(),
                    settings.max_delay(),
                    settings.delay_seed,
                );
                Self::leader(config, Arc::new(HttpReplicaClient::new()), delays)
            }
        }
    }

    /// Commits locally, replicates, and reports once the quorum gate has decided.
    ///
    /// The local write is never rolled back. Attempts still running when this
    /// returns keep applying the value on followers in the background.
    pub async fn write(&self, key: &str, value: Value) -> Result<WriteOutcome, KvError> {
        let Some(replication) = &self.replication else {
            return Err(KvError::RoleViolation {
                role: self.role,
                operation: "writes",
            });
        };

        self.store.put(key, value.clone())?;

        let coordinator = &replication.coordinator;
        if coordinator.followers().is_empty() {
            return Ok(WriteOutcome::LocalOnly);
        }

        let request = Arc::new(WriteRequest::new(key, value));
        let mut outcomes = coordinator.replicate(request.clone());
        let decision = replication.gate.decide(&mut outcomes).await;

        if decision.is_success() {
            info!(
                "Write {} key={} met quorum ({}/{} acks)",
                request.id, request.key, decision.acks, decision.required
            );
            Ok(WriteOutcome::QuorumMet(decision))
        } else {
            warn!(
                "Write {} key={} failed quorum ({}/{} acks, {} of {} reported)",
                request.id,
                request.key,
                decision.acks,
                decision.required,
                decision.seen,
                decision.total
            );
            Ok(WriteOutcome::QuorumFailed(decision))
        }
    }

    /// Applies a write pushed by the leader. Last arrival wins; no ordering is enforced.
    pub fn replicate(&self, key: &str, value: Value) -> Result<(), KvError> {
        if self.role != Role::Follower {
            return Err(KvError::RoleViolation {
                role: self.role,
                operation: "replication",
            });
        }
        self.store.put(key, value)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    pub fn data(&self) -> BTreeMap<String, Value> {
        self.store.snapshot()
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            role: self.role,
            status: "alive".to_string(),
            data_count: self.store.len(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn background_tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    /// Waits for replication still in flight. Returns how many attempts were aborted.
    pub async fn drain(&self) -> usize {
        self.tasks.drain(self.shutdown_grace).await
    }
}
