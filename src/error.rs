use crate::types::Role;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("write quorum {quorum} exceeds follower count {followers}")]
    QuorumExceedsFollowers { quorum: usize, followers: usize },
    #[error("write quorum must be at least 1 when followers are configured")]
    ZeroQuorum,
    #[error("follower list contains an empty entry")]
    EmptyFollower,
    #[error("min delay {min_ms}ms is greater than max delay {max_ms}ms")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },
    #[error("replication timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("{role} node cannot accept {operation}")]
    RoleViolation { role: Role, operation: &'static str },
    #[error("key must not be empty")]
    EmptyKey,
}

/// Why one replicate call did not produce an ack.
#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("follower returned status {0}")]
    Status(u16),
}
