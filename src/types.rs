use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub type Key = String;
pub type RequestId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Leader,
    Follower,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Leader => f.write_str("leader"),
            Role::Follower => f.write_str("follower"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leader" => Ok(Role::Leader),
            "follower" => Ok(Role::Follower),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Body of both `/write` and `/replicate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyValue {
    pub key: Key,
    pub value: serde_json::Value,
}

/// One client write as it travels through replication.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub id: RequestId,
    pub key: Key,
    pub value: serde_json::Value,
}

impl WriteRequest {
    pub fn new(key: impl Into<Key>, value: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.into(),
            value,
        }
    }

    pub fn to_key_value(&self) -> KeyValue {
        KeyValue {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// A follower replica, addressed by its base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowerTarget {
    pub url: String,
}

impl FollowerTarget {
    /// Accepts either a full URL or a bare `host:port`, which is assumed to be plain http.
    pub fn parse(addr: &str) -> Option<Self> {
        let addr = addr.trim().trim_end_matches('/');
        if addr.is_empty() {
            return None;
        }
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        };
        Some(Self { url })
    }

    pub fn replicate_url(&self) -> String {
        format!("{}/replicate", self.url)
    }
}

impl fmt::Display for FollowerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    FailureTimeout,
    FailureError(String),
}

impl AttemptOutcome {
    pub fn is_ack(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// The finished state of one (request, follower) replication attempt.
#[derive(Debug, Clone)]
pub struct ReplicationAttempt {
    pub request_id: RequestId,
    pub follower: FollowerTarget,
    pub delay: Duration,
    pub elapsed: Duration,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumResult {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumDecision {
    pub result: QuorumResult,
    pub required: usize,
    pub total: usize,
    pub acks: usize,
    pub seen: usize,
    pub deadline_expired: bool,
}

impl QuorumDecision {
    pub fn is_success(&self) -> bool {
        self.result == QuorumResult::Success
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetResponse {
    pub key: Key,
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub role: Role,
    pub status: String,
    pub data_count: usize,
}
