use crate::error::ConfigError;
use crate::types::{FollowerTarget, Role};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub role: Role,

    pub bind_addr: String,
    pub bind_port: u16,

    pub followers: Vec<String>,
    pub write_quorum: usize,

    pub shutdown_grace_secs: u64,

    pub replication: ReplicationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationSettings {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub timeout_ms: u64,
    pub write_deadline_ms: Option<u64>,
    pub delay_seed: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Follower,
            bind_addr: "0.0.0.0".to_string(),
            bind_port: 8000,
            followers: Vec::new(),
            write_quorum: 1,
            shutdown_grace_secs: 5,
            replication: ReplicationSettings::default(),
        }
    }
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 1000,
            timeout_ms: 5000,
            write_deadline_ms: None,
            delay_seed: None,
        }
    }
}

impl ReplicationSettings {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn write_deadline(&self) -> Option<Duration> {
        self.write_deadline_ms.map(Duration::from_millis)
    }
}

impl NodeConfig {
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &PathBuf) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Overrides fields from `ROLE`, `FOLLOWERS`, `WRITE_QUORUM`, `MIN_DELAY`,
    /// `MAX_DELAY`, `REPLICATION_TIMEOUT`, `WRITE_DEADLINE`, `DELAY_SEED`,
    /// `BIND_ADDR` and `PORT`. Durations are milliseconds.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(role) = lookup("ROLE") {
            self.role = role.parse().map_err(|reason| ConfigError::InvalidVar {
                var: "ROLE",
                reason,
            })?;
        }
        if let Some(followers) = lookup("FOLLOWERS") {
            self.followers = followers
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if let Some(quorum) = lookup("WRITE_QUORUM") {
            self.write_quorum = parse_var("WRITE_QUORUM", &quorum)?;
        }
        if let Some(min) = lookup("MIN_DELAY") {
            self.replication.min_delay_ms = parse_var("MIN_DELAY", &min)?;
        }
        if let Some(max) = lookup("MAX_DELAY") {
            self.replication.max_delay_ms = parse_var("MAX_DELAY", &max)?;
        }
        if let Some(timeout) = lookup("REPLICATION_TIMEOUT") {
            self.replication.timeout_ms = parse_var("REPLICATION_TIMEOUT", &timeout)?;
        }
        if let Some(deadline) = lookup("WRITE_DEADLINE") {
            self.replication.write_deadline_ms = Some(parse_var("WRITE_DEADLINE", &deadline)?);
        }
        if let Some(seed) = lookup("DELAY_SEED") {
            self.replication.delay_seed = Some(parse_var("DELAY_SEED", &seed)?);
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            self.bind_port = parse_var("PORT", &port)?;
        }
        Ok(())
    }

    /// Rejects configurations that could never serve a write correctly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.replication;
        if settings.min_delay_ms > settings.max_delay_ms {
            return Err(ConfigError::InvalidDelayRange {
                min_ms: settings.min_delay_ms,
                max_ms: settings.max_delay_ms,
            });
        }
        if settings.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.role == Role::Follower {
            return Ok(());
        }

        if self.followers.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::EmptyFollower);
        }
        let followers = self.followers.len();
        if self.write_quorum > followers {
            return Err(ConfigError::QuorumExceedsFollowers {
                quorum: self.write_quorum,
                followers,
            });
        }
        if followers > 0 && self.write_quorum == 0 {
            return Err(ConfigError::ZeroQuorum);
        }
        Ok(())
    }

    pub fn follower_targets(&self) -> Result<Vec<FollowerTarget>, ConfigError> {
        self.followers
            .iter()
            .map(|f| FollowerTarget::parse(f).ok_or(ConfigError::EmptyFollower))
            .collect()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        var,
        reason: e.to_string(),
    })
}
