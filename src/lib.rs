pub mod api;
pub mod config;
pub mod error;
pub mod node;
pub mod replicator;
pub mod store;
pub mod types;

pub use api::create_router;
pub use config::{NodeConfig, ReplicationSettings};
pub use error::{ConfigError, KvError, ReplicationError};
pub use node::{KvNode, WriteOutcome};
pub use replicator::{HttpReplicaClient, ReplicaClient};
pub use store::Store;
pub use types::*;
