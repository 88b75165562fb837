mod coordinator;
mod delay;
mod network;
mod quorum;
mod tasks;
mod worker;

pub use coordinator::*;
pub use delay::*;
pub use network::*;
pub use quorum::*;
pub use tasks::*;
pub use worker::*;

use crate::error::ReplicationError;
use crate::types::*;
use async_trait::async_trait;

/// Transport used by workers to push one write to one follower.
#[async_trait]
pub trait ReplicaClient: Send + Sync {
    async fn replicate(
        &self,
        target: &FollowerTarget,
        request: &WriteRequest,
    ) -> Result<(), ReplicationError>;
}
