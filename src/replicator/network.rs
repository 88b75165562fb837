use crate::error::ReplicationError;
use crate::replicator::ReplicaClient;
use crate::types::*;
use async_trait::async_trait;

/// Pushes writes to followers over HTTP (`POST {follower}/replicate`).
#[derive(Clone, Default)]
pub struct HttpReplicaClient {
    client: reqwest::Client,
}

impl HttpReplicaClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReplicaClient for HttpReplicaClient {
    async fn replicate(
        &self,
        target: &FollowerTarget,
        request: &WriteRequest,
    ) -> Result<(), ReplicationError> {
        let response = self
            .client
            .post(target.replicate_url())
            .header("x-request-id", &request.id)
            .json(&request.to_key_value())
            .send()
            .await
            .map_err(|e| ReplicationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReplicationError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
