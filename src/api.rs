use crate::error::KvError;
use crate::node::{KvNode, WriteOutcome};
use crate::types::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn create_router(node: Arc<KvNode>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/write", post(write))
        .route("/replicate", post(replicate))
        .route("/data", get(get_data))
        .route("/get/:key", get(get_value))
        .with_state(node)
}

impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

async fn health_check(State(node): State<Arc<KvNode>>) -> impl IntoResponse {
    Json(node.health())
}

#[derive(Serialize)]
struct QuorumMetResponse {
    status: &'static str,
    quorum_met: bool,
}

async fn write(
    State(node): State<Arc<KvNode>>,
    Json(req): Json<KeyValue>,
) -> Result<Response, KvError> {
    let outcome = node.write(&req.key, req.value).await?;

    let response = match outcome {
        WriteOutcome::QuorumMet(_) => (
            StatusCode::OK,
            Json(QuorumMetResponse {
                status: "success",
                quorum_met: true,
            }),
        )
            .into_response(),
        WriteOutcome::LocalOnly => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "written_local_only" })),
        )
            .into_response(),
        WriteOutcome::QuorumFailed(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": "fail" })),
        )
            .into_response(),
    };

    Ok(response)
}

async fn replicate(
    State(node): State<Arc<KvNode>>,
    Json(req): Json<KeyValue>,
) -> Result<impl IntoResponse, KvError> {
    node.replicate(&req.key, req.value)?;
    Ok(Json(serde_json::json!({ "status": "replicated" })))
}

async fn get_data(State(node): State<Arc<KvNode>>) -> impl IntoResponse {
    Json(node.data())
}

async fn get_value(
    State(node): State<Arc<KvNode>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let value = node.get(&key);
    Json(GetResponse { key, value })
}
