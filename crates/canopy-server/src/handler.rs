use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::{get, post, MethodRouter};
use canopy_model::ModelResult;
use canopy_sdk::{AncestorResponse, CreateTreeResponse, RequestFacade};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::endpoint::HealthResponse;
use crate::error::{ServerError, ServerResult};

/// The one facade every route shares.
pub type SharedFacade = Arc<RequestFacade>;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "name": "canopy-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST` a JSON tree, receive `{"id": <integer>}`.
pub async fn create_tree_handler(
    State(facade): State<SharedFacade>,
    body: Bytes,
) -> ServerResult<Json<CreateTreeResponse>> {
    let tree: Value = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("request body is not valid JSON: {e}")))?;
    let response = run_blocking(move || facade.create_tree_response(&tree)).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct AncestorParams {
    pub q: Option<String>,
}

/// `GET ?q=<json query>`, receive `{"node": <value>}`.
pub async fn ancestor_handler(
    State(facade): State<SharedFacade>,
    Query(params): Query<AncestorParams>,
) -> ServerResult<Json<AncestorResponse>> {
    let q = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("empty query parameter (q)".into()))?;
    let query: Value = serde_json::from_str(&q)
        .map_err(|e| ServerError::BadRequest(format!("query parameter q is not valid JSON: {e}")))?;
    let response = run_blocking(move || facade.find_ancestor_response(&query)).await?;
    Ok(Json(response))
}

pub fn trees_route() -> MethodRouter<SharedFacade> {
    post(create_tree_handler)
}

pub fn ancestor_route() -> MethodRouter<SharedFacade> {
    get(ancestor_handler)
}

pub fn health_route() -> MethodRouter<SharedFacade> {
    get(health_handler)
}

pub fn info_route() -> MethodRouter<SharedFacade> {
    get(info_handler)
}

/// Run a synchronous facade call on the blocking pool.
async fn run_blocking<T, F>(job: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ModelResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}
