/*!
REST surface over the query engine.

Routes:
- `GET /hosts`: router IDs.
- `GET /lsdb`: normalized records.
- `GET /nx`, `GET /graph`: node-link export of the whole graph.
- `GET /status`: snapshot generation and source health.
- `POST /shortest_path/:source/:target/hosts`: router IDs along the shortest path.
- `POST /shortest_path/:source/:target`: induced subgraph over the shortest path.
*/

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::{
    network::{export::GraphExport, record::NormalizedRecord, router::RouterId},
    topology::query::{QueryEngine, QueryError, TopologyStatus},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(QueryError::UnknownNode(_)) => StatusCode::NOT_FOUND,
            ApiError::Query(QueryError::NoPath { .. }) => StatusCode::CONFLICT,
            ApiError::Query(QueryError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(%status, error = %self, "query failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(engine: QueryEngine) -> Router {
    Router::new()
        .route("/hosts", get(hosts_handler))
        .route("/lsdb", get(lsdb_handler))
        .route("/nx", get(graph_handler))
        .route("/graph", get(graph_handler))
        .route("/status", get(status_handler))
        .route("/shortest_path/:source/:target/hosts", post(shortest_path_hosts_handler))
        .route("/shortest_path/:source/:target", post(shortest_path_graph_handler))
        .with_state(engine)
}

async fn hosts_handler(State(engine): State<QueryEngine>) -> ApiResult<Vec<RouterId>> {
    Ok(Json(engine.list_nodes()?))
}

async fn lsdb_handler(State(engine): State<QueryEngine>) -> ApiResult<Vec<NormalizedRecord>> {
    Ok(Json(engine.dump_lsdb()?))
}

async fn graph_handler(State(engine): State<QueryEngine>) -> ApiResult<GraphExport> {
    Ok(Json(engine.export_graph()?))
}

async fn status_handler(State(engine): State<QueryEngine>) -> Json<TopologyStatus> {
    Json(engine.status())
}

async fn shortest_path_hosts_handler(
    State(engine): State<QueryEngine>,
    Path((source, target)): Path<(String, String)>,
) -> ApiResult<Vec<RouterId>> {
    Ok(Json(engine.shortest_path(&source, &target)?))
}

async fn shortest_path_graph_handler(
    State(engine): State<QueryEngine>,
    Path((source, target)): Path<(String, String)>,
) -> ApiResult<GraphExport> {
    Ok(Json(engine.shortest_path_subgraph(&source, &target)?))
}
