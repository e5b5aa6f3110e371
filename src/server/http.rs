use crate::app::dto::*;
use crate::app::engine::AnalysisEngine;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::{JoinError, spawn_blocking};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct HttpState {
    pub engine: AnalysisEngine,
}

#[derive(Debug, Clone, serde::Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

fn join_error(e: JoinError) -> Response {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("task join error: {e}"),
    )
    .into_response()
}

pub fn build_router(engine: AnalysisEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/reload", post(reload))
        .route("/callgraph", get(call_graph))
        .route("/coupling", get(coupling))
        .route("/coupling/pair", get(pair_coupling))
        .route("/coupling/matrix", get(coupling_matrix))
        .route("/dendrogram", get(dendrogram))
        .route("/modules", post(modules))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: AnalysisEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn reload(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.reload()).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        Err(e) => join_error(e),
    }
}

async fn call_graph(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.call_graph()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

async fn coupling(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<CouplingRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.coupling(q.limit)).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

async fn pair_coupling(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<PairCouplingRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.pair_coupling(&q.a, &q.b)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Err(e) => join_error(e),
    }
}

async fn coupling_matrix(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.coupling_matrix()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

async fn dendrogram(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.dendrogram()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

async fn modules(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ModulesRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.modules(req)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Err(e) => join_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ClassModel, ClassUnit, MethodUnit};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn make_engine() -> AnalysisEngine {
        let model = ClassModel::new(vec![
            ClassUnit::new("Orders")
                .with_method(MethodUnit::new("place", 1).with_call("save", 1)),
            ClassUnit::new("Store").with_method(MethodUnit::new("save", 1)),
        ]);
        AnalysisEngine::from_model(model, false)
    }

    async fn get_status(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    async fn post_modules(app: &Router, body: serde_json::Value) -> StatusCode {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/modules")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_http_read_routes() {
        let app = build_router(make_engine());

        for uri in [
            "/health",
            "/callgraph",
            "/coupling",
            "/coupling?limit=1",
            "/coupling/pair?a=Orders&b=Store",
            "/coupling/matrix",
            "/dendrogram",
        ] {
            assert_eq!(get_status(&app, uri).await, StatusCode::OK, "{uri}");
        }

        assert_eq!(
            get_status(&app, "/coupling/pair?a=Orders&b=Nope").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_http_modules() {
        let app = build_router(make_engine());

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/modules")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::json!({"threshold": 0.5}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ModulesResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.modules.len(), 1);
        assert_eq!(body.modules[0].classes, vec!["Orders", "Store"]);

        assert_eq!(
            post_modules(&app, serde_json::json!({})).await,
            StatusCode::OK
        );
        assert_eq!(
            post_modules(&app, serde_json::json!({"threshold": 2.0})).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_http_reload_without_file_fails() {
        let app = build_router(make_engine());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
