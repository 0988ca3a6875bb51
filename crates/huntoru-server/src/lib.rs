//! HTTP surface of the HunToru backend.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /judge` | Judge a photo against a theme |
//! | `GET /themes?difficulty=EASY&limit=1` | Random themes for a difficulty |
//! | `GET /healthz` | Liveness and configuration status |

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use huntoru_judge::{
    failure_response, Difficulty, Judge, JudgeError, JudgeRequestBody, ThemeCatalog,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

pub mod cli;

/// Shared handler state.
pub struct AppState {
    pub judge: Judge,
    pub catalog: Arc<dyn ThemeCatalog>,
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/judge", post(judge_handler))
        .route("/themes", get(themes_handler))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// CORS for the listed origins plus any `https://*.pages.dev` preview deployment.
pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let allow = AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        allowed_origins.iter().any(|o| o == origin)
            || origin
                .strip_prefix("https://")
                .is_some_and(|host| host.ends_with(".pages.dev"))
    });

    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

async fn judge_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<JudgeRequestBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = match payload {
        Ok(Json(body)) => state.judge.respond(body).await,
        Err(rejection) => failure_response(&JudgeError::InvalidRequest {
            message: rejection.body_text(),
        }),
    };
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
}

#[derive(Debug, Deserialize)]
struct ThemesQuery {
    difficulty: Option<String>,
    limit: Option<usize>,
}

async fn themes_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThemesQuery>,
) -> (StatusCode, Json<Value>) {
    let difficulty = match query.difficulty.as_deref().map(str::parse::<Difficulty>) {
        Some(Ok(difficulty)) => difficulty,
        Some(Err(message)) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "difficulty query parameter is required" })),
            )
        }
    };

    let themes = state.catalog.pick(difficulty, query.limit.unwrap_or(1).max(1));
    (StatusCode::OK, Json(json!({ "themes": themes })))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "judgeConfigured": state.judge.is_configured(),
        "themes": state.catalog.len(),
    }))
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server running on {addr}");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Server shutting down...");
}
