//! HTTP API for the adjudicator
//!
//! Endpoints (all but `/` and `/health` need `Authorization: Bearer <token>`):
//! - GET  /user_sessions               - Sessions created and joined
//! - POST /create_session              - Create session
//! - POST /join_session/:token         - Join via invite token
//! - GET  /session/:id                 - Session detail
//! - GET  /session_arguments/:id       - Arguments of a session
//! - POST /submit_argument/:id         - Submit argument
//! - POST /lock_argument/:argument_id  - Lock argument
//! - POST /get_judgment/:id            - Request judgment
//! - GET  /health                      - Health check
//!
//! Cross-origin browser calls are answered for the configured origins,
//! preflight `OPTIONS` included.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::core::{
    Adjudicator, ArgumentListing, ConfigError, IdentityGate, OpenAiJudge, ServerConfig, SessionListing,
    TokenRegistry,
};
use crate::types::{ArgumentId, ArgumentView, EngineError, SessionId, SessionView, User};

/// App state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Adjudicator>,
    pub identity: Arc<dyn IdentityGate>,
}

/// Create session request
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: String,
}

/// Submit argument request
#[derive(Debug, Deserialize)]
pub struct SubmitArgumentRequest {
    #[serde(default)]
    pub content: String,
}

/// Judgment response
#[derive(Debug, Serialize, Deserialize)]
pub struct JudgmentResponse {
    pub judgment: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct Caller(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = EngineError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| EngineError::unauthorized("missing bearer token"))?
            .to_str()
            .map_err(|_| EngineError::unauthorized("malformed authorization header"))?;
        // Auth schemes are case-insensitive
        let token = value
            .trim()
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EngineError::unauthorized("expected a bearer token"))?;
        state
            .identity
            .authenticate(token)
            .map(Caller)
            .ok_or_else(|| EngineError::unauthorized("unknown bearer token"))
    }
}

/// CORS policy for the browser frontend
///
/// Allows GET/POST/OPTIONS with `Authorization` and `Content-Type` from the
/// given origins only.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::CorsOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Create the API router
pub fn create_router(
    engine: Arc<Adjudicator>,
    identity: Arc<dyn IdentityGate>,
    cors: CorsLayer,
) -> Router {
    let state = AppState { engine, identity };

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/user_sessions", get(user_sessions))
        .route("/create_session", post(create_session))
        .route("/join_session/:token", post(join_session))
        .route("/session/:id", get(get_session))
        .route("/session_arguments/:id", get(session_arguments))
        .route("/submit_argument/:id", post(submit_argument))
        .route("/lock_argument/:argument_id", post(lock_argument))
        .route("/get_judgment/:id", post(get_judgment))
        .with_state(state)
        .layer(cors)
}

async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to the Adjudicator API!" }))
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions: state.engine.store().len(),
    })
}

async fn user_sessions(
    Caller(user): Caller,
    State(state): State<AppState>,
) -> Result<Json<SessionListing>, EngineError> {
    state.engine.sessions_for(user.id).map(Json)
}

async fn create_session(
    Caller(user): Caller,
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), EngineError> {
    let view = state.engine.create_session(&req.title, &user)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn join_session(
    Caller(user): Caller,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SessionView>, EngineError> {
    state.engine.join_session(&token, &user).map(Json)
}

async fn get_session(
    Caller(user): Caller,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>, EngineError> {
    state.engine.session(SessionId(id), user.id).map(Json)
}

async fn session_arguments(
    Caller(user): Caller,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ArgumentListing>, EngineError> {
    state.engine.arguments(SessionId(id), user.id).map(Json)
}

async fn submit_argument(
    Caller(user): Caller,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<SubmitArgumentRequest>,
) -> Result<(StatusCode, Json<ArgumentView>), EngineError> {
    let view = state.engine.submit_argument(SessionId(id), &user, &req.content)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn lock_argument(
    Caller(user): Caller,
    State(state): State<AppState>,
    Path(argument_id): Path<u64>,
) -> Result<Json<ArgumentView>, EngineError> {
    state.engine.lock_argument(ArgumentId(argument_id), user.id).map(Json)
}

async fn get_judgment(
    Caller(user): Caller,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<JudgmentResponse>, EngineError> {
    let judgment = state.engine.request_judgment(SessionId(id), user.id).await?;
    Ok(Json(JudgmentResponse { judgment }))
}

/// Run the API server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = match &config.users_file {
        Some(path) => TokenRegistry::load(path)?,
        None => {
            warn!("no users file configured, every request will be unauthorized");
            TokenRegistry::new()
        }
    };
    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY not set, judgment requests will fail");
    }

    let cors = cors_layer(&config.cors_origins)?;
    let judge = Arc::new(OpenAiJudge::new(config.openai.clone()));
    let model = judge.model().to_string();
    let engine = Arc::new(Adjudicator::new(config.engine.clone(), judge));
    let users = registry.len();
    let router = create_router(engine, Arc::new(registry), cors);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(
        addr = %config.addr,
        users,
        model = %model,
        cors_origins = ?config.cors_origins,
        judge_timeout_secs = config.engine.judge_timeout.as_secs(),
        "adjudicator API listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}
