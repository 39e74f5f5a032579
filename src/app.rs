use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{DefaultPolicyEvaluator, PolicyEvaluator};
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{auth, clients, contract_statuses, contracts, events, health};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub authz: Arc<dyn PolicyEvaluator>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        Self::with_evaluator(pool, jwt, DefaultPolicyEvaluator::new())
    }

    pub fn with_evaluator(pool: SqlitePool, jwt: JwtConfig, evaluator: impl PolicyEvaluator + 'static) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            authz: Arc::new(evaluator),
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    Ok(router(AppState::new(pool, jwt_config)))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/auth", auth::routes())
        .route("/api/health", get(health::health))
        .merge(clients::routes())
        .merge(contracts::routes())
        .merge(contract_statuses::routes())
        .merge(events::routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
