use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::Team;
use crate::errors::AppResult;
use sqlx::query_scalar;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db_ok: bool,
    pub db_error: Option<String>,
    /// Selling and Support teams are both present
    pub teams_ok: bool,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Health check", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let teams = query_scalar::<_, String>("SELECT name FROM teams").fetch_all(&state.pool).await;

    match teams {
        Ok(names) => Ok(Json(HealthResponse {
            status: "ok",
            db_ok: true,
            db_error: None,
            teams_ok: Team::ALL.iter().all(|team| names.iter().any(|name| name == team.name())),
        })),
        Err(e) => Ok(Json(HealthResponse {
            status: "degraded",
            db_ok: false,
            db_error: Some(e.to_string()),
            teams_ok: false,
        })),
    }
}
