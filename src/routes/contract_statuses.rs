use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::app::AppState;
use crate::authz::{Action, Identity, ResourceKind};
use crate::errors::{AppError, AppResult};
use crate::models::contract_status::{
    ContractStatus, ContractStatusCreateRequest, ContractStatusUpdateRequest, DbContractStatus,
};
use crate::routes::{authorize_collection, authorize_instance};
use crate::utils::utc_now;
use crate::validation::{self, NOTE_MAX_LEN};

const KIND: ResourceKind = ResourceKind::ContractStatus;

const STATUS_COLUMNS: &str =
    "id, contract_id, is_accepted, acceptance_note, state, state_note, created_at, updated_at";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contract_status", get(list_contract_statuses).post(create_contract_status))
        .route("/contract_status/", get(list_contract_statuses).post(create_contract_status))
        .route(
            "/contract_status/:id",
            get(get_contract_status).put(update_contract_status).delete(delete_contract_status),
        )
        .route(
            "/contract_status/:id/",
            get(get_contract_status).put(update_contract_status).delete(delete_contract_status),
        )
}

#[utoipa::path(
    get,
    path = "/contract_status",
    tag = "Contract statuses",
    responses((status = 200, description = "List contract statuses", body = [ContractStatus])),
    security(("bearerAuth" = []))
)]
pub async fn list_contract_statuses(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<Vec<ContractStatus>>> {
    authorize_collection(&state, &identity, Action::List, KIND)?;

    let sql = format!("SELECT {STATUS_COLUMNS} FROM contract_statuses ORDER BY id");
    let rows = sqlx::query_as::<_, DbContractStatus>(&sql).fetch_all(&state.pool).await?;

    let statuses: Vec<ContractStatus> = rows
        .into_iter()
        .map(ContractStatus::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(statuses))
}

#[utoipa::path(
    post,
    path = "/contract_status",
    tag = "Contract statuses",
    request_body = ContractStatusCreateRequest,
    responses(
        (status = 201, description = "Contract status created", body = ContractStatus),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Selling team membership required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_contract_status(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ContractStatusCreateRequest>,
) -> AppResult<(StatusCode, Json<ContractStatus>)> {
    authorize_collection(&state, &identity, Action::Create, KIND)?;

    validation::max_text("acceptance_note", &payload.acceptance_note, NOTE_MAX_LEN)?;
    validation::max_text("state_note", &payload.state_note, NOTE_MAX_LEN)?;
    validation::reference_exists(&state.pool, "contracts", "contract", payload.contract).await?;

    let now = utc_now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO contract_statuses (contract_id, is_accepted, acceptance_note, state, state_note, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(payload.contract)
    .bind(payload.is_accepted)
    .bind(&payload.acceptance_note)
    .bind(payload.state.code())
    .bind(&payload.state_note)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(contract_status_id = id, user_id = identity.id, "contract status created");

    let status = fetch_contract_status(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(ContractStatus::try_from(status)?)))
}

#[utoipa::path(
    get,
    path = "/contract_status/{id}",
    tag = "Contract statuses",
    params(("id" = i64, Path, description = "Contract status id")),
    responses(
        (status = 200, description = "Contract status detail", body = ContractStatus),
        (status = 404, description = "Contract status not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_contract_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<ContractStatus>> {
    authorize_instance(&state, &identity, Action::Retrieve, KIND, id).await?;

    let status = fetch_contract_status(&state.pool, id).await?;
    Ok(Json(ContractStatus::try_from(status)?))
}

#[utoipa::path(
    put,
    path = "/contract_status/{id}",
    tag = "Contract statuses",
    params(("id" = i64, Path, description = "Contract status id")),
    request_body = ContractStatusUpdateRequest,
    responses(
        (status = 200, description = "Contract status updated", body = ContractStatus),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Only the client's contact may update it"),
        (status = 404, description = "Contract status not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_contract_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<ContractStatusUpdateRequest>,
) -> AppResult<Json<ContractStatus>> {
    authorize_instance(&state, &identity, Action::Update, KIND, id).await?;

    let mut status = fetch_contract_status(&state.pool, id).await?;

    if let Some(is_accepted) = payload.is_accepted {
        status.is_accepted = is_accepted;
    }
    if let Some(note) = payload.acceptance_note {
        validation::max_text("acceptance_note", &note, NOTE_MAX_LEN)?;
        status.acceptance_note = note;
    }
    if let Some(state_code) = payload.state {
        status.state = state_code.code().to_string();
    }
    if let Some(note) = payload.state_note {
        validation::max_text("state_note", &note, NOTE_MAX_LEN)?;
        status.state_note = note;
    }
    if let Some(contract) = payload.contract {
        validation::reference_exists(&state.pool, "contracts", "contract", contract).await?;
        status.contract_id = contract;
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE contract_statuses SET contract_id = ?, is_accepted = ?, acceptance_note = ?, state = ?, state_note = ?, updated_at = ? WHERE id = ?",
    )
    .bind(status.contract_id)
    .bind(status.is_accepted)
    .bind(&status.acceptance_note)
    .bind(&status.state)
    .bind(&status.state_note)
    .bind(now)
    .bind(status.id)
    .execute(&state.pool)
    .await?;

    status.updated_at = now;
    Ok(Json(ContractStatus::try_from(status)?))
}

#[utoipa::path(
    delete,
    path = "/contract_status/{id}",
    tag = "Contract statuses",
    params(("id" = i64, Path, description = "Contract status id")),
    responses(
        (status = 204, description = "Contract status deleted"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "Contract status not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_contract_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    authorize_instance(&state, &identity, Action::Delete, KIND, id).await?;

    let affected = sqlx::query("DELETE FROM contract_statuses WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("contract status not found"));
    }

    tracing::info!(contract_status_id = id, user_id = identity.id, "contract status deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_contract_status(pool: &SqlitePool, id: i64) -> AppResult<DbContractStatus> {
    let sql = format!("SELECT {STATUS_COLUMNS} FROM contract_statuses WHERE id = ?");
    sqlx::query_as::<_, DbContractStatus>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("contract status not found"))
}
