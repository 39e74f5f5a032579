use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::app::AppState;
use crate::authz::{Action, Identity, ResourceKind};
use crate::errors::{AppError, AppResult};
use crate::models::contract::{Contract, ContractCreateRequest, ContractUpdateRequest, DbContract};
use crate::routes::{authorize_collection, authorize_instance};
use crate::utils::utc_now;
use crate::validation;

const KIND: ResourceKind = ResourceKind::Contract;

const CONTRACT_COLUMNS: &str = "id, client_id, amount, payment_due, date_created, date_updated";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contract", get(list_contracts).post(create_contract))
        .route("/contract/", get(list_contracts).post(create_contract))
        .route("/contract/:id", get(get_contract).put(update_contract).delete(delete_contract))
        .route("/contract/:id/", get(get_contract).put(update_contract).delete(delete_contract))
}

#[utoipa::path(
    get,
    path = "/contract",
    tag = "Contracts",
    responses((status = 200, description = "List contracts", body = [Contract])),
    security(("bearerAuth" = []))
)]
pub async fn list_contracts(State(state): State<AppState>, identity: Identity) -> AppResult<Json<Vec<Contract>>> {
    authorize_collection(&state, &identity, Action::List, KIND)?;

    let sql = format!("SELECT {CONTRACT_COLUMNS} FROM contracts ORDER BY id");
    let contracts = sqlx::query_as::<_, DbContract>(&sql).fetch_all(&state.pool).await?;

    Ok(Json(contracts.into_iter().map(Contract::from).collect()))
}

#[utoipa::path(
    post,
    path = "/contract",
    tag = "Contracts",
    request_body = ContractCreateRequest,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Selling team membership required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_contract(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ContractCreateRequest>,
) -> AppResult<(StatusCode, Json<Contract>)> {
    authorize_collection(&state, &identity, Action::Create, KIND)?;

    validation::amount(payload.amount)?;
    validation::reference_exists(&state.pool, "clients", "client", payload.client).await?;

    let now = utc_now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO contracts (client_id, amount, payment_due, date_created, date_updated) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(payload.client)
    .bind(payload.amount)
    .bind(payload.payment_due)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(contract_id = id, client_id = payload.client, user_id = identity.id, "contract created");

    let contract = fetch_contract(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(contract.into())))
}

#[utoipa::path(
    get,
    path = "/contract/{id}",
    tag = "Contracts",
    params(("id" = i64, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract detail", body = Contract),
        (status = 404, description = "Contract not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_contract(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Contract>> {
    authorize_instance(&state, &identity, Action::Retrieve, KIND, id).await?;

    let contract = fetch_contract(&state.pool, id).await?;
    Ok(Json(contract.into()))
}

#[utoipa::path(
    put,
    path = "/contract/{id}",
    tag = "Contracts",
    params(("id" = i64, Path, description = "Contract id")),
    request_body = ContractUpdateRequest,
    responses(
        (status = 200, description = "Contract updated", body = Contract),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Only the client's contact may update it"),
        (status = 404, description = "Contract not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_contract(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<ContractUpdateRequest>,
) -> AppResult<Json<Contract>> {
    authorize_instance(&state, &identity, Action::Update, KIND, id).await?;

    let mut contract = fetch_contract(&state.pool, id).await?;

    if let Some(amount) = payload.amount {
        validation::amount(amount)?;
        contract.amount = amount;
    }
    if let Some(payment_due) = payload.payment_due {
        contract.payment_due = payment_due;
    }
    if let Some(client) = payload.client {
        validation::reference_exists(&state.pool, "clients", "client", client).await?;
        contract.client_id = client;
    }

    let now = utc_now();
    sqlx::query("UPDATE contracts SET client_id = ?, amount = ?, payment_due = ?, date_updated = ? WHERE id = ?")
        .bind(contract.client_id)
        .bind(contract.amount)
        .bind(contract.payment_due)
        .bind(now)
        .bind(contract.id)
        .execute(&state.pool)
        .await?;

    contract.date_updated = now;
    Ok(Json(contract.into()))
}

#[utoipa::path(
    delete,
    path = "/contract/{id}",
    tag = "Contracts",
    params(("id" = i64, Path, description = "Contract id")),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "Contract not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_contract(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    authorize_instance(&state, &identity, Action::Delete, KIND, id).await?;

    let affected = sqlx::query("DELETE FROM contracts WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("contract not found"));
    }

    tracing::info!(contract_id = id, user_id = identity.id, "contract deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_contract(pool: &SqlitePool, id: i64) -> AppResult<DbContract> {
    let sql = format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = ?");
    sqlx::query_as::<_, DbContract>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("contract not found"))
}
