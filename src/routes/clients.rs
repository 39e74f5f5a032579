use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::app::AppState;
use crate::authz::{Action, Identity, ResourceKind};
use crate::errors::{AppError, AppResult};
use crate::models::client::{Client, ClientCreateRequest, ClientUpdateRequest, DbClient};
use crate::routes::{authorize_collection, authorize_instance};
use crate::utils::utc_now;
use crate::validation::{self, NAME_MAX_LEN};

const KIND: ResourceKind = ResourceKind::Client;

const CLIENT_COLUMNS: &str =
    "id, first_name, last_name, email, phone, mobile, company_name, contact_id, created_at, updated_at";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/client", get(list_clients).post(create_client))
        .route("/client/", get(list_clients).post(create_client))
        .route("/client/:id", get(get_client).put(update_client).delete(delete_client))
        .route("/client/:id/", get(get_client).put(update_client).delete(delete_client))
}

#[utoipa::path(
    get,
    path = "/client",
    tag = "Clients",
    responses(
        (status = 200, description = "List clients", body = [Client]),
        (status = 403, description = "Staff status required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_clients(State(state): State<AppState>, identity: Identity) -> AppResult<Json<Vec<Client>>> {
    authorize_collection(&state, &identity, Action::List, KIND)?;

    let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id");
    let clients = sqlx::query_as::<_, DbClient>(&sql).fetch_all(&state.pool).await?;

    Ok(Json(clients.into_iter().map(Client::from).collect()))
}

#[utoipa::path(
    post,
    path = "/client",
    tag = "Clients",
    request_body = ClientCreateRequest,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Selling team membership required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_client(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ClientCreateRequest>,
) -> AppResult<(StatusCode, Json<Client>)> {
    authorize_collection(&state, &identity, Action::Create, KIND)?;

    validate_fields(
        &payload.first_name,
        &payload.last_name,
        &payload.email,
        payload.phone.as_deref(),
        payload.mobile.as_deref(),
        &payload.company_name,
    )?;
    validation::selling_contact(&state.pool, payload.contact).await?;

    let now = utc_now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO clients (first_name, last_name, email, phone, mobile, company_name, contact_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.mobile)
    .bind(&payload.company_name)
    .bind(payload.contact)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(client_id = id, user_id = identity.id, "client created");

    let client = fetch_client(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

#[utoipa::path(
    get,
    path = "/client/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client detail", body = Client),
        (status = 404, description = "Client not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_client(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    authorize_instance(&state, &identity, Action::Retrieve, KIND, id).await?;

    let client = fetch_client(&state.pool, id).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    put,
    path = "/client/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "Client id")),
    request_body = ClientUpdateRequest,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Only the client's contact may update it"),
        (status = 404, description = "Client not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_client(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdateRequest>,
) -> AppResult<Json<Client>> {
    authorize_instance(&state, &identity, Action::Update, KIND, id).await?;

    let mut client = fetch_client(&state.pool, id).await?;

    if let Some(first_name) = payload.first_name {
        client.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        client.last_name = last_name;
    }
    if let Some(email) = payload.email {
        client.email = email;
    }
    if payload.phone.is_some() {
        client.phone = payload.phone;
    }
    if payload.mobile.is_some() {
        client.mobile = payload.mobile;
    }
    if let Some(company_name) = payload.company_name {
        client.company_name = company_name;
    }

    validate_fields(
        &client.first_name,
        &client.last_name,
        &client.email,
        client.phone.as_deref(),
        client.mobile.as_deref(),
        &client.company_name,
    )?;

    if let Some(contact) = payload.contact {
        validation::selling_contact(&state.pool, contact).await?;
        client.contact_id = Some(contact);
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE clients SET first_name = ?, last_name = ?, email = ?, phone = ?, mobile = ?, company_name = ?, contact_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.mobile)
    .bind(&client.company_name)
    .bind(client.contact_id)
    .bind(now)
    .bind(client.id)
    .execute(&state.pool)
    .await?;

    client.updated_at = now;
    Ok(Json(client.into()))
}

#[utoipa::path(
    delete,
    path = "/client/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "Client id")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "Client not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_client(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    authorize_instance(&state, &identity, Action::Delete, KIND, id).await?;

    let affected = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("client not found"));
    }

    tracing::info!(client_id = id, user_id = identity.id, "client deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_fields(
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: Option<&str>,
    mobile: Option<&str>,
    company_name: &str,
) -> AppResult<()> {
    validation::required_text("first_name", first_name, NAME_MAX_LEN)?;
    validation::required_text("last_name", last_name, NAME_MAX_LEN)?;
    validation::required_text("email", email, NAME_MAX_LEN)?;
    if !validation::is_valid_email(email) {
        return Err(AppError::validation("'email' must be a valid address"));
    }
    validation::phone_or_mobile(phone, mobile)?;
    validation::required_text("company_name", company_name, NAME_MAX_LEN)
}

async fn fetch_client(pool: &SqlitePool, id: i64) -> AppResult<DbClient> {
    let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?");
    sqlx::query_as::<_, DbClient>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("client not found"))
}
