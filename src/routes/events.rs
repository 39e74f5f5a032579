use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::app::AppState;
use crate::authz::{Action, Identity, ResourceKind};
use crate::errors::{AppError, AppResult};
use crate::models::event::{DbEvent, Event, EventCreateRequest, EventUpdateRequest};
use crate::routes::{authorize_collection, authorize_instance};
use crate::utils::utc_now;
use crate::validation::{self, NOTE_MAX_LEN};

const KIND: ResourceKind = ResourceKind::Event;

const EVENT_COLUMNS: &str = "id, contract_id, support_contact_id, attendees, date, note, created_at, updated_at";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/event", get(list_events).post(create_event))
        .route("/event/", get(list_events).post(create_event))
        .route("/event/:id", get(get_event).put(update_event).delete(delete_event))
        .route("/event/:id/", get(get_event).put(update_event).delete(delete_event))
}

#[utoipa::path(
    get,
    path = "/event",
    tag = "Events",
    responses((status = 200, description = "List events", body = [Event])),
    security(("bearerAuth" = []))
)]
pub async fn list_events(State(state): State<AppState>, identity: Identity) -> AppResult<Json<Vec<Event>>> {
    authorize_collection(&state, &identity, Action::List, KIND)?;

    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id");
    let events = sqlx::query_as::<_, DbEvent>(&sql).fetch_all(&state.pool).await?;

    Ok(Json(events.into_iter().map(Event::from).collect()))
}

#[utoipa::path(
    post,
    path = "/event",
    tag = "Events",
    request_body = EventCreateRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Selling or Support team membership required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_event(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<EventCreateRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    authorize_collection(&state, &identity, Action::Create, KIND)?;

    validation::attendees(payload.attendees)?;
    validation::max_text("note", &payload.note, NOTE_MAX_LEN)?;
    validation::reference_exists(&state.pool, "contracts", "contract", payload.contract).await?;
    validation::support_contact(&state.pool, payload.support_contact).await?;

    let now = utc_now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO events (contract_id, support_contact_id, attendees, date, note, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(payload.contract)
    .bind(payload.support_contact)
    .bind(payload.attendees)
    .bind(payload.date)
    .bind(&payload.note)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(event_id = id, user_id = identity.id, "event created");

    let event = fetch_event(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

#[utoipa::path(
    get,
    path = "/event/{id}",
    tag = "Events",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event detail", body = Event),
        (status = 404, description = "Event not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_event(State(state): State<AppState>, identity: Identity, Path(id): Path<i64>) -> AppResult<Json<Event>> {
    authorize_instance(&state, &identity, Action::Retrieve, KIND, id).await?;

    let event = fetch_event(&state.pool, id).await?;
    Ok(Json(event.into()))
}

#[utoipa::path(
    put,
    path = "/event/{id}",
    tag = "Events",
    params(("id" = i64, Path, description = "Event id")),
    request_body = EventUpdateRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Only the client's contact or the support contact may update it"),
        (status = 404, description = "Event not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_event(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<EventUpdateRequest>,
) -> AppResult<Json<Event>> {
    authorize_instance(&state, &identity, Action::Update, KIND, id).await?;

    let mut event = fetch_event(&state.pool, id).await?;

    if let Some(attendees) = payload.attendees {
        validation::attendees(attendees)?;
        event.attendees = attendees;
    }
    if let Some(date) = payload.date {
        event.date = date;
    }
    if let Some(note) = payload.note {
        validation::max_text("note", &note, NOTE_MAX_LEN)?;
        event.note = note;
    }
    if let Some(contract) = payload.contract {
        validation::reference_exists(&state.pool, "contracts", "contract", contract).await?;
        event.contract_id = contract;
    }
    if let Some(support_contact) = payload.support_contact {
        validation::support_contact(&state.pool, support_contact).await?;
        event.support_contact_id = Some(support_contact);
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE events SET contract_id = ?, support_contact_id = ?, attendees = ?, date = ?, note = ?, updated_at = ? WHERE id = ?",
    )
    .bind(event.contract_id)
    .bind(event.support_contact_id)
    .bind(event.attendees)
    .bind(event.date)
    .bind(&event.note)
    .bind(now)
    .bind(event.id)
    .execute(&state.pool)
    .await?;

    event.updated_at = now;
    Ok(Json(event.into()))
}

#[utoipa::path(
    delete,
    path = "/event/{id}",
    tag = "Events",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "Event not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_event(State(state): State<AppState>, identity: Identity, Path(id): Path<i64>) -> AppResult<StatusCode> {
    authorize_instance(&state, &identity, Action::Delete, KIND, id).await?;

    let affected = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("event not found"));
    }

    tracing::info!(event_id = id, user_id = identity.id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_event(pool: &SqlitePool, id: i64) -> AppResult<DbEvent> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
    sqlx::query_as::<_, DbEvent>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("event not found"))
}
