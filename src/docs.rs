use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::auth::login,
		routes::auth::me,
		routes::health::health,
		routes::clients::list_clients,
		routes::clients::create_client,
		routes::clients::get_client,
		routes::clients::update_client,
		routes::clients::delete_client,
		routes::contracts::list_contracts,
		routes::contracts::create_contract,
		routes::contracts::get_contract,
		routes::contracts::update_contract,
		routes::contracts::delete_contract,
		routes::contract_statuses::list_contract_statuses,
		routes::contract_statuses::create_contract_status,
		routes::contract_statuses::get_contract_status,
		routes::contract_statuses::update_contract_status,
		routes::contract_statuses::delete_contract_status,
		routes::events::list_events,
		routes::events::create_event,
		routes::events::get_event,
		routes::events::update_event,
		routes::events::delete_event
	),
	components(
		schemas(
			crate::authz::Team,
			models::user::User,
			models::user::AuthResponse,
			models::user::LoginRequest,
			models::client::Client,
			models::client::ClientCreateRequest,
			models::client::ClientUpdateRequest,
			models::contract::Contract,
			models::contract::ContractCreateRequest,
			models::contract::ContractUpdateRequest,
			models::contract_status::ContractState,
			models::contract_status::ContractStatus,
			models::contract_status::ContractStatusCreateRequest,
			models::contract_status::ContractStatusUpdateRequest,
			models::event::Event,
			models::event::EventCreateRequest,
			models::event::EventUpdateRequest,
			routes::health::HealthResponse
		)
	),
	tags(
		(name = "Auth", description = "Authentication endpoints"),
		(name = "Health", description = "Service health"),
		(name = "Clients", description = "Client management"),
		(name = "Contracts", description = "Contract management"),
		(name = "Contract statuses", description = "Contract status tracking"),
		(name = "Events", description = "Event management")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	ensure_security_components(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(serde_json::to_value(&doc)?);

	let json_route = get(move || {
		let doc_json = Arc::clone(&doc_json);
		async move { Json((*doc_json).clone()) }
	});

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn ensure_security_components(doc: &mut Value) {
	let Some(root) = doc.as_object_mut() else {
		return;
	};

	let components = root.entry("components").or_insert_with(|| Value::Object(Map::new()));
	let Some(components) = components.as_object_mut() else {
		return;
	};

	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()));
	if let Some(schemes) = schemes.as_object_mut() {
		schemes.insert(
			"bearerAuth".to_string(),
			json!({
				"type": "http",
				"scheme": "bearer",
				"bearerFormat": "JWT"
			}),
		);
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let server_url = format!("http://localhost:{}", port);

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr.iter().any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}
