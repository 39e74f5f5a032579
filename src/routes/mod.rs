pub mod auth;
pub mod clients;
pub mod contract_statuses;
pub mod contracts;
pub mod events;
pub mod health;

use crate::app::AppState;
use crate::authz::{Action, Decision, Identity, Instance, ResourceKind, Target};
use crate::db::graph;
use crate::errors::AppResult;

/// Runs the Decision Engine for a collection-level action (LIST, CREATE)
pub(crate) fn authorize_collection(
    state: &AppState,
    identity: &Identity,
    action: Action,
    kind: ResourceKind,
) -> AppResult<()> {
    let decision = state.authz.decide(identity, action, kind, Target::Collection);
    report(identity, action, kind, None, decision);
    decision.into_result(kind)
}

/// Fetches the hydrated instance and runs the Decision Engine on it
pub(crate) async fn authorize_instance(
    state: &AppState,
    identity: &Identity,
    action: Action,
    kind: ResourceKind,
    id: i64,
) -> AppResult<Instance> {
    let instance = graph::fetch_instance(&state.pool, kind, id).await?;

    let target = match &instance {
        Some(instance) => Target::Instance(instance),
        None => Target::Missing,
    };
    let decision = state.authz.decide(identity, action, kind, target);
    report(identity, action, kind, Some(id), decision);
    decision.into_result(kind)?;

    // an allowed instance-scoped decision implies the instance was present
    instance.ok_or_else(|| crate::errors::AppError::not_found(format!("{} not found", kind)))
}

fn report(identity: &Identity, action: Action, kind: ResourceKind, id: Option<i64>, decision: Decision) {
    if let Decision::Denied(reason) = decision {
        tracing::info!(
            user_id = identity.id,
            action = %action,
            resource = %kind,
            resource_id = ?id,
            reason = reason.message(),
            "request denied"
        );
    }
}
