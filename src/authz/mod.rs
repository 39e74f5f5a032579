//! Authorization module - Decision Engine and ownership evaluation
//!
//! This module implements the CRM access model:
//! - Team membership (Selling / Support) grants baseline eligibility
//! - Ownership is derived by walking the fixed reference chain
//!   (Event -> Contract -> Client -> contact, or Event -> support contact)
//! - Superuser bypass, with DELETE restricted to superusers only
//! - Staff precondition evaluated before any other rule

mod evaluator;
mod extract;
mod identity;
mod ownership;

pub use evaluator::{DefaultPolicyEvaluator, PolicyEvaluator, Target};
pub use identity::{Identity, Team, UserId};
pub use ownership::{
    owns, owns_via_selling, owns_via_support, ClientNode, ContractNode, ContractStatusNode, EventNode, IdentityRef,
    Instance,
};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Actions a request can perform against a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Read the collection
    List,
    Create,
    /// Read one instance
    Retrieve,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Whether the action targets a single existing instance
    pub fn is_instance_scoped(&self) -> bool {
        matches!(self, Action::Retrieve | Action::Update | Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types guarded by the Decision Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Client,
    Contract,
    ContractStatus,
    Event,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Client,
        ResourceKind::Contract,
        ResourceKind::ContractStatus,
        ResourceKind::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Client => "client",
            ResourceKind::Contract => "contract",
            ResourceKind::ContractStatus => "contract_status",
            ResourceKind::Event => "event",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
    NotFound,
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Identity lacks staff status; no team or ownership rule was evaluated
    NotStaff,
    /// Action is reserved to superusers
    SuperuserOnly,
    /// Identity is not in a team eligible for the action
    TeamRequired,
    /// Identity is in an eligible team but does not own the instance
    NotOwner,
    /// Instance-scoped action without a usable instance
    MissingInstance,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotStaff => "staff status required",
            DenyReason::SuperuserOnly => "action restricted to superusers",
            DenyReason::TeamRequired => "team membership required",
            DenyReason::NotOwner => "you do not own this resource",
            DenyReason::MissingInstance => "resource instance required",
        }
    }
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Map the decision onto the request error taxonomy
    pub fn into_result(self, kind: ResourceKind) -> Result<(), AppError> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(AppError::forbidden(reason.message())),
            Decision::NotFound => Err(AppError::not_found(format!("{} not found", kind))),
        }
    }
}

/// Well-known team names and their permission codenames
pub mod teams {
    use super::Team;

    pub const SELLING_TEAM_NAME: &str = "Selling team";
    pub const SUPPORT_TEAM_NAME: &str = "Support team";

    pub const SELLING_TEAM_PERMISSIONS: &[&str] = &[
        "add_client",
        "view_client",
        "change_client",
        "add_contract",
        "view_contract",
        "change_contract",
        "add_contractstatus",
        "view_contractstatus",
        "change_contractstatus",
        "add_event",
        "view_event",
        "change_event",
    ];

    pub const SUPPORT_TEAM_PERMISSIONS: &[&str] = &[
        "view_client",
        "view_contract",
        "view_contractstatus",
        "add_event",
        "view_event",
        "change_event",
    ];

    pub fn permissions_for(team: Team) -> &'static [&'static str] {
        match team {
            Team::Selling => SELLING_TEAM_PERMISSIONS,
            Team::Support => SUPPORT_TEAM_PERMISSIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_scoped_actions() {
        assert!(!Action::List.is_instance_scoped());
        assert!(!Action::Create.is_instance_scoped());
        assert!(Action::Retrieve.is_instance_scoped());
        assert!(Action::Update.is_instance_scoped());
        assert!(Action::Delete.is_instance_scoped());
    }

    #[test]
    fn decision_maps_to_error_kinds() {
        assert!(Decision::Allowed.into_result(ResourceKind::Client).is_ok());
        assert!(matches!(
            Decision::Denied(DenyReason::NotOwner).into_result(ResourceKind::Client),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            Decision::NotFound.into_result(ResourceKind::Event),
            Err(AppError::NotFound(msg)) if msg == "event not found"
        ));
    }

    #[test]
    fn support_team_cannot_change_clients() {
        let perms = teams::permissions_for(Team::Support);
        assert!(perms.contains(&"change_event"));
        assert!(!perms.contains(&"change_client"));
    }
}
