//! Resource graph and ownership resolution.
//!
//! Instances are handed over fully hydrated: every link the chain needs is
//! already loaded. A missing link (`None`) means the reference could not be
//! resolved, and ownership through it is always false.

use super::identity::{Identity, UserId};
use super::ResourceKind;

/// Terminal reference to a user at the end of an ownership chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRef {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientNode {
    pub id: i64,
    /// Selling-team member owning the client
    pub contact: Option<IdentityRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractNode {
    pub id: i64,
    pub client: Option<ClientNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractStatusNode {
    pub id: i64,
    pub contract: Option<ContractNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNode {
    pub id: i64,
    pub contract: Option<ContractNode>,
    /// Support-team member owning the event
    pub support_contact: Option<IdentityRef>,
}

/// A hydrated resource instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instance {
    Client(ClientNode),
    Contract(ContractNode),
    ContractStatus(ContractStatusNode),
    Event(EventNode),
}

impl Instance {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Instance::Client(_) => ResourceKind::Client,
            Instance::Contract(_) => ResourceKind::Contract,
            Instance::ContractStatus(_) => ResourceKind::ContractStatus,
            Instance::Event(_) => ResourceKind::Event,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Instance::Client(node) => node.id,
            Instance::Contract(node) => node.id,
            Instance::ContractStatus(node) => node.id,
            Instance::Event(node) => node.id,
        }
    }
}

fn owns_client(identity: &Identity, client: Option<&ClientNode>) -> bool {
    match client.and_then(|c| c.contact) {
        Some(contact) => contact.id == identity.id,
        None => false,
    }
}

fn owns_contract(identity: &Identity, contract: Option<&ContractNode>) -> bool {
    match contract {
        Some(contract) => owns_client(identity, contract.client.as_ref()),
        None => false,
    }
}

/// Whether the identity owns the instance through any of its chains.
///
/// Events have two owners: the client's selling contact and the support contact.
pub fn owns(identity: &Identity, instance: &Instance) -> bool {
    owns_via_selling(identity, instance) || owns_via_support(identity, instance)
}

/// Ownership through the Contract -> Client -> contact chain only
pub fn owns_via_selling(identity: &Identity, instance: &Instance) -> bool {
    match instance {
        Instance::Client(client) => owns_client(identity, Some(client)),
        Instance::Contract(contract) => owns_contract(identity, Some(contract)),
        Instance::ContractStatus(status) => owns_contract(identity, status.contract.as_ref()),
        Instance::Event(event) => owns_contract(identity, event.contract.as_ref()),
    }
}

/// Ownership through an event's support contact only
pub fn owns_via_support(identity: &Identity, instance: &Instance) -> bool {
    match instance {
        Instance::Event(event) => owns_event_support(identity, event),
        Instance::Client(_) | Instance::Contract(_) | Instance::ContractStatus(_) => false,
    }
}

fn owns_event_support(identity: &Identity, event: &EventNode) -> bool {
    event.support_contact.map(|c| c.id == identity.id).unwrap_or(false)
}
