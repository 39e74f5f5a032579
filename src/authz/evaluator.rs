use super::identity::{Identity, Team};
use super::ownership::{owns, owns_via_support, Instance};
use super::{Action, Decision, DenyReason, ResourceKind};

/// What the request targets
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// The collection (LIST, CREATE)
    Collection,
    /// A fetched, fully hydrated instance
    Instance(&'a Instance),
    /// The requested instance does not exist
    Missing,
}

impl<'a> From<Option<&'a Instance>> for Target<'a> {
    fn from(value: Option<&'a Instance>) -> Self {
        match value {
            Some(instance) => Target::Instance(instance),
            None => Target::Collection,
        }
    }
}

/// Policy evaluator trait for pluggable authorization logic
pub trait PolicyEvaluator: Send + Sync {
    /// Decide whether `identity` may perform `action` on `kind`
    fn decide(&self, identity: &Identity, action: Action, kind: ResourceKind, target: Target<'_>) -> Decision;

    /// Boolean form of [`PolicyEvaluator::decide`]
    fn authorize(&self, identity: &Identity, action: Action, kind: ResourceKind, instance: Option<&Instance>) -> bool {
        self.decide(identity, action, kind, instance.into()).is_allowed()
    }
}

/// Default evaluator with the fixed CRM rule table
///
/// Evaluation order:
/// 1. non-staff -> deny
/// 2. DELETE by a non-superuser -> deny
/// 3. instance-scoped action on a missing instance -> not found
///    (RETRIEVE may also be asked without an instance)
/// 4. superuser -> allow
/// 5. per-action rule (team, then ownership)
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicyEvaluator;

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn create_rule(identity: &Identity, kind: ResourceKind) -> Decision {
        let eligible = match kind {
            ResourceKind::Event => in_selling(identity) || in_support(identity),
            ResourceKind::Client | ResourceKind::Contract | ResourceKind::ContractStatus => in_selling(identity),
        };

        if eligible {
            Decision::Allowed
        } else {
            Decision::Denied(DenyReason::TeamRequired)
        }
    }

    fn update_rule(identity: &Identity, instance: &Instance) -> Decision {
        let selling = in_selling(identity);
        let support = in_support(identity) && matches!(instance, Instance::Event(_));

        if !selling && !support {
            return Decision::Denied(DenyReason::TeamRequired);
        }

        let allowed = (selling && owns(identity, instance)) || (support && owns_via_support(identity, instance));
        if allowed {
            Decision::Allowed
        } else {
            Decision::Denied(DenyReason::NotOwner)
        }
    }
}

fn in_selling(identity: &Identity) -> bool {
    identity.in_team(Team::Selling)
}

fn in_support(identity: &Identity) -> bool {
    identity.in_team(Team::Support)
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn decide(&self, identity: &Identity, action: Action, kind: ResourceKind, target: Target<'_>) -> Decision {
        let decision = evaluate(identity, action, kind, target);

        tracing::debug!(
            user_id = identity.id,
            action = %action,
            resource = %kind,
            ?decision,
            "authorization decision"
        );

        decision
    }
}

fn evaluate(identity: &Identity, action: Action, kind: ResourceKind, target: Target<'_>) -> Decision {
    if !identity.is_staff() {
        return Decision::Denied(DenyReason::NotStaff);
    }

    if action == Action::Delete && !identity.is_superuser() {
        return Decision::Denied(DenyReason::SuperuserOnly);
    }

    let instance = if action.is_instance_scoped() {
        match target {
            Target::Instance(instance) if instance.kind() == kind => Some(instance),
            Target::Instance(instance) => {
                tracing::warn!(
                    expected = %kind,
                    got = %instance.kind(),
                    instance_id = instance.id(),
                    "instance kind does not match requested resource"
                );
                return Decision::Denied(DenyReason::MissingInstance);
            }
            Target::Missing => return Decision::NotFound,
            Target::Collection if action == Action::Retrieve => None,
            Target::Collection => return Decision::Denied(DenyReason::MissingInstance),
        }
    } else {
        None
    };

    if identity.is_superuser() {
        return Decision::Allowed;
    }

    match (action, instance) {
        (Action::List | Action::Retrieve, _) => Decision::Allowed,
        (Action::Create, _) => DefaultPolicyEvaluator::create_rule(identity, kind),
        (Action::Update, Some(instance)) => DefaultPolicyEvaluator::update_rule(identity, instance),
        (Action::Update, None) => Decision::Denied(DenyReason::MissingInstance),
        // non-superusers were rejected above
        (Action::Delete, _) => Decision::Denied(DenyReason::SuperuserOnly),
    }
}
