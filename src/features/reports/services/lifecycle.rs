//! Report status graph
//!
//! The legal edges are data, not branching code: an immutable rule table
//! consumed by a pure validator. Adding a transition means adding a row, not
//! touching the predicate logic.

use crate::features::reports::models::ReportStatus;
use crate::shared::constants::ROLE_PUBLIC_RELATIONS;

/// Who may traverse an edge
#[derive(Debug, Clone, Copy)]
pub enum RulePermission {
    /// Only the actor the report is currently assigned to
    AssignedActor,
    /// Any actor whose role name contains one of the listed names.
    /// Substring match on purpose, so "Senior Public Relations Officer"
    /// satisfies "Public Relations Officer".
    Roles(&'static [&'static str]),
}

/// One legal edge in the report status graph
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub from: ReportStatus,
    pub to: ReportStatus,
    pub permission: RulePermission,
    /// Whether external maintenance partners may traverse this edge
    pub allows_external_maintainer: bool,
    /// Edge reserved for municipality staff (the delegation handoff)
    pub municipality_only: bool,
}

use ReportStatus::*;

pub const TRANSITION_RULES: &[TransitionRule] = &[
    // Triage decisions by public relations
    TransitionRule {
        from: PendingApproval,
        to: Assigned,
        permission: RulePermission::Roles(&[ROLE_PUBLIC_RELATIONS]),
        allows_external_maintainer: false,
        municipality_only: false,
    },
    TransitionRule {
        from: PendingApproval,
        to: Rejected,
        permission: RulePermission::Roles(&[ROLE_PUBLIC_RELATIONS]),
        allows_external_maintainer: false,
        municipality_only: false,
    },
    // In-flight work by the current holder
    TransitionRule {
        from: Assigned,
        to: InProgress,
        permission: RulePermission::AssignedActor,
        allows_external_maintainer: true,
        municipality_only: false,
    },
    // Handing the report to an external maintainer is a municipality decision
    TransitionRule {
        from: Assigned,
        to: Delegated,
        permission: RulePermission::AssignedActor,
        allows_external_maintainer: false,
        municipality_only: true,
    },
    TransitionRule {
        from: Delegated,
        to: InProgress,
        permission: RulePermission::AssignedActor,
        allows_external_maintainer: true,
        municipality_only: false,
    },
    TransitionRule {
        from: InProgress,
        to: Suspended,
        permission: RulePermission::AssignedActor,
        allows_external_maintainer: true,
        municipality_only: false,
    },
    TransitionRule {
        from: Suspended,
        to: InProgress,
        permission: RulePermission::AssignedActor,
        allows_external_maintainer: true,
        municipality_only: false,
    },
    TransitionRule {
        from: InProgress,
        to: Resolved,
        permission: RulePermission::AssignedActor,
        allows_external_maintainer: true,
        municipality_only: false,
    },
];

/// Outcome of a transition check; this API never fails, it answers
#[derive(Debug, Clone)]
pub struct TransitionCheck {
    pub valid: bool,
    pub error: Option<String>,
}

impl TransitionCheck {
    fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(error: String) -> Self {
        Self {
            valid: false,
            error: Some(error),
        }
    }
}

/// Check whether an actor may move a report between two statuses
pub fn validate(
    current: ReportStatus,
    target: ReportStatus,
    actor_role: &str,
    is_external_maintainer: bool,
    is_assigned_actor: bool,
) -> TransitionCheck {
    // Re-asserting the current status is an accepted no-op
    if current == target {
        return TransitionCheck::valid();
    }

    let Some(rule) = TRANSITION_RULES
        .iter()
        .find(|r| r.from == current && r.to == target)
    else {
        return TransitionCheck::invalid(format!(
            "Invalid transition from '{}' to '{}'",
            current, target
        ));
    };

    // The external-maintainer gate comes before the assignment check: a
    // maintainer on a closed edge is told about the maintainer restriction,
    // not about assignment, even when they hold the report.
    if is_external_maintainer && !rule.allows_external_maintainer {
        return TransitionCheck::invalid(format!(
            "External maintainers cannot transition from '{}' to '{}'",
            current, target
        ));
    }

    if rule.municipality_only && is_external_maintainer {
        return TransitionCheck::invalid(format!(
            "Only municipality staff can transition from '{}' to '{}'",
            current, target
        ));
    }

    match rule.permission {
        RulePermission::AssignedActor => {
            if !is_assigned_actor {
                return TransitionCheck::invalid(format!(
                    "Only the assigned user can transition from '{}' to '{}'",
                    current, target
                ));
            }
        }
        RulePermission::Roles(allowed) => {
            if !allowed.iter().any(|name| actor_role.contains(name)) {
                return TransitionCheck::invalid(format!(
                    "Only roles [{}] can transition from '{}' to '{}'",
                    allowed.join(", "),
                    current,
                    target
                ));
            }
        }
    }

    TransitionCheck::valid()
}

/// Targets reachable from `current` for this actor, for UI affordances.
/// Always consistent with [`validate`]: every returned target would pass it.
pub fn valid_next_statuses(
    current: ReportStatus,
    actor_role: &str,
    is_external_maintainer: bool,
    is_assigned_actor: bool,
) -> Vec<ReportStatus> {
    TRANSITION_RULES
        .iter()
        .filter(|r| r.from == current)
        .filter(|r| !(is_external_maintainer && !r.allows_external_maintainer))
        .filter(|r| !(r.municipality_only && is_external_maintainer))
        .filter(|r| match r.permission {
            RulePermission::AssignedActor => is_assigned_actor,
            RulePermission::Roles(allowed) => {
                allowed.iter().any(|name| actor_role.contains(name))
            }
        })
        .map(|r| r.to)
        .collect()
}
