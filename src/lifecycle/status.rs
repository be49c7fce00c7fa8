//! Plan status progression

use chrono::{DateTime, Utc};

use crate::types::*;

/// Move a plan one step along its lifecycle, stamping `closed_at` when it
/// enters the terminal state. Closed plans come back unchanged.
pub fn advance_at(plan: &Plan, now: DateTime<Utc>) -> Plan {
    let mut next = plan.clone();
    if let Some(status) = plan.status.next() {
        next.status = status;
        if status == PlanStatus::Closed {
            next.closed_at = Some(now);
        }
    }
    next
}

/// [`advance_at`] using the current time
pub fn advance(plan: &Plan) -> Plan {
    advance_at(plan, Utc::now())
}

/// Explicitly assign a status.
///
/// Only the current status (a no-op) or the immediate successor is accepted.
pub fn transition_at(plan: &Plan, target: PlanStatus, now: DateTime<Utc>) -> PlanResult<Plan> {
    if target == plan.status {
        return Ok(plan.clone());
    }
    if plan.status.next() != Some(target) {
        return Err(PlanError::InvalidStatusTransition {
            from: plan.status,
            to: target,
        });
    }
    Ok(advance_at(plan, now))
}

/// [`transition_at`] using the current time
pub fn transition(plan: &Plan, target: PlanStatus) -> PlanResult<Plan> {
    transition_at(plan, target, Utc::now())
}
