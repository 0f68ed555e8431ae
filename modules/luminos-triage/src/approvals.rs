//! Admin approval of government-authority accounts.

use chrono::{DateTime, Utc};
use tracing::info;

use luminos_common::{Actor, ApprovalStatus, GovtAuthority, LuminosError, Role};

pub fn approve(
    admin: &Actor,
    authority: &mut GovtAuthority,
    now: DateTime<Utc>,
) -> Result<(), LuminosError> {
    decide(admin, authority, ApprovalStatus::Approved, now)
}

pub fn reject(
    admin: &Actor,
    authority: &mut GovtAuthority,
    now: DateTime<Utc>,
) -> Result<(), LuminosError> {
    decide(admin, authority, ApprovalStatus::Rejected, now)
}

/// Accounts still waiting for a decision, in input order.
pub fn pending(authorities: &[GovtAuthority]) -> Vec<&GovtAuthority> {
    authorities
        .iter()
        .filter(|a| a.approval == ApprovalStatus::Pending)
        .collect()
}

fn decide(
    admin: &Actor,
    authority: &mut GovtAuthority,
    outcome: ApprovalStatus,
    now: DateTime<Utc>,
) -> Result<(), LuminosError> {
    if admin.role != Role::Admin {
        return Err(LuminosError::Unauthorized(format!(
            "user {} may not decide authority approvals",
            admin.user_id
        )));
    }
    if authority.approval != ApprovalStatus::Pending {
        return Err(LuminosError::Validation(format!(
            "authority {} was already decided ({:?})",
            authority.id, authority.approval
        )));
    }

    authority.approval = outcome;
    authority.decided_at = Some(now);
    info!(
        authority_id = %authority.id,
        department = authority.department.as_str(),
        region = authority.region.as_str(),
        outcome = ?outcome,
        "Authority approval decided"
    );
    Ok(())
}
