//! Issue status transitions.
//!
//! ```text
//! pending ──► verified ──► in_progress ──► resolved
//!    │           │  └─────────────────────────▲
//!    ▼           ▼
//! rejected    rejected
//! ```

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use luminos_common::{Actor, Issue, IssueStatus, LuminosError};

use crate::collection::verdict::scan_order;
use crate::traits::IssueStore;

pub fn can_transition(from: IssueStatus, to: IssueStatus) -> bool {
    use IssueStatus::*;
    matches!(
        (from, to),
        (Pending, Verified)
            | (Pending, Rejected)
            | (Verified, InProgress)
            | (Verified, Resolved)
            | (Verified, Rejected)
            | (InProgress, Resolved)
    )
}

/// Check both permission and transition validity.
pub fn check_transition(actor: &Actor, from: IssueStatus, to: IssueStatus) -> Result<(), LuminosError> {
    if !actor.can_triage() {
        return Err(LuminosError::Unauthorized(format!(
            "user {} may not change issue status",
            actor.user_id
        )));
    }
    if !can_transition(from, to) {
        return Err(LuminosError::InvalidTransition { from, to });
    }
    Ok(())
}

/// Move an issue to `to`. When the issue heads a collection, every member that
/// can make the same move follows. Returns the ids that changed.
pub async fn transition(
    store: &dyn IssueStore,
    actor: &Actor,
    issue_id: Uuid,
    to: IssueStatus,
) -> Result<Vec<Uuid>> {
    let issue = store
        .get(issue_id)
        .await?
        .ok_or(LuminosError::NotFound(issue_id))?;
    check_transition(actor, issue.status, to)?;

    store.set_status(issue.id, to).await?;
    let mut changed = vec![issue.id];

    if !issue.is_collection_member() {
        let mut stranded = Vec::new();
        for member in store.collection_members(issue.id).await? {
            if can_transition(member.status, to) {
                store.set_status(member.id, to).await?;
                changed.push(member.id);
            } else {
                debug!(member = %member.id, from = %member.status, to = %to, "Member left as is");
                if member.status != IssueStatus::Rejected {
                    stranded.push(member);
                }
            }
        }
        if to == IssueStatus::Rejected {
            promote_successor(store, issue.id, stranded).await?;
        }
    }

    info!(
        issue_id = %issue.id,
        actor = %actor.user_id,
        from = %issue.status,
        to = %to,
        updated = changed.len(),
        "Issue status changed"
    );
    Ok(changed)
}

/// A rejected head cannot lead its collection. The earliest member still alive
/// becomes the head and the other live members follow it.
async fn promote_successor(
    store: &dyn IssueStore,
    rejected_head: Uuid,
    mut members: Vec<Issue>,
) -> Result<()> {
    scan_order(&mut members);
    let Some((successor, rest)) = members.split_first() else {
        return Ok(());
    };

    store.set_same_collection(successor.id, None).await?;
    for member in rest {
        store.set_same_collection(member.id, Some(successor.id)).await?;
    }
    info!(
        rejected_head = %rejected_head,
        new_head = %successor.id,
        members = rest.len(),
        "Collection head rejected, promoted earliest live member"
    );
    Ok(())
}
