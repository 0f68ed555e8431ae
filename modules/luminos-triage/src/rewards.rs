//! Citizen reward points and the leaderboard.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use luminos_common::{Issue, IssueStatus};

pub const VERIFIED_POINTS: u32 = 10;
pub const RESOLVED_POINTS: u32 = 15;
pub const EMERGENCY_BONUS: u32 = 5;
/// Flat credit for a confirmed report that joined an earlier collection.
pub const CORROBORATION_POINTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub reporter_id: Uuid,
    pub points: u32,
    pub reports: u32,
    /// Reports that reached verified or beyond.
    pub confirmed: u32,
}

/// Points earned by a single report.
pub fn issue_points(issue: &Issue) -> u32 {
    if !issue.status.is_confirmed() {
        return 0;
    }
    if issue.is_collection_member() {
        return CORROBORATION_POINTS;
    }
    let base = match issue.status {
        IssueStatus::Resolved => RESOLVED_POINTS,
        _ => VERIFIED_POINTS,
    };
    if issue.emergency {
        base + EMERGENCY_BONUS
    } else {
        base
    }
}

/// Rank reporters by points, then confirmed reports, then id. `limit == 0` means no limit.
pub fn leaderboard(issues: &[Issue], limit: usize) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<Uuid, (u32, u32, u32)> = HashMap::new();
    for issue in issues {
        let entry = totals.entry(issue.reporter_id).or_default();
        entry.0 += issue_points(issue);
        entry.1 += 1;
        if issue.status.is_confirmed() {
            entry.2 += 1;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = totals
        .into_iter()
        .map(|(reporter_id, (points, reports, confirmed))| LeaderboardEntry {
            rank: 0,
            reporter_id,
            points,
            reports,
            confirmed,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.confirmed.cmp(&a.confirmed))
            .then(a.reporter_id.cmp(&b.reporter_id))
    });
    if limit > 0 {
        entries.truncate(limit);
    }
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::IssueBuilder;

    #[test]
    fn pending_and_rejected_earn_nothing() {
        assert_eq!(issue_points(&IssueBuilder::new("x").build()), 0);
        assert_eq!(
            issue_points(&IssueBuilder::new("x").status(IssueStatus::Rejected).emergency().build()),
            0
        );
    }

    #[test]
    fn points_by_status() {
        let verified = IssueBuilder::new("x").status(IssueStatus::Verified).build();
        let in_progress = IssueBuilder::new("x").status(IssueStatus::InProgress).build();
        let resolved = IssueBuilder::new("x").status(IssueStatus::Resolved).build();
        assert_eq!(issue_points(&verified), VERIFIED_POINTS);
        assert_eq!(issue_points(&in_progress), VERIFIED_POINTS);
        assert_eq!(issue_points(&resolved), RESOLVED_POINTS);
    }

    #[test]
    fn emergency_bonus_applies_once_confirmed() {
        let issue = IssueBuilder::new("x")
            .status(IssueStatus::Resolved)
            .emergency()
            .build();
        assert_eq!(issue_points(&issue), RESOLVED_POINTS + EMERGENCY_BONUS);
    }

    #[test]
    fn collection_member_gets_flat_credit() {
        let member = IssueBuilder::new("x")
            .status(IssueStatus::Resolved)
            .emergency()
            .member_of(Uuid::new_v4())
            .build();
        assert_eq!(issue_points(&member), CORROBORATION_POINTS);
    }

    #[test]
    fn leaderboard_ranks_and_breaks_ties() {
        let alice = Uuid::from_u128(1);
        let bob = Uuid::from_u128(2);
        let carol = Uuid::from_u128(3);

        let issues = vec![
            // alice: 10 + 10 = 20, two confirmed
            IssueBuilder::new("a").reporter(alice).status(IssueStatus::Verified).build(),
            IssueBuilder::new("a").reporter(alice).status(IssueStatus::Verified).build(),
            // bob: 15 + 5 = 20, one confirmed
            IssueBuilder::new("b")
                .reporter(bob)
                .status(IssueStatus::Resolved)
                .emergency()
                .build(),
            IssueBuilder::new("b").reporter(bob).build(),
            // carol: 0
            IssueBuilder::new("c").reporter(carol).status(IssueStatus::Rejected).build(),
        ];

        let board = leaderboard(&issues, 0);
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].reporter_id, alice);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].points, 20);
        assert_eq!(board[0].confirmed, 2);
        assert_eq!(board[1].reporter_id, bob);
        assert_eq!(board[1].points, 20);
        assert_eq!(board[1].reports, 2);
        assert_eq!(board[2].reporter_id, carol);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn leaderboard_respects_limit() {
        let issues: Vec<Issue> = (0..5)
            .map(|_| IssueBuilder::new("x").status(IssueStatus::Verified).build())
            .collect();
        let board = leaderboard(&issues, 2);
        assert_eq!(board.len(), 2);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn leaderboard_of_nothing_is_empty() {
        assert!(leaderboard(&[], 10).is_empty());
    }
}
