//! Pure decision functions for same-incident grouping.
//!
//! A [`Probe`] is the newly submitted issue with its coordinate parsed and its
//! description tokenized once. [`collection_verdict`] compares it against one
//! earlier issue. Filters run cheapest first and exit early:
//!
//! 1. eligibility: different id, not rejected, created no later, inside window
//! 2. candidate coordinate parses
//! 3. distance within radius
//! 4. token overlap of the two descriptions

use std::collections::BTreeSet;

use luminos_common::config::CollectionConfig;
use luminos_common::{token_overlap, tokenize, Coordinate, Issue, IssueStatus, LuminosError};

/// The new issue, pre-processed for repeated comparison.
#[derive(Debug, Clone)]
pub struct Probe<'a> {
    pub issue: &'a Issue,
    pub location: Coordinate,
    pub tokens: BTreeSet<String>,
}

impl<'a> Probe<'a> {
    pub fn new(issue: &'a Issue) -> Result<Self, LuminosError> {
        Ok(Self {
            issue,
            location: issue.location()?,
            tokens: tokenize(&issue.description),
        })
    }
}

/// Why a candidate was not grouped with the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SameIssue,
    Rejected,
    NewerThanProbe,
    OutsideWindow,
    BadCoordinate,
    TooFar,
    TextMismatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionVerdict {
    /// Overlap is high enough to group outright.
    Same { distance_km: f64, overlap: f64 },
    /// Close in space and time, but the text alone cannot decide.
    Ambiguous { distance_km: f64, overlap: f64 },
    Different(SkipReason),
}

/// Cheap eligibility check that needs no parsing.
pub fn eligibility(probe: &Probe, candidate: &Issue, config: &CollectionConfig) -> Option<SkipReason> {
    if candidate.id == probe.issue.id {
        return Some(SkipReason::SameIssue);
    }
    if candidate.status == IssueStatus::Rejected {
        return Some(SkipReason::Rejected);
    }
    if candidate.created_at > probe.issue.created_at {
        return Some(SkipReason::NewerThanProbe);
    }
    let gap = probe.issue.created_at - candidate.created_at;
    if config.window().is_ok_and(|window| gap > window) {
        return Some(SkipReason::OutsideWindow);
    }
    None
}

pub fn collection_verdict(
    probe: &Probe,
    candidate: &Issue,
    config: &CollectionConfig,
) -> CollectionVerdict {
    if let Some(reason) = eligibility(probe, candidate, config) {
        return CollectionVerdict::Different(reason);
    }

    let Ok(location) = candidate.location() else {
        return CollectionVerdict::Different(SkipReason::BadCoordinate);
    };

    let distance_km = probe.location.distance_km(&location);
    if distance_km > config.radius_km {
        return CollectionVerdict::Different(SkipReason::TooFar);
    }

    let overlap = token_overlap(&probe.tokens, &tokenize(&candidate.description));
    if overlap >= config.strong_overlap {
        CollectionVerdict::Same { distance_km, overlap }
    } else if overlap >= config.weak_overlap {
        CollectionVerdict::Ambiguous { distance_km, overlap }
    } else {
        CollectionVerdict::Different(SkipReason::TextMismatch)
    }
}

/// Earliest first, ties by id, so the first match is the collection's oldest issue.
pub fn scan_order(candidates: &mut [Issue]) {
    candidates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{north_of, IssueBuilder, INDIRANAGAR, MG_ROAD};

    fn cfg() -> CollectionConfig {
        CollectionConfig::default()
    }

    #[test]
    fn near_and_similar_is_same() {
        let new = IssueBuilder::new("Deep pothole on MG Road near metro pillar")
            .minutes_after_epoch(30)
            .build();
        let old = IssueBuilder::new("pothole MG Road metro pillar").build();
        let probe = Probe::new(&new).unwrap();

        assert!(matches!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Same { .. }
        ));
    }

    #[test]
    fn far_apart_is_too_far() {
        let new = IssueBuilder::new("pothole on road").minutes_after_epoch(5).build();
        let old = IssueBuilder::new("pothole on road").at(INDIRANAGAR).build();
        let probe = Probe::new(&new).unwrap();

        assert_eq!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Different(SkipReason::TooFar)
        );
    }

    #[test]
    fn just_inside_radius_is_considered() {
        let new = IssueBuilder::new("garbage heap").minutes_after_epoch(5).build();
        let old = IssueBuilder::new("garbage heap")
            .at(north_of(MG_ROAD, 90.0))
            .build();
        let probe = Probe::new(&new).unwrap();

        match collection_verdict(&probe, &old, &cfg()) {
            CollectionVerdict::Same { distance_km, .. } => assert!(distance_km < 0.1),
            other => panic!("expected Same, got {other:?}"),
        }
    }

    #[test]
    fn just_outside_radius_is_too_far() {
        let new = IssueBuilder::new("garbage heap").minutes_after_epoch(5).build();
        let old = IssueBuilder::new("garbage heap")
            .at(north_of(MG_ROAD, 120.0))
            .build();
        let probe = Probe::new(&new).unwrap();

        assert_eq!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Different(SkipReason::TooFar)
        );
    }

    #[test]
    fn outside_window_is_skipped() {
        let new = IssueBuilder::new("pothole").minutes_after_epoch(49 * 60).build();
        let old = IssueBuilder::new("pothole").build();
        let probe = Probe::new(&new).unwrap();

        assert_eq!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Different(SkipReason::OutsideWindow)
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let new = IssueBuilder::new("pothole").minutes_after_epoch(48 * 60).build();
        let old = IssueBuilder::new("pothole").build();
        let probe = Probe::new(&new).unwrap();

        assert!(matches!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Same { .. }
        ));
    }

    #[test]
    fn newer_candidate_is_skipped() {
        let new = IssueBuilder::new("pothole").build();
        let later = IssueBuilder::new("pothole").minutes_after_epoch(1).build();
        let probe = Probe::new(&new).unwrap();

        assert_eq!(
            collection_verdict(&probe, &later, &cfg()),
            CollectionVerdict::Different(SkipReason::NewerThanProbe)
        );
    }

    #[test]
    fn self_is_skipped() {
        let new = IssueBuilder::new("pothole").build();
        let probe = Probe::new(&new).unwrap();
        assert_eq!(
            collection_verdict(&probe, &new, &cfg()),
            CollectionVerdict::Different(SkipReason::SameIssue)
        );
    }

    #[test]
    fn rejected_candidate_is_skipped() {
        let new = IssueBuilder::new("pothole").minutes_after_epoch(1).build();
        let old = IssueBuilder::new("pothole").status(IssueStatus::Rejected).build();
        let probe = Probe::new(&new).unwrap();
        assert_eq!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Different(SkipReason::Rejected)
        );
    }

    #[test]
    fn unparseable_candidate_coordinate_is_skipped() {
        let new = IssueBuilder::new("pothole").minutes_after_epoch(1).build();
        let old = IssueBuilder::new("pothole").raw_coordinate("somewhere").build();
        let probe = Probe::new(&new).unwrap();
        assert_eq!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Different(SkipReason::BadCoordinate)
        );
    }

    #[test]
    fn unparseable_probe_coordinate_fails_probe() {
        let new = IssueBuilder::new("pothole").raw_coordinate("12.9").build();
        assert!(Probe::new(&new).is_err());
    }

    #[test]
    fn middling_overlap_is_ambiguous() {
        // {water, pipe, burst, main, road} vs {water, logging, entire, lane, pipe}
        // shared 2 of 5 = 0.4
        let new = IssueBuilder::new("water pipe burst main road")
            .minutes_after_epoch(10)
            .build();
        let old = IssueBuilder::new("water logging entire lane pipe").build();
        let probe = Probe::new(&new).unwrap();

        match collection_verdict(&probe, &old, &cfg()) {
            CollectionVerdict::Ambiguous { overlap, .. } => assert!((overlap - 0.4).abs() < 1e-9),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_text_is_mismatch() {
        let new = IssueBuilder::new("streetlight not working")
            .minutes_after_epoch(10)
            .build();
        let old = IssueBuilder::new("garbage dumped footpath").build();
        let probe = Probe::new(&new).unwrap();

        assert_eq!(
            collection_verdict(&probe, &old, &cfg()),
            CollectionVerdict::Different(SkipReason::TextMismatch)
        );
    }

    #[test]
    fn scan_order_is_oldest_first() {
        let a = IssueBuilder::new("a").minutes_after_epoch(20).build();
        let b = IssueBuilder::new("b").minutes_after_epoch(5).build();
        let c = IssueBuilder::new("c").minutes_after_epoch(10).build();
        let mut v = vec![a.clone(), b.clone(), c.clone()];
        scan_order(&mut v);
        let ids: Vec<_> = v.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }
}
