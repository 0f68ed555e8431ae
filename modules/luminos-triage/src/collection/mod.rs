//! Same-incident grouping ("same_collection").
//!
//! Citizens often report the same pothole or garbage heap several times.
//! Reports that are close in space and time and describe the same thing are
//! grouped under the earliest of them, the collection head. Members store the
//! head's id in `same_collection`; heads store `None`. Collections are flat:
//! a member never points at another member.

pub mod verdict;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};
use uuid::Uuid;

use luminos_common::config::CollectionConfig;
use luminos_common::{Issue, IssueStatus, LuminosError};

use crate::traits::{IncidentJudge, IssueStore};
use verdict::{collection_verdict, scan_order, CollectionVerdict, Probe};

/// Counters from a full rebuild.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RebuildStats {
    pub issues: usize,
    /// Issues that joined an earlier collection.
    pub grouped: usize,
    /// Distinct collections, singletons included.
    pub collections: usize,
    /// Issues whose coordinate could not be parsed.
    pub unlocatable: usize,
    /// Rows whose `same_collection` value changed.
    pub changed: usize,
    pub judge_calls: usize,
}

/// Outcome of scanning the candidates for one issue.
#[derive(Debug, Default)]
struct HeadSearch {
    head: Option<Uuid>,
    judge_calls: usize,
    unlocatable: bool,
}

pub struct CollectionEngine {
    store: Arc<dyn IssueStore>,
    judge: Option<Arc<dyn IncidentJudge>>,
    config: CollectionConfig,
}

impl CollectionEngine {
    pub fn new(store: Arc<dyn IssueStore>, config: CollectionConfig) -> Self {
        Self {
            store,
            judge: None,
            config,
        }
    }

    /// Consult `judge` when text overlap alone is inconclusive.
    pub fn with_judge(mut self, judge: Arc<dyn IncidentJudge>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Group a newly submitted issue and persist the result.
    ///
    /// Returns the head it joined, or `None` when it stands alone.
    pub async fn assign(&self, issue_id: Uuid) -> Result<Option<Uuid>> {
        let issue = self
            .store
            .get(issue_id)
            .await?
            .ok_or(LuminosError::NotFound(issue_id))?;

        let window = self.config.window()?;
        let from = issue.created_at.checked_sub_signed(window).ok_or_else(|| {
            LuminosError::Config(format!(
                "window of {} hours reaches before the earliest representable time",
                self.config.window_hours
            ))
        })?;
        let candidates = self.store.created_between(from, issue.created_at).await?;
        let search = self.find_head(&issue, candidates).await?;

        if issue.same_collection != search.head {
            self.store.set_same_collection(issue.id, search.head).await?;
        }

        // An issue that was itself a head hands its members to the new head.
        if let Some(head) = search.head {
            for member in self.store.collection_members(issue.id).await? {
                self.store.set_same_collection(member.id, Some(head)).await?;
            }
            info!(issue_id = %issue.id, head = %head, "Issue joined existing collection");
        } else {
            debug!(issue_id = %issue.id, "Issue starts its own collection");
        }

        Ok(search.head)
    }

    /// Clear and recompute every `same_collection` in one chronological pass.
    pub async fn rebuild(&self) -> Result<RebuildStats> {
        let mut issues = self.store.all().await?;
        scan_order(&mut issues);

        let mut stats = RebuildStats {
            issues: issues.len(),
            ..Default::default()
        };
        let window = self.config.window()?;
        let mut processed: Vec<Issue> = Vec::with_capacity(issues.len());

        for mut issue in issues {
            let previous = issue.same_collection;

            // `processed` is sorted oldest first; only its tail can be in the window.
            let start = processed.partition_point(|p| issue.created_at - p.created_at > window);
            let candidates = processed[start..].to_vec();

            let search = self.find_head(&issue, candidates).await?;
            stats.judge_calls += search.judge_calls;
            if search.unlocatable {
                stats.unlocatable += 1;
            }
            if search.head.is_some() {
                stats.grouped += 1;
            }

            if previous != search.head {
                self.store.set_same_collection(issue.id, search.head).await?;
                stats.changed += 1;
            }
            issue.same_collection = search.head;
            processed.push(issue);
        }

        stats.collections = stats.issues - stats.grouped;
        info!(
            issues = stats.issues,
            grouped = stats.grouped,
            collections = stats.collections,
            unlocatable = stats.unlocatable,
            changed = stats.changed,
            judge_calls = stats.judge_calls,
            "Rebuilt issue collections"
        );
        Ok(stats)
    }

    async fn find_head(&self, issue: &Issue, mut candidates: Vec<Issue>) -> Result<HeadSearch> {
        let mut search = HeadSearch::default();

        let probe = match Probe::new(issue) {
            Ok(p) => p,
            Err(e) => {
                warn!(issue_id = %issue.id, error = %e, "Cannot locate issue, skipping grouping");
                search.unlocatable = true;
                return Ok(search);
            }
        };

        scan_order(&mut candidates);

        for candidate in &candidates {
            if candidate.collection_id() == issue.id {
                continue;
            }

            let verdict = collection_verdict(&probe, candidate, &self.config);
            if let CollectionVerdict::Different(_) = verdict {
                continue;
            }

            let Some(head) = self.live_head(candidate, &candidates).await? else {
                debug!(
                    issue_id = %issue.id,
                    candidate = %candidate.id,
                    "Candidate belongs to a rejected collection, skipping"
                );
                continue;
            };

            match verdict {
                CollectionVerdict::Same { distance_km, overlap } => {
                    debug!(
                        issue_id = %issue.id,
                        candidate = %candidate.id,
                        distance_km,
                        overlap,
                        "Same incident by text overlap"
                    );
                    search.head = Some(head);
                    return Ok(search);
                }
                CollectionVerdict::Ambiguous { distance_km, overlap } => {
                    let Some(judge) = &self.judge else {
                        continue;
                    };
                    search.judge_calls += 1;
                    match judge.same_incident(issue, candidate).await {
                        Ok(true) => {
                            debug!(
                                issue_id = %issue.id,
                                candidate = %candidate.id,
                                distance_km,
                                overlap,
                                "Same incident by judge"
                            );
                            search.head = Some(head);
                            return Ok(search);
                        }
                        Ok(false) => {}
                        Err(e) => {
                            warn!(
                                issue_id = %issue.id,
                                candidate = %candidate.id,
                                error = %e,
                                "Incident judge failed, treating as different"
                            );
                        }
                    }
                }
                CollectionVerdict::Different(_) => {}
            }
        }

        Ok(search)
    }

    /// The head a match on `candidate` would join. `None` when the candidate is a
    /// member whose head is rejected or missing.
    async fn live_head(&self, candidate: &Issue, candidates: &[Issue]) -> Result<Option<Uuid>> {
        let Some(head) = candidate.same_collection else {
            return Ok(Some(candidate.id));
        };
        let status = match candidates.iter().find(|c| c.id == head) {
            Some(found) => Some(found.status),
            None => self.store.get(head).await?.map(|h| h.status),
        };
        Ok(match status {
            Some(status) if status != IssueStatus::Rejected => Some(head),
            _ => None,
        })
    }
}
