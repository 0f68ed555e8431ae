// Trait seams for triage.
//
// IssueStore hides persistence. IncidentJudge and PhotoJudge hide the LLM.
// Tests swap in MemoryIssueStore, MockJudge and MockVision: no network,
// no database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use luminos_common::{Issue, IssueCategory, IssueStatus, Photo};

// ---------------------------------------------------------------------------
// IssueStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Issue>>;

    /// Issues with `from <= created_at <= to`, in no particular order.
    async fn created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Issue>>;

    async fn all(&self) -> Result<Vec<Issue>>;

    /// Issues whose `same_collection` is `head`. Does not include the head.
    async fn collection_members(&self, head: Uuid) -> Result<Vec<Issue>>;

    async fn set_same_collection(&self, id: Uuid, head: Option<Uuid>) -> Result<()>;

    async fn set_status(&self, id: Uuid, status: IssueStatus) -> Result<()>;
}

// ---------------------------------------------------------------------------
// IncidentJudge: tie-break for ambiguous text overlap
// ---------------------------------------------------------------------------

#[async_trait]
pub trait IncidentJudge: Send + Sync {
    /// Do `new` and `existing` describe the same real-world incident?
    async fn same_incident(&self, new: &Issue, existing: &Issue) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// PhotoJudge: does the photo show what the description says?
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhotoAssessment {
    /// True when the photo plausibly shows the described issue.
    pub matches: bool,
    /// 0.0 to 1.0.
    pub confidence: f32,
    /// One sentence explaining the judgment.
    pub reason: String,
    pub category: IssueCategory,
    /// True if the photo shows danger to people (fire, collapse, live wires, flooding).
    pub emergency: bool,
}

#[async_trait]
pub trait PhotoJudge: Send + Sync {
    async fn assess(&self, description: &str, photo: &Photo) -> Result<PhotoAssessment>;
}
