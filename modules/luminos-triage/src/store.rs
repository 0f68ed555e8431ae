//! In-memory issue store with JSON snapshot load/save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use luminos_common::{Issue, IssueStatus, LuminosError};

use crate::traits::IssueStore;

#[derive(Default)]
pub struct MemoryIssueStore {
    issues: RwLock<HashMap<Uuid, Issue>>,
}

impl MemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        Self {
            issues: RwLock::new(issues.into_iter().map(|i| (i.id, i)).collect()),
        }
    }

    pub async fn insert(&self, issue: Issue) {
        self.issues.write().await.insert(issue.id, issue);
    }

    /// Every issue, oldest first (ties by id).
    pub async fn snapshot(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self.issues.read().await.values().cloned().collect();
        issues.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        issues
    }

    /// Load a JSON array of issues.
    pub async fn load_json(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| storage_error("reading", path, e))?;
        let issues: Vec<Issue> =
            serde_json::from_str(&raw).map_err(|e| storage_error("parsing", path, e))?;
        Ok(Self::with_issues(issues))
    }

    pub async fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot().await)
            .map_err(|e| storage_error("encoding", path, e))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| storage_error("writing", path, e))?;
        Ok(())
    }
}

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> LuminosError {
    LuminosError::Storage(format!("{action} {}: {err}", path.display()))
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    async fn get(&self, id: Uuid) -> Result<Option<Issue>> {
        Ok(self.issues.read().await.get(&id).cloned())
    }

    async fn created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Issue>> {
        Ok(self
            .issues
            .read()
            .await
            .values()
            .filter(|i| i.created_at >= from && i.created_at <= to)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Issue>> {
        Ok(self.issues.read().await.values().cloned().collect())
    }

    async fn collection_members(&self, head: Uuid) -> Result<Vec<Issue>> {
        Ok(self
            .issues
            .read()
            .await
            .values()
            .filter(|i| i.same_collection == Some(head))
            .cloned()
            .collect())
    }

    async fn set_same_collection(&self, id: Uuid, head: Option<Uuid>) -> Result<()> {
        let mut issues = self.issues.write().await;
        let issue = issues.get_mut(&id).ok_or(LuminosError::NotFound(id))?;
        issue.same_collection = head;
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: IssueStatus) -> Result<()> {
        let mut issues = self.issues.write().await;
        let issue = issues.get_mut(&id).ok_or(LuminosError::NotFound(id))?;
        issue.status = status;
        Ok(())
    }
}
