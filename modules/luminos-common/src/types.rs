use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LuminosError;
use crate::geo::{parse_coordinate, Coordinate};

// --- Issues ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Pending,
    Verified,
    InProgress,
    Resolved,
    Rejected,
}

impl IssueStatus {
    /// Verified or any state past it (except rejection).
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Verified | Self::InProgress | Self::Resolved)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Road,
    Garbage,
    Water,
    Drainage,
    Electricity,
    Vegetation,
    Other,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Road => "road",
            Self::Garbage => "garbage",
            Self::Water => "water",
            Self::Drainage => "drainage",
            Self::Electricity => "electricity",
            Self::Vegetation => "vegetation",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// A citizen-submitted incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub reporter_id: Uuid,
    /// Raw `"lat,lng"` as submitted by the client.
    pub coordinate: String,
    pub description: String,
    /// Path of the uploaded photo, relative to the upload directory.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub emergency: bool,
    pub created_at: DateTime<Utc>,
    /// Head of the collection this report was grouped into, if any.
    #[serde(default)]
    pub same_collection: Option<Uuid>,
}

impl Issue {
    pub fn location(&self) -> Result<Coordinate, LuminosError> {
        parse_coordinate(&self.coordinate)
    }

    /// The collection this issue belongs to: its head, or itself.
    pub fn collection_id(&self) -> Uuid {
        self.same_collection.unwrap_or(self.id)
    }

    pub fn is_collection_member(&self) -> bool {
        self.same_collection.is_some()
    }
}

/// Raw photo bytes handed to the validator.
#[derive(Debug, Clone)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Photo {
    /// Guess the MIME type from a file extension. Defaults to JPEG.
    pub fn mime_for_path(path: &std::path::Path) -> &'static str {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        }
    }
}

// --- Validation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSource {
    Llm,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub plausible: bool,
    pub confidence: f32,
    pub reason: String,
    pub category: IssueCategory,
    pub suggests_emergency: bool,
    pub source: ValidationSource,
}

// --- Users & authorities ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    GovtAuthority,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovtAuthority {
    pub id: Uuid,
    pub user_id: Uuid,
    pub department: String,
    pub region: String,
    #[serde(default)]
    pub approval: ApprovalStatus,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

impl GovtAuthority {
    pub fn new(user_id: Uuid, department: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            department: department.into(),
            region: region.into(),
            approval: ApprovalStatus::Pending,
            decided_at: None,
        }
    }
}

/// Whoever is performing an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    /// Only meaningful for `Role::GovtAuthority`.
    #[serde(default)]
    pub approval: Option<ApprovalStatus>,
}

impl Actor {
    pub fn admin(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Admin, approval: None }
    }

    pub fn citizen(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Citizen, approval: None }
    }

    pub fn authority(authority: &GovtAuthority) -> Self {
        Self {
            user_id: authority.user_id,
            role: Role::GovtAuthority,
            approval: Some(authority.approval),
        }
    }

    /// Admins and approved authorities may verify and progress issues.
    pub fn can_triage(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::GovtAuthority => self.approval == Some(ApprovalStatus::Approved),
            Role::Citizen => false,
        }
    }
}
