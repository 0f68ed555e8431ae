// Test mocks and builders for triage.
//
// - IssueBuilder: terse Issue construction with sensible defaults
// - MockJudge (IncidentJudge): fixed answer, call counter, optional failure
// - MockVision (PhotoJudge): fixed assessment or failure

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use luminos_common::{Coordinate, Issue, IssueCategory, IssueStatus, Photo};

use crate::traits::{IncidentJudge, PhotoAssessment, PhotoJudge};

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

/// MG Road metro station, Bengaluru.
pub const MG_ROAD: (f64, f64) = (12.9756, 77.6066);
/// Indiranagar 100ft Road, ~3 km east of MG Road.
pub const INDIRANAGAR: (f64, f64) = (12.9719, 77.6412);

/// A fixed instant so tests do not depend on the wall clock.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().unwrap_or_else(Utc::now)
}

/// Shift a point north by `meters`.
pub fn north_of(point: (f64, f64), meters: f64) -> (f64, f64) {
    (point.0 + meters / 111_195.0, point.1)
}

// ---------------------------------------------------------------------------
// IssueBuilder
// ---------------------------------------------------------------------------

pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new(description: &str) -> Self {
        Self {
            issue: Issue {
                id: Uuid::new_v4(),
                reporter_id: Uuid::new_v4(),
                coordinate: Coordinate { lat: MG_ROAD.0, lng: MG_ROAD.1 }.to_string(),
                description: description.to_string(),
                photo: None,
                status: IssueStatus::Pending,
                emergency: false,
                created_at: epoch(),
                same_collection: None,
            },
        }
    }

    pub fn at(mut self, point: (f64, f64)) -> Self {
        self.issue.coordinate = Coordinate { lat: point.0, lng: point.1 }.to_string();
        self
    }

    pub fn raw_coordinate(mut self, raw: &str) -> Self {
        self.issue.coordinate = raw.to_string();
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.issue.created_at = at;
        self
    }

    pub fn minutes_after_epoch(self, minutes: i64) -> Self {
        self.created_at(epoch() + Duration::minutes(minutes))
    }

    pub fn reporter(mut self, reporter_id: Uuid) -> Self {
        self.issue.reporter_id = reporter_id;
        self
    }

    pub fn status(mut self, status: IssueStatus) -> Self {
        self.issue.status = status;
        self
    }

    pub fn emergency(mut self) -> Self {
        self.issue.emergency = true;
        self
    }

    pub fn member_of(mut self, head: Uuid) -> Self {
        self.issue.same_collection = Some(head);
        self
    }

    pub fn photo(mut self, path: &str) -> Self {
        self.issue.photo = Some(path.to_string());
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}

pub fn test_photo() -> Photo {
    Photo {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        mime_type: "image/jpeg".to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockJudge
// ---------------------------------------------------------------------------

pub struct MockJudge {
    answer: Option<bool>,
    calls: AtomicUsize,
}

impl MockJudge {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer: Some(answer),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call returns an error.
    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncidentJudge for MockJudge {
    async fn same_incident(&self, _new: &Issue, _existing: &Issue) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Some(answer) => Ok(answer),
            None => bail!("judge unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockVision
// ---------------------------------------------------------------------------

pub struct MockVision {
    assessment: Option<PhotoAssessment>,
}

impl MockVision {
    pub fn returning(matches: bool, category: IssueCategory) -> Self {
        Self {
            assessment: Some(PhotoAssessment {
                matches,
                confidence: 0.9,
                reason: "mock".to_string(),
                category,
                emergency: false,
            }),
        }
    }

    pub fn with_assessment(assessment: PhotoAssessment) -> Self {
        Self {
            assessment: Some(assessment),
        }
    }

    pub fn failing() -> Self {
        Self { assessment: None }
    }
}

#[async_trait]
impl PhotoJudge for MockVision {
    async fn assess(&self, _description: &str, _photo: &Photo) -> Result<PhotoAssessment> {
        match &self.assessment {
            Some(a) => Ok(a.clone()),
            None => bail!("vision unavailable"),
        }
    }
}
