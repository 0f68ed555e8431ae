//! Does a report's photo plausibly match its description?
//!
//! With a vision judge and a photo, the model decides. Otherwise, or when the
//! model call fails, a keyword table over the description decides. Emergency
//! keywords are checked on both paths.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use luminos_common::{tokenize, Issue, IssueCategory, Photo, ValidationSource, ValidationVerdict};

use crate::traits::PhotoJudge;

const KEYWORD_HIT_CONFIDENCE: f32 = 0.5;
const KEYWORD_MISS_CONFIDENCE: f32 = 0.3;

/// Category keyword table. On a tie the earlier category wins.
const CATEGORY_KEYWORDS: &[(IssueCategory, &[&str])] = &[
    (
        IssueCategory::Road,
        &[
            "pothole", "potholes", "road", "crack", "cracked", "street", "footpath", "sidewalk",
            "pavement", "asphalt", "speedbreaker", "divider",
        ],
    ),
    (
        IssueCategory::Garbage,
        &[
            "garbage", "trash", "waste", "litter", "dump", "dumped", "dumping", "rubbish",
            "debris", "bin", "stink", "smell",
        ],
    ),
    (
        IssueCategory::Water,
        &["water", "leak", "leaking", "leakage", "pipe", "pipeline", "supply", "tap", "burst"],
    ),
    (
        IssueCategory::Drainage,
        &[
            "drain", "drainage", "sewage", "sewer", "manhole", "clogged", "blocked", "overflow",
            "overflowing", "waterlogging", "waterlogged", "gutter",
        ],
    ),
    (
        IssueCategory::Electricity,
        &[
            "streetlight", "streetlights", "light", "lamp", "wire", "wires", "electric",
            "electricity", "power", "pole", "transformer", "outage", "sparking",
        ],
    ),
    (
        IssueCategory::Vegetation,
        &["tree", "trees", "branch", "branches", "fallen", "overgrown", "weeds", "uprooted"],
    ),
];

const EMERGENCY_KEYWORDS: &[&str] = &[
    "fire", "smoke", "accident", "collapse", "collapsed", "flood", "flooding", "electrocution",
    "sparking", "explosion", "gas", "injured", "injury", "trapped",
];

pub struct ReportValidator {
    vision: Option<Arc<dyn PhotoJudge>>,
}

impl ReportValidator {
    /// Keyword-only validator.
    pub fn keyword_only() -> Self {
        Self { vision: None }
    }

    pub fn with_vision(vision: Arc<dyn PhotoJudge>) -> Self {
        Self {
            vision: Some(vision),
        }
    }

    pub async fn validate(&self, description: &str, photo: Option<&Photo>) -> ValidationVerdict {
        let tokens = tokenize(description);
        let keyword_emergency = has_emergency_keyword(&tokens);

        if let (Some(vision), Some(photo)) = (&self.vision, photo) {
            match vision.assess(description, photo).await {
                Ok(assessment) => {
                    info!(
                        matches = assessment.matches,
                        confidence = assessment.confidence,
                        category = %assessment.category,
                        "Photo validated by model"
                    );
                    return ValidationVerdict {
                        plausible: assessment.matches,
                        confidence: assessment.confidence.clamp(0.0, 1.0),
                        reason: assessment.reason,
                        category: assessment.category,
                        suggests_emergency: assessment.emergency || keyword_emergency,
                        source: ValidationSource::Llm,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "Photo validation call failed, using keyword fallback");
                }
            }
        }

        keyword_verdict(&tokens, keyword_emergency)
    }

    /// Validate an issue, loading its photo from `upload_dir` when it has one.
    /// A missing or unreadable photo is validated as if none was attached.
    pub async fn validate_issue(&self, issue: &Issue, upload_dir: &Path) -> ValidationVerdict {
        let photo = match &issue.photo {
            Some(rel) => match load_photo(&upload_dir.join(rel)).await {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(issue_id = %issue.id, error = %e, "Photo unreadable, validating text only");
                    None
                }
            },
            None => None,
        };
        self.validate(&issue.description, photo.as_ref()).await
    }
}

pub async fn load_photo(path: &Path) -> Result<Photo> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading photo {}", path.display()))?;
    Ok(Photo {
        bytes,
        mime_type: Photo::mime_for_path(path).to_string(),
    })
}

/// Best-matching category by keyword hits, `Other` when nothing matches.
pub fn classify(tokens: &BTreeSet<String>) -> (IssueCategory, usize) {
    let mut best = (IssueCategory::Other, 0);
    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = keywords.iter().filter(|k| tokens.contains(**k)).count();
        if hits > best.1 {
            best = (*category, hits);
        }
    }
    best
}

fn has_emergency_keyword(tokens: &BTreeSet<String>) -> bool {
    EMERGENCY_KEYWORDS.iter().any(|k| tokens.contains(*k))
}

fn keyword_verdict(tokens: &BTreeSet<String>, suggests_emergency: bool) -> ValidationVerdict {
    let (category, hits) = classify(tokens);
    let plausible = hits > 0;
    ValidationVerdict {
        plausible,
        confidence: if plausible {
            KEYWORD_HIT_CONFIDENCE
        } else {
            KEYWORD_MISS_CONFIDENCE
        },
        reason: if plausible {
            format!("description mentions {category} keywords")
        } else {
            "description matches no known issue keywords".to_string()
        },
        category,
        suggests_emergency,
        source: ValidationSource::Keyword,
    }
}
