//! Claude-backed implementations of the LLM seams.

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use luminos_common::{Issue, Photo};
use luminos_llm::util::truncate_to_char_boundary;
use luminos_llm::Claude;

use crate::traits::{IncidentJudge, PhotoAssessment, PhotoJudge};

/// Descriptions longer than this are cut before prompting.
const MAX_DESCRIPTION_BYTES: usize = 1_000;

const SAME_INCIDENT_SYSTEM: &str = "\
You compare two citizen reports submitted to a municipal issue tracker. \
Both were filed close together in place and time. Decide whether they \
describe the SAME real-world problem (one pothole, one garbage heap, one \
broken streetlight) or two different problems that happen to be nearby. \
Different wording for the same problem counts as the same incident. \
A different kind of problem is never the same incident.";

const PHOTO_SYSTEM: &str = "\
You review photos attached to citizen reports in a municipal issue tracker. \
Decide whether the photo plausibly shows the problem the citizen described. \
Be lenient about angle, lighting and framing; be strict about the kind of \
problem. Pick the single best category. Flag emergency only for danger to \
people: fire, collapse, live wires, flooding, a serious accident.";

#[derive(Debug, Deserialize, JsonSchema)]
struct SameIncidentAnswer {
    /// True if both reports describe the same real-world problem.
    same_incident: bool,
    /// One sentence explaining the decision.
    reason: String,
}

pub struct ClaudeIncidentJudge {
    claude: Claude,
}

impl ClaudeIncidentJudge {
    pub fn new(claude: Claude) -> Self {
        Self { claude }
    }
}

#[async_trait]
impl IncidentJudge for ClaudeIncidentJudge {
    async fn same_incident(&self, new: &Issue, existing: &Issue) -> Result<bool> {
        let gap_minutes = (new.created_at - existing.created_at).num_minutes().abs();
        let prompt = format!(
            "Report A (filed first):\n{}\n\nReport B (filed {} minutes later):\n{}",
            truncate_to_char_boundary(&existing.description, MAX_DESCRIPTION_BYTES),
            gap_minutes,
            truncate_to_char_boundary(&new.description, MAX_DESCRIPTION_BYTES),
        );

        let answer: SameIncidentAnswer = self.claude.extract(SAME_INCIDENT_SYSTEM, prompt).await?;
        debug!(
            new = %new.id,
            existing = %existing.id,
            same = answer.same_incident,
            reason = answer.reason.as_str(),
            "Incident judge answered"
        );
        Ok(answer.same_incident)
    }
}

pub struct ClaudePhotoJudge {
    claude: Claude,
}

impl ClaudePhotoJudge {
    pub fn new(claude: Claude) -> Self {
        Self { claude }
    }
}

#[async_trait]
impl PhotoJudge for ClaudePhotoJudge {
    async fn assess(&self, description: &str, photo: &Photo) -> Result<PhotoAssessment> {
        let prompt = format!(
            "The citizen wrote:\n{}\n\nDoes the attached photo show this problem?",
            truncate_to_char_boundary(description, MAX_DESCRIPTION_BYTES),
        );
        self.claude
            .extract_with_image(PHOTO_SYSTEM, &photo.bytes, &photo.mime_type, prompt)
            .await
    }
}
