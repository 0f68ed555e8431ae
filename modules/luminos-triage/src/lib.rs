pub mod approvals;
pub mod collection;
pub mod judge;
pub mod lifecycle;
pub mod rewards;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod validation;

pub use collection::{CollectionEngine, RebuildStats};
pub use store::MemoryIssueStore;
pub use traits::{IncidentJudge, IssueStore, PhotoAssessment, PhotoJudge};
pub use validation::ReportValidator;
