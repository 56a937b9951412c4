use screentime_core::MergeDecision;
use serde::Serialize;

/// Per-sample outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOutcome {
    Inserted,
    Updated,
    Skipped,
}

impl From<MergeDecision> for SampleOutcome {
    fn from(decision: MergeDecision) -> Self {
        match decision {
            MergeDecision::Insert => Self::Inserted,
            MergeDecision::Update => Self::Updated,
            MergeDecision::Skip => Self::Skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleReport {
    pub hour: String,
    pub seconds: u64,
    pub outcome: SampleOutcome,
}

/// Non-fatal failures encountered while reconciling a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileIssue {
    pub hour: String,
    pub message: String,
}

/// Summary returned after reconciling one submission. The HTTP surface only
/// reports an aggregate success flag; this is for the caller's logs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub samples: Vec<SampleReport>,
    pub issues: Vec<ReconcileIssue>,
}

impl ReconcileReport {
    pub(crate) fn record(&mut self, hour: &str, seconds: u64, outcome: SampleOutcome) {
        match outcome {
            SampleOutcome::Inserted => self.inserted += 1,
            SampleOutcome::Updated => self.updated += 1,
            SampleOutcome::Skipped => self.skipped += 1,
        }
        self.samples.push(SampleReport {
            hour: hour.to_string(),
            seconds,
            outcome,
        });
    }
}

/// Submission-level failures. Per-sample store errors are not represented
/// here; they land in `ReconcileReport::issues`.
#[derive(Debug)]
pub enum ReconcileError {
    EmptyUser,
    Store(screentime_store::StoreError),
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUser => write!(f, "user identifier must not be empty"),
            Self::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for ReconcileError {}

impl From<screentime_store::StoreError> for ReconcileError {
    fn from(err: screentime_store::StoreError) -> Self {
        Self::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
