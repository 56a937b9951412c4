use serde::{Deserialize, Serialize};

/// One hourly usage sample as submitted by a device. Not persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSample {
    pub hour: String,
    pub seconds: u64,
}

/// Persisted ledger row. At most one row exists per (user, hour) pair and
/// `seconds` never decreases across writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: i64,
    pub user: String,
    pub hour: String,
    pub seconds: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Audit row appended once per upload submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    pub user: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

/// What to do with an incoming sample given the currently stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeDecision {
    Insert,
    Update,
    Skip,
}

/// Monotonic merge rule: a stored value is replaced only by a strictly
/// larger incoming value. Re-applying the same or an older sample is a
/// no-op, which makes re-submission idempotent regardless of arrival order.
pub fn merge_decision(existing: Option<u64>, incoming: u64) -> MergeDecision {
    match existing {
        None => MergeDecision::Insert,
        Some(stored) if incoming > stored => MergeDecision::Update,
        Some(_) => MergeDecision::Skip,
    }
}
