use screentime_core::{MergeDecision, UsageSample, merge_decision};
use screentime_store::{JOBS_COLLECTION, StoreError, USAGE_COLLECTION};

use crate::store::RecordStore;
use crate::types::{ReconcileError, ReconcileIssue, ReconcileReport, Result, SampleOutcome};

/// Bound on the exact-match query. One row is expected; anything past the
/// first signals a uniqueness violation from racing submissions.
const MATCH_LIMIT: u32 = 5;

/// Applies a batch of hourly samples to the usage ledger, one sample at a
/// time in batch order. A store failure on a single sample is recorded and
/// the batch continues; only an empty user id or an unresolvable collection
/// aborts the submission.
pub fn reconcile<S: RecordStore>(
    store: &mut S,
    user: &str,
    samples: &[UsageSample],
) -> Result<ReconcileReport> {
    let user = user.trim();
    if user.is_empty() {
        return Err(ReconcileError::EmptyUser);
    }
    store.resolve_collection(USAGE_COLLECTION)?;

    let mut report = ReconcileReport::default();
    for sample in samples {
        match apply_sample(store, user, sample) {
            Ok(outcome) => report.record(&sample.hour, sample.seconds, outcome),
            Err(err) => {
                log::warn!(
                    "sample failed for user={} hour={}: {}",
                    user,
                    sample.hour,
                    err
                );
                report.issues.push(ReconcileIssue {
                    hour: sample.hour.clone(),
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn apply_sample<S: RecordStore>(
    store: &mut S,
    user: &str,
    sample: &UsageSample,
) -> std::result::Result<SampleOutcome, StoreError> {
    let matches = store.find_usage_records(user, &sample.hour, MATCH_LIMIT)?;
    if matches.len() > 1 {
        log::warn!(
            "{} usage records for user={} hour={}; expected at most one",
            matches.len(),
            user,
            sample.hour
        );
    }
    let existing = matches.into_iter().next();
    let decision = merge_decision(existing.as_ref().map(|record| record.seconds), sample.seconds);
    match (decision, existing) {
        (MergeDecision::Update, Some(mut record)) => {
            record.seconds = sample.seconds;
            store.save_usage_record(&record)?;
            log::debug!(
                "updated user={} hour={} seconds={}",
                user,
                sample.hour,
                sample.seconds
            );
        }
        (MergeDecision::Insert, _) | (MergeDecision::Update, None) => {
            store.create_usage_record(user, &sample.hour, sample.seconds)?;
            log::debug!(
                "inserted user={} hour={} seconds={}",
                user,
                sample.hour,
                sample.seconds
            );
        }
        (MergeDecision::Skip, _) => {
            log::debug!(
                "skipped user={} hour={}: stored value >= {}",
                user,
                sample.hour,
                sample.seconds
            );
        }
    }
    Ok(SampleOutcome::from(decision))
}

/// Appends one audit job record for a submission. Best-effort: the caller
/// logs a failure and never lets it block the reconciliation result.
pub fn record_job<S: RecordStore>(store: &mut S, user: &str) -> std::result::Result<(), StoreError> {
    store.resolve_collection(JOBS_COLLECTION)?;
    store.append_job_record(user)
}
