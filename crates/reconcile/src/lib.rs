mod pipeline;
mod store;
mod types;

pub use pipeline::{reconcile, record_job};
pub use store::RecordStore;
pub use types::{
    ReconcileError, ReconcileIssue, ReconcileReport, Result, SampleOutcome, SampleReport,
};
