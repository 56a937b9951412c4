use screentime_core::UsageRecord;
use screentime_store::{Collection, Store, StoreError};

/// The record-store operations the reconciler depends on. The store is an
/// external collaborator; this seam lets tests inject per-record failures.
pub trait RecordStore {
    fn resolve_collection(&self, name: &str) -> Result<Collection, StoreError>;
    fn find_usage_records(
        &mut self,
        user: &str,
        hour: &str,
        limit: u32,
    ) -> Result<Vec<UsageRecord>, StoreError>;
    fn create_usage_record(
        &mut self,
        user: &str,
        hour: &str,
        seconds: u64,
    ) -> Result<UsageRecord, StoreError>;
    fn save_usage_record(&mut self, record: &UsageRecord) -> Result<(), StoreError>;
    fn append_job_record(&mut self, user: &str) -> Result<(), StoreError>;
}

impl RecordStore for Store {
    fn resolve_collection(&self, name: &str) -> Result<Collection, StoreError> {
        Store::resolve_collection(self, name)
    }

    fn find_usage_records(
        &mut self,
        user: &str,
        hour: &str,
        limit: u32,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        Store::find_usage_records(self, user, hour, limit)
    }

    fn create_usage_record(
        &mut self,
        user: &str,
        hour: &str,
        seconds: u64,
    ) -> Result<UsageRecord, StoreError> {
        Store::create_usage_record(self, user, hour, seconds)
    }

    fn save_usage_record(&mut self, record: &UsageRecord) -> Result<(), StoreError> {
        Store::save_usage_record(self, record)
    }

    fn append_job_record(&mut self, user: &str) -> Result<(), StoreError> {
        Store::append_job_record(self, user).map(|_| ())
    }
}
