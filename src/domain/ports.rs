use crate::domain::model::{ClientRecord, NewCase, NewClient, StaffMember};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Snapshot of the firm's active staff. The engine reads this once per
    /// run; directory writes made while an import is in flight are not seen.
    async fn active_staff(&self, firm_id: &str) -> Result<Vec<StaffMember>>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Case-insensitive exact lookup on the full client name.
    async fn find_by_name(&self, firm_id: &str, name: &str) -> Result<Option<ClientRecord>>;

    async fn create(&self, firm_id: &str, client: NewClient) -> Result<ClientRecord>;
}

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Returns the opaque id of the created case.
    async fn create(&self, firm_id: &str, case: NewCase) -> Result<String>;
}

/// Called with (rows done, total, percent, current client name).
pub type ProgressCallback = dyn Fn(usize, usize, u8, &str) + Send + Sync;
