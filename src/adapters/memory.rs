use crate::domain::model::{ClientRecord, NewCase, NewClient, StaffMember};
use crate::domain::ports::{CaseStore, ClientStore, StaffDirectory};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed staff snapshot. Backs the CLI dry-run mode and tests.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    staff: Vec<StaffMember>,
}

impl MemoryDirectory {
    pub fn new(staff: Vec<StaffMember>) -> Self {
        Self { staff }
    }
}

#[async_trait]
impl StaffDirectory for MemoryDirectory {
    async fn active_staff(&self, _firm_id: &str) -> Result<Vec<StaffMember>> {
        Ok(self.staff.clone())
    }
}

#[derive(Clone, Default)]
pub struct MemoryClientStore {
    clients: Arc<Mutex<Vec<ClientRecord>>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(clients: Vec<ClientRecord>) -> Self {
        Self {
            clients: Arc::new(Mutex::new(clients)),
        }
    }

    pub async fn clients(&self) -> Vec<ClientRecord> {
        self.clients.lock().await.clone()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_by_name(&self, _firm_id: &str, name: &str) -> Result<Option<ClientRecord>> {
        let clients = self.clients.lock().await;
        let wanted = name.to_lowercase();
        Ok(clients
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn create(&self, _firm_id: &str, client: NewClient) -> Result<ClientRecord> {
        let mut clients = self.clients.lock().await;
        let record = ClientRecord {
            id: format!("client-{}", clients.len() + 1),
            name: client.name,
            birth_date: client.birth_date,
        };
        clients.push(record.clone());
        Ok(record)
    }
}

#[derive(Clone, Default)]
pub struct MemoryCaseStore {
    cases: Arc<Mutex<Vec<NewCase>>>,
    calls: Arc<Mutex<usize>>,
    fail_on_call: Option<usize>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the n-th create call (1-based). Lets tests exercise per-row
    /// failure isolation without a real store.
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    pub async fn cases(&self) -> Vec<NewCase> {
        self.cases.lock().await.clone()
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn create(&self, _firm_id: &str, case: NewCase) -> Result<String> {
        let mut calls = self.calls.lock().await;
        *calls += 1;
        if self.fail_on_call == Some(*calls) {
            return Err(ImportError::StoreError {
                message: "create rejected by store".to_string(),
            });
        }

        let mut cases = self.cases.lock().await;
        cases.push(case);
        Ok(format!("case-{}", cases.len()))
    }
}
