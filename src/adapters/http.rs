use crate::domain::model::{ClientRecord, NewCase, NewClient, StaffMember};
use crate::domain::ports::{CaseStore, ClientStore, StaffDirectory};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Practice-management REST adapter. One base URL backs all three ports;
/// every path is scoped by firm id.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Result<Self> {
        crate::utils::validation::validate_url("store.base_url", base_url)?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Deserialize)]
struct CreatedCase {
    id: String,
}

#[async_trait]
impl StaffDirectory for HttpStore {
    async fn active_staff(&self, firm_id: &str) -> Result<Vec<StaffMember>> {
        let url = self.endpoint(&format!("/firms/{}/staff", firm_id));
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ImportError::StoreError {
                message: format!("staff directory returned {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ClientStore for HttpStore {
    async fn find_by_name(&self, firm_id: &str, name: &str) -> Result<Option<ClientRecord>> {
        let url = self.endpoint(&format!("/firms/{}/clients", firm_id));
        debug!("GET {} (name lookup)", url);

        let response = self.client.get(&url).query(&[("name", name)]).send().await?;
        if !response.status().is_success() {
            return Err(ImportError::StoreError {
                message: format!("client lookup returned {}", response.status()),
            });
        }

        let matches: Vec<ClientRecord> = response.json().await?;
        Ok(matches.into_iter().next())
    }

    async fn create(&self, firm_id: &str, client: NewClient) -> Result<ClientRecord> {
        let url = self.endpoint(&format!("/firms/{}/clients", firm_id));
        debug!("POST {}", url);

        let response = self.client.post(&url).json(&client).send().await?;
        if !response.status().is_success() {
            return Err(ImportError::StoreError {
                message: format!("client create returned {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CaseStore for HttpStore {
    async fn create(&self, firm_id: &str, case: NewCase) -> Result<String> {
        let url = self.endpoint(&format!("/firms/{}/cases", firm_id));
        debug!("POST {}", url);

        let response = self.client.post(&url).json(&case).send().await?;
        if !response.status().is_success() {
            return Err(ImportError::StoreError {
                message: format!("case create returned {}", response.status()),
            });
        }

        let created: CreatedCase = response.json().await?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    #[test]
    fn test_new_rejects_invalid_base_url() {
        assert!(HttpStore::new("not-a-url").is_err());
        assert!(HttpStore::new("ftp://cases.example.com").is_err());
    }

    #[tokio::test]
    async fn test_active_staff() {
        let server = MockServer::start();
        let staff_mock = server.mock(|when, then| {
            when.method(GET).path("/firms/firm-1/staff");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": "s1", "name": "John Lamb", "role": "lawyer"},
                    {"id": "s2", "name": "Mary Park", "role": "benefits_coordinator"}
                ]));
        });

        let store = HttpStore::new(&server.base_url()).unwrap();
        let staff = store.active_staff("firm-1").await.unwrap();

        staff_mock.assert();
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[0].id, "s1");
        assert_eq!(staff[1].name, "Mary Park");
    }

    #[tokio::test]
    async fn test_find_by_name_sends_query_and_takes_first_match() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/firms/firm-1/clients")
                .query_param("name", "Smith, John");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": "c1", "name": "Smith, John", "birth_date": "1996-07-17"}
                ]));
        });

        let store = HttpStore::new(&server.base_url()).unwrap();
        let found = store.find_by_name("firm-1", "Smith, John").await.unwrap();

        lookup_mock.assert();
        let found = found.unwrap();
        assert_eq!(found.id, "c1");
        assert_eq!(
            found.birth_date,
            Some(NaiveDate::from_ymd_opt(1996, 7, 17).unwrap())
        );
    }

    #[tokio::test]
    async fn test_find_by_name_empty_result_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/firms/firm-1/clients");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });

        let store = HttpStore::new(&server.base_url()).unwrap();
        let found = store.find_by_name("firm-1", "Nobody").await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_case_returns_new_id() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/firms/firm-1/cases");
            then.status(201)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "case-9"}));
        });

        let store = HttpStore::new(&server.base_url()).unwrap();
        let case = NewCase {
            client_id: "c1".to_string(),
            staff_id: Some("s1".to_string()),
            file_number: Some("AB123".to_string()),
            date_of_loss: NaiveDate::from_ymd_opt(2014, 2, 6).unwrap(),
            limitation_date: NaiveDate::from_ymd_opt(2016, 2, 6).unwrap(),
            insurance_company: None,
            policy_number: None,
            claim_number: None,
            adjuster: None,
            status: None,
            benefit_type: None,
            notes: Vec::new(),
        };

        // HttpStore 同時實作 ClientStore 與 CaseStore,呼叫時要指名 trait
        let id = CaseStore::create(&store, "firm-1", case).await.unwrap();

        create_mock.assert();
        assert_eq!(id, "case-9");
    }

    #[tokio::test]
    async fn test_server_error_surfaces_as_store_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/firms/firm-1/staff");
            then.status(500);
        });

        let store = HttpStore::new(&server.base_url()).unwrap();
        let result = store.active_staff("firm-1").await;

        assert!(matches!(result, Err(ImportError::StoreError { .. })));
    }
}
