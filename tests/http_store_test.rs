use anyhow::Result;
use caseload_etl::adapters::http::HttpStore;
use caseload_etl::config::profile::FirmProfile;
use caseload_etl::utils::validation::Validate;
use caseload_etl::ImportEngine;
use httpmock::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_import_against_rest_store() -> Result<()> {
    let server = MockServer::start();

    let staff_mock = server.mock(|when, then| {
        when.method(GET).path("/firms/smith-legal/staff");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"id": "s1", "name": "John Lamb", "role": "lawyer"}
            ]));
    });

    let lookup_mock = server.mock(|when, then| {
        when.method(GET).path("/firms/smith-legal/clients");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });

    let client_create_mock = server.mock(|when, then| {
        when.method(POST).path("/firms/smith-legal/clients");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!(
                {"id": "c9", "name": "Nguyen Lan", "birth_date": null}
            ));
    });

    let case_create_mock = server.mock(|when, then| {
        when.method(POST).path("/firms/smith-legal/cases");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": "case-1"}));
    });

    let store = HttpStore::new(&server.base_url())?;
    let engine = ImportEngine::new(store.clone(), store.clone(), store);

    let text = "Client Name,Assigned Lawyer,Date of Loss\nNguyen Lan,J. Lamb,17-Jul-16\n";
    let run = engine.run("smith-legal", text).await?;

    assert_eq!(run.result.succeeded, 1);
    assert_eq!(run.result.failed, 0);
    assert!(run.result.unmatched_names.is_empty());

    staff_mock.assert();
    lookup_mock.assert();
    client_create_mock.assert();
    case_create_mock.assert();

    Ok(())
}

#[tokio::test]
async fn test_profile_store_url_and_synonyms_drive_the_run() -> Result<()> {
    let server = MockServer::start();
    std::env::set_var("CASELOAD_TEST_STORE", server.base_url());

    // 事務所設定檔:store 位址從環境變數代入,欄名拼法是該所自己的
    let mut profile_file = NamedTempFile::new()?;
    profile_file.write_all(
        br#"
[firm]
id = "smith-legal"

[store]
base_url = "${CASELOAD_TEST_STORE}"

[synonyms]
client_name = ["Insured"]
assigned_to = ["Handled By"]
date_of_loss = ["Incident Date"]
"#,
    )?;

    let profile = FirmProfile::from_file(profile_file.path())?;
    profile.validate()?;

    server.mock(|when, then| {
        when.method(GET).path("/firms/smith-legal/staff");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"id": "s1", "name": "John Lamb", "role": "lawyer"}
            ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/firms/smith-legal/clients");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/firms/smith-legal/clients");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!(
                {"id": "c1", "name": "Osei Kwame", "birth_date": null}
            ));
    });
    let case_create_mock = server.mock(|when, then| {
        when.method(POST).path("/firms/smith-legal/cases");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": "case-1"}));
    });

    let store = HttpStore::new(profile.store_url().unwrap())?;
    let engine = ImportEngine::new(store.clone(), store.clone(), store)
        .with_options(profile.import_options());

    let text = "Insured,Handled By,Incident Date\nOsei Kwame,J. Lamb,17-Jul-16\n";
    let run = engine.run(&profile.firm.id, text).await?;

    assert_eq!(run.result.succeeded, 1);
    assert!(run.rejected.is_empty());
    case_create_mock.assert();

    std::env::remove_var("CASELOAD_TEST_STORE");
    Ok(())
}

#[tokio::test]
async fn test_staff_directory_outage_fails_the_whole_run() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/firms/smith-legal/staff");
        then.status(500);
    });

    let store = HttpStore::new(&server.base_url())?;
    let engine = ImportEngine::new(store.clone(), store.clone(), store);

    let text = "Client Name,Date of Loss\nNguyen Lan,17-Jul-16\n";
    let result = engine.run("smith-legal", text).await;

    // 拿不到員工名單就不該開始逐列寫入
    assert!(result.is_err());
    Ok(())
}
