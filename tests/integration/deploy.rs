//! Integration tests for the deploy workflow

use super::*;
use integrations_drive_deploy::{
    AccessToken, BestEffort, DeployOutcome, DeployRequest, DeployStage, DriveDeployClient,
    DriveError, PreviousVersion,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> AccessToken {
    AccessToken::bearer("tok")
}

fn request(dir: &TempDir) -> DeployRequest {
    DeployRequest::new("mydoc", "v2", "temp-folder", "final-folder", dir.path())
}

async fn mount_existing(server: &MockServer, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param(
            "q",
            "'final-folder' in parents and name='mydoc.pdf' and trashed=false",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_final_move(server: &MockServer, id: &str) {
    Mock::given(method("PATCH"))
        .and(path(format!("/drive/v3/files/{}", id)))
        .and(query_param("addParents", "final-folder"))
        .and(query_param("removeParents", "temp-folder"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": id, "parents": ["final-folder"] })),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn deploy(client: &DriveDeployClient, dir: &TempDir) -> Result<DeployOutcome, DriveError> {
    client.deploy().deploy_pdf(&token(), &request(dir)).await
}

#[tokio::test]
async fn test_first_deploy() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(&server, json!([])).await;
    mount_upload(&server, "new-file-id").await;
    mount_final_move(&server, "new-file-id").await;

    let outcome = deploy(&mock_client(&server), &dir).await.unwrap();

    assert_eq!(outcome.file_id(), "new-file-id");
    assert_eq!(
        recorded_calls(&server).await,
        vec![
            ("GET".to_string(), "/drive/v3/files".to_string()),
            ("POST".to_string(), "/upload/drive/v3/files".to_string()),
            ("PATCH".to_string(), "/drive/v3/files/new-file-id".to_string()),
        ]
    );

    let requests = server.received_requests().await.unwrap();
    let upload_body = String::from_utf8_lossy(&requests[1].body);
    assert!(upload_body.contains(r#""name":"mydoc.pdf""#));
    assert!(upload_body.contains(r#""parents":["temp-folder"]"#));
    assert!(upload_body.contains(r#""description":"v2""#));
}

#[tokio::test]
async fn test_same_version_is_noop() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(
        &server,
        json!([{"id": "live-id", "name": "mydoc.pdf", "description": "v2"}]),
    )
    .await;

    let client = DriveDeployClient::new(mock_config(&server, true)).unwrap();
    let outcome = deploy(&client, &dir).await.unwrap();

    assert!(matches!(outcome, DeployOutcome::AlreadyDeployed { ref file_id } if file_id == "live-id"));
    assert_eq!(recorded_methods(&server).await, vec!["GET"]);
}

#[tokio::test]
async fn test_replace_without_archive_deletes() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(
        &server,
        json!([{"id": "oldid", "name": "mydoc.pdf", "description": "v1"}]),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/oldid"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_upload(&server, "newid").await;
    mount_final_move(&server, "newid").await;

    let outcome = deploy(&mock_client(&server), &dir).await.unwrap();

    assert_eq!(
        recorded_methods(&server).await,
        vec!["GET", "DELETE", "POST", "PATCH"]
    );
    match outcome {
        DeployOutcome::Deployed { file_id, previous, .. } => {
            assert_eq!(file_id, "newid");
            assert_eq!(
                previous,
                PreviousVersion::Deleted {
                    file_id: "oldid".to_string()
                }
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_replace_with_archive() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(
        &server,
        json!([{"id": "oldid", "name": "mydoc.pdf", "description": "v1"}]),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/oldid"))
        .and(body_json(json!({"name": "mydoc-v1.pdf"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "oldid"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/oldid"))
        .and(query_param("addParents", "archive-folder"))
        .and(query_param("removeParents", "final-folder"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "oldid", "parents": ["archive-folder"]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_upload(&server, "newid").await;
    mount_final_move(&server, "newid").await;

    let request = request(&dir).with_archive_folder("archive-folder");
    let outcome = mock_client(&server)
        .deploy()
        .deploy_pdf(&token(), &request)
        .await
        .unwrap();

    assert_eq!(
        recorded_calls(&server).await,
        vec![
            ("GET".to_string(), "/drive/v3/files".to_string()),
            ("PATCH".to_string(), "/drive/v3/files/oldid".to_string()),
            ("PATCH".to_string(), "/drive/v3/files/oldid".to_string()),
            ("POST".to_string(), "/upload/drive/v3/files".to_string()),
            ("PATCH".to_string(), "/drive/v3/files/newid".to_string()),
        ]
    );
    match outcome {
        DeployOutcome::Deployed { previous, .. } => assert_eq!(
            previous,
            PreviousVersion::Archived {
                file_id: "oldid".to_string(),
                archived_name: "mydoc-v1.pdf".to_string(),
            }
        ),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_sharing_restriction_applied() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(&server, json!([])).await;
    mount_upload(&server, "newid").await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/newid"))
        .and(body_json(json!({
            "copyRequiresWriterPermission": true,
            "writersCanShare": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "newid"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_final_move(&server, "newid").await;

    let client = DriveDeployClient::new(mock_config(&server, true)).unwrap();
    let outcome = deploy(&client, &dir).await.unwrap();

    assert_eq!(
        recorded_methods(&server).await,
        vec!["GET", "POST", "PATCH", "PATCH"]
    );
    match outcome {
        DeployOutcome::Deployed { sharing, .. } => assert!(sharing.is_applied()),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_sharing_failure_still_deploys() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(&server, json!([])).await;
    mount_upload(&server, "newid").await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/newid"))
        .and(body_json(json!({
            "copyRequiresWriterPermission": true,
            "writersCanShare": false
        })))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficientFilePermissions"))
        .mount(&server)
        .await;
    mount_final_move(&server, "newid").await;

    let client = DriveDeployClient::new(mock_config(&server, true)).unwrap();
    let outcome = deploy(&client, &dir).await.unwrap();

    match outcome {
        DeployOutcome::Deployed { file_id, sharing, .. } => {
            assert_eq!(file_id, "newid");
            assert!(matches!(sharing, BestEffort::Failed(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_final_move_reports_orphan() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    mount_existing(&server, json!([])).await;
    mount_upload(&server, "newid").await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/newid"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backendError"))
        .expect(1)
        .mount(&server)
        .await;

    let err = deploy(&mock_client(&server), &dir).await.unwrap_err();

    assert_eq!(err.stage(), Some(DeployStage::MoveToFinal));
    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(500));
    match err {
        DriveError::Orphaned {
            file_id,
            temp_folder_id,
            ..
        } => {
            assert_eq!(file_id, "newid");
            assert_eq!(temp_folder_id, "temp-folder");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_failed_query_stops_deploy() {
    let server = setup_mock_server().await;
    let (dir, _) = pdf_fixture("mydoc.pdf");

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rateLimitExceeded"))
        .mount(&server)
        .await;

    let err = deploy(&mock_client(&server), &dir).await.unwrap_err();

    assert_eq!(err.stage(), Some(DeployStage::Query));
    assert!(err.to_string().starts_with("query for existing file failed"));
    assert_eq!(recorded_methods(&server).await, vec!["GET"]);
}

#[tokio::test]
async fn test_missing_pdf_sends_nothing() {
    let server = setup_mock_server().await;
    let dir = tempfile::tempdir().unwrap();

    let err = deploy(&mock_client(&server), &dir).await.unwrap_err();

    assert!(err.is_validation());
    assert!(recorded_calls(&server).await.is_empty());
}
