mod common;

use common::{scoped, subaccount_path, tester, AUTHORIZATION, REGION, SUBACCOUNT};
use httpmock::prelude::*;
use sapcc_provider::testing::{
    assert_api_status, assert_not_found, assert_plan_changes_attribute, assert_plan_replaces,
};
use sapcc_provider::ProviderError;
use serde_json::{json, Value};

const TYPE: &str = "sapcc_subaccount";

fn config() -> Value {
    scoped(json!({
        "cloud_user": "admin@example.com",
        "cloud_password": "s3cret",
        "location_id": "DC1",
        "display_name": "Development",
        "description": "dev subaccount"
    }))
}

fn api_subaccount(tunnel_state: &str, display_name: &str) -> Value {
    json!({
        "regionHost": REGION,
        "subaccount": SUBACCOUNT,
        "locationID": "DC1",
        "displayName": display_name,
        "description": "dev subaccount",
        "tunnel": {
            "state": tunnel_state,
            "connectedSinceTimeStamp": 1712000000000i64,
            "connections": 0,
            "user": "admin@example.com",
            "subaccountCertificate": {
                "validTo": 1743000000000i64,
                "validFrom": 1712000000000i64,
                "subjectDN": "CN=0f7a4c3e,L=eu10",
                "issuer": "CN=SAP Cloud Platform Client CA",
                "serialNumber": "5f:1a"
            },
            "applicationConnections": [],
            "serviceChannels": []
        }
    })
}

#[tokio::test]
async fn test_create_connects_and_keeps_credentials() {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/configuration/subaccounts")
                .header("authorization", AUTHORIZATION)
                .json_body(json!({
                    "regionHost": REGION,
                    "subaccount": SUBACCOUNT,
                    "cloudUser": "admin@example.com",
                    "cloudPassword": "s3cret",
                    "locationID": "DC1",
                    "displayName": "Development",
                    "description": "dev subaccount"
                }));
            then.status(201);
        })
        .await;
    let get = server
        .mock_async(|when, then| {
            when.method(GET).path(subaccount_path(""));
            then.status(200).json_body(api_subaccount("Connected", "Development"));
        })
        .await;

    let state = tester(&server).lifecycle_create(TYPE, config()).await.unwrap();

    post.assert_async().await;
    // Read-back after create plus the harness read.
    assert_eq!(get.hits_async().await, 2);
    assert_eq!(state["connected"], true);
    assert_eq!(state["cloud_password"], "s3cret");
    assert_eq!(state["tunnel"]["state"], "Connected");
    assert_eq!(state["tunnel"]["subaccount_certificate"]["subject_dn"], "CN=0f7a4c3e,L=eu10");
}

#[tokio::test]
async fn test_create_disconnected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/configuration/subaccounts");
            then.status(201);
        })
        .await;
    let state_put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(subaccount_path("/state"))
                .json_body(json!({"connected": false}));
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(subaccount_path(""));
            then.status(200).json_body(api_subaccount("Disconnected", "Development"));
        })
        .await;

    let mut config = config();
    config["connected"] = json!(false);
    let state = tester(&server).create(TYPE, config).await.unwrap();

    state_put.assert_async().await;
    assert_eq!(state["connected"], false);
}

#[tokio::test]
async fn test_update_changes_display_name_and_tunnel_state() {
    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(subaccount_path(""))
                .json_body(json!({
                    "locationID": "DC1",
                    "displayName": "Development (EU)",
                    "description": "dev subaccount"
                }));
            then.status(200);
        })
        .await;
    let state_put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(subaccount_path("/state"))
                .json_body(json!({"connected": false}));
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(subaccount_path(""));
            then.status(200).json_body(api_subaccount("Disconnected", "Development (EU)"));
        })
        .await;

    let mut prior = config();
    prior["connected"] = json!(true);
    let mut proposed = config();
    proposed["display_name"] = json!("Development (EU)");
    proposed["connected"] = json!(false);

    let state = tester(&server)
        .lifecycle_update(TYPE, prior, proposed)
        .await
        .unwrap();

    put.assert_async().await;
    state_put.assert_async().await;
    assert_eq!(state["display_name"], "Development (EU)");
    assert_eq!(state["connected"], false);
    assert_eq!(state["cloud_user"], "admin@example.com");
}

#[tokio::test]
async fn test_changing_subaccount_requires_replace() {
    let server = MockServer::start_async().await;
    let mut proposed = config();
    proposed["subaccount"] = json!("another");

    let plan = tester(&server)
        .plan_update(TYPE, config(), proposed)
        .await
        .unwrap();
    assert_plan_replaces(&plan);
}

#[tokio::test]
async fn test_changing_credentials_requires_replace() {
    let server = MockServer::start_async().await;
    let mut proposed = config();
    proposed["cloud_password"] = json!("rotated");

    let plan = tester(&server)
        .plan_update(TYPE, config(), proposed)
        .await
        .unwrap();
    assert_plan_replaces(&plan);
    assert_plan_changes_attribute(&plan, "cloud_password");
}

#[tokio::test]
async fn test_credentials_after_import_update_in_place() {
    let server = MockServer::start_async().await;
    let mut imported = config();
    imported["cloud_user"] = Value::Null;
    imported["cloud_password"] = Value::Null;

    let plan = tester(&server)
        .plan_update(TYPE, imported, config())
        .await
        .unwrap();
    assert!(!plan.requires_replace);
    assert_eq!(plan.planned_state["cloud_password"], "s3cret");
}

#[tokio::test]
async fn test_failed_disconnect_removes_new_subaccount() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/configuration/subaccounts");
            then.status(201);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path(subaccount_path("/state"));
            then.status(500).json_body(json!({"type": "INTERNAL", "message": "boom"}));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(subaccount_path(""));
            then.status(204);
        })
        .await;

    let mut config = config();
    config["connected"] = json!(false);
    let result = tester(&server).create(TYPE, config).await;

    assert_api_status(&result, 500);
    delete.assert_async().await;
}

#[tokio::test]
async fn test_delete() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(subaccount_path(""));
            then.status(204);
        })
        .await;

    tester(&server).lifecycle_delete(TYPE, config()).await.unwrap();
    delete.assert_async().await;
}

#[tokio::test]
async fn test_read_missing_subaccount() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(subaccount_path(""));
            then.status(404).json_body(json!({
                "type": "NOT_FOUND",
                "message": "Subaccount does not exist"
            }));
        })
        .await;

    let result = tester(&server).read(TYPE, config()).await;
    assert_not_found(&result);
}

#[tokio::test]
async fn test_create_conflict_becomes_diagnostic() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/configuration/subaccounts");
            then.status(409).json_body(json!({
                "type": "ALREADY_EXISTS",
                "message": "Subaccount already configured"
            }));
        })
        .await;

    let result = tester(&server).create(TYPE, config()).await;
    assert_api_status(&result, 409);

    let diagnostic = result.unwrap_err().to_diagnostic();
    assert_eq!(diagnostic.summary, "ALREADY_EXISTS");
    assert_eq!(diagnostic.detail.as_deref(), Some("HTTP 409: Subaccount already configured"));
}

#[tokio::test]
async fn test_import() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(subaccount_path(""));
            then.status(200).json_body(api_subaccount("Connected", "Development"));
        })
        .await;

    let id = format!("{},{}", REGION, SUBACCOUNT);
    let state = tester(&server).lifecycle_import(TYPE, &id).await.unwrap();
    assert_eq!(state["subaccount"], SUBACCOUNT);
    assert_eq!(state["display_name"], "Development");
    assert_eq!(state["cloud_password"], Value::Null);

    let err = tester(&server).import_resource(TYPE, REGION).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}
