mod common;

use common::{scoped, subaccount_path, tester, REGION, SUBACCOUNT};
use httpmock::prelude::*;
use sapcc_provider::testing::{assert_not_found, assert_plan_replaces};
use serde_json::{json, Value};

const TYPE: &str = "sapcc_system_mapping_resource";
// base64url("/sap/opu/odata")
const ENCODED_PATH: &str = "L3NhcC9vcHUvb2RhdGE=";

fn resource_path() -> String {
    subaccount_path(&format!(
        "/systemMappings/virtual.erp:44300/resources/{}",
        ENCODED_PATH
    ))
}

fn config() -> Value {
    scoped(json!({
        "virtual_host": "virtual.erp",
        "virtual_port": "44300",
        "url_path": "/sap/opu/odata",
        "enabled": true,
        "path_only": false,
        "description": "OData services"
    }))
}

fn api_resource(enabled: bool) -> Value {
    json!({
        "id": "/sap/opu/odata",
        "enabled": enabled,
        "exactMatchOnly": false,
        "websocketUpgradeAllowed": false,
        "description": "OData services",
        "creationDate": "1712000000000"
    })
}

#[tokio::test]
async fn test_create() {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(subaccount_path("/systemMappings/virtual.erp:44300/resources"))
                .json_body(json!({
                    "id": "/sap/opu/odata",
                    "enabled": true,
                    "exactMatchOnly": false,
                    "description": "OData services"
                }));
            then.status(201);
        })
        .await;
    let get = server
        .mock_async(|when, then| {
            when.method(GET).path(resource_path());
            then.status(200).json_body(api_resource(true));
        })
        .await;

    let state = tester(&server).lifecycle_create(TYPE, config()).await.unwrap();

    post.assert_async().await;
    assert_eq!(get.hits_async().await, 2);
    assert_eq!(state["url_path"], "/sap/opu/odata");
    assert_eq!(state["websocket_upgrade_allowed"], false);
    assert_eq!(state["creation_date"], "1712000000000");
}

#[tokio::test]
async fn test_disable() {
    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(resource_path())
                .json_body_partial(r#"{"id": "/sap/opu/odata", "enabled": false}"#);
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(resource_path());
            then.status(200).json_body(api_resource(false));
        })
        .await;

    let mut proposed = config();
    proposed["enabled"] = json!(false);
    let state = tester(&server)
        .lifecycle_update(TYPE, config(), proposed)
        .await
        .unwrap();

    put.assert_async().await;
    assert_eq!(state["enabled"], false);
}

#[tokio::test]
async fn test_path_change_replaces() {
    let server = MockServer::start_async().await;
    let mut proposed = config();
    proposed["url_path"] = json!("/sap/bc/rest");

    let plan = tester(&server).plan_update(TYPE, config(), proposed).await.unwrap();
    assert_plan_replaces(&plan);
}

#[tokio::test]
async fn test_import_delete_and_gone() {
    let server = MockServer::start_async().await;
    let mut get = server
        .mock_async(|when, then| {
            when.method(GET).path(resource_path());
            then.status(200).json_body(api_resource(true));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(resource_path());
            then.status(204);
        })
        .await;

    let tester = tester(&server);
    let id = format!("{},{},virtual.erp,44300,/sap/opu/odata", REGION, SUBACCOUNT);
    let state = tester.lifecycle_import(TYPE, &id).await.unwrap();
    assert_eq!(state["virtual_host"], "virtual.erp");

    tester.delete(TYPE, state.clone()).await.unwrap();
    delete.assert_async().await;

    get.delete_async().await;
    get = server
        .mock_async(|when, then| {
            when.method(GET).path(resource_path());
            then.status(404).body("Not Found");
        })
        .await;

    let result = tester.read(TYPE, state).await;
    assert_not_found(&result);
    get.assert_async().await;
}

#[tokio::test]
async fn test_import_path_with_comma() {
    let server = MockServer::start_async().await;
    let get = server
        .mock_async(|when, then| {
            // base64url("/sap/a,b")
            when.method(GET).path(subaccount_path(
                "/systemMappings/virtual.erp:44300/resources/L3NhcC9hLGI=",
            ));
            then.status(200).json_body(json!({"id": "/sap/a,b", "enabled": true}));
        })
        .await;

    let id = format!("{},{},virtual.erp,44300,/sap/a,b", REGION, SUBACCOUNT);
    let imported = tester(&server).import_resource(TYPE, &id).await.unwrap();

    get.assert_async().await;
    assert_eq!(imported[0].state["url_path"], "/sap/a,b");
}
