mod common;

use common::{AUTHORIZATION, REGION, SUBACCOUNT};
use httpmock::prelude::*;
use sapcc_provider::testing::{assert_error_contains, ProviderTester};
use sapcc_provider::{CloudConnectorProvider, ProviderService};
use serde_json::json;

#[tokio::test]
async fn test_configured_attributes_win_over_environment() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/configuration/subaccounts")
                .header("Authorization", AUTHORIZATION);
            then.status(200).json_body(json!([
                {"regionHost": REGION, "subaccount": SUBACCOUNT}
            ]));
        })
        .await;

    let provider = CloudConnectorProvider::with_env(|var| match var {
        "CC_INSTANCE_URL" => Some("https://unused.example.com:8443".to_string()),
        "CC_USERNAME" => Some("someone-else".to_string()),
        "CC_PASSWORD" => Some("manage".to_string()),
        _ => None,
    });
    let tester = ProviderTester::new(provider);
    tester
        .configure(json!({
            "instance_url": server.base_url(),
            "username": "Administrator"
        }))
        .await
        .unwrap();

    let value = tester
        .read_data_source("sapcc_subaccounts", json!({}))
        .await
        .unwrap();

    list.assert_async().await;
    assert_eq!(value["subaccounts"][0]["subaccount"], SUBACCOUNT);
}

#[tokio::test]
async fn test_configure_rejects_bad_url() {
    let provider = CloudConnectorProvider::with_env(|_| None);
    let diagnostics = provider
        .configure(json!({
            "instance_url": "ftp://scc.example.com",
            "username": "Administrator",
            "password": "manage"
        }))
        .await
        .unwrap();

    assert_error_contains(&diagnostics, "instance URL");
    assert!(!provider.is_configured().await);
}

#[tokio::test]
async fn test_empty_attribute_falls_back_to_environment() {
    let provider = CloudConnectorProvider::with_env(|var| match var {
        "CC_PASSWORD" => Some("manage".to_string()),
        _ => None,
    });
    let diagnostics = provider
        .configure(json!({
            "instance_url": "https://scc.example.com:8443",
            "username": "Administrator",
            "password": ""
        }))
        .await
        .unwrap();

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert!(provider.is_configured().await);
}

#[tokio::test]
async fn test_metadata_lists_every_type() {
    let tester = ProviderTester::new(CloudConnectorProvider::with_env(|_| None));

    let resources = tester.resource_types();
    assert_eq!(resources.len(), 6);
    assert!(resources.contains(&"sapcc_subaccount".to_string()));
    assert!(resources.contains(&"sapcc_subaccount_k8s_service_channel".to_string()));

    let data_sources = tester.data_source_types();
    assert_eq!(data_sources.len(), 12);
    assert!(data_sources.contains(&"sapcc_subaccount_k8s_service_channels".to_string()));
}
