//! Shared fixtures for the acceptance tests.
//!
//! Each test starts an httpmock server that replays Cloud Connector
//! responses and drives the provider against it through `ProviderTester`.

#![allow(dead_code)]

use httpmock::MockServer;
use sapcc_provider::testing::ProviderTester;
use sapcc_provider::CloudConnectorProvider;
use serde_json::{json, Value};

pub const REGION: &str = "cf.eu10.hana.ondemand.com";
pub const SUBACCOUNT: &str = "0f7a4c3e-3c52-4b1a-9d2e-5d1f0b6a7c11";

/// `Basic` header for the harness credentials.
pub const AUTHORIZATION: &str = "Basic QWRtaW5pc3RyYXRvcjptYW5hZ2U=";

pub fn tester(server: &MockServer) -> ProviderTester<CloudConnectorProvider> {
    let _ = sapcc_provider::try_init_logging();
    ProviderTester::connected(&server.base_url()).expect("mock server URL is valid")
}

/// `/api/v1/configuration/subaccounts/{REGION}/{SUBACCOUNT}` followed by `suffix`.
pub fn subaccount_path(suffix: &str) -> String {
    format!(
        "/api/v1/configuration/subaccounts/{}/{}{}",
        REGION, SUBACCOUNT, suffix
    )
}

/// `region_host` and `subaccount` merged into `attributes`.
pub fn scoped(attributes: Value) -> Value {
    let mut value = json!({"region_host": REGION, "subaccount": SUBACCOUNT});
    if let (Value::Object(target), Value::Object(extra)) = (&mut value, attributes) {
        target.extend(extra);
    }
    value
}
