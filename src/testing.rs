//! Test harness for driving the provider the way the host does.
//!
//! [`ProviderTester`] wraps any [`ProviderService`] and offers the host's
//! call sequences (plan then create then read, and so on) as single calls.
//! Pointed at a mock Cloud Connector it doubles as an acceptance test driver.
//!
//! # Example
//!
//! ```ignore
//! use sapcc_provider::testing::ProviderTester;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_domain_mapping() {
//!     let server = httpmock::MockServer::start_async().await;
//!     // ... register mocks ...
//!     let tester = ProviderTester::connected(&server.base_url()).unwrap();
//!     let state = tester
//!         .lifecycle_create("sapcc_domain_mapping", json!({
//!             "region_host": "cf.eu10.hana.ondemand.com",
//!             "subaccount": "abc",
//!             "virtual_domain": "cloud.example.com",
//!             "internal_domain": "intern.corp"
//!         }))
//!         .await
//!         .unwrap();
//!     assert_eq!(state["virtual_domain"], "cloud.example.com");
//! }
//! ```

use std::fmt;

use serde_json::Value;

use crate::client::RestClient;
use crate::error::ProviderError;
use crate::provider::CloudConnectorProvider;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// User name the harness sends to mock servers.
pub const TEST_USERNAME: &str = "Administrator";
/// Password the harness sends to mock servers.
pub const TEST_PASSWORD: &str = "manage";

/// Drives a [`ProviderService`] without a host.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl ProviderTester<CloudConnectorProvider> {
    /// A configured Cloud Connector provider talking to `instance_url`
    /// with [`TEST_USERNAME`] and [`TEST_PASSWORD`].
    pub fn connected(instance_url: &str) -> Result<Self, ProviderError> {
        let client = RestClient::new(instance_url, TEST_USERNAME, TEST_PASSWORD)?;
        Ok(Self::new(CloudConnectorProvider::with_client(client)))
    }
}

impl<P: ProviderService> ProviderTester<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a create (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan an update of `prior_state` to `proposed_state`.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a destroy.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// plan → create → read. Returns the state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// plan → update → read. Returns the state after read.
    ///
    /// Fails with [`ProviderError::Validation`] when the plan requires
    /// replacement, since the host would destroy and recreate instead.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        if plan.requires_replace {
            return Err(ProviderError::Validation(format!(
                "{} update requires replacement",
                resource_type
            )));
        }
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    /// plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone()).await?;
        self.delete(resource_type, current_state).await
    }

    /// import → read. Returns the state after read.
    pub async fn lifecycle_import(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Value, ProviderError> {
        let imported = self.import_resource(resource_type, id).await?;
        let state = imported
            .into_iter()
            .next()
            .map(|r| r.state)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
        self.read(resource_type, state).await
    }

    /// create → update → delete. Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// Failure of a harness call that reports diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// Error diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// A provider error.
    Provider(ProviderError),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan creates without replacing.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        plan.has_changes() && !plan.requires_replace,
        "Expected an in-place update, got {} change(s) with requires_replace={}",
        plan.changes.len(),
        plan.requires_replace
    );
}

/// Assert that the plan touches the attribute at `path`.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        !plan.changes.iter().any(|c| c.path == path),
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert an error diagnostic whose summary contains `substring`.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.summary.contains(substring)),
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

/// Assert that `result` failed because the object is gone.
pub fn assert_not_found<T: fmt::Debug>(result: &Result<T, ProviderError>) {
    match result {
        Err(err) if err.is_not_found() => {},
        other => panic!("Expected a not-found error, got {:?}", other),
    }
}

/// Assert that `result` failed with an API error of the given status.
pub fn assert_api_status<T: fmt::Debug>(result: &Result<T, ProviderError>, expected: u16) {
    match result {
        Err(ProviderError::Api { status, .. }) if *status == expected => {},
        other => panic!("Expected an API error with status {}, got {:?}", expected, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CloudConnectorProvider;
    use serde_json::json;

    fn tester() -> ProviderTester<CloudConnectorProvider> {
        ProviderTester::new(CloudConnectorProvider::with_env(|_| None))
    }

    fn domain_mapping() -> Value {
        json!({
            "region_host": "cf.eu10.hana.ondemand.com",
            "subaccount": "abc",
            "virtual_domain": "cloud.example.com",
            "internal_domain": "intern.corp"
        })
    }

    #[tokio::test]
    async fn test_configure_surfaces_diagnostics() {
        let err = tester().configure(json!({"username": "u"})).await.unwrap_err();
        match err {
            TestError::Diagnostics(diags) => {
                assert_error_contains(&diags, "instance URL");
                assert_error_contains(&diags, "password");
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_type_lists() {
        let tester = tester();
        assert!(tester.resource_types().contains(&"sapcc_subaccount".to_string()));
        assert!(tester
            .data_source_types()
            .contains(&"sapcc_subaccounts".to_string()));
    }

    #[tokio::test]
    async fn test_plan_helpers() {
        let tester = tester();
        let plan = tester
            .plan_create("sapcc_domain_mapping", domain_mapping())
            .await
            .unwrap();
        assert_plan_creates(&plan);
        assert_plan_changes_attribute(&plan, "internal_domain");

        let plan = tester
            .plan_update("sapcc_domain_mapping", domain_mapping(), domain_mapping())
            .await
            .unwrap();
        assert_plan_no_changes(&plan);

        let mut renamed = domain_mapping();
        renamed["virtual_domain"] = json!("cloud2.example.com");
        let plan = tester
            .plan_update("sapcc_domain_mapping", domain_mapping(), renamed)
            .await
            .unwrap();
        assert_plan_updates_in_place(&plan);
        assert_plan_does_not_change_attribute(&plan, "internal_domain");

        let plan = tester
            .plan_delete("sapcc_domain_mapping", domain_mapping())
            .await
            .unwrap();
        assert_eq!(plan.changes.len(), 4);
    }

    #[tokio::test]
    async fn test_validate_resource_config() {
        let tester = tester();
        assert!(tester
            .validate_resource_config("sapcc_domain_mapping", domain_mapping())
            .await
            .is_ok());

        let err = tester
            .validate_resource_config("sapcc_domain_mapping", json!({"region_host": "r"}))
            .await
            .unwrap_err();
        assert!(matches!(err, TestError::Diagnostics(_)));
    }

    #[test]
    fn test_assert_not_found() {
        assert_not_found::<()>(&Err(ProviderError::NotFound("gone".to_string())));
        assert_api_status::<()>(
            &Err(ProviderError::Api {
                status: 409,
                kind: "CONFLICT".to_string(),
                message: "exists".to_string(),
            }),
            409,
        );
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("Missing Cloud Connector username")]);
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing Cloud Connector password").with_attribute("password"),
            Diagnostic::error("Invalid Cloud Connector instance URL").with_detail("bad scheme"),
        ]);

        let display = err.to_string();
        assert!(display.contains("password"));
        assert!(display.contains("(at password)"));
        assert!(display.contains("bad scheme"));
    }
}
