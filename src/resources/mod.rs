//! Managed resources.
//!
//! Each resource decodes the host's JSON state into its typed state struct,
//! performs its REST round trips and encodes the Cloud Connector's answer
//! back into state.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::RestClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

pub mod domain_mapping;
pub mod service_channel;
pub mod subaccount;
pub mod system_mapping;
pub mod system_mapping_resource;

/// CRUD handler for one resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `sapcc_subaccount`.
    fn type_name(&self) -> &'static str;

    /// Schema of the resource.
    fn schema(&self) -> Schema;

    /// Create the object and return its state.
    async fn create(&self, client: &RestClient, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh state from the API.
    async fn read(&self, client: &RestClient, current: Value) -> Result<Value, ProviderError>;

    /// Apply `planned` to an existing object and return its new state.
    async fn update(
        &self,
        client: &RestClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the object.
    async fn delete(&self, client: &RestClient, current: Value) -> Result<(), ProviderError>;

    /// Fetch an existing object by its import id.
    async fn import(&self, client: &RestClient, id: &str) -> Result<Value, ProviderError>;
}

/// Constructor registered with the provider.
pub type ResourceFactory = fn() -> Box<dyn Resource>;

/// Every resource this provider serves.
pub fn factories() -> Vec<ResourceFactory> {
    vec![
        subaccount::new,
        domain_mapping::new,
        system_mapping::new,
        system_mapping_resource::new,
        service_channel::new_k8s,
        service_channel::new_abap_cloud,
    ]
}

/// Decode host JSON into a typed state struct.
pub(crate) fn decode<T: DeserializeOwned>(type_name: &str, value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|e| {
        ProviderError::InvalidRequest(format!("malformed {} state: {}", type_name, e))
    })
}

/// Encode a typed state struct as host JSON.
pub(crate) fn encode<T: Serialize>(state: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(state)?)
}

/// Split a comma-separated import id into exactly `parts.len()` fields.
///
/// The last field takes the rest of the id, commas included.
pub(crate) fn split_import_id(id: &str, parts: &[&str]) -> Result<Vec<String>, ProviderError> {
    let fields: Vec<String> = id
        .splitn(parts.len(), ',')
        .map(|s| s.trim().to_string())
        .collect();
    if fields.len() != parts.len() || fields.iter().any(String::is_empty) {
        return Err(ProviderError::InvalidRequest(format!(
            "unexpected import id '{}', expected '{}'",
            id,
            parts.join(",")
        )));
    }
    Ok(fields)
}

/// Fail with a validation error when an attribute the API needs is unset.
pub(crate) fn required<T: Clone>(value: &Option<T>, attribute: &str) -> Result<T, ProviderError> {
    value
        .clone()
        .ok_or_else(|| ProviderError::Validation(format!("attribute '{}' must be set", attribute)))
}

/// Turn a 404 into [`ProviderError::NotFound`] naming the missing object.
pub(crate) fn not_found(err: ProviderError, what: impl Into<String>) -> ProviderError {
    if err.is_not_found() {
        ProviderError::NotFound(what.into())
    } else {
        err
    }
}

/// `region_host` and `subaccount`, shared by every subaccount-scoped schema.
pub(crate) fn subaccount_scope(schema: Schema) -> Schema {
    schema
        .with_attribute(
            "region_host",
            Attribute::required_string()
                .with_force_new()
                .with_description("Region host of the subaccount, e.g. cf.eu10.hana.ondemand.com."),
        )
        .with_attribute(
            "subaccount",
            Attribute::required_string()
                .with_force_new()
                .with_description("ID of the subaccount."),
        )
}
