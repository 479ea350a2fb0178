//! `sapcc_system_mapping_resource`: a URL path reachable through a system mapping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::system_mapping::virtual_address;
use super::{decode, encode, not_found, split_import_id, subaccount_scope, Resource};
use crate::api::SystemMappingResource;
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::{self, get_json, request_unit, Verb};
use crate::schema::{Attribute, Schema};

/// Resource type name.
pub const TYPE_NAME: &str = "sapcc_system_mapping_resource";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMappingResourceState {
    pub region_host: String,
    pub subaccount: String,
    pub virtual_host: String,
    pub virtual_port: String,
    pub url_path: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub path_only: Option<bool>,
    #[serde(default)]
    pub websocket_upgrade_allowed: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
}

impl SystemMappingResourceState {
    pub fn from_api(
        region_host: &str,
        subaccount: &str,
        virtual_host: &str,
        virtual_port: &str,
        api: SystemMappingResource,
    ) -> Self {
        Self {
            region_host: region_host.to_string(),
            subaccount: subaccount.to_string(),
            virtual_host: virtual_host.to_string(),
            virtual_port: virtual_port.to_string(),
            url_path: api.id,
            enabled: api.enabled,
            path_only: api.exact_match_only,
            websocket_upgrade_allowed: api.websocket_upgrade_allowed,
            description: api.description,
            creation_date: api.creation_date,
        }
    }

    fn to_api(&self) -> SystemMappingResource {
        SystemMappingResource {
            id: self.url_path.clone(),
            enabled: self.enabled,
            exact_match_only: self.path_only,
            websocket_upgrade_allowed: self.websocket_upgrade_allowed,
            description: self.description.clone(),
            creation_date: None,
        }
    }

    fn endpoint(&self) -> String {
        endpoints::system_mapping_resource(
            &self.region_host,
            &self.subaccount,
            &self.virtual_host,
            &self.virtual_port,
            &self.url_path,
        )
    }
}

/// Handler for [`TYPE_NAME`].
#[derive(Debug, Default)]
pub struct SystemMappingResourceHandler;

/// Registry constructor.
pub fn new() -> Box<dyn Resource> {
    Box::new(SystemMappingResourceHandler)
}

/// All resources of a system mapping.
pub(crate) async fn list(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
    virtual_host: &str,
    virtual_port: &str,
) -> Result<Vec<SystemMappingResource>, ProviderError> {
    get_json(
        client,
        &endpoints::system_mapping_resources(region_host, subaccount, virtual_host, virtual_port),
    )
    .await
    .map_err(|e| {
        not_found(
            e,
            format!("system mapping {}:{} in subaccount {}/{}", virtual_host, virtual_port, region_host, subaccount),
        )
    })
}

pub(crate) async fn fetch(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
    virtual_host: &str,
    virtual_port: &str,
    url_path: &str,
) -> Result<SystemMappingResource, ProviderError> {
    get_json(
        client,
        &endpoints::system_mapping_resource(region_host, subaccount, virtual_host, virtual_port, url_path),
    )
    .await
    .map_err(|e| {
        not_found(
            e,
            format!("resource '{}' of system mapping {}:{}", url_path, virtual_host, virtual_port),
        )
    })
}

async fn refresh(
    client: &RestClient,
    state: &SystemMappingResourceState,
) -> Result<Value, ProviderError> {
    let api = fetch(
        client,
        &state.region_host,
        &state.subaccount,
        &state.virtual_host,
        &state.virtual_port,
        &state.url_path,
    )
    .await?;
    encode(&SystemMappingResourceState::from_api(
        &state.region_host,
        &state.subaccount,
        &state.virtual_host,
        &state.virtual_port,
        api,
    ))
}

#[async_trait]
impl Resource for SystemMappingResourceHandler {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        virtual_address(subaccount_scope(Schema::v0()))
            .with_description("URL path of a system mapping that cloud applications may call.")
            .with_attribute(
                "url_path",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Path prefix of the exposed resource, e.g. /sap/opu/odata."),
            )
            .with_attribute(
                "enabled",
                Attribute::optional_computed_bool().with_description("Whether the resource is accessible."),
            )
            .with_attribute(
                "path_only",
                Attribute::optional_computed_bool()
                    .with_description("Expose only the exact path instead of everything below it."),
            )
            .with_attribute("websocket_upgrade_allowed", Attribute::optional_computed_bool())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("creation_date", Attribute::computed_string())
    }

    #[instrument(skip_all, name = "system_mapping_resource.create")]
    async fn create(&self, client: &RestClient, planned: Value) -> Result<Value, ProviderError> {
        let planned: SystemMappingResourceState = decode(TYPE_NAME, planned)?;
        info!(url_path = %planned.url_path, "Creating system mapping resource");

        request_unit(
            client,
            Verb::Post,
            &endpoints::system_mapping_resources(
                &planned.region_host,
                &planned.subaccount,
                &planned.virtual_host,
                &planned.virtual_port,
            ),
            Some(&planned.to_api()),
        )
        .await?;

        refresh(client, &planned).await
    }

    #[instrument(skip_all, name = "system_mapping_resource.read")]
    async fn read(&self, client: &RestClient, current: Value) -> Result<Value, ProviderError> {
        let current: SystemMappingResourceState = decode(TYPE_NAME, current)?;
        refresh(client, &current).await
    }

    #[instrument(skip_all, name = "system_mapping_resource.update")]
    async fn update(
        &self,
        client: &RestClient,
        _prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let planned: SystemMappingResourceState = decode(TYPE_NAME, planned)?;
        request_unit(client, Verb::Put, &planned.endpoint(), Some(&planned.to_api())).await?;
        refresh(client, &planned).await
    }

    #[instrument(skip_all, name = "system_mapping_resource.delete")]
    async fn delete(&self, client: &RestClient, current: Value) -> Result<(), ProviderError> {
        let current: SystemMappingResourceState = decode(TYPE_NAME, current)?;
        info!(url_path = %current.url_path, "Deleting system mapping resource");
        request::delete(client, &current.endpoint()).await
    }

    async fn import(&self, client: &RestClient, id: &str) -> Result<Value, ProviderError> {
        let fields = split_import_id(
            id,
            &["region_host", "subaccount", "virtual_host", "virtual_port", "url_path"],
        )?;
        let api = fetch(client, &fields[0], &fields[1], &fields[2], &fields[3], &fields[4]).await?;
        encode(&SystemMappingResourceState::from_api(
            &fields[0], &fields[1], &fields[2], &fields[3], api,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_only_maps_to_exact_match() {
        let state = SystemMappingResourceState {
            url_path: "/sap/opu/odata".to_string(),
            path_only: Some(true),
            enabled: Some(false),
            ..Default::default()
        };
        let body = serde_json::to_value(state.to_api()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "id": "/sap/opu/odata",
                "enabled": false,
                "exactMatchOnly": true
            })
        );
    }

    #[test]
    fn test_endpoint_encodes_path() {
        let state = SystemMappingResourceState {
            region_host: "cf.eu10.hana.ondemand.com".to_string(),
            subaccount: "abc".to_string(),
            virtual_host: "virtual.erp".to_string(),
            virtual_port: "44300".to_string(),
            url_path: "/sap/opu/odata".to_string(),
            ..Default::default()
        };
        assert!(state.endpoint().ends_with("/virtual.erp:44300/resources/L3NhcC9vcHUvb2RhdGE="));
    }
}
