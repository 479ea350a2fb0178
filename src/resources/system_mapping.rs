//! `sapcc_system_mapping`: exposes an internal system under a virtual host.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::{decode, encode, not_found, split_import_id, subaccount_scope, Resource};
use crate::api::SystemMapping;
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::{self, get_json, request_unit, Verb};
use crate::schema::{Attribute, Schema};

/// Resource type name.
pub const TYPE_NAME: &str = "sapcc_system_mapping";

/// Terraform state of a system mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMappingState {
    pub region_host: String,
    pub subaccount: String,
    pub virtual_host: String,
    pub virtual_port: String,
    #[serde(default)]
    pub local_host: Option<String>,
    #[serde(default)]
    pub local_port: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub backend_type: Option<String>,
    #[serde(default)]
    pub authentication_mode: Option<String>,
    #[serde(default)]
    pub host_in_header: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub snc_partner_name: Option<String>,
    #[serde(default)]
    pub sap_router: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub total_resources_count: Option<i64>,
    #[serde(default)]
    pub enabled_resources_count: Option<i64>,
}

impl SystemMappingState {
    pub fn from_api(region_host: &str, subaccount: &str, api: SystemMapping) -> Self {
        Self {
            region_host: region_host.to_string(),
            subaccount: subaccount.to_string(),
            virtual_host: api.virtual_host,
            virtual_port: api.virtual_port.unwrap_or_default(),
            local_host: api.local_host,
            local_port: api.local_port,
            protocol: api.protocol,
            backend_type: api.backend_type,
            authentication_mode: api.authentication_mode,
            host_in_header: api.host_in_header,
            sid: api.sid,
            description: api.description,
            snc_partner_name: api.snc_partner_name,
            sap_router: api.sap_router,
            creation_date: api.creation_date,
            total_resources_count: api.total_resources_count,
            enabled_resources_count: api.enabled_resources_count,
        }
    }

    /// Request body; computed fields stay unset.
    fn to_api(&self) -> SystemMapping {
        SystemMapping {
            virtual_host: self.virtual_host.clone(),
            virtual_port: Some(self.virtual_port.clone()),
            local_host: self.local_host.clone(),
            local_port: self.local_port.clone(),
            protocol: self.protocol.clone(),
            backend_type: self.backend_type.clone(),
            authentication_mode: self.authentication_mode.clone(),
            host_in_header: self.host_in_header.clone(),
            sid: self.sid.clone(),
            description: self.description.clone(),
            snc_partner_name: self.snc_partner_name.clone(),
            sap_router: self.sap_router.clone(),
            ..Default::default()
        }
    }
}

/// Handler for [`TYPE_NAME`].
#[derive(Debug, Default)]
pub struct SystemMappingResource;

/// Registry constructor.
pub fn new() -> Box<dyn Resource> {
    Box::new(SystemMappingResource)
}

pub(crate) async fn fetch(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
    virtual_host: &str,
    virtual_port: &str,
) -> Result<SystemMapping, ProviderError> {
    get_json(
        client,
        &endpoints::system_mapping(region_host, subaccount, virtual_host, virtual_port),
    )
    .await
    .map_err(|e| {
        not_found(
            e,
            format!("system mapping {}:{} in subaccount {}/{}", virtual_host, virtual_port, region_host, subaccount),
        )
    })
}

/// Identity attributes of a system mapping, reused by its resources.
pub(crate) fn virtual_address(schema: Schema) -> Schema {
    schema
        .with_attribute(
            "virtual_host",
            Attribute::required_string()
                .with_force_new()
                .with_description("Host name cloud applications use to reach the system."),
        )
        .with_attribute(
            "virtual_port",
            Attribute::required_string()
                .with_force_new()
                .with_description("Port cloud applications use to reach the system."),
        )
}

#[async_trait]
impl Resource for SystemMappingResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        virtual_address(subaccount_scope(Schema::v0()))
            .with_description("Access control entry exposing an on-premise system to a subaccount.")
            .with_attribute("local_host", Attribute::required_string())
            .with_attribute("local_port", Attribute::required_string())
            .with_attribute(
                "protocol",
                Attribute::required_string()
                    .with_description("HTTP, HTTPS, RFC, RFCS, LDAP, LDAPS, TCP or TCPS."),
            )
            .with_attribute(
                "backend_type",
                Attribute::required_string()
                    .with_description("abapSys, netweaverCE, netweaverGW, applServerJava, PI, hana, otherSAPsys or nonSAPsys."),
            )
            .with_attribute(
                "authentication_mode",
                Attribute::optional_computed_string()
                    .with_description("NONE, KERBEROS, X509_GENERAL or X509_RESTRICTED."),
            )
            .with_attribute(
                "host_in_header",
                Attribute::optional_computed_string()
                    .with_description("VIRTUAL or INTERNAL."),
            )
            .with_attribute("sid", Attribute::optional_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("snc_partner_name", Attribute::optional_string())
            .with_attribute("sap_router", Attribute::optional_string())
            .with_attribute("creation_date", Attribute::computed_string())
            .with_attribute("total_resources_count", Attribute::computed_int64())
            .with_attribute("enabled_resources_count", Attribute::computed_int64())
    }

    #[instrument(skip_all, name = "system_mapping.create")]
    async fn create(&self, client: &RestClient, planned: Value) -> Result<Value, ProviderError> {
        let planned: SystemMappingState = decode(TYPE_NAME, planned)?;
        info!(
            virtual_host = %planned.virtual_host,
            virtual_port = %planned.virtual_port,
            "Creating system mapping"
        );

        request_unit(
            client,
            Verb::Post,
            &endpoints::system_mappings(&planned.region_host, &planned.subaccount),
            Some(&planned.to_api()),
        )
        .await?;

        refresh(client, &planned).await
    }

    #[instrument(skip_all, name = "system_mapping.read")]
    async fn read(&self, client: &RestClient, current: Value) -> Result<Value, ProviderError> {
        let current: SystemMappingState = decode(TYPE_NAME, current)?;
        refresh(client, &current).await
    }

    #[instrument(skip_all, name = "system_mapping.update")]
    async fn update(
        &self,
        client: &RestClient,
        _prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let planned: SystemMappingState = decode(TYPE_NAME, planned)?;
        request_unit(
            client,
            Verb::Put,
            &endpoints::system_mapping(
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

    #[instrument(skip_all, name = "system_mapping.delete")]
    async fn delete(&self, client: &RestClient, current: Value) -> Result<(), ProviderError> {
        let current: SystemMappingState = decode(TYPE_NAME, current)?;
        info!(
            virtual_host = %current.virtual_host,
            virtual_port = %current.virtual_port,
            "Deleting system mapping"
        );
        request::delete(
            client,
            &endpoints::system_mapping(
                &current.region_host,
                &current.subaccount,
                &current.virtual_host,
                &current.virtual_port,
            ),
        )
        .await
    }

    async fn import(&self, client: &RestClient, id: &str) -> Result<Value, ProviderError> {
        let fields = split_import_id(
            id,
            &["region_host", "subaccount", "virtual_host", "virtual_port"],
        )?;
        let api = fetch(client, &fields[0], &fields[1], &fields[2], &fields[3]).await?;
        encode(&SystemMappingState::from_api(&fields[0], &fields[1], api))
    }
}

async fn refresh(client: &RestClient, state: &SystemMappingState) -> Result<Value, ProviderError> {
    let api = fetch(
        client,
        &state.region_host,
        &state.subaccount,
        &state.virtual_host,
        &state.virtual_port,
    )
    .await?;
    encode(&SystemMappingState::from_api(
        &state.region_host,
        &state.subaccount,
        api,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_omits_computed_fields() {
        let state = SystemMappingState {
            region_host: "cf.eu10.hana.ondemand.com".to_string(),
            subaccount: "abc".to_string(),
            virtual_host: "virtual.erp".to_string(),
            virtual_port: "44300".to_string(),
            total_resources_count: Some(3),
            creation_date: Some("1700000000000".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(state.to_api()).unwrap();
        assert!(body.get("totalResourcesCount").is_none());
        assert!(body.get("creationDate").is_none());
        assert_eq!(body["virtualPort"], "44300");
    }

    #[test]
    fn test_identity_forces_replacement() {
        let schema = SystemMappingResource.schema();
        let forced: Vec<_> = schema.force_new_attributes().collect();
        assert_eq!(
            forced,
            vec!["region_host", "subaccount", "virtual_host", "virtual_port"]
        );
    }
}
