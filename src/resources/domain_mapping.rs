//! `sapcc_domain_mapping`: maps an internal domain to a virtual domain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::{decode, encode, split_import_id, subaccount_scope, Resource};
use crate::api::DomainMapping;
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::{self, get_json, request_unit, Verb};
use crate::schema::{Attribute, Schema};

/// Resource type name.
pub const TYPE_NAME: &str = "sapcc_domain_mapping";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMappingState {
    pub region_host: String,
    pub subaccount: String,
    pub virtual_domain: String,
    pub internal_domain: String,
}

impl DomainMappingState {
    pub fn from_api(region_host: &str, subaccount: &str, api: DomainMapping) -> Self {
        Self {
            region_host: region_host.to_string(),
            subaccount: subaccount.to_string(),
            virtual_domain: api.virtual_domain,
            internal_domain: api.internal_domain,
        }
    }

    fn to_api(&self) -> DomainMapping {
        DomainMapping {
            virtual_domain: self.virtual_domain.clone(),
            internal_domain: self.internal_domain.clone(),
        }
    }
}

/// Handler for [`TYPE_NAME`].
#[derive(Debug, Default)]
pub struct DomainMappingResource;

/// Registry constructor.
pub fn new() -> Box<dyn Resource> {
    Box::new(DomainMappingResource)
}

/// All domain mappings of a subaccount.
pub(crate) async fn list(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
) -> Result<Vec<DomainMapping>, ProviderError> {
    get_json(client, &endpoints::domain_mappings(region_host, subaccount)).await
}

/// The API has no single-mapping GET, so reads select from the list.
pub(crate) async fn find(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
    internal_domain: &str,
) -> Result<DomainMapping, ProviderError> {
    list(client, region_host, subaccount)
        .await?
        .into_iter()
        .find(|m| m.internal_domain == internal_domain)
        .ok_or_else(|| {
            ProviderError::NotFound(format!(
                "domain mapping for internal domain '{}' in subaccount {}/{}",
                internal_domain, region_host, subaccount
            ))
        })
}

#[async_trait]
impl Resource for DomainMappingResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        subaccount_scope(Schema::v0())
            .with_description("Maps an internal domain to the virtual domain used by cloud applications.")
            .with_attribute(
                "virtual_domain",
                Attribute::required_string().with_description("Domain visible to cloud applications."),
            )
            .with_attribute(
                "internal_domain",
                Attribute::required_string().with_description("Domain of the on-premise system."),
            )
    }

    #[instrument(skip_all, name = "domain_mapping.create")]
    async fn create(&self, client: &RestClient, planned: Value) -> Result<Value, ProviderError> {
        let planned: DomainMappingState = decode(TYPE_NAME, planned)?;
        info!(internal_domain = %planned.internal_domain, "Creating domain mapping");

        request_unit(
            client,
            Verb::Post,
            &endpoints::domain_mappings(&planned.region_host, &planned.subaccount),
            Some(&planned.to_api()),
        )
        .await?;

        let api = find(
            client,
            &planned.region_host,
            &planned.subaccount,
            &planned.internal_domain,
        )
        .await?;
        encode(&DomainMappingState::from_api(
            &planned.region_host,
            &planned.subaccount,
            api,
        ))
    }

    #[instrument(skip_all, name = "domain_mapping.read")]
    async fn read(&self, client: &RestClient, current: Value) -> Result<Value, ProviderError> {
        let current: DomainMappingState = decode(TYPE_NAME, current)?;
        let api = find(
            client,
            &current.region_host,
            &current.subaccount,
            &current.internal_domain,
        )
        .await?;
        encode(&DomainMappingState::from_api(
            &current.region_host,
            &current.subaccount,
            api,
        ))
    }

    #[instrument(skip_all, name = "domain_mapping.update")]
    async fn update(
        &self,
        client: &RestClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: DomainMappingState = decode(TYPE_NAME, prior)?;
        let planned: DomainMappingState = decode(TYPE_NAME, planned)?;

        // The mapping is addressed by its current internal domain, which
        // the update may rename.
        request_unit(
            client,
            Verb::Put,
            &endpoints::domain_mapping(
                &prior.region_host,
                &prior.subaccount,
                &prior.internal_domain,
            ),
            Some(&planned.to_api()),
        )
        .await?;

        let api = find(
            client,
            &planned.region_host,
            &planned.subaccount,
            &planned.internal_domain,
        )
        .await?;
        encode(&DomainMappingState::from_api(
            &planned.region_host,
            &planned.subaccount,
            api,
        ))
    }

    #[instrument(skip_all, name = "domain_mapping.delete")]
    async fn delete(&self, client: &RestClient, current: Value) -> Result<(), ProviderError> {
        let current: DomainMappingState = decode(TYPE_NAME, current)?;
        info!(internal_domain = %current.internal_domain, "Deleting domain mapping");
        request::delete(
            client,
            &endpoints::domain_mapping(
                &current.region_host,
                &current.subaccount,
                &current.internal_domain,
            ),
        )
        .await
    }

    async fn import(&self, client: &RestClient, id: &str) -> Result<Value, ProviderError> {
        let fields = split_import_id(id, &["region_host", "subaccount", "internal_domain"])?;
        let api = find(client, &fields[0], &fields[1], &fields[2]).await?;
        encode(&DomainMappingState::from_api(&fields[0], &fields[1], api))
    }
}
