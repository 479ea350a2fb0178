//! `sapcc_domain_mapping` and `sapcc_domain_mappings`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{list_element, list_output, list_schema, lookup_schema, project, DataSource, SubaccountKey};
use crate::client::RestClient;
use crate::error::ProviderError;
use crate::resources::domain_mapping::{self, DomainMappingResource, DomainMappingState};
use crate::resources::{decode, encode, not_found, Resource};
use crate::schema::Schema;

pub const SINGLE_TYPE_NAME: &str = "sapcc_domain_mapping";
pub const LIST_TYPE_NAME: &str = "sapcc_domain_mappings";

const KEYS: &[&str] = &["region_host", "subaccount", "internal_domain"];
const LIST_KEYS: &[&str] = &["region_host", "subaccount"];
const LIST_ATTRIBUTE: &str = "domain_mappings";

fn item_schema() -> Schema {
    lookup_schema(DomainMappingResource.schema(), KEYS, &[])
}

#[derive(Debug, Deserialize)]
struct DomainMappingKey {
    region_host: String,
    subaccount: String,
    internal_domain: String,
}

#[derive(Debug, Default)]
pub struct DomainMappingDataSource;

#[derive(Debug, Default)]
pub struct DomainMappingsDataSource;

pub fn new_single() -> Box<dyn DataSource> {
    Box::new(DomainMappingDataSource)
}

pub fn new_list() -> Box<dyn DataSource> {
    Box::new(DomainMappingsDataSource)
}

#[async_trait]
impl DataSource for DomainMappingDataSource {
    fn type_name(&self) -> &'static str {
        SINGLE_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        item_schema()
    }

    #[instrument(skip_all, name = "domain_mapping.lookup")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: DomainMappingKey = decode(SINGLE_TYPE_NAME, config)?;
        let api = domain_mapping::find(client, &key.region_host, &key.subaccount, &key.internal_domain).await?;
        let state = DomainMappingState::from_api(&key.region_host, &key.subaccount, api);
        Ok(project(&self.schema(), encode(&state)?))
    }
}

#[async_trait]
impl DataSource for DomainMappingsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        list_schema(
            &item_schema(),
            LIST_KEYS,
            LIST_ATTRIBUTE,
            "All domain mappings of a subaccount.",
        )
    }

    #[instrument(skip_all, name = "domain_mapping.list")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: SubaccountKey = decode(LIST_TYPE_NAME, config)?;
        let item = item_schema();
        let mappings = domain_mapping::list(client, &key.region_host, &key.subaccount)
            .await
            .map_err(|e| not_found(e, format!("subaccount {}/{}", key.region_host, key.subaccount)))?;

        let elements = mappings
            .into_iter()
            .map(|api| {
                let state = DomainMappingState::from_api(&key.region_host, &key.subaccount, api);
                encode(&state).map(|v| list_element(&item, LIST_KEYS, v))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(list_output(
            &[("region_host", key.region_host.as_str()), ("subaccount", key.subaccount.as_str())],
            LIST_ATTRIBUTE,
            elements,
        ))
    }
}
