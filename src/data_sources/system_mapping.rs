//! `sapcc_system_mapping` and `sapcc_system_mappings`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{
    list_element, list_output, list_schema, lookup_schema, project, DataSource, SubaccountKey,
    SystemMappingKey,
};
use crate::api::SystemMapping;
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::get_json;
use crate::resources::system_mapping::{self, SystemMappingResource, SystemMappingState};
use crate::resources::{decode, encode, not_found, Resource};
use crate::schema::Schema;

pub const SINGLE_TYPE_NAME: &str = "sapcc_system_mapping";
pub const LIST_TYPE_NAME: &str = "sapcc_system_mappings";

const KEYS: &[&str] = &["region_host", "subaccount", "virtual_host", "virtual_port"];
const LIST_KEYS: &[&str] = &["region_host", "subaccount"];
const LIST_ATTRIBUTE: &str = "system_mappings";

fn item_schema() -> Schema {
    lookup_schema(SystemMappingResource.schema(), KEYS, &[])
}

#[derive(Debug, Default)]
pub struct SystemMappingDataSource;

#[derive(Debug, Default)]
pub struct SystemMappingsDataSource;

pub fn new_single() -> Box<dyn DataSource> {
    Box::new(SystemMappingDataSource)
}

pub fn new_list() -> Box<dyn DataSource> {
    Box::new(SystemMappingsDataSource)
}

#[async_trait]
impl DataSource for SystemMappingDataSource {
    fn type_name(&self) -> &'static str {
        SINGLE_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        item_schema()
    }

    #[instrument(skip_all, name = "system_mapping.lookup")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: SystemMappingKey = decode(SINGLE_TYPE_NAME, config)?;
        let api = system_mapping::fetch(
            client,
            &key.region_host,
            &key.subaccount,
            &key.virtual_host,
            &key.virtual_port,
        )
        .await?;
        let state = SystemMappingState::from_api(&key.region_host, &key.subaccount, api);
        Ok(project(&self.schema(), encode(&state)?))
    }
}

#[async_trait]
impl DataSource for SystemMappingsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        list_schema(
            &item_schema(),
            LIST_KEYS,
            LIST_ATTRIBUTE,
            "All system mappings of a subaccount.",
        )
    }

    #[instrument(skip_all, name = "system_mapping.list")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: SubaccountKey = decode(LIST_TYPE_NAME, config)?;
        let item = item_schema();
        let mappings: Vec<SystemMapping> =
            get_json(client, &endpoints::system_mappings(&key.region_host, &key.subaccount))
                .await
                .map_err(|e| not_found(e, format!("subaccount {}/{}", key.region_host, key.subaccount)))?;

        let elements = mappings
            .into_iter()
            .map(|api| {
                let state = SystemMappingState::from_api(&key.region_host, &key.subaccount, api);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeType;

    #[test]
    fn test_list_element_keeps_virtual_address() {
        let schema = SystemMappingsDataSource.schema();
        let attr = schema.attribute(LIST_ATTRIBUTE).unwrap();
        let AttributeType::List(element) = &attr.attr_type else {
            panic!("expected a list");
        };
        let AttributeType::Object(fields) = element.as_ref() else {
            panic!("expected objects");
        };
        assert!(fields.contains_key("virtual_host"));
        assert!(fields.contains_key("local_port"));
        assert!(!fields.contains_key("subaccount"));
    }
}
