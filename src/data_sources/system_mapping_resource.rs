//! `sapcc_system_mapping_resource` and `sapcc_system_mapping_resources`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{list_element, list_output, list_schema, lookup_schema, project, DataSource, SystemMappingKey};
use crate::client::RestClient;
use crate::error::ProviderError;
use crate::resources::system_mapping_resource::{
    self, SystemMappingResourceHandler, SystemMappingResourceState,
};
use crate::resources::{decode, encode, Resource};
use crate::schema::Schema;

pub const SINGLE_TYPE_NAME: &str = "sapcc_system_mapping_resource";
pub const LIST_TYPE_NAME: &str = "sapcc_system_mapping_resources";

const KEYS: &[&str] = &["region_host", "subaccount", "virtual_host", "virtual_port", "url_path"];
const LIST_KEYS: &[&str] = &["region_host", "subaccount", "virtual_host", "virtual_port"];
const LIST_ATTRIBUTE: &str = "resources";

fn item_schema() -> Schema {
    lookup_schema(SystemMappingResourceHandler.schema(), KEYS, &[])
}

#[derive(Debug, Deserialize)]
struct ResourceKey {
    region_host: String,
    subaccount: String,
    virtual_host: String,
    virtual_port: String,
    url_path: String,
}

#[derive(Debug, Default)]
pub struct SystemMappingResourceDataSource;

#[derive(Debug, Default)]
pub struct SystemMappingResourcesDataSource;

pub fn new_single() -> Box<dyn DataSource> {
    Box::new(SystemMappingResourceDataSource)
}

pub fn new_list() -> Box<dyn DataSource> {
    Box::new(SystemMappingResourcesDataSource)
}

#[async_trait]
impl DataSource for SystemMappingResourceDataSource {
    fn type_name(&self) -> &'static str {
        SINGLE_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        item_schema()
    }

    #[instrument(skip_all, name = "system_mapping_resource.lookup")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: ResourceKey = decode(SINGLE_TYPE_NAME, config)?;
        let api = system_mapping_resource::fetch(
            client,
            &key.region_host,
            &key.subaccount,
            &key.virtual_host,
            &key.virtual_port,
            &key.url_path,
        )
        .await?;
        let state = SystemMappingResourceState::from_api(
            &key.region_host,
            &key.subaccount,
            &key.virtual_host,
            &key.virtual_port,
            api,
        );
        Ok(project(&self.schema(), encode(&state)?))
    }
}

#[async_trait]
impl DataSource for SystemMappingResourcesDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        list_schema(
            &item_schema(),
            LIST_KEYS,
            LIST_ATTRIBUTE,
            "All resources of a system mapping.",
        )
    }

    #[instrument(skip_all, name = "system_mapping_resource.list")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: SystemMappingKey = decode(LIST_TYPE_NAME, config)?;
        let item = item_schema();
        let resources = system_mapping_resource::list(
            client,
            &key.region_host,
            &key.subaccount,
            &key.virtual_host,
            &key.virtual_port,
        )
        .await?;

        let elements = resources
            .into_iter()
            .map(|api| {
                let state = SystemMappingResourceState::from_api(
                    &key.region_host,
                    &key.subaccount,
                    &key.virtual_host,
                    &key.virtual_port,
                    api,
                );
                encode(&state).map(|v| list_element(&item, LIST_KEYS, v))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(list_output(
            &[
                ("region_host", key.region_host.as_str()),
                ("subaccount", key.subaccount.as_str()),
                ("virtual_host", key.virtual_host.as_str()),
                ("virtual_port", key.virtual_port.as_str()),
            ],
            LIST_ATTRIBUTE,
            elements,
        ))
    }
}
