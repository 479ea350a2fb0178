//! `sapcc_subaccount` and `sapcc_subaccounts`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{list_element, list_output, list_schema, lookup_schema, project, DataSource, SubaccountKey};
use crate::api::Subaccount;
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::get_json;
use crate::resources::subaccount::{self, SubaccountResource, SubaccountState};
use crate::resources::{decode, encode, Resource};
use crate::schema::Schema;

pub const SINGLE_TYPE_NAME: &str = "sapcc_subaccount";
pub const LIST_TYPE_NAME: &str = "sapcc_subaccounts";

const KEYS: &[&str] = &["region_host", "subaccount"];
// Write-only, never returned by the API.
const OMIT: &[&str] = &["cloud_user"];

fn item_schema() -> Schema {
    lookup_schema(SubaccountResource.schema(), KEYS, OMIT)
}

#[derive(Debug, Default)]
pub struct SubaccountDataSource;

#[derive(Debug, Default)]
pub struct SubaccountsDataSource;

pub fn new_single() -> Box<dyn DataSource> {
    Box::new(SubaccountDataSource)
}

pub fn new_list() -> Box<dyn DataSource> {
    Box::new(SubaccountsDataSource)
}

#[async_trait]
impl DataSource for SubaccountDataSource {
    fn type_name(&self) -> &'static str {
        SINGLE_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        item_schema()
    }

    #[instrument(skip_all, name = "subaccount.lookup")]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: SubaccountKey = decode(SINGLE_TYPE_NAME, config)?;
        let api = subaccount::fetch(client, &key.region_host, &key.subaccount).await?;
        Ok(project(&self.schema(), encode(&SubaccountState::from_api(api))?))
    }
}

#[async_trait]
impl DataSource for SubaccountsDataSource {
    fn type_name(&self) -> &'static str {
        LIST_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        list_schema(
            &item_schema(),
            &[],
            "subaccounts",
            "All subaccounts the Cloud Connector is connected to.",
        )
    }

    #[instrument(skip_all, name = "subaccount.list")]
    async fn read(&self, client: &RestClient, _config: Value) -> Result<Value, ProviderError> {
        let item = item_schema();
        let subaccounts: Vec<Subaccount> = get_json(client, &endpoints::subaccounts()).await?;
        let elements = subaccounts
            .into_iter()
            .map(|api| encode(&SubaccountState::from_api(api)).map(|v| list_element(&item, &[], v)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(list_output(&[], "subaccounts", elements))
    }
}
