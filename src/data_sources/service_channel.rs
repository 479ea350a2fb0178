//! Service channel data sources, singular and plural for both kinds.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{list_element, list_output, list_schema, lookup_schema, project, DataSource, SubaccountKey};
use crate::api::ChannelKind;
use crate::client::RestClient;
use crate::error::ProviderError;
use crate::resources::service_channel::{self, channel_schema, ServiceChannelState};
use crate::resources::{decode, encode};
use crate::schema::Schema;

const KEYS: &[&str] = &["region_host", "subaccount", "id"];
const LIST_KEYS: &[&str] = &["region_host", "subaccount"];
const LIST_ATTRIBUTE: &str = "service_channels";

/// Type name of the plural data source for `kind`.
pub fn list_type_name(kind: ChannelKind) -> &'static str {
    match kind {
        ChannelKind::K8s => "sapcc_subaccount_k8s_service_channels",
        ChannelKind::AbapCloud => "sapcc_subaccount_abap_service_channels",
    }
}

fn item_schema(kind: ChannelKind) -> Schema {
    lookup_schema(channel_schema(kind), KEYS, &[])
}

#[derive(Debug, Deserialize)]
struct ChannelKey {
    region_host: String,
    subaccount: String,
    id: i64,
}

/// One channel, looked up by id.
#[derive(Debug, Clone, Copy)]
pub struct ServiceChannelDataSource {
    kind: ChannelKind,
}

/// All channels of one kind in a subaccount.
#[derive(Debug, Clone, Copy)]
pub struct ServiceChannelsDataSource {
    kind: ChannelKind,
}

pub fn new_k8s_single() -> Box<dyn DataSource> {
    Box::new(ServiceChannelDataSource { kind: ChannelKind::K8s })
}

pub fn new_k8s_list() -> Box<dyn DataSource> {
    Box::new(ServiceChannelsDataSource { kind: ChannelKind::K8s })
}

pub fn new_abap_cloud_single() -> Box<dyn DataSource> {
    Box::new(ServiceChannelDataSource { kind: ChannelKind::AbapCloud })
}

pub fn new_abap_cloud_list() -> Box<dyn DataSource> {
    Box::new(ServiceChannelsDataSource { kind: ChannelKind::AbapCloud })
}

#[async_trait]
impl DataSource for ServiceChannelDataSource {
    fn type_name(&self) -> &'static str {
        service_channel::type_name(self.kind)
    }

    fn schema(&self) -> Schema {
        item_schema(self.kind)
    }

    #[instrument(skip_all, name = "service_channel.lookup", fields(kind = %self.kind))]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: ChannelKey = decode(self.type_name(), config)?;
        let api = service_channel::fetch(client, &key.region_host, &key.subaccount, self.kind, key.id).await?;
        let state = ServiceChannelState::from_api(&key.region_host, &key.subaccount, api);
        Ok(project(&self.schema(), encode(&state)?))
    }
}

#[async_trait]
impl DataSource for ServiceChannelsDataSource {
    fn type_name(&self) -> &'static str {
        list_type_name(self.kind)
    }

    fn schema(&self) -> Schema {
        let description = match self.kind {
            ChannelKind::K8s => "All Kubernetes service channels of a subaccount.",
            ChannelKind::AbapCloud => "All ABAP Cloud service channels of a subaccount.",
        };
        list_schema(&item_schema(self.kind), LIST_KEYS, LIST_ATTRIBUTE, description)
    }

    #[instrument(skip_all, name = "service_channel.list", fields(kind = %self.kind))]
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError> {
        let key: SubaccountKey = decode(self.type_name(), config)?;
        let item = item_schema(self.kind);
        let channels = service_channel::list(client, &key.region_host, &key.subaccount, self.kind).await?;

        let elements = channels
            .into_iter()
            .map(|api| {
                let state = ServiceChannelState::from_api(&key.region_host, &key.subaccount, api);
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
