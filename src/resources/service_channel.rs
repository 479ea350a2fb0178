//! Service channels: `sapcc_subaccount_k8s_service_channel` and
//! `sapcc_subaccount_abap_service_channel`.
//!
//! Both kinds share one handler. The kind selects the endpoint segment and
//! the target attributes; everything else (connections, comment, enabled
//! state and the computed runtime state) is common.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{decode, encode, not_found, required, split_import_id, subaccount_scope, Resource};
use crate::api::{ChannelKind, ChannelState, ServiceChannel, ServiceChannelStateRequest};
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::{self, get_json, request_unit, send, Verb};
use crate::schema::{Attribute, AttributeType, Schema};

/// Type name of the Kubernetes channel resource.
pub const K8S_TYPE_NAME: &str = "sapcc_subaccount_k8s_service_channel";
/// Type name of the ABAP Cloud channel resource.
pub const ABAP_CLOUD_TYPE_NAME: &str = "sapcc_subaccount_abap_service_channel";

/// Resource type name for a channel kind.
pub fn type_name(kind: ChannelKind) -> &'static str {
    match kind {
        ChannelKind::K8s => K8S_TYPE_NAME,
        ChannelKind::AbapCloud => ABAP_CLOUD_TYPE_NAME,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceChannelState {
    pub region_host: String,
    pub subaccount: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abap_cloud_tenant_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_number: Option<String>,
    #[serde(default)]
    pub connections: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, rename = "type")]
    pub type_desc: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub state: Option<ChannelRuntimeState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRuntimeState {
    pub connected: bool,
    pub opened_connections: i64,
    pub connected_since_time_stamp: Option<i64>,
}

impl From<ChannelState> for ChannelRuntimeState {
    fn from(s: ChannelState) -> Self {
        Self {
            connected: s.connected,
            opened_connections: s.opened_connections,
            connected_since_time_stamp: s.connected_since_time_stamp,
        }
    }
}

impl ServiceChannelState {
    pub fn from_api(region_host: &str, subaccount: &str, api: ServiceChannel) -> Self {
        Self {
            region_host: region_host.to_string(),
            subaccount: subaccount.to_string(),
            id: api.id,
            k8s_cluster: api.k8s_cluster,
            k8s_service: api.k8s_service,
            port: api.port,
            abap_cloud_tenant_host: api.abap_cloud_tenant_host,
            instance_number: api.instance_number,
            connections: api.connections,
            comment: api.comment,
            enabled: api.enabled,
            type_desc: api.type_desc,
            details: api.details,
            state: api.state.map(ChannelRuntimeState::from),
        }
    }

    /// Body for create and update; only the target fields of `kind` are sent.
    fn to_api(&self, kind: ChannelKind) -> ServiceChannel {
        let mut body = ServiceChannel {
            connections: self.connections,
            comment: self.comment.clone(),
            ..Default::default()
        };
        match kind {
            ChannelKind::K8s => {
                body.k8s_cluster = self.k8s_cluster.clone();
                body.k8s_service = self.k8s_service.clone();
                body.port = self.port;
            },
            ChannelKind::AbapCloud => {
                body.abap_cloud_tenant_host = self.abap_cloud_tenant_host.clone();
                body.instance_number = self.instance_number.clone();
            },
        }
        body
    }
}

/// Handler for one channel kind.
#[derive(Debug, Clone, Copy)]
pub struct ServiceChannelResource {
    kind: ChannelKind,
}

impl ServiceChannelResource {
    pub fn new(kind: ChannelKind) -> Self {
        Self { kind }
    }

    fn id(&self, state: &ServiceChannelState) -> Result<i64, ProviderError> {
        required(&state.id, "id")
    }
}

/// Registry constructor for [`K8S_TYPE_NAME`].
pub fn new_k8s() -> Box<dyn Resource> {
    Box::new(ServiceChannelResource::new(ChannelKind::K8s))
}

/// Registry constructor for [`ABAP_CLOUD_TYPE_NAME`].
pub fn new_abap_cloud() -> Box<dyn Resource> {
    Box::new(ServiceChannelResource::new(ChannelKind::AbapCloud))
}

/// Attributes shared by both kinds plus the target attributes of `kind`.
pub(crate) fn channel_schema(kind: ChannelKind) -> Schema {
    let schema = subaccount_scope(Schema::v0())
        .with_attribute(
            "id",
            Attribute::computed_int64().with_description("ID the Cloud Connector assigned to the channel."),
        )
        .with_attribute(
            "connections",
            Attribute::required_int64().with_description("Maximum number of open connections."),
        )
        .with_attribute("comment", Attribute::optional_string())
        .with_attribute(
            "enabled",
            Attribute::optional_computed_bool().with_description("Whether the channel is open."),
        )
        .with_attribute("type", Attribute::computed_string())
        .with_attribute("details", Attribute::computed_string())
        .with_attribute(
            "state",
            Attribute::computed(AttributeType::object([
                ("connected", AttributeType::Bool),
                ("opened_connections", AttributeType::Int64),
                ("connected_since_time_stamp", AttributeType::Int64),
            ])),
        );

    match kind {
        ChannelKind::K8s => schema
            .with_description("Service channel to a Kubernetes cluster service.")
            .with_attribute(
                "k8s_cluster",
                Attribute::required_string().with_description("Host of the cluster's control plane."),
            )
            .with_attribute(
                "k8s_service",
                Attribute::required_string().with_description("Host of the service inside the cluster."),
            )
            .with_attribute("port", Attribute::required_int64().with_description("Local port of the channel.")),
        ChannelKind::AbapCloud => schema
            .with_description("Service channel to an ABAP Cloud tenant.")
            .with_attribute(
                "abap_cloud_tenant_host",
                Attribute::required_string().with_description("Host of the ABAP Cloud tenant."),
            )
            .with_attribute(
                "instance_number",
                Attribute::required_string().with_description("Two-digit instance number; the local port is 33 followed by it."),
            ),
    }
}

/// All channels of one kind in a subaccount.
pub(crate) async fn list(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
    kind: ChannelKind,
) -> Result<Vec<ServiceChannel>, ProviderError> {
    get_json(client, &endpoints::service_channels(region_host, subaccount, kind))
        .await
        .map_err(|e| not_found(e, format!("subaccount {}/{}", region_host, subaccount)))
}

pub(crate) async fn fetch(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
    kind: ChannelKind,
    id: i64,
) -> Result<ServiceChannel, ProviderError> {
    get_json(client, &endpoints::service_channel(region_host, subaccount, kind, id))
        .await
        .map_err(|e| {
            not_found(
                e,
                format!("{} service channel {} in subaccount {}/{}", kind, id, region_host, subaccount),
            )
        })
}

async fn set_enabled(
    client: &RestClient,
    state: &ServiceChannelState,
    kind: ChannelKind,
    id: i64,
    enabled: bool,
) -> Result<(), ProviderError> {
    info!(%kind, id, enabled, "Changing service channel state");
    request_unit(
        client,
        Verb::Put,
        &endpoints::service_channel_state(&state.region_host, &state.subaccount, kind, id),
        Some(&ServiceChannelStateRequest { enabled }),
    )
    .await
}

impl ServiceChannelResource {
    /// Id of a freshly created channel.
    ///
    /// Taken from the create response when the API echoes the channel,
    /// otherwise the newest channel with the same target.
    async fn created_id(
        &self,
        client: &RestClient,
        planned: &ServiceChannelState,
        response_body: &[u8],
    ) -> Result<i64, ProviderError> {
        if !response_body.is_empty() {
            if let Ok(ServiceChannel { id: Some(id), .. }) = serde_json::from_slice::<ServiceChannel>(response_body) {
                return Ok(id);
            }
        }

        debug!(kind = %self.kind, "Create response carried no id, searching the channel list");
        let wanted = planned.to_api(self.kind);
        list(client, &planned.region_host, &planned.subaccount, self.kind)
            .await?
            .into_iter()
            .filter(|c| c.same_target(&wanted))
            .filter_map(|c| c.id)
            .max()
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "newly created {} service channel in subaccount {}/{}",
                    self.kind, planned.region_host, planned.subaccount
                ))
            })
    }

    /// Remove a channel whose create did not complete, so a retry does not
    /// leave a duplicate behind.
    async fn roll_back(&self, client: &RestClient, planned: &ServiceChannelState, id: i64) {
        warn!(kind = %self.kind, id, "Removing partially created service channel");
        let endpoint = endpoints::service_channel(&planned.region_host, &planned.subaccount, self.kind, id);
        if let Err(err) = request::delete(client, &endpoint).await {
            warn!(kind = %self.kind, id, error = %err, "Could not remove service channel");
        }
    }

    async fn refresh(
        &self,
        client: &RestClient,
        state: &ServiceChannelState,
        id: i64,
    ) -> Result<Value, ProviderError> {
        let api = fetch(client, &state.region_host, &state.subaccount, self.kind, id).await?;
        encode(&ServiceChannelState::from_api(
            &state.region_host,
            &state.subaccount,
            api,
        ))
    }
}

#[async_trait]
impl Resource for ServiceChannelResource {
    fn type_name(&self) -> &'static str {
        type_name(self.kind)
    }

    fn schema(&self) -> Schema {
        channel_schema(self.kind)
    }

    #[instrument(skip_all, name = "service_channel.create", fields(kind = %self.kind))]
    async fn create(&self, client: &RestClient, planned: Value) -> Result<Value, ProviderError> {
        let planned: ServiceChannelState = decode(self.type_name(), planned)?;
        info!(subaccount = %planned.subaccount, "Creating service channel");

        let response = send(
            client,
            Verb::Post,
            &endpoints::service_channels(&planned.region_host, &planned.subaccount, self.kind),
            Some(&planned.to_api(self.kind)),
        )
        .await?;
        let id = self.created_id(client, &planned, &response.body).await?;

        // Channels start enabled.
        if planned.enabled == Some(false) {
            if let Err(err) = set_enabled(client, &planned, self.kind, id, false).await {
                self.roll_back(client, &planned, id).await;
                return Err(err);
            }
        }

        self.refresh(client, &planned, id).await
    }

    #[instrument(skip_all, name = "service_channel.read", fields(kind = %self.kind))]
    async fn read(&self, client: &RestClient, current: Value) -> Result<Value, ProviderError> {
        let current: ServiceChannelState = decode(self.type_name(), current)?;
        let id = self.id(&current)?;
        self.refresh(client, &current, id).await
    }

    #[instrument(skip_all, name = "service_channel.update", fields(kind = %self.kind))]
    async fn update(
        &self,
        client: &RestClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: ServiceChannelState = decode(self.type_name(), prior)?;
        let planned: ServiceChannelState = decode(self.type_name(), planned)?;
        // The id is computed, so the plan may not carry it.
        let id = self.id(&prior)?;

        request_unit(
            client,
            Verb::Put,
            &endpoints::service_channel(&planned.region_host, &planned.subaccount, self.kind, id),
            Some(&planned.to_api(self.kind)),
        )
        .await?;

        if let Some(enabled) = planned.enabled {
            if prior.enabled != Some(enabled) {
                set_enabled(client, &planned, self.kind, id, enabled).await?;
            }
        }

        self.refresh(client, &planned, id).await
    }

    #[instrument(skip_all, name = "service_channel.delete", fields(kind = %self.kind))]
    async fn delete(&self, client: &RestClient, current: Value) -> Result<(), ProviderError> {
        let current: ServiceChannelState = decode(self.type_name(), current)?;
        let id = self.id(&current)?;
        info!(id, "Deleting service channel");
        request::delete(
            client,
            &endpoints::service_channel(&current.region_host, &current.subaccount, self.kind, id),
        )
        .await
    }

    async fn import(&self, client: &RestClient, id: &str) -> Result<Value, ProviderError> {
        let fields = split_import_id(id, &["region_host", "subaccount", "id"])?;
        let channel_id: i64 = fields[2].parse().map_err(|_| {
            ProviderError::InvalidRequest(format!(
                "unexpected import id '{}', channel id '{}' is not a number",
                id, fields[2]
            ))
        })?;
        let api = fetch(client, &fields[0], &fields[1], self.kind, channel_id).await?;
        encode(&ServiceChannelState::from_api(&fields[0], &fields[1], api))
    }
}
