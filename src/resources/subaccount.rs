//! `sapcc_subaccount`: connects the Cloud Connector to a BTP subaccount.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{decode, encode, not_found, required, split_import_id, subaccount_scope, Resource};
use crate::api::{
    ApplicationConnection, Subaccount, SubaccountCertificate, SubaccountCreateRequest,
    SubaccountStateRequest, SubaccountUpdateRequest, Tunnel, TunnelServiceChannel,
};
use crate::client::RestClient;
use crate::endpoints;
use crate::error::ProviderError;
use crate::request::{self, get_json, request_unit, Verb};
use crate::schema::{Attribute, AttributeType, Schema};

/// Resource type name.
pub const TYPE_NAME: &str = "sapcc_subaccount";

/// Terraform state of a subaccount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubaccountState {
    pub region_host: String,
    pub subaccount: String,
    #[serde(default)]
    pub cloud_user: Option<String>,
    #[serde(default)]
    pub cloud_password: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(default)]
    pub tunnel: Option<TunnelState>,
}

impl SubaccountState {
    /// State as reported by the API. Credentials are never returned.
    pub fn from_api(api: Subaccount) -> Self {
        Self {
            connected: api.tunnel.as_ref().map(Tunnel::is_connected),
            tunnel: api.tunnel.map(TunnelState::from),
            region_host: api.region_host,
            subaccount: api.subaccount,
            cloud_user: None,
            cloud_password: None,
            location_id: api.location_id,
            display_name: api.display_name,
            description: api.description,
        }
    }

    fn with_credentials_from(mut self, other: &SubaccountState) -> Self {
        self.cloud_user = other.cloud_user.clone();
        self.cloud_password = other.cloud_password.clone();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelState {
    pub state: String,
    pub connected_since_time_stamp: Option<i64>,
    pub connections: Option<i64>,
    pub user: Option<String>,
    pub subaccount_certificate: Option<CertificateState>,
    pub application_connections: Vec<ApplicationConnectionState>,
    pub service_channels: Vec<TunnelChannelState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateState {
    pub valid_to: Option<i64>,
    pub valid_from: Option<i64>,
    pub subject_dn: Option<String>,
    pub issuer: Option<String>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConnectionState {
    pub connection_count: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelChannelState {
    #[serde(rename = "type")]
    pub kind: String,
    pub state: String,
    pub details: String,
    pub comment: Option<String>,
}

impl From<Tunnel> for TunnelState {
    fn from(t: Tunnel) -> Self {
        Self {
            state: t.state,
            connected_since_time_stamp: t.connected_since_time_stamp,
            connections: t.connections,
            user: t.user,
            subaccount_certificate: t.subaccount_certificate.map(CertificateState::from),
            application_connections: t
                .application_connections
                .into_iter()
                .map(ApplicationConnectionState::from)
                .collect(),
            service_channels: t
                .service_channels
                .into_iter()
                .map(TunnelChannelState::from)
                .collect(),
        }
    }
}

impl From<SubaccountCertificate> for CertificateState {
    fn from(c: SubaccountCertificate) -> Self {
        Self {
            valid_to: c.valid_to,
            valid_from: c.valid_from,
            subject_dn: c.subject_dn,
            issuer: c.issuer,
            serial_number: c.serial_number,
        }
    }
}

impl From<ApplicationConnection> for ApplicationConnectionState {
    fn from(c: ApplicationConnection) -> Self {
        Self {
            connection_count: c.connection_count,
            name: c.name,
            kind: c.kind,
        }
    }
}

impl From<TunnelServiceChannel> for TunnelChannelState {
    fn from(c: TunnelServiceChannel) -> Self {
        Self {
            kind: c.kind,
            state: c.state,
            details: c.details,
            comment: c.comment,
        }
    }
}

/// Type of the computed `tunnel` attribute.
pub fn tunnel_type() -> AttributeType {
    AttributeType::object([
        ("state", AttributeType::String),
        ("connected_since_time_stamp", AttributeType::Int64),
        ("connections", AttributeType::Int64),
        ("user", AttributeType::String),
        (
            "subaccount_certificate",
            AttributeType::object([
                ("valid_to", AttributeType::Int64),
                ("valid_from", AttributeType::Int64),
                ("subject_dn", AttributeType::String),
                ("issuer", AttributeType::String),
                ("serial_number", AttributeType::String),
            ]),
        ),
        (
            "application_connections",
            AttributeType::list(AttributeType::object([
                ("connection_count", AttributeType::Int64),
                ("name", AttributeType::String),
                ("type", AttributeType::String),
            ])),
        ),
        (
            "service_channels",
            AttributeType::list(AttributeType::object([
                ("type", AttributeType::String),
                ("state", AttributeType::String),
                ("details", AttributeType::String),
                ("comment", AttributeType::String),
            ])),
        ),
    ])
}

/// Handler for [`TYPE_NAME`].
#[derive(Debug, Default)]
pub struct SubaccountResource;

/// Registry constructor.
pub fn new() -> Box<dyn Resource> {
    Box::new(SubaccountResource)
}

pub(crate) async fn fetch(
    client: &RestClient,
    region_host: &str,
    subaccount: &str,
) -> Result<Subaccount, ProviderError> {
    get_json(client, &endpoints::subaccount(region_host, subaccount))
        .await
        .map_err(|e| not_found(e, format!("subaccount {}/{}", region_host, subaccount)))
}

async fn set_connected(
    client: &RestClient,
    state: &SubaccountState,
    connected: bool,
) -> Result<(), ProviderError> {
    info!(
        region_host = %state.region_host,
        subaccount = %state.subaccount,
        connected,
        "Changing subaccount tunnel state"
    );
    request_unit(
        client,
        Verb::Put,
        &endpoints::subaccount_state(&state.region_host, &state.subaccount),
        Some(&SubaccountStateRequest { connected }),
    )
    .await
}

/// Remove a subaccount whose create did not complete.
async fn roll_back(client: &RestClient, planned: &SubaccountState) {
    warn!(
        region_host = %planned.region_host,
        subaccount = %planned.subaccount,
        "Removing partially created subaccount"
    );
    let endpoint = endpoints::subaccount(&planned.region_host, &planned.subaccount);
    if let Err(err) = request::delete(client, &endpoint).await {
        warn!(subaccount = %planned.subaccount, error = %err, "Could not remove subaccount");
    }
}

#[async_trait]
impl Resource for SubaccountResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        subaccount_scope(Schema::v0())
            .with_description("A subaccount the Cloud Connector opens a tunnel to.")
            .with_attribute(
                "cloud_user",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("User with Cloud Connector Administrator role in the subaccount."),
            )
            .with_attribute(
                "cloud_password",
                Attribute::required_string()
                    .sensitive()
                    .with_force_new()
                    .with_description("Password of cloud_user."),
            )
            .with_attribute("location_id", Attribute::optional_computed_string())
            .with_attribute("display_name", Attribute::optional_computed_string())
            .with_attribute("description", Attribute::optional_computed_string())
            .with_attribute(
                "connected",
                Attribute::optional_computed_bool()
                    .with_description("Whether the tunnel to the subaccount is open."),
            )
            .with_attribute("tunnel", Attribute::computed(tunnel_type()))
    }

    #[instrument(skip_all, name = "subaccount.create")]
    async fn create(&self, client: &RestClient, planned: Value) -> Result<Value, ProviderError> {
        let planned: SubaccountState = decode(TYPE_NAME, planned)?;
        let body = SubaccountCreateRequest {
            region_host: planned.region_host.clone(),
            subaccount: planned.subaccount.clone(),
            cloud_user: required(&planned.cloud_user, "cloud_user")?,
            cloud_password: required(&planned.cloud_password, "cloud_password")?,
            location_id: planned.location_id.clone(),
            display_name: planned.display_name.clone(),
            description: planned.description.clone(),
        };

        info!(region_host = %body.region_host, subaccount = %body.subaccount, "Creating subaccount");
        request_unit(client, Verb::Post, &endpoints::subaccounts(), Some(&body)).await?;

        // New subaccounts connect right away.
        if planned.connected == Some(false) {
            if let Err(err) = set_connected(client, &planned, false).await {
                roll_back(client, &planned).await;
                return Err(err);
            }
        }

        let api = fetch(client, &planned.region_host, &planned.subaccount).await?;
        encode(&SubaccountState::from_api(api).with_credentials_from(&planned))
    }

    #[instrument(skip_all, name = "subaccount.read")]
    async fn read(&self, client: &RestClient, current: Value) -> Result<Value, ProviderError> {
        let current: SubaccountState = decode(TYPE_NAME, current)?;
        let api = fetch(client, &current.region_host, &current.subaccount).await?;
        encode(&SubaccountState::from_api(api).with_credentials_from(&current))
    }

    #[instrument(skip_all, name = "subaccount.update")]
    async fn update(
        &self,
        client: &RestClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: SubaccountState = decode(TYPE_NAME, prior)?;
        let planned: SubaccountState = decode(TYPE_NAME, planned)?;

        let body = SubaccountUpdateRequest {
            location_id: planned.location_id.clone(),
            display_name: planned.display_name.clone(),
            description: planned.description.clone(),
        };
        request_unit(
            client,
            Verb::Put,
            &endpoints::subaccount(&planned.region_host, &planned.subaccount),
            Some(&body),
        )
        .await?;

        if let Some(connected) = planned.connected {
            if prior.connected != Some(connected) {
                set_connected(client, &planned, connected).await?;
            }
        }

        let api = fetch(client, &planned.region_host, &planned.subaccount).await?;
        encode(&SubaccountState::from_api(api).with_credentials_from(&planned))
    }

    #[instrument(skip_all, name = "subaccount.delete")]
    async fn delete(&self, client: &RestClient, current: Value) -> Result<(), ProviderError> {
        let current: SubaccountState = decode(TYPE_NAME, current)?;
        info!(region_host = %current.region_host, subaccount = %current.subaccount, "Deleting subaccount");
        request::delete(
            client,
            &endpoints::subaccount(&current.region_host, &current.subaccount),
        )
        .await
    }

    async fn import(&self, client: &RestClient, id: &str) -> Result<Value, ProviderError> {
        let fields = split_import_id(id, &["region_host", "subaccount"])?;
        let api = fetch(client, &fields[0], &fields[1]).await?;
        encode(&SubaccountState::from_api(api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_api_derives_connected() {
        let api: Subaccount = serde_json::from_value(json!({
            "regionHost": "cf.eu10.hana.ondemand.com",
            "subaccount": "abc",
            "tunnel": {"state": "Disconnected", "applicationConnections": [], "serviceChannels": []}
        }))
        .unwrap();

        let state = SubaccountState::from_api(api);
        assert_eq!(state.connected, Some(false));
        assert_eq!(state.tunnel.unwrap().state, "Disconnected");
        assert!(state.cloud_password.is_none());
    }

    #[test]
    fn test_credentials_are_carried_forward() {
        let prior = SubaccountState {
            cloud_user: Some("admin@example.com".to_string()),
            cloud_password: Some("pw".to_string()),
            ..Default::default()
        };
        let state = SubaccountState::default().with_credentials_from(&prior);
        assert_eq!(state.cloud_user.as_deref(), Some("admin@example.com"));
        assert_eq!(state.cloud_password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_schema_marks_password_sensitive() {
        let schema = SubaccountResource.schema();
        assert!(schema.attribute("cloud_password").unwrap().flags.sensitive);
        assert!(schema.attribute("tunnel").unwrap().flags.is_computed_only());
    }

    #[test]
    fn test_credential_change_requires_replace() {
        let prior = json!({
            "region_host": "cf.eu10.hana.ondemand.com",
            "subaccount": "abc",
            "cloud_user": "admin@example.com",
            "cloud_password": "old"
        });
        let mut proposed = prior.clone();
        proposed["cloud_password"] = json!("new");

        let result = crate::plan::plan(&SubaccountResource.schema(), Some(&prior), &proposed);
        assert!(result.requires_replace);

        proposed["cloud_password"] = json!("old");
        proposed["cloud_user"] = json!("other@example.com");
        let result = crate::plan::plan(&SubaccountResource.schema(), Some(&prior), &proposed);
        assert!(result.requires_replace);
    }

    #[test]
    fn test_tunnel_state_serializes_type_key() {
        let state = TunnelState {
            service_channels: vec![TunnelChannelState {
                kind: "HANA".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(state).unwrap();
        assert_eq!(value["service_channels"][0]["type"], "HANA");
    }
}
