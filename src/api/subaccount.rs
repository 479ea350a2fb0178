use serde::{Deserialize, Serialize};

/// A subaccount as listed or fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subaccount {
    pub region_host: String,
    pub subaccount: String,
    #[serde(rename = "locationID", default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunnel: Option<Tunnel>,
}

/// Body of `POST /subaccounts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubaccountCreateRequest {
    pub region_host: String,
    pub subaccount: String,
    pub cloud_user: String,
    pub cloud_password: String,
    #[serde(rename = "locationID", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /subaccounts/{region}/{subaccount}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubaccountUpdateRequest {
    #[serde(rename = "locationID", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /subaccounts/{region}/{subaccount}/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubaccountStateRequest {
    pub connected: bool,
}

/// Tunnel between the Cloud Connector and the subaccount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tunnel {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub connected_since_time_stamp: Option<i64>,
    #[serde(default)]
    pub connections: Option<i64>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub subaccount_certificate: Option<SubaccountCertificate>,
    #[serde(default)]
    pub application_connections: Vec<ApplicationConnection>,
    #[serde(default)]
    pub service_channels: Vec<TunnelServiceChannel>,
}

impl Tunnel {
    /// State string reported for an open tunnel.
    pub const CONNECTED: &'static str = "Connected";

    pub fn is_connected(&self) -> bool {
        self.state.eq_ignore_ascii_case(Self::CONNECTED)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubaccountCertificate {
    #[serde(default)]
    pub valid_to: Option<i64>,
    #[serde(default)]
    pub valid_from: Option<i64>,
    #[serde(rename = "subjectDN", default)]
    pub subject_dn: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConnection {
    #[serde(default)]
    pub connection_count: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelServiceChannel {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub comment: Option<String>,
}
