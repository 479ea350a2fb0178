//! Wire models of the Cloud Connector configuration API.
//!
//! These mirror the JSON objects of the REST API one to one (camelCase). The
//! same struct is used for requests and responses; fields the API computes
//! are optional and skipped when serializing a request.

mod domain_mapping;
mod service_channel;
mod subaccount;
mod system_mapping;

pub use domain_mapping::DomainMapping;
pub use service_channel::{ChannelKind, ChannelState, ServiceChannel, ServiceChannelStateRequest};
pub use subaccount::{
    ApplicationConnection, Subaccount, SubaccountCertificate, SubaccountCreateRequest,
    SubaccountStateRequest, SubaccountUpdateRequest, Tunnel, TunnelServiceChannel,
};
pub use system_mapping::{SystemMapping, SystemMappingResource};

/// Deserializers for fields the API returns as either string or number.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accept `"443"`, `443` or null as an optional string.
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }
}
