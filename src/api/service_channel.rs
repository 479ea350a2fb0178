use std::fmt;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Kinds of service channel this provider manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Kubernetes cluster service.
    K8s,
    /// ABAP Cloud tenant.
    AbapCloud,
}

impl ChannelKind {
    /// Path segment under `.../channels/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::K8s => "K8S",
            Self::AbapCloud => "ABAPCloud",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// A service channel as fetched, and the body for create/update.
///
/// Only the fields of the channel's own kind are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceChannel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ChannelState>,

    // K8S
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    // ABAP Cloud
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abap_cloud_tenant_host: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub instance_number: Option<String>,
}

impl ServiceChannel {
    /// Whether `other` addresses the same backend as `self`.
    pub fn same_target(&self, other: &ServiceChannel) -> bool {
        self.k8s_cluster == other.k8s_cluster
            && self.k8s_service == other.k8s_service
            && self.port == other.port
            && self.abap_cloud_tenant_host == other.abap_cloud_tenant_host
            && self.instance_number == other.instance_number
    }
}

/// Runtime state of a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub opened_connections: i64,
    #[serde(default)]
    pub connected_since_time_stamp: Option<i64>,
}

/// Body of `PUT .../channels/{kind}/{id}/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceChannelStateRequest {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_kind_segments() {
        assert_eq!(ChannelKind::K8s.to_string(), "K8S");
        assert_eq!(ChannelKind::AbapCloud.path_segment(), "ABAPCloud");
    }

    #[test]
    fn test_k8s_channel_body() {
        let body = serde_json::to_value(ServiceChannel {
            k8s_cluster: Some("cp.cluster.example.com".to_string()),
            k8s_service: Some("svc.cluster.example.com".to_string()),
            port: Some(3000),
            connections: Some(1),
            comment: Some("hana".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "k8sCluster": "cp.cluster.example.com",
                "k8sService": "svc.cluster.example.com",
                "port": 3000,
                "connections": 1,
                "comment": "hana"
            })
        );
    }

    #[test]
    fn test_same_target() {
        let a = ServiceChannel {
            id: Some(1),
            abap_cloud_tenant_host: Some("tenant.abap.example.com".to_string()),
            instance_number: Some("20".to_string()),
            ..Default::default()
        };
        let mut b = a.clone();
        b.id = Some(2);
        assert!(a.same_target(&b));

        b.instance_number = Some("21".to_string());
        assert!(!a.same_target(&b));
    }
}
