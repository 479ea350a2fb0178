//! REST paths of the Cloud Connector configuration API.
//!
//! Pure string builders; the client joins them onto the instance URL.
//! Identifier segments are percent-encoded.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use url::form_urlencoded;

use crate::api::ChannelKind;

/// Root of the configuration API.
pub const CONFIGURATION_ROOT: &str = "/api/v1/configuration";

/// All subaccounts.
pub fn subaccounts() -> String {
    format!("{}/subaccounts", CONFIGURATION_ROOT)
}

/// A single subaccount.
pub fn subaccount(region_host: &str, subaccount: &str) -> String {
    format!("{}/{}/{}", subaccounts(), segment(region_host), segment(subaccount))
}

/// Tunnel state (connect/disconnect) of a subaccount.
pub fn subaccount_state(region_host: &str, subaccount_id: &str) -> String {
    format!("{}/state", subaccount(region_host, subaccount_id))
}

/// Domain mappings of a subaccount.
pub fn domain_mappings(region_host: &str, subaccount_id: &str) -> String {
    format!("{}/domainMappings", subaccount(region_host, subaccount_id))
}

/// A single domain mapping, addressed by its internal domain.
pub fn domain_mapping(region_host: &str, subaccount_id: &str, internal_domain: &str) -> String {
    format!(
        "{}/{}",
        domain_mappings(region_host, subaccount_id),
        segment(internal_domain)
    )
}

/// System mappings of a subaccount.
pub fn system_mappings(region_host: &str, subaccount_id: &str) -> String {
    format!("{}/systemMappings", subaccount(region_host, subaccount_id))
}

/// A single system mapping, addressed as `virtualHost:virtualPort`.
pub fn system_mapping(
    region_host: &str,
    subaccount_id: &str,
    virtual_host: &str,
    virtual_port: &str,
) -> String {
    format!(
        "{}/{}:{}",
        system_mappings(region_host, subaccount_id),
        segment(virtual_host),
        segment(virtual_port)
    )
}

/// Resources exposed through a system mapping.
pub fn system_mapping_resources(
    region_host: &str,
    subaccount_id: &str,
    virtual_host: &str,
    virtual_port: &str,
) -> String {
    format!(
        "{}/resources",
        system_mapping(region_host, subaccount_id, virtual_host, virtual_port)
    )
}

/// A single system mapping resource.
///
/// The resource id is a URL path, so it travels base64url-encoded.
pub fn system_mapping_resource(
    region_host: &str,
    subaccount_id: &str,
    virtual_host: &str,
    virtual_port: &str,
    resource_id: &str,
) -> String {
    format!(
        "{}/{}",
        system_mapping_resources(region_host, subaccount_id, virtual_host, virtual_port),
        encode_resource_id(resource_id)
    )
}

/// Percent-encode an identifier so it stays a single path segment.
fn segment(raw: &str) -> String {
    // Form encoding writes spaces as '+', which a path would keep literally.
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Encode a resource id for use as a path segment.
pub fn encode_resource_id(resource_id: &str) -> String {
    URL_SAFE.encode(resource_id.as_bytes())
}

/// Service channels of one kind.
pub fn service_channels(region_host: &str, subaccount_id: &str, kind: ChannelKind) -> String {
    format!(
        "{}/channels/{}",
        subaccount(region_host, subaccount_id),
        kind.path_segment()
    )
}

/// A single service channel.
pub fn service_channel(region_host: &str, subaccount_id: &str, kind: ChannelKind, id: i64) -> String {
    format!(
        "{}/{}",
        service_channels(region_host, subaccount_id, kind),
        id
    )
}

/// Enabled state of a service channel.
pub fn service_channel_state(
    region_host: &str,
    subaccount_id: &str,
    kind: ChannelKind,
    id: i64,
) -> String {
    format!(
        "{}/state",
        service_channel(region_host, subaccount_id, kind, id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: &str = "cf.eu10.hana.ondemand.com";
    const SUB: &str = "0bcb0012-a982-42f9-bda4-0a5cb15f88c8";

    #[test]
    fn test_subaccount_paths() {
        assert_eq!(subaccounts(), "/api/v1/configuration/subaccounts");
        assert_eq!(
            subaccount(REGION, SUB),
            format!("/api/v1/configuration/subaccounts/{}/{}", REGION, SUB)
        );
        assert_eq!(
            subaccount_state(REGION, SUB),
            format!("/api/v1/configuration/subaccounts/{}/{}/state", REGION, SUB)
        );
    }

    #[test]
    fn test_domain_mapping_paths() {
        assert!(domain_mappings(REGION, SUB).ends_with(&format!("{}/domainMappings", SUB)));
        assert!(domain_mapping(REGION, SUB, "intern.corp").ends_with("/domainMappings/intern.corp"));
    }

    #[test]
    fn test_system_mapping_paths() {
        assert!(system_mapping(REGION, SUB, "virtual.erp", "44300")
            .ends_with("/systemMappings/virtual.erp:44300"));
        assert!(system_mapping_resources(REGION, SUB, "virtual.erp", "44300")
            .ends_with("/systemMappings/virtual.erp:44300/resources"));
    }

    #[test]
    fn test_system_mapping_resource_id_is_encoded() {
        assert_eq!(encode_resource_id("/sap/opu/odata"), "L3NhcC9vcHUvb2RhdGE=");
        let path = system_mapping_resource(REGION, SUB, "virtual.erp", "44300", "/sap/opu/odata");
        assert!(path.ends_with("/resources/L3NhcC9vcHUvb2RhdGE="));
        assert!(!path.ends_with("/sap/opu/odata"));
    }

    #[test]
    fn test_identifiers_cannot_escape_their_segment() {
        assert!(domain_mapping(REGION, SUB, "intern.corp?x=1#frag")
            .ends_with("/domainMappings/intern.corp%3Fx%3D1%23frag"));
        assert!(subaccount(REGION, "a/b c").ends_with("/a%2Fb%20c"));
        assert!(system_mapping(REGION, SUB, "erp host", "443")
            .ends_with("/systemMappings/erp%20host:443"));
    }

    #[test]
    fn test_service_channel_paths() {
        assert!(service_channels(REGION, SUB, ChannelKind::K8s).ends_with("/channels/K8S"));
        assert!(service_channel(REGION, SUB, ChannelKind::AbapCloud, 3)
            .ends_with("/channels/ABAPCloud/3"));
        assert!(service_channel_state(REGION, SUB, ChannelKind::K8s, 7)
            .ends_with("/channels/K8S/7/state"));
    }
}
