use serde::{Deserialize, Serialize};

/// Maps an internal domain to the virtual domain visible in the cloud.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMapping {
    pub virtual_domain: String,
    pub internal_domain: String,
}
