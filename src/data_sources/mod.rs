//! Read-only data sources.
//!
//! Every managed entity has a singular data source, looked up by the same
//! identity attributes as its resource, and a plural one that lists all
//! entities under a parent. Schemas are derived from the resource schemas so
//! both always expose the same attributes.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::RestClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

pub mod domain_mapping;
pub mod service_channel;
pub mod subaccount;
pub mod system_mapping;
pub mod system_mapping_resource;

/// Read handler for one data source type.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `sapcc_domain_mappings`.
    fn type_name(&self) -> &'static str;

    /// Schema of the data source.
    fn schema(&self) -> Schema;

    /// Look up the entity (or entities) selected by `config`.
    async fn read(&self, client: &RestClient, config: Value) -> Result<Value, ProviderError>;
}

/// Constructor registered with the provider.
pub type DataSourceFactory = fn() -> Box<dyn DataSource>;

/// Every data source this provider serves.
pub fn factories() -> Vec<DataSourceFactory> {
    vec![
        subaccount::new_single,
        subaccount::new_list,
        domain_mapping::new_single,
        domain_mapping::new_list,
        system_mapping::new_single,
        system_mapping::new_list,
        system_mapping_resource::new_single,
        system_mapping_resource::new_list,
        service_channel::new_k8s_single,
        service_channel::new_k8s_list,
        service_channel::new_abap_cloud_single,
        service_channel::new_abap_cloud_list,
    ]
}

/// Lookup attributes of subaccount-scoped data sources.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubaccountKey {
    pub region_host: String,
    pub subaccount: String,
}

/// Lookup attributes of data sources scoped to a system mapping.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SystemMappingKey {
    pub region_host: String,
    pub subaccount: String,
    pub virtual_host: String,
    pub virtual_port: String,
}

/// Derive a data source schema from a resource schema.
///
/// `keys` become required lookup attributes, everything else is computed.
/// Sensitive attributes and those in `omit` are dropped since the API never
/// returns them.
pub(crate) fn lookup_schema(resource: Schema, keys: &[&str], omit: &[&str]) -> Schema {
    let mut schema = Schema::v0();
    schema.description = resource.description;
    for (name, attr) in resource.attributes {
        if keys.contains(&name.as_str()) {
            schema = schema.with_attribute(name, reflag(attr, AttributeFlags::required()));
        } else if !attr.flags.sensitive && !omit.contains(&name.as_str()) {
            schema = schema.with_attribute(name, reflag(attr, AttributeFlags::computed()));
        }
    }
    schema
}

/// Schema of a plural data source: the `keys` of `item` as lookup attributes
/// and a computed `list_attribute` holding the remaining attributes of each
/// entity.
pub(crate) fn list_schema(
    item: &Schema,
    keys: &[&str],
    list_attribute: &str,
    description: &str,
) -> Schema {
    let mut schema = Schema::v0().with_description(description);
    for key in keys {
        if let Some(attr) = item.attribute(key) {
            schema = schema.with_attribute(*key, attr.clone());
        }
    }
    let element = AttributeType::object(
        item.attributes
            .iter()
            .filter(|(name, _)| !keys.contains(&name.as_str()))
            .map(|(name, attr)| (name.clone(), attr.attr_type.clone())),
    );
    schema.with_attribute(list_attribute, Attribute::computed(AttributeType::list(element)))
}

fn reflag(attr: Attribute, flags: AttributeFlags) -> Attribute {
    Attribute {
        flags,
        force_new: false,
        ..attr
    }
}

/// Keep only the top-level keys `schema` declares.
pub(crate) fn project(schema: &Schema, value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| schema.attributes.contains_key(k))
                .collect(),
        ),
        other => other,
    }
}

/// Keep the keys of `item` except the lookup `keys`, for one list element.
pub(crate) fn list_element(item: &Schema, keys: &[&str], value: Value) -> Value {
    match project(item, value) {
        Value::Object(mut map) => {
            for key in keys {
                map.remove(*key);
            }
            Value::Object(map)
        },
        other => other,
    }
}

/// Output of a plural data source: the lookup values plus the list.
pub(crate) fn list_output(
    lookup: &[(&str, &str)],
    list_attribute: &str,
    elements: Vec<Value>,
) -> Value {
    let mut map: Map<String, Value> = lookup
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    map.insert(list_attribute.to_string(), Value::Array(elements));
    Value::Object(map)
}
