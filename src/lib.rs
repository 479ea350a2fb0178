//! SAP Cloud Connector provider
//!
//! Manages the configuration of an SAP Cloud Connector through its REST
//! administration API: subaccounts, domain mappings, system mappings and
//! their resources, and service channels.
//!
//! # Overview
//!
//! The crate is organised in layers, leaves first:
//!
//! - **[`client`]**: a small REST client with basic auth and status classification
//! - **[`endpoints`]**: builders for every configuration API path
//! - **[`request`]**: typed JSON request helpers on top of the client
//! - **[`api`]**: wire models of the configuration API
//! - **[`resources`]** and **[`data_sources`]**: one handler per type
//! - **[`provider`]**: the [`ProviderService`] implementation the host drives
//!
//! Every handler call is a short series of request/response round trips.
//! A non-2xx answer becomes [`ProviderError::Api`], which the host turns
//! into a diagnostic via [`ProviderError::to_diagnostic`].
//!
//! # Quick Start
//!
//! ```ignore
//! use sapcc_provider::{CloudConnectorProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     sapcc_provider::init_logging();
//!
//!     let provider = CloudConnectorProvider::new();
//!     let diagnostics = provider
//!         .configure(json!({"instance_url": "https://scc.example.com:8443"}))
//!         .await?;
//!     assert!(diagnostics.is_empty(), "CC_USERNAME and CC_PASSWORD supply the rest");
//!
//!     let mappings = provider
//!         .read_data_source(
//!             "sapcc_domain_mappings",
//!             json!({"region_host": "cf.eu10.hana.ondemand.com", "subaccount": "abc"}),
//!         )
//!         .await?;
//!     println!("{}", mappings["domain_mappings"]);
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! | Attribute      | Environment variable | |
//! |----------------|----------------------|-|
//! | `instance_url` | `CC_INSTANCE_URL`    | `https://host:port` of the Cloud Connector |
//! | `username`     | `CC_USERNAME`        | administrator user |
//! | `password`     | `CC_PASSWORD`        | administrator password (sensitive) |
//!
//! Attribute values win over the environment. Logging honours `RUST_LOG`.

#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod config;
pub mod data_sources;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod request;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

pub use client::{ApiResponse, RestClient};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::CloudConnectorProvider;
pub use schema::{Diagnostic, ProviderSchema};
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

pub use serde_json;
pub use tracing;
