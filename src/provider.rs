//! The provider root.
//!
//! [`CloudConnectorProvider`] owns the registries of resource and data
//! source handlers and the REST client built by `configure`, and dispatches
//! every [`ProviderService`] call to the handler registered for the type.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::client::RestClient;
use crate::config::ProviderConfig;
use crate::data_sources::{self, DataSource};
use crate::error::ProviderError;
use crate::plan;
use crate::resources::{self, Resource};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use crate::validation::validate;

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// SAP Cloud Connector provider.
pub struct CloudConnectorProvider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
    client: RwLock<Option<Arc<RestClient>>>,
    env: EnvLookup,
}

impl fmt::Debug for CloudConnectorProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConnectorProvider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for CloudConnectorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudConnectorProvider {
    /// A provider that falls back to the process environment.
    pub fn new() -> Self {
        Self::with_env(|var| std::env::var(var).ok())
    }

    /// A provider that falls back to `env` for unset configuration.
    pub fn with_env<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self::build(Arc::new(env), None)
    }

    /// A provider that is already configured with `client`.
    pub fn with_client(client: RestClient) -> Self {
        Self::build(Arc::new(|var: &str| std::env::var(var).ok()), Some(Arc::new(client)))
    }

    fn build(env: EnvLookup, client: Option<Arc<RestClient>>) -> Self {
        let resources = resources::factories()
            .into_iter()
            .map(|factory| {
                let resource = factory();
                (resource.type_name(), resource)
            })
            .collect();
        let data_sources = data_sources::factories()
            .into_iter()
            .map(|factory| {
                let data_source = factory();
                (data_source.type_name(), data_source)
            })
            .collect();

        Self {
            resources,
            data_sources,
            client: RwLock::new(client),
            env,
        }
    }

    /// Whether `configure` has succeeded.
    pub async fn is_configured(&self) -> bool {
        self.client.read().await.is_some()
    }

    async fn client(&self) -> Result<Arc<RestClient>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "provider is not configured, configure must succeed before any other call".to_string(),
            )
        })
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for CloudConnectorProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self
            .resources
            .iter()
            .fold(schema, |s, (name, r)| s.with_resource(*name, r.schema()));
        self.data_sources
            .iter()
            .fold(schema, |s, (name, d)| s.with_data_source(*name, d.schema()))
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&ProviderConfig::schema(), &config))
    }

    #[instrument(skip_all, name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = match ProviderConfig::resolve(&config, |var| (self.env)(var)) {
            Ok(config) => config,
            Err(diagnostics) => return Ok(diagnostics),
        };

        let client = match config.client() {
            Ok(client) => client,
            Err(err) => return Ok(vec![err.to_diagnostic()]),
        };

        info!(instance_url = %config.instance_url, username = %config.username, "Configured Cloud Connector client");
        *self.client.write().await = Some(Arc::new(client));
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        debug!("Stopping provider");
        self.client.write().await.take();
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.resource(resource_type)?.schema(), &config))
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        let result = plan::plan(&schema, prior_state.as_ref(), &proposed_state);
        debug!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Planned"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        resource.create(&client, planned_state).await
    }

    #[instrument(skip(self, current_state))]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        resource.read(&client, current_state).await
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        resource.update(&client, prior_state, planned_state).await
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        resource.delete(&client, current_state).await
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        let state = resource.import(&client, id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.data_source(data_source_type)?.schema(), &config))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        let client = self.client().await?;
        data_source.read(&client, config).await
    }
}
