//! Provider configuration.
//!
//! Each setting comes from the provider block first and falls back to its
//! environment variable. The environment lookup is a parameter so callers
//! (and tests) decide where values come from.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::client::RestClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Environment variable for the instance URL.
pub const ENV_INSTANCE_URL: &str = "CC_INSTANCE_URL";
/// Environment variable for the user name.
pub const ENV_USERNAME: &str = "CC_USERNAME";
/// Environment variable for the password.
pub const ENV_PASSWORD: &str = "CC_PASSWORD";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    instance_url: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the Cloud Connector administration endpoint.
    pub instance_url: Url,
    /// User name for basic auth.
    pub username: String,
    /// Password for basic auth.
    pub password: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("instance_url", &self.instance_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Manages the configuration of an SAP Cloud Connector instance.")
            .with_attribute(
                "instance_url",
                Attribute::optional_string().with_description(format!(
                    "URL of the Cloud Connector, e.g. https://scc.example.com:8443. Falls back to {}.",
                    ENV_INSTANCE_URL
                )),
            )
            .with_attribute(
                "username",
                Attribute::optional_string().with_description(format!(
                    "Administrator user name. Falls back to {}.",
                    ENV_USERNAME
                )),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "Administrator password. Falls back to {}.",
                        ENV_PASSWORD
                    )),
            )
    }

    /// Resolve settings from the provider block with `env` as fallback.
    ///
    /// Returns one error diagnostic per missing or invalid setting.
    pub fn resolve<F>(config: &Value, env: F) -> Result<Self, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = match config {
            Value::Null => RawConfig::default(),
            other => serde_json::from_value(other.clone()).map_err(|e| {
                vec![Diagnostic::error("Invalid provider configuration").with_detail(e.to_string())]
            })?,
        };

        let pick = |value: Option<String>, var: &str| {
            value
                .filter(|v| !v.is_empty())
                .or_else(|| env(var).filter(|v| !v.is_empty()))
        };

        let instance_url = pick(raw.instance_url, ENV_INSTANCE_URL);
        let username = pick(raw.username, ENV_USERNAME);
        let password = pick(raw.password, ENV_PASSWORD);

        let mut diagnostics = Vec::new();
        let instance_url = match instance_url {
            None => {
                diagnostics.push(missing("instance_url", "instance URL", ENV_INSTANCE_URL));
                None
            },
            Some(raw_url) => match parse_instance_url(&raw_url) {
                Ok(url) => Some(url),
                Err(detail) => {
                    diagnostics.push(
                        Diagnostic::error("Invalid Cloud Connector instance URL")
                            .with_detail(detail)
                            .with_attribute("instance_url"),
                    );
                    None
                },
            },
        };
        if username.is_none() {
            diagnostics.push(missing("username", "username", ENV_USERNAME));
        }
        if password.is_none() {
            diagnostics.push(missing("password", "password", ENV_PASSWORD));
        }

        match (instance_url, username, password) {
            (Some(instance_url), Some(username), Some(password)) if diagnostics.is_empty() => {
                Ok(Self {
                    instance_url,
                    username,
                    password,
                })
            },
            _ => Err(diagnostics),
        }
    }

    /// Build the REST client for these settings.
    pub fn client(&self) -> Result<RestClient, ProviderError> {
        RestClient::new(self.instance_url.as_str(), &self.username, &self.password)
    }
}

fn parse_instance_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "'{}' uses scheme '{}', expected http or https",
            raw, other
        )),
    }
}

fn missing(attribute: &str, what: &str, var: &str) -> Diagnostic {
    Diagnostic::error(format!("Missing Cloud Connector {}", what))
        .with_detail(format!(
            "Set '{}' in the provider configuration or the {} environment variable.",
            attribute, var
        ))
        .with_attribute(attribute)
}
