//! Typed request helpers on top of [`RestClient`].
//!
//! Handlers speak in wire structs; this module serializes request bodies,
//! dispatches to the client by [`Verb`] and deserializes the response.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiResponse, RestClient};
use crate::error::ProviderError;

/// HTTP verbs used by the configuration API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Read.
    Get,
    /// Create.
    Post,
    /// Update.
    Put,
    /// Delete.
    Delete,
}

/// Send a request with an optional serializable body.
pub async fn send<B>(
    client: &RestClient,
    verb: Verb,
    endpoint: &str,
    body: Option<&B>,
) -> Result<ApiResponse, ProviderError>
where
    B: Serialize + ?Sized,
{
    let body = match body {
        Some(body) => serde_json::to_value(body)?,
        None => Value::Null,
    };

    match verb {
        Verb::Get => client.get(endpoint).await,
        Verb::Post => client.post(endpoint, &body).await,
        Verb::Put => client.put(endpoint, &body).await,
        Verb::Delete => client.delete(endpoint).await,
    }
}

/// Send a request and deserialize the JSON response into `T`.
///
/// An empty body is an error here; use [`request_unit`] when the API answers
/// with 204 or a body nobody reads.
pub async fn request_json<T, B>(
    client: &RestClient,
    verb: Verb,
    endpoint: &str,
    body: Option<&B>,
) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    send(client, verb, endpoint, body).await?.json()
}

/// Send a request, discarding the response body.
pub async fn request_unit<B>(
    client: &RestClient,
    verb: Verb,
    endpoint: &str,
    body: Option<&B>,
) -> Result<(), ProviderError>
where
    B: Serialize + ?Sized,
{
    send(client, verb, endpoint, body).await.map(|_| ())
}

/// GET `endpoint` into `T`.
pub async fn get_json<T: DeserializeOwned>(
    client: &RestClient,
    endpoint: &str,
) -> Result<T, ProviderError> {
    request_json(client, Verb::Get, endpoint, None::<&Value>).await
}

/// DELETE `endpoint`.
pub async fn delete(client: &RestClient, endpoint: &str) -> Result<(), ProviderError> {
    request_unit(client, Verb::Delete, endpoint, None::<&Value>).await
}
