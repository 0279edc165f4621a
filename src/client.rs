//! Connection handle for the external index server.
//!
//! [`IndexClient`] owns the HTTP client and the server's base URL. It is
//! constructed explicitly at startup and passed by reference to every
//! operation; there is no process-wide singleton. The underlying
//! `reqwest::Client` is internally reference-counted, so sharing one handle
//! across concurrent requests is cheap.
//!
//! Operation methods (`create_collection`, `upload_one`, `near_media`, ...)
//! are defined in their own modules; this module provides the request
//! plumbing they share: URL construction, JSON encode/decode, and the
//! mapping from HTTP status codes to [`BrocadeError`] kinds.
//!
//! # Examples
//!
//! ```no_run
//! use brocade::client::{IndexClient, ServerConfig};
//!
//! # async fn example() -> brocade::error::Result<()> {
//! let client = IndexClient::new(&ServerConfig::default())?;
//! client.ready().await?;
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{BrocadeError, Result};

/// Network location of the index server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Create a config from explicit parts.
    pub fn new<S: Into<String>, H: Into<String>>(scheme: S, host: H, port: u16) -> Self {
        ServerConfig {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// The base URL this config points at, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Handle to one index server.
///
/// Stateless aside from its target address; all collection state lives
/// server-side.
#[derive(Debug, Clone)]
pub struct IndexClient {
    http: reqwest::Client,
    base_url: String,
}

/// Error envelope the server wraps failure messages in.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl IndexClient {
    /// Create a client for the given server. Performs no I/O.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(IndexClient {
            http,
            base_url: config.base_url(),
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the server's readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`BrocadeError::Transport`] when the server is unreachable and
    /// [`BrocadeError::Api`] when it answers but is not ready.
    pub async fn ready(&self) -> Result<()> {
        let url = self.url("/v1/.well-known/ready");
        let response = self.http.get(&url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_failure(response, "server readiness").await)
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON resource.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response, subject).await
    }

    /// POST a JSON body and decode the JSON response.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        subject: &str,
    ) -> Result<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response, subject).await
    }

    /// DELETE a resource, expecting no response body.
    pub(crate) async fn delete(&self, path: &str, subject: &str) -> Result<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_failure(response, subject).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, subject: &str) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::map_failure(response, subject).await);
        }
        Ok(response.json::<T>().await?)
    }

    /// Turn a non-success response into the matching error kind.
    ///
    /// 404 maps to [`BrocadeError::NotFound`]; everything else surfaces as
    /// [`BrocadeError::Api`] with the message extracted from the server's
    /// error envelope when one is present.
    async fn map_failure(response: reqwest::Response, subject: &str) -> BrocadeError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if status == 404 {
            return BrocadeError::not_found(subject);
        }
        BrocadeError::api(status, extract_message(&body))
    }
}

/// Pull the human-readable message out of the server's error envelope,
/// falling back to the raw body.
fn extract_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(first) = envelope.error.first()
    {
        return first.message.clone();
    }
    if body.is_empty() {
        "(no response body)".to_string()
    } else {
        body.to_string()
    }
}
