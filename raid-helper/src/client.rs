use std::fmt;
use std::time::Duration;

use log::warn;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Config;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream answered with {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Body returned by the events endpoint for one server.
///
/// Events are kept as raw JSON values, they only become typed during
/// normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcePayload {
    #[serde(rename = "servername", default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub events: Option<Vec<Value>>,
}

#[derive(Serialize)]
struct EventsRequest<'a> {
    #[serde(rename = "serverid")]
    server_id: &'a str,
    #[serde(rename = "accessToken")]
    access_token: &'a str,
}

/// Fetches the event list of a single server from the Raid-Helper API.
///
/// The underlying `reqwest::Client` is reused across fetches for connection
/// pooling only.
#[derive(Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    timeout: Duration,
}

impl fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SourceClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            timeout: config.timeout,
        }
    }

    /// Like [`SourceClient::try_fetch`], but reports the failure and yields
    /// `None` instead.
    pub async fn fetch(&self, source_id: &str) -> Option<SourcePayload> {
        match self.try_fetch(source_id).await {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!("Failed to fetch events for server {source_id}: {err}");
                None
            }
        }
    }

    pub async fn try_fetch(&self, source_id: &str) -> Result<SourcePayload, SourceError> {
        let response = self
            .http
            .post(&self.base_url)
            .header(header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .json(&EventsRequest {
                server_id: source_id,
                access_token: &self.access_token,
            })
            .send()
            .await
            .map_err(|err| self.classify_error(err, SourceError::Transport))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        response
            .json::<SourcePayload>()
            .await
            .map_err(|err| self.classify_error(err, SourceError::Decode))
    }

    fn classify_error(
        &self,
        err: reqwest::Error,
        otherwise: fn(reqwest::Error) -> SourceError,
    ) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            otherwise(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_body_uses_upstream_field_names() {
        let body = serde_json::to_value(EventsRequest {
            server_id: "902588385607163955",
            access_token: "secret",
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "serverid": "902588385607163955", "accessToken": "secret" })
        );
    }

    #[test]
    fn payload_tolerates_missing_and_null_fields() {
        let payload: SourcePayload = serde_json::from_value(json!({ "events": null })).unwrap();
        assert!(payload.server_name.is_none());
        assert!(payload.events.is_none());

        let payload: SourcePayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.events.is_none());
    }

    #[test]
    fn debug_output_hides_access_token() {
        let client = SourceClient::new(&Config::new("very-secret-token"));
        assert!(!format!("{client:?}").contains("very-secret-token"));
    }
}
