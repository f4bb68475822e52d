use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{BackendClient, DEFAULT_TIMEOUT};
use crate::{ClientError, Result};

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::UrlParse(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded,
    /// so device identifiers can be passed verbatim.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET an endpoint and decode its JSON body.
    pub(super) async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        self.send_json(self.http.get(url)).await
    }

    /// POST a JSON body and decode the JSON response.
    pub(super) async fn post_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &(impl Serialize + ?Sized),
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");
        self.send_json(self.http.post(url).json(body)).await
    }

    /// POST without a body and decode the JSON response.
    pub(super) async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");
        self.send_json(self.http.post(url)).await
    }

    /// GET an endpoint, succeeding on any 2xx regardless of body.
    pub(super) async fn get_ok(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<()> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        let (status, body) = self.send_raw(self.http.get(url).query(query)).await?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(())
    }

    /// Send a request and return status and body without judging the status.
    pub(super) async fn send_raw(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok((status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let (status, body) = self.send_raw(request).await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers `message`, then `error`; non-JSON bodies yield `None`.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(String::from)
}
