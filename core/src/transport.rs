//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the single I/O seam of the crate. `DncClient` is generic
//! over it so tests can substitute a recording implementation while the
//! default `UreqTransport` performs blocking HTTP.
//!
//! `UreqTransport` disables ureq's status-code-as-error behavior: 4xx/5xx
//! responses come back as data and the client decides what they mean.

use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round-trip. Returns `Err` only when no response was
    /// received; non-2xx statuses are returned as `Ok`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let body = request.body.as_deref();
        let mut response = match (request.method, body) {
            (HttpMethod::Get, _) => decorate(self.agent.get(&request.url), request).call()?,
            (HttpMethod::Post, Some(body)) => {
                decorate(self.agent.post(&request.url), request).send(body.as_bytes())?
            }
            (HttpMethod::Post, None) => decorate(self.agent.post(&request.url), request).send_empty()?,
            // DELETE /remove identifies the number in a JSON body.
            (HttpMethod::Delete, Some(body)) => {
                decorate(self.agent.delete(&request.url).force_send_body(), request)
                    .send(body.as_bytes())?
            }
            (HttpMethod::Delete, None) => decorate(self.agent.delete(&request.url), request).call()?,
            (other, _) => return Err(ApiError::UnsupportedMethod(other.to_string())),
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        // CSV dumps can exceed ureq's default 10 MB read limit.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        // A response arrived, so a bad encoding is a decode failure.
        let body = String::from_utf8(bytes)
            .map_err(|e| ApiError::DeserializationError(format!("response body is not UTF-8: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn decorate<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    builder
}
