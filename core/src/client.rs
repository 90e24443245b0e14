//! Request builder, response parser and blocking executor for the DNClear API.
//!
//! # Design
//! `DncClient` holds its configuration and a `Transport`, nothing else. Every
//! operation is available in two layers:
//! - `build_*` produces an `HttpRequest` and `parse_json` / `parse_text`
//!   consume an `HttpResponse`. Neither touches the network.
//! - The operation itself (`add`, `check`, ...) builds, executes through the
//!   transport, and parses, logging a single error event when anything fails.
//!
//! All endpoint-specific knowledge lives in `Endpoint`; `build_request` is the
//! one dispatcher that turns (path, verb, payload) into a request.

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{AddRequest, BatchRequest, CheckQuery, RemoveRequest, RetrieveQuery, WebhookRequest};

pub const API_KEY_HEADER: &str = "x-api-key";

/// How a response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
}

/// The fixed set of remote capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Add,
    Webhook,
    Check,
    Remove,
    Retrieve,
    DumpCsv,
    BatchAdd,
    BatchScan,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Add,
        Endpoint::Webhook,
        Endpoint::Check,
        Endpoint::Remove,
        Endpoint::Retrieve,
        Endpoint::DumpCsv,
        Endpoint::BatchAdd,
        Endpoint::BatchScan,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Add => "/add",
            Endpoint::Webhook => "/webhook/ghl",
            Endpoint::Check => "/check",
            Endpoint::Remove => "/remove",
            Endpoint::Retrieve => "/",
            Endpoint::DumpCsv => "/dump-csv",
            Endpoint::BatchAdd => "/batch-add",
            Endpoint::BatchScan => "/batch-scan",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Endpoint::Check | Endpoint::Retrieve | Endpoint::DumpCsv => HttpMethod::Get,
            Endpoint::Remove => HttpMethod::Delete,
            Endpoint::Add | Endpoint::Webhook | Endpoint::BatchAdd | Endpoint::BatchScan => {
                HttpMethod::Post
            }
        }
    }

    pub fn format(self) -> ResponseFormat {
        match self {
            Endpoint::DumpCsv => ResponseFormat::Text,
            _ => ResponseFormat::Json,
        }
    }

    /// Short name used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Add => "add",
            Endpoint::Webhook => "webhook",
            Endpoint::Check => "check",
            Endpoint::Remove => "remove",
            Endpoint::Retrieve => "retrieve",
            Endpoint::DumpCsv => "dump-csv",
            Endpoint::BatchAdd => "batch-add",
            Endpoint::BatchScan => "batch-scan",
        }
    }
}

/// Synchronous client for the DNClear API.
#[derive(Debug, Clone)]
pub struct DncClient<T = UreqTransport> {
    base_url: String,
    api_key: String,
    transport: T,
}

impl DncClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T> DncClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turn (path, verb, payload) into a request.
    ///
    /// GET payloads become query parameters; POST and DELETE payloads become
    /// the JSON body. Any other verb is rejected here, before a request
    /// exists.
    pub fn build_request<P>(
        &self,
        path: &str,
        method: HttpMethod,
        payload: Option<&P>,
        format: ResponseFormat,
    ) -> Result<HttpRequest, ApiError>
    where
        P: Serialize + ?Sized,
    {
        if !matches!(method, HttpMethod::Get | HttpMethod::Post | HttpMethod::Delete) {
            return Err(ApiError::UnsupportedMethod(method.to_string()));
        }

        let mut headers = vec![(API_KEY_HEADER.to_string(), self.api_key.clone())];
        if format == ResponseFormat::Json {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        let (query, body) = match (method, payload) {
            (_, None) => (Vec::new(), None),
            (HttpMethod::Get, Some(payload)) => (query_pairs(payload)?, None),
            (_, Some(payload)) => {
                let body = serde_json::to_string(payload)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                (Vec::new(), Some(body))
            }
        };

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            query,
            headers,
            body,
        })
    }

    fn build_endpoint<P: Serialize>(
        &self,
        endpoint: Endpoint,
        payload: Option<&P>,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(endpoint.path(), endpoint.method(), payload, endpoint.format())
    }

    pub fn build_add(&self, phone_number: &str) -> Result<HttpRequest, ApiError> {
        let payload = AddRequest {
            phone_number: phone_number.to_string(),
        };
        self.build_endpoint(Endpoint::Add, Some(&payload))
    }

    pub fn build_webhook(&self, phone_number: &str) -> Result<HttpRequest, ApiError> {
        let payload = WebhookRequest {
            phone_number: phone_number.to_string(),
        };
        self.build_endpoint(Endpoint::Webhook, Some(&payload))
    }

    pub fn build_check(&self, phone_number: &str) -> Result<HttpRequest, ApiError> {
        let payload = CheckQuery {
            phone_number: phone_number.to_string(),
        };
        self.build_endpoint(Endpoint::Check, Some(&payload))
    }

    pub fn build_remove(&self, phone_number: &str) -> Result<HttpRequest, ApiError> {
        let payload = RemoveRequest {
            phone_number: phone_number.to_string(),
        };
        self.build_endpoint(Endpoint::Remove, Some(&payload))
    }

    pub fn build_retrieve(&self, page: u32, limit: u32) -> Result<HttpRequest, ApiError> {
        self.build_endpoint(Endpoint::Retrieve, Some(&RetrieveQuery { page, limit }))
    }

    pub fn build_dump_csv(&self) -> Result<HttpRequest, ApiError> {
        self.build_endpoint::<()>(Endpoint::DumpCsv, None)
    }

    pub fn build_batch_add<I, S>(&self, phone_numbers: I) -> Result<HttpRequest, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_endpoint(Endpoint::BatchAdd, Some(&batch(phone_numbers)))
    }

    pub fn build_batch_scan<I, S>(&self, phone_numbers: I) -> Result<HttpRequest, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_endpoint(Endpoint::BatchScan, Some(&batch(phone_numbers)))
    }

    /// Decode a JSON endpoint's response.
    pub fn parse_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Return a text endpoint's body unmodified.
    pub fn parse_text(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        Ok(response.body)
    }
}

impl<T: Transport> DncClient<T> {
    /// Add a number to the DNC list.
    pub fn add(&self, phone_number: &str) -> Result<Value, ApiError> {
        self.dispatch(Endpoint::Add.name(), self.build_add(phone_number), Self::parse_json)
    }

    /// Ingest a number the way the GoHighLevel webhook delivers it.
    pub fn webhook(&self, phone_number: &str) -> Result<Value, ApiError> {
        self.dispatch(Endpoint::Webhook.name(), self.build_webhook(phone_number), Self::parse_json)
    }

    pub fn check(&self, phone_number: &str) -> Result<Value, ApiError> {
        self.dispatch(Endpoint::Check.name(), self.build_check(phone_number), Self::parse_json)
    }

    pub fn remove(&self, phone_number: &str) -> Result<Value, ApiError> {
        self.dispatch(Endpoint::Remove.name(), self.build_remove(phone_number), Self::parse_json)
    }

    /// Fetch one page of listed numbers. Pages start at 1.
    pub fn retrieve(&self, page: u32, limit: u32) -> Result<Value, ApiError> {
        self.dispatch(Endpoint::Retrieve.name(), self.build_retrieve(page, limit), Self::parse_json)
    }

    /// Export the whole list as CSV text, byte-for-byte as served.
    pub fn dump_csv(&self) -> Result<String, ApiError> {
        self.dispatch(Endpoint::DumpCsv.name(), self.build_dump_csv(), Self::parse_text)
    }

    pub fn batch_add<I, S>(&self, phone_numbers: I) -> Result<Value, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch(Endpoint::BatchAdd.name(), self.build_batch_add(phone_numbers), Self::parse_json)
    }

    pub fn batch_scan<I, S>(&self, phone_numbers: I) -> Result<Value, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch(Endpoint::BatchScan.name(), self.build_batch_scan(phone_numbers), Self::parse_json)
    }

    /// Call an arbitrary JSON endpoint with a verb given as text.
    ///
    /// Verbs other than GET, POST and DELETE fail with
    /// `ApiError::UnsupportedMethod` without contacting the server.
    pub fn request(&self, path: &str, method: &str, payload: Option<&Value>) -> Result<Value, ApiError> {
        let request = method
            .parse::<HttpMethod>()
            .and_then(|method| self.build_request(path, method, payload, ResponseFormat::Json));
        self.dispatch(path, request, Self::parse_json)
    }

    fn dispatch<R>(
        &self,
        endpoint: &str,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&Self, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let result = request.and_then(|request| {
            tracing::debug!(endpoint, method = %request.method, url = %request.url, "sending DNC request");
            let response = self.transport.execute(&request)?;
            parse(self, response)
        });
        if let Err(err) = &result {
            tracing::error!(endpoint, error = %err, "DNC request failed");
        }
        result
    }
}

fn batch<I, S>(phone_numbers: I) -> BatchRequest
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    BatchRequest {
        phone_numbers: phone_numbers.into_iter().map(Into::into).collect(),
    }
}

/// Flatten a payload object into query parameters. Strings are sent
/// unquoted and nulls are dropped.
fn query_pairs<P: Serialize + ?Sized>(payload: &P) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ApiError::SerializationError(
            "query payload must be a JSON object".to_string(),
        ));
    };
    Ok(fields
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        403 => Err(ApiError::Forbidden),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
