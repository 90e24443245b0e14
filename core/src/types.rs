//! Request payloads and response views for the DNClear API.
//!
//! # Design
//! The deployed server reads a different field name per endpoint
//! (`phoneNumber`, `phone`, `phone_number`, `phone_numbers`). The Rust fields
//! are uniform and serde renames them to the wire names, so the JSON stays
//! byte-compatible with the server.
//!
//! Response views mirror the bodies the server documents. Operations return
//! the raw `serde_json::Value`; use [`decode`] for typed access.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of `POST /add`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddRequest {
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
}

/// Body of `POST /webhook/ghl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookRequest {
    #[serde(rename = "phone")]
    pub phone_number: String,
}

/// Query of `GET /check`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckQuery {
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
}

/// Body of `DELETE /remove`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveRequest {
    pub phone_number: String,
}

/// Query of `GET /`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrieveQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for RetrieveQuery {
    fn default() -> Self {
        Self { page: 1, limit: 100 }
    }
}

/// Body of `POST /batch-add` and `POST /batch-scan`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchRequest {
    pub phone_numbers: Vec<String>,
}

/// `POST /add` and a fresh `POST /webhook/ghl`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AddResult {
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub phone_number: String,
    pub in_dnc_list: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoveResult {
    pub message: String,
    pub phone_number: String,
}

/// One page of `GET /`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PhoneNumberPage {
    pub phone_numbers: Vec<String>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BatchAddResult {
    pub added_phone_numbers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BatchScanResult {
    pub matched_phone_numbers: Vec<String>,
}

/// Convert a decoded response into one of the typed views.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
