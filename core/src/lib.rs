//! Synchronous client SDK for the DNClear "Do Not Call" list API.
//!
//! # Overview
//! Wraps the eight DNClear endpoints (add, webhook, check, remove, retrieve,
//! dump-csv, batch-add, batch-scan) as typed calls on `DncClient`. Requests
//! carry the `x-api-key` header; JSON endpoints return a decoded
//! `serde_json::Value` and the CSV export returns raw text.
//!
//! # Design
//! - Host-does-IO: `build_*` produces an `HttpRequest`, `parse_*` consumes an
//!   `HttpResponse`, and a `Transport` performs the round-trip in between.
//! - `DncClient` holds only an explicit `ClientConfig` and its transport;
//!   there is no process-wide state.
//! - Failures are typed (`ApiError`) instead of collapsing to an empty value;
//!   call `.ok()` where an optional result is enough.
//!
//! ```no_run
//! use dnclear_core::{ClientConfig, DncClient};
//!
//! let client = DncClient::new(ClientConfig::new("https://dnc.example.com/api", "key"));
//! let status = client.check("222-222-2222")?;
//! println!("{status}");
//! # Ok::<(), dnclear_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{DncClient, Endpoint, ResponseFormat};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    decode, AddResult, BatchAddResult, BatchScanResult, CheckResult, PhoneNumberPage, RemoveResult,
};
