//! In-memory implementation of the DNClear API for tests and local runs.
//!
//! Numbers are sanitized to ten digits before they are stored or compared,
//! so `+1 (727) 266-0666` and `727-266-0666` are the same entry. Every route
//! sits behind an `x-api-key` check.

use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub struct AppState {
    api_key: String,
    numbers: RwLock<BTreeSet<String>>,
}

pub type Db = Arc<AppState>;

type Reply = (StatusCode, Json<Value>);

#[derive(Deserialize)]
pub struct AddBody {
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct WebhookBody {
    pub phone: Option<String>,
}

/// The server historically read `phone_number` here while the SDKs send
/// `phoneNumber`; both are accepted.
#[derive(Deserialize)]
pub struct CheckParams {
    #[serde(rename = "phoneNumber", alias = "phone_number")]
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct RemoveBody {
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize)]
pub struct BatchBody {
    pub phone_numbers: Option<Vec<String>>,
}

pub fn app(api_key: &str) -> Router {
    let db: Db = Arc::new(AppState {
        api_key: api_key.to_string(),
        numbers: RwLock::new(BTreeSet::new()),
    });
    Router::new()
        .route("/", get(retrieve))
        .route("/add", post(add))
        .route("/webhook/ghl", post(webhook))
        .route("/check", get(check))
        .route("/remove", delete(remove))
        .route("/dump-csv", get(dump_csv))
        .route("/batch-add", post(batch_add))
        .route("/batch-scan", post(batch_scan))
        .layer(middleware::from_fn_with_state(db.clone(), authenticate))
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

/// Reduce a phone number to its last ten digits, dropping a leading US `1`
/// or Indian `91` country code.
pub fn sanitize_phone_number(phone_number: &str) -> String {
    let mut digits: String = phone_number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    } else if digits.len() == 12 && digits.starts_with("91") {
        digits.drain(..2);
    }
    if digits.len() > 10 {
        digits.drain(..digits.len() - 10);
    }
    digits
}

async fn authenticate(State(db): State<Db>, request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if key != Some(db.api_key.as_str()) {
        tracing::warn!(?key, "invalid API key");
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "Forbidden" }))).into_response();
    }
    next.run(request).await
}

fn missing_phone() -> Reply {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Phone number is required" })),
    )
}

fn required(phone_number: Option<String>) -> Option<String> {
    phone_number.filter(|p| !p.is_empty())
}

async fn add(State(db): State<Db>, Json(input): Json<AddBody>) -> Reply {
    let Some(phone_number) = required(input.phone_number) else {
        return missing_phone();
    };
    let sanitized = sanitize_phone_number(&phone_number);
    if !db.numbers.write().await.insert(sanitized.clone()) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Phone number already exists" })),
        );
    }
    (StatusCode::OK, Json(json!({ "phone_number": sanitized })))
}

async fn webhook(State(db): State<Db>, Json(input): Json<WebhookBody>) -> Reply {
    tracing::info!("received GHL webhook");
    let Some(phone_number) = required(input.phone) else {
        tracing::info!("phone number missing from webhook payload");
        return missing_phone();
    };
    let sanitized = sanitize_phone_number(&phone_number);
    if !db.numbers.write().await.insert(sanitized.clone()) {
        tracing::info!(phone_number = %sanitized, "phone number already exists");
        return (
            StatusCode::OK,
            Json(json!({ "message": "Phone number already exists" })),
        );
    }
    tracing::info!(phone_number = %sanitized, "phone number added from webhook");
    (StatusCode::OK, Json(json!({ "phone_number": sanitized })))
}

async fn check(State(db): State<Db>, Query(params): Query<CheckParams>) -> Reply {
    let Some(phone_number) = required(params.phone_number) else {
        return missing_phone();
    };
    let sanitized = sanitize_phone_number(&phone_number);
    let in_dnc_list = db.numbers.read().await.contains(&sanitized);
    (
        StatusCode::OK,
        Json(json!({ "phone_number": sanitized, "in_dnc_list": in_dnc_list })),
    )
}

async fn remove(State(db): State<Db>, Json(input): Json<RemoveBody>) -> Reply {
    let Some(phone_number) = required(input.phone_number) else {
        return missing_phone();
    };
    let sanitized = sanitize_phone_number(&phone_number);
    if !db.numbers.write().await.remove(&sanitized) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Phone number not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "Phone number removed", "phone_number": sanitized })),
    )
}

/// Non-numeric or zero values fall back to the default.
fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

async fn retrieve(State(db): State<Db>, Query(params): Query<PageParams>) -> Reply {
    let page = positive_or(params.page.as_deref(), 1);
    let limit = positive_or(params.limit.as_deref(), 100);
    let start = (page - 1).saturating_mul(limit);

    let numbers = db.numbers.read().await;
    let phone_numbers: Vec<&String> = numbers.iter().skip(start).take(limit).collect();
    (
        StatusCode::OK,
        Json(json!({
            "phone_numbers": phone_numbers,
            "page": page,
            "limit": limit,
            "total": numbers.len(),
        })),
    )
}

async fn dump_csv(State(db): State<Db>) -> impl IntoResponse {
    let numbers = db.numbers.read().await;
    let mut csv = String::from("phone_number\n");
    for number in numbers.iter() {
        csv.push_str(number);
        csv.push('\n');
    }
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"dnc_list.csv\""),
        ],
        csv,
    )
}

async fn batch_add(State(db): State<Db>, Json(input): Json<BatchBody>) -> Reply {
    let Some(phone_numbers) = input.phone_numbers else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "phone_numbers array is required" })),
        );
    };
    let mut numbers = db.numbers.write().await;
    let added: Vec<String> = phone_numbers
        .iter()
        .map(|p| sanitize_phone_number(p))
        .filter(|p| !p.is_empty() && numbers.insert(p.clone()))
        .collect();
    (StatusCode::OK, Json(json!({ "added_phone_numbers": added })))
}

async fn batch_scan(State(db): State<Db>, Json(input): Json<BatchBody>) -> Reply {
    let Some(phone_numbers) = input.phone_numbers else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "phone_numbers array is required" })),
        );
    };
    let numbers = db.numbers.read().await;
    let mut matched: Vec<String> = Vec::new();
    for sanitized in phone_numbers.iter().map(|p| sanitize_phone_number(p)) {
        if numbers.contains(&sanitized) && !matched.contains(&sanitized) {
            matched.push(sanitized);
        }
    }
    (StatusCode::OK, Json(json!({ "matched_phone_numbers": matched })))
}
