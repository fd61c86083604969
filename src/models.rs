use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Field stamped by the store on every create-or-update.
pub const RECEIVED_AT: &str = "received_at";
/// Field stamped by the ingest boundary with the caller's origin address.
pub const RECEIVED_FROM_IP: &str = "received_from_ip";

/// Formats a UTC instant as fixed-width RFC 3339 (microseconds, `Z` suffix).
///
/// Fixed width keeps lexicographic order equal to chronological order,
/// which the listing sort relies on.
pub fn utc_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Canonical identity of a quotation.
///
/// String ids are kept as-is and integer ids use their decimal rendering,
/// so `"1"` and `1` address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotationId(String);

impl QuotationId {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Self(text.clone()),
            Value::Null => Self(String::new()),
            other => Self(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quotation as stored: the caller's payload verbatim plus ingest metadata.
///
/// The record is an open map. Only `id`, `customer_name`, `items` and
/// `total_amount` are guaranteed (by the validator); any other caller
/// fields are preserved untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quotation {
    fields: Map<String, Value>,
}

impl Quotation {
    /// Wraps an already-validated payload.
    pub(crate) fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn id(&self) -> QuotationId {
        self.fields
            .get("id")
            .map(QuotationId::from_value)
            .unwrap_or_else(|| QuotationId(String::new()))
    }

    /// The id exactly as the caller supplied it (string or integer).
    pub fn raw_id(&self) -> Value {
        self.fields.get("id").cloned().unwrap_or(Value::Null)
    }

    pub fn customer_name(&self) -> &str {
        self.str_field("customer_name")
    }

    pub fn items(&self) -> &[Value] {
        self.fields
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_amount(&self) -> Option<&Value> {
        self.fields.get("total_amount")
    }

    /// Empty until the record has been stored.
    pub fn received_at(&self) -> &str {
        self.str_field(RECEIVED_AT)
    }

    pub fn received_from_ip(&self) -> &str {
        self.str_field(RECEIVED_FROM_IP)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Sets the ingest metadata, replacing any caller-supplied values.
    pub(crate) fn stamp(&mut self, received_at: String, origin: &str) {
        self.fields
            .insert(RECEIVED_AT.to_string(), Value::String(received_at));
        self.fields.insert(
            RECEIVED_FROM_IP.to_string(),
            Value::String(origin.to_string()),
        );
    }

    fn str_field(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// Successful ingest response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    /// The stored id, as supplied by the caller.
    #[schema(value_type = Object)]
    pub id: Value,
}

/// Error body shared by every rejected request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Full, unfiltered store contents in insertion order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuotationListResponse {
    #[schema(value_type = Vec<Object>)]
    pub quotations: Vec<Quotation>,
    pub total_count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub quotations_count: usize,
    pub timestamp: String,
}

/// Free-text filters accepted by the listing view.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    /// Matches against id or customer name (case-insensitive substring).
    pub search: Option<String>,
    /// Matches against customer name (case-insensitive substring).
    pub customer: Option<String>,
}
