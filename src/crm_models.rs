use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Flattened quotation summary accepted by the CRM sync webhook.
///
/// Every field is optional; absent text fields become empty strings and
/// the numeric/timestamp fields fall back to fixed defaults. Numbers are
/// forwarded as sent, so an explicit `null` stays `null`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrmSyncRequest {
    pub client_name: Option<String>,
    /// ISO-8601 date.
    pub birthday: Option<String>,
    pub nationality: Option<String>,
    pub phone: Option<String>,
    /// ISO-8601 timestamp; defaults to the time of the sync.
    pub quotation_time: Option<String>,
    /// Defaults to 1.
    pub quotation_round: Value,
    pub quote_detail: Option<String>,
    pub benefits: Option<String>,
    /// Defaults to 0.
    pub exchange_rate: Value,
}

impl Default for CrmSyncRequest {
    fn default() -> Self {
        Self {
            client_name: None,
            birthday: None,
            nationality: None,
            phone: None,
            quotation_time: None,
            quotation_round: json!(1),
            quote_detail: None,
            benefits: None,
            exchange_rate: json!(0),
        }
    }
}

impl CrmSyncRequest {
    /// Maps the request onto the CRM database's property schema.
    pub fn to_properties(&self, now: DateTime<Utc>) -> Value {
        let quotation_time = self
            .quotation_time
            .clone()
            .unwrap_or_else(|| now.to_rfc3339());

        json!({
            "Client Name": title(self.client_name.as_deref()),
            "Birthday": date(self.birthday.as_deref()),
            "Nationality": rich_text(self.nationality.as_deref()),
            "Phone": rich_text(self.phone.as_deref()),
            "Quotation Time": date(Some(&quotation_time)),
            "Quotation Round": { "number": self.quotation_round },
            "Quote Detail": rich_text(self.quote_detail.as_deref()),
            "Benefits": rich_text(self.benefits.as_deref()),
            "Exchange Rate": { "number": self.exchange_rate },
        })
    }
}

fn title(content: Option<&str>) -> Value {
    json!({ "title": [{ "text": { "content": content.unwrap_or_default() } }] })
}

fn rich_text(content: Option<&str>) -> Value {
    json!({ "rich_text": [{ "text": { "content": content.unwrap_or_default() } }] })
}

fn date(start: Option<&str>) -> Value {
    match start {
        Some(start) => json!({ "date": { "start": start } }),
        None => json!({ "date": null }),
    }
}

/// Success body of the CRM sync webhook.
#[derive(Debug, Serialize, Deserialize)]
pub struct CrmSyncResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
