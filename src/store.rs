use crate::models::{utc_timestamp, Quotation, QuotationId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// In-memory quotation collection with upsert-by-id semantics.
///
/// Records iterate in first-insertion order. A repeated id replaces the
/// existing record at its original position. Nothing is ever removed, so
/// positions recorded in `index` stay valid for the life of the store.
///
/// The store itself does no locking; shared access goes through the
/// lock held in `AppState`.
#[derive(Debug, Default)]
pub struct QuotationStore {
    records: Vec<Quotation>,
    index: HashMap<QuotationId, usize>,
}

impl QuotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a validated quotation stamped with the current UTC time.
    pub fn upsert(&mut self, quotation: Quotation, origin: &str) -> QuotationId {
        self.upsert_at(quotation, origin, Utc::now())
    }

    /// Stores a validated quotation stamped with `received_at`.
    pub fn upsert_at(
        &mut self,
        mut quotation: Quotation,
        origin: &str,
        received_at: DateTime<Utc>,
    ) -> QuotationId {
        quotation.stamp(utc_timestamp(received_at), origin);
        let id = quotation.id();

        match self.index.get(&id) {
            Some(&position) => {
                tracing::debug!("Replacing quotation {} at position {}", id, position);
                self.records[position] = quotation;
            }
            None => {
                tracing::debug!("Appending quotation {}", id);
                self.index.insert(id.clone(), self.records.len());
                self.records.push(quotation);
            }
        }

        id
    }

    /// Snapshot of every record in insertion order.
    pub fn list_all(&self) -> Vec<Quotation> {
        self.records.clone()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}
