//! Completion side effects for a finalized lead: append to the store, then
//! POST to the webhook. The two attempts are independent; a failure in one
//! becomes a warning and never stops the other.

use crate::lead::LeadRecord;
use crate::store::LeadStore;
use crate::webhook::WebhookClient;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub const SUCCESS_MESSAGE: &str = "Thanks! Our property expert will contact you shortly.";

/// Serialized as `{kind, detail, message}`; `message` is the banner text
/// the page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionWarning {
    /// The store could not be read or written. The row is lost.
    PersistenceWriteFailure(String),
    /// The webhook POST failed in transport. Not retried.
    DeliveryFailure(String),
}

impl std::fmt::Display for CompletionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionWarning::PersistenceWriteFailure(e) => {
                write!(f, "Could not write to the lead store (is the file open?): {e}")
            }
            CompletionWarning::DeliveryFailure(e) => {
                write!(f, "Failed to send the lead to the webhook: {e}")
            }
        }
    }
}

impl CompletionWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionWarning::PersistenceWriteFailure(_) => "persistence_write_failure",
            CompletionWarning::DeliveryFailure(_) => "delivery_failure",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            CompletionWarning::PersistenceWriteFailure(e)
            | CompletionWarning::DeliveryFailure(e) => e,
        }
    }
}

impl Serialize for CompletionWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CompletionWarning", 3)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("detail", self.detail())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    pub record: LeadRecord,
    pub stored: bool,
    /// HTTP status returned by the webhook, if the request went out.
    pub webhook_status: Option<u16>,
    pub warnings: Vec<CompletionWarning>,
}

/// Run both side effects for `record`. Blocking.
pub fn complete(
    record: LeadRecord,
    store: &LeadStore,
    webhook: &WebhookClient,
) -> CompletionOutcome {
    let mut warnings = Vec::new();

    let stored = match store.append(&record) {
        Ok(()) => {
            tracing::info!(path = %store.path().display(), "lead saved");
            true
        }
        Err(e) => {
            tracing::warn!(path = %store.path().display(), error = %e, "could not save lead");
            warnings.push(CompletionWarning::PersistenceWriteFailure(e.to_string()));
            false
        }
    };

    let webhook_status = match webhook.deliver(&record) {
        Ok(delivery) => Some(delivery.status),
        Err(e) => {
            tracing::warn!(url = %webhook.url(), error = %e, "webhook delivery failed");
            warnings.push(CompletionWarning::DeliveryFailure(e.to_string()));
            None
        }
    };

    CompletionOutcome {
        record,
        stored,
        webhook_status,
        warnings,
    }
}
