use crate::error::Result;
use crate::lead::LeadRecord;
use std::time::Duration;

/// Fire-and-forget POST of finalized leads to one fixed endpoint.
///
/// No retry, no backoff. Only transport failures are errors; the receiver's
/// HTTP status is reported back but a non-2xx answer still counts as sent.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    url: String,
    timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `record` as a flat JSON object. Blocking; call it from a
    /// blocking thread. The client is built per call so it never outlives
    /// that thread.
    pub fn deliver(&self, record: &LeadRecord) -> Result<Delivery> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.post(&self.url).json(record).send()?;
        let delivery = Delivery {
            status: response.status().as_u16(),
        };
        if delivery.is_success() {
            tracing::info!(status = delivery.status, "lead delivered to webhook");
        } else {
            tracing::warn!(
                status = delivery.status,
                url = %self.url,
                "webhook answered with a non-success status"
            );
        }
        Ok(delivery)
    }
}
