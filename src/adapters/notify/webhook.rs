//! Webhook review notifier - POSTs escalation records to the review service.
//!
//! Delivery is best-effort with a short timeout; the caller fires and
//! forgets, so a slow or broken review service never delays a verdict.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::ports::{EscalationRecord, NotifyError, ReviewNotifier};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// `ReviewNotifier` that delivers escalations over HTTP.
pub struct WebhookReviewNotifier {
    client: Client,
    endpoint: String,
}

impl WebhookReviewNotifier {
    /// Creates a notifier POSTing to `{base_url}/review/escalations`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            endpoint: format!(
                "{}/review/escalations",
                base_url.into().trim_end_matches('/')
            ),
        }
    }
}

#[async_trait]
impl ReviewNotifier for WebhookReviewNotifier {
    async fn notify_human_review(&self, record: EscalationRecord) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&record)
            .send()
            .await
            .map_err(|e| {
                error!(journey_id = %record.journey_id, error = %e, "escalation webhook failed");
                NotifyError::new(e.to_string())
            })?;

        if response.status().is_success() {
            info!(journey_id = %record.journey_id, "escalation delivered to review service");
            Ok(())
        } else {
            let status = response.status();
            error!(
                journey_id = %record.journey_id,
                status = %status,
                "review service rejected escalation"
            );
            Err(NotifyError::new(format!("HTTP {}", status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let notifier = WebhookReviewNotifier::new("https://review.example.com/");
        assert_eq!(
            notifier.endpoint,
            "https://review.example.com/review/escalations"
        );
    }
}
