//! Web Push delivery of an empty, VAPID-authenticated message.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;

use super::vapid::{audience_for, VapidSigner};
use crate::config::NotificationConfig;

/// What the push service told us about one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// 404 or 410: the subscription is permanently dead.
    Gone(StatusCode),
    /// Any other error status. The subscription is kept.
    Rejected(StatusCode),
    /// Timeout, refused connection, bad endpoint or signing failure. Treated as transient.
    Failed,
}

impl DeliveryOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => Self::Gone(status),
            s if s.is_client_error() || s.is_server_error() => Self::Rejected(s),
            _ => Self::Delivered,
        }
    }
}

/// Sends tickle pushes on behalf of one VAPID identity. Cheap to clone.
#[derive(Clone)]
pub struct PushClient {
    http: reqwest::Client,
    signer: Arc<VapidSigner>,
    public_key: String,
    ttl_secs: u64,
}

impl PushClient {
    /// `public_key` overrides the key derived from the signer; pass `None` to derive.
    pub fn new(
        http: reqwest::Client,
        signer: Arc<VapidSigner>,
        public_key: Option<String>,
        ttl_secs: u64,
    ) -> Self {
        let public_key = public_key.unwrap_or_else(|| signer.public_key().to_string());
        Self {
            http,
            signer,
            public_key,
            ttl_secs,
        }
    }

    /// HTTP client with the configured per-request timeout.
    pub fn http_client(config: &NotificationConfig) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build push HTTP client")
    }

    /// POST an empty message to `endpoint`. Never returns an error: every
    /// failure is folded into a [`DeliveryOutcome`] and logged here.
    pub async fn deliver(&self, endpoint: &str) -> DeliveryOutcome {
        let token = match audience_for(endpoint).and_then(|aud| self.signer.sign(&aud)) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "could not sign push request");
                return DeliveryOutcome::Failed;
            }
        };

        let response = self
            .http
            .post(endpoint)
            .header("Authorization", format!("WebPush {token}"))
            .header("Crypto-Key", format!("p256ecdsa={}", self.public_key))
            .header("TTL", self.ttl_secs.to_string())
            .body(Vec::new())
            .send()
            .await;

        match response {
            Ok(resp) => {
                let outcome = DeliveryOutcome::from_status(resp.status());
                if let DeliveryOutcome::Rejected(status) = outcome {
                    tracing::warn!(endpoint, status = status.as_u16(), "push service returned error");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "failed to send push");
                DeliveryOutcome::Failed
            }
        }
    }
}
