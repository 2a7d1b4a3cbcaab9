//! Payment gateway verification client.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::payments::models::{PaymentReference, Verification, VerifiedPayment};

/// Default upper bound for a single verification call.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for connecting to the payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Verification endpoint, e.g. `"https://pay.example.com/v1/verify"`.
    pub url: String,

    /// Bearer API key sent with every request.
    pub api_key: String,

    /// Upper bound for one verification call, including reading the body.
    pub timeout: Duration,
}

/// HTTP client for the gateway's verification endpoint.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    config: GatewayConfig,
    http: Client,
}

impl HttpPaymentGateway {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn request(&self, reference: &PaymentReference) -> Result<Vec<u8>, GatewayCallError> {
        let response = self
            .http
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&VerifyRequest {
                reference: reference.as_str(),
            })
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayCallError::UnexpectedStatus(format!(
                "verify request failed with status {status}: {text}"
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn verify(&self, reference: &PaymentReference) -> Verification {
        let body = match timeout(self.config.timeout, self.request(reference)).await {
            Ok(Ok(body)) => body,
            Ok(Err(error)) => {
                warn!(%reference, %error, "payment gateway call failed");

                return Verification::TransportFailure {
                    detail: error.to_string(),
                };
            }
            Err(_) => {
                warn!(%reference, timeout = ?self.config.timeout, "payment gateway timed out");

                return Verification::TransportFailure {
                    detail: format!(
                        "gateway did not answer within {}ms",
                        self.config.timeout.as_millis()
                    ),
                };
            }
        };

        let verification = normalize(reference, &body);

        debug!(%reference, ?verification, "payment verification normalised");

        verification
    }
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Ask the gateway whether the payment identified by `reference` succeeded.
    ///
    /// Never fails: transport problems are reported as
    /// [`Verification::TransportFailure`].
    async fn verify(&self, reference: &PaymentReference) -> Verification;
}

/// Turn a raw gateway reply into a [`Verification`].
///
/// Anything that cannot be trusted as an authoritative answer for `requested`
/// becomes a retryable transport failure.
pub(crate) fn normalize(requested: &PaymentReference, body: &[u8]) -> Verification {
    let response: VerifyResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(error) => {
            return Verification::TransportFailure {
                detail: format!("undecodable gateway response: {error}"),
            };
        }
    };

    if !response.success {
        return Verification::NotVerified {
            reason: response
                .error
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| "payment not verified".to_string()),
        };
    }

    let Some(data) = response.data else {
        return malformed("success response without data");
    };

    let Some(amount) = data.amount.as_u64() else {
        return malformed(&format!("amount {} is not a non-negative integer", data.amount));
    };

    let Ok(paid_at) = data.paid_at.parse::<Timestamp>() else {
        return malformed(&format!("unparsable paidAt {:?}", data.paid_at));
    };

    if data.reference.trim() != requested.as_str() {
        return malformed(&format!(
            "gateway answered for reference {:?}",
            data.reference
        ));
    }

    if data.currency.trim().is_empty() {
        return malformed("empty currency");
    }

    Verification::Verified(VerifiedPayment {
        amount,
        currency: data.currency.trim().to_ascii_uppercase(),
        reference: requested.clone(),
        paid_at,
    })
}

fn malformed(detail: &str) -> Verification {
    Verification::TransportFailure {
        detail: format!("malformed gateway response: {detail}"),
    }
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    reference: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,

    #[serde(default)]
    data: Option<VerifyData>,

    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyData {
    amount: Number,
    currency: String,
    reference: String,
    paid_at: String,
}

#[derive(Debug, Error)]
enum GatewayCallError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    UnexpectedStatus(String),
}
