use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// PaymentGateway
///
/// Defines the abstract contract for the external payment provider. The
/// provider is a black box: the application only ever asks it to open a
/// payment intent for an amount and passes the opaque client secret back to
/// the frontend. The trait allows swapping the real Stripe client for the
/// in-memory mock during testing without touching the calling handlers.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for `amount_cents` and returns the client
    /// secret the frontend uses to confirm the payment.
    async fn create_intent(&self, amount_cents: i64) -> Result<String, String>;
}

/// PaymentState
///
/// The concrete type used to share the payment gateway access across the application state.
pub type PaymentState = Arc<dyn PaymentGateway>;

/// IntentResponse
///
/// Minimal struct to deserialize the provider's payment-intent response,
/// capturing only the client secret the application cares about.
#[derive(Deserialize)]
struct IntentResponse {
    client_secret: String,
}

/// StripeClient
///
/// The concrete implementation talking to the Stripe REST API. Stripe's API
/// takes form-encoded bodies and authenticates with the secret key as the
/// basic-auth username.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.to_string(),
            base_url: "https://api.stripe.com".to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_intent(&self, amount_cents: i64) -> Result<String, String> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("payment provider returned {}", response.status()));
        }

        let intent = response
            .json::<IntentResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(intent.client_secret)
    }
}

/// MockPaymentGateway
///
/// A mock implementation of `PaymentGateway` used exclusively for testing.
/// Returns a deterministic secret derived from the amount, so handler tests
/// can assert the conversion to cents without a network connection.
#[derive(Clone)]
pub struct MockPaymentGateway {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(&self, amount_cents: i64) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Payment Error: Simulation requested".to_string());
        }
        Ok(format!("pi_mock_{}_secret_test", amount_cents))
    }
}
