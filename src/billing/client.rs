//! REST client for the billing provider's checkout and portal APIs.
//!
//! The provider speaks form-encoded requests and JSON responses. The client
//! is built once at startup and injected through `AppState`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::logging::pii::Redacted;

const API_BASE: &str = "https://api.stripe.com";

/// Checkout session fields the verify flow reads back after a purchase.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    /// Bare id string; nothing is expanded on retrieval.
    pub customer: Option<String>,
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

impl CheckoutSession {
    /// Buyer email, preferring the explicit field over the billing details.
    pub fn email(&self) -> Option<&str> {
        self.customer_email.as_deref().or_else(|| {
            self.customer_details
                .as_ref()
                .and_then(|details| details.email.as_deref())
        })
    }
}

/// Both checkout and portal creation answer with a hosted-page URL.
#[derive(Debug, Deserialize)]
struct SessionLink {
    url: Option<String>,
}

#[derive(Clone)]
pub struct BillingClient {
    client: reqwest::Client,
    secret_key: String,
    price_id: String,
    public_base_url: String,
}

impl BillingClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::config(format!("billing http client: {e}")))?;
        Ok(Self {
            client,
            secret_key: config.stripe_secret_key.clone(),
            price_id: config.stripe_price_id.clone(),
            public_base_url: config.public_base_url.clone(),
        })
    }

    /// Start a subscription checkout; returns the hosted page URL.
    pub async fn create_checkout_session(&self, email: Option<&str>) -> Result<String, AppError> {
        let form = self.checkout_form(email);
        let response = self.post_form("/v1/checkout/sessions", &form).await?;
        let link: SessionLink = read_json(response, "checkout session").await?;
        link.url
            .ok_or_else(|| AppError::upstream("checkout session carried no url"))
    }

    /// Fetch a checkout session after the success redirect.
    pub async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, AppError> {
        let response = self
            .client
            .get(format!("{API_BASE}/v1/checkout/sessions/{id}"))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("billing provider unreachable: {e}")))?;
        let response = check_status(response).await?;
        read_json(response, "checkout session").await
    }

    /// Open the self-serve billing portal for an existing customer.
    pub async fn create_portal_session(&self, customer_id: &str) -> Result<String, AppError> {
        let form = self.portal_form(customer_id);
        let response = self.post_form("/v1/billing_portal/sessions", &form).await?;
        let link: SessionLink = read_json(response, "portal session").await?;
        link.url
            .ok_or_else(|| AppError::upstream("portal session carried no url"))
    }

    fn checkout_form(&self, email: Option<&str>) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "success_url",
                // The provider substitutes the placeholder on redirect.
                format!(
                    "{}/api/auth/verify?checkout_session={{CHECKOUT_SESSION_ID}}",
                    self.public_base_url
                ),
            ),
            ("cancel_url", self.public_base_url.clone()),
            ("allow_promotion_codes", "true".to_string()),
            ("billing_address_collection", "required".to_string()),
            (
                "subscription_data[metadata][source]",
                "toolgate_website".to_string(),
            ),
        ];
        if let Some(email) = email {
            form.push(("customer_email", email.to_string()));
        }
        form
    }

    fn portal_form(&self, customer_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("customer", customer_id.to_string()),
            ("return_url", format!("{}/dashboard", self.public_base_url)),
        ]
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(&'static str, String)],
    ) -> Result<reqwest::Response, AppError> {
        let response = self
            .client
            .post(format!("{API_BASE}{path}"))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("billing provider unreachable: {e}")))?;
        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    tracing::error!(
        status = status.as_u16(),
        detail = %Redacted(&detail),
        "billing provider call failed"
    );
    Err(AppError::upstream(format!(
        "billing provider returned status {status}"
    )))
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AppError> {
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::upstream(format!("billing provider sent a malformed {what}: {e}")))
}
