//! Billing provider integration: the REST client for checkout and portal
//! sessions, webhook signature verification and webhook event decoding.

pub mod client;
pub mod event;
pub mod webhook;

pub use client::{BillingClient, CheckoutSession};
pub use event::{parse_event, BillingEvent, WebhookEvent};
pub use webhook::{verify_signature, SignatureError};
