//! Outbound email via the Resend HTTP API.
//!
//! Without an API key the mailer runs in disabled mode and logs the login
//! link instead of sending it, which is how local development logs in.

use serde_json::json;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::logging::pii::Redacted;

const RESEND_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    public_base_url: String,
}

impl Mailer {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// The URL a login email points at.
    pub fn magic_link(&self, token: &str) -> String {
        format!("{}/api/auth/verify?token={}", self.public_base_url, token)
    }

    /// Send the login link to `email`, or log it when delivery is disabled.
    pub async fn send_magic_link(&self, email: &str, token: &str) -> Result<(), AppError> {
        let link = self.magic_link(token);

        let Some(api_key) = &self.api_key else {
            // The link is the delivery channel when no provider is
            // configured, so it is logged in full.
            tracing::info!(
                email = %Redacted(email),
                %link,
                "email delivery disabled, use the logged login link"
            );
            return Ok(());
        };

        let body = json!({
            "from": self.from,
            "to": [email],
            "subject": "Your Toolgate login link",
            "html": login_email_html(&link),
        });

        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("email provider unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                detail = %Redacted(&detail),
                "email provider rejected the send"
            );
            return Err(AppError::upstream(format!(
                "email provider returned status {status}"
            )));
        }

        Ok(())
    }
}

fn login_email_html(link: &str) -> String {
    format!(
        r#"<div style="font-family: system-ui, sans-serif; max-width: 480px; margin: 0 auto; padding: 40px 20px;">
  <h1 style="font-size: 24px; margin-bottom: 8px;">Toolgate</h1>
  <p style="color: #666; font-size: 14px; margin-bottom: 32px;">Automation tools for auditors &amp; accountants</p>
  <p style="color: #333; font-size: 16px; line-height: 1.5;">
    Click the button below to log in to your Toolgate account. This link expires in 15 minutes.
  </p>
  <a href="{link}" style="display: inline-block; background: #F59E0B; color: #000; font-weight: 600; padding: 14px 28px; border-radius: 8px; text-decoration: none; margin: 24px 0; font-size: 16px;">
    Log in to Toolgate
  </a>
  <p style="color: #999; font-size: 13px; margin-top: 32px;">
    If you didn't request this link, you can safely ignore this email.
  </p>
</div>"#
    )
}
