// SPDX-License-Identifier: MIT

//! Transactional email delivery over SMTP.
//!
//! Mail bodies are rendered from minijinja templates that extend a shared
//! base layout. Delivery is best-effort: callers log failures and carry on,
//! a lost email never fails the request that triggered it.
//!
//! When no SMTP credentials are configured the service runs disabled and
//! every send becomes a no-op.

use crate::config::Config;
use crate::error::AppError;
use crate::models::Item;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minijinja::{context, Environment};

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="margin:0;padding:0;background:#f4f6f8;font-family:Arial,Helvetica,sans-serif;">
  <div style="max-width:600px;margin:0 auto;background:#ffffff;">
    <div style="background:#2e7d32;color:#ffffff;padding:24px;text-align:center;">
      <h1 style="margin:0;">ShareCare</h1>
      <p style="margin:4px 0 0;">Share more. Waste less.</p>
    </div>
    <div style="padding:24px;color:#333333;line-height:1.5;">
      {% block content %}{% endblock %}
    </div>
    <div style="padding:16px;text-align:center;color:#888888;font-size:12px;">
      <p>You are receiving this email because you have a ShareCare account.</p>
      <p><a href="{{ frontend_url }}" style="color:#2e7d32;">Open ShareCare</a></p>
    </div>
  </div>
</body>
</html>"##;

const WELCOME_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>Welcome, {{ name }}!</h2>
<p>Your ShareCare account is ready. Browse items near you, donate what you no
longer need, and chat with other members to arrange pickups.</p>
<p>Every shared item keeps something useful out of the landfill. Thanks for
joining in.</p>
{% endblock %}"#;

const LOGIN_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>New sign-in to your account</h2>
<p>Hi {{ name }}, we noticed a sign-in to your ShareCare account.</p>
<p>If this was you, no action is needed. If you don't recognize this
activity, please update your password with your identity provider.</p>
{% endblock %}"#;

const DONATION_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>Your donation is live!</h2>
<p>Hi {{ name }}, your {{ category }} listing <strong>{{ item_name }}</strong>
is now visible to everyone on ShareCare.</p>
<p>We'll let you know as soon as someone requests it.</p>
{% endblock %}"#;

const REQUEST_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>Someone wants your item</h2>
<p>Hi {{ name }}, <strong>{{ requester_name }}</strong> has requested
<strong>{{ item_name }}</strong>.</p>
{% if message %}<p>Their message: "{{ message }}"</p>{% endif %}
<p>Open ShareCare to approve or decline the request.</p>
{% endblock %}"#;

const CONFIRMATION_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>Request sent</h2>
<p>Hi {{ name }}, your request for <strong>{{ item_name }}</strong> has been
sent to {{ donor_name }}.</p>
<p>You'll get a notification when the donor responds.</p>
{% endblock %}"#;

const TRACKING_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>Your item is being prepared</h2>
<p>Hi {{ name }}, great news: your request for
<strong>{{ item_name }}</strong> was accepted.</p>
<p>Track the pickup with this ID: <strong>{{ tracking_id }}</strong></p>
{% endblock %}"#;

const DELETION_TEMPLATE: &str = r#"{% extends "base.html" %}{% block content %}
<h2>Account deleted</h2>
<p>Hi {{ name }}, your ShareCare account and all associated data have been
removed. We're sorry to see you go.</p>
{% endblock %}"#;

/// SMTP email sender. `transport` is `None` when email is not configured.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
    frontend_url: String,
    templates: Environment<'static>,
}

impl EmailService {
    pub fn new(config: &Config) -> Self {
        let transport = if config.email_address.is_empty() || config.email_password.is_empty() {
            tracing::warn!("SMTP credentials not configured, email delivery disabled");
            None
        } else {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server) {
                Ok(builder) => Some(
                    builder
                        .port(config.smtp_port)
                        .credentials(Credentials::new(
                            config.email_address.clone(),
                            config.email_password.clone(),
                        ))
                        .build(),
                ),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build SMTP transport, email delivery disabled");
                    None
                }
            }
        };

        Self {
            transport,
            from_address: config.email_address.clone(),
            frontend_url: config.frontend_url.clone(),
            templates: Self::build_templates(),
        }
    }

    /// Create a disabled email service for testing.
    pub fn new_mock() -> Self {
        Self {
            transport: None,
            from_address: "noreply@sharecare.test".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            templates: Self::build_templates(),
        }
    }

    fn build_templates() -> Environment<'static> {
        let mut env = Environment::new();
        // Static template strings, adding them cannot fail
        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("welcome.html", WELCOME_TEMPLATE),
            ("login.html", LOGIN_TEMPLATE),
            ("donation.html", DONATION_TEMPLATE),
            ("request.html", REQUEST_TEMPLATE),
            ("confirmation.html", CONFIRMATION_TEMPLATE),
            ("tracking.html", TRACKING_TEMPLATE),
            ("deletion.html", DELETION_TEMPLATE),
        ] {
            if let Err(e) = env.add_template(name, source) {
                tracing::error!(template = name, error = %e, "Failed to register email template");
            }
        }
        env
    }

    fn render(&self, template: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        self.templates
            .get_template(template)
            .and_then(|t| t.render(ctx))
            .map_err(|e| AppError::Email(format!("Failed to render '{}': {}", template, e)))
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), AppError> {
        let Some(transport) = &self.transport else {
            tracing::debug!(to, subject, "Email delivery disabled, skipping");
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| AppError::Email(format!("Invalid sender address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Email(format!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| AppError::Email(format!("Failed to build message: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("SMTP send failed: {}", e)))?;

        tracing::info!(to, subject, "Email sent");
        Ok(())
    }

    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), AppError> {
        let html = self.render(
            "welcome.html",
            context! { name, frontend_url => self.frontend_url },
        )?;
        self.send(to, "Welcome to ShareCare! Let's Make a Difference Together", html)
            .await
    }

    pub async fn send_login_notification(&self, to: &str, name: &str) -> Result<(), AppError> {
        let html = self.render(
            "login.html",
            context! { name, frontend_url => self.frontend_url },
        )?;
        self.send(to, "ShareCare Login Notification", html).await
    }

    pub async fn send_donation_confirmation(
        &self,
        to: &str,
        name: &str,
        item: &Item,
    ) -> Result<(), AppError> {
        let html = self.render(
            "donation.html",
            context! {
                name,
                category => item.category,
                item_name => item.name,
                frontend_url => self.frontend_url,
            },
        )?;
        let subject = format!("Your {} donation is live on ShareCare!", item.category);
        self.send(to, &subject, html).await
    }

    pub async fn send_reservation_request(
        &self,
        to: &str,
        donor_name: &str,
        requester_name: &str,
        item: &Item,
        message: Option<&str>,
    ) -> Result<(), AppError> {
        let html = self.render(
            "request.html",
            context! {
                name => donor_name,
                requester_name,
                item_name => item.name,
                message,
                frontend_url => self.frontend_url,
            },
        )?;
        let subject = format!("Someone wants your {} - ShareCare", item.name);
        self.send(to, &subject, html).await
    }

    pub async fn send_reservation_confirmation(
        &self,
        to: &str,
        requester_name: &str,
        donor_name: &str,
        item: &Item,
    ) -> Result<(), AppError> {
        let html = self.render(
            "confirmation.html",
            context! {
                name => requester_name,
                donor_name,
                item_name => item.name,
                frontend_url => self.frontend_url,
            },
        )?;
        let subject = format!("Your request for {} was sent", item.name);
        self.send(to, &subject, html).await
    }

    pub async fn send_tracking(
        &self,
        to: &str,
        name: &str,
        item: &Item,
        tracking_id: &str,
    ) -> Result<(), AppError> {
        let html = self.render(
            "tracking.html",
            context! {
                name,
                item_name => item.name,
                tracking_id,
                frontend_url => self.frontend_url,
            },
        )?;
        let subject = format!("Your item is being prepared! Tracking ID: {}", tracking_id);
        self.send(to, &subject, html).await
    }

    pub async fn send_account_deletion(&self, to: &str, name: &str) -> Result<(), AppError> {
        let html = self.render(
            "deletion.html",
            context! { name, frontend_url => self.frontend_url },
        )?;
        self.send(to, "Account Deletion Confirmed - ShareCare", html)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_render() {
        let email = EmailService::new_mock();
        let html = email
            .render(
                "welcome.html",
                context! { name => "Ada", frontend_url => "http://localhost:3000" },
            )
            .unwrap();
        assert!(html.contains("Welcome, Ada!"));
        assert!(html.contains("ShareCare"));
    }

    #[test]
    fn test_request_template_optional_message() {
        let email = EmailService::new_mock();
        let with_msg = email
            .render(
                "request.html",
                context! {
                    name => "Don",
                    requester_name => "Ada",
                    item_name => "Rice",
                    message => "Can I pick it up today?",
                    frontend_url => "x",
                },
            )
            .unwrap();
        assert!(with_msg.contains("Can I pick it up today?"));

        let without_msg = email
            .render(
                "request.html",
                context! {
                    name => "Don",
                    requester_name => "Ada",
                    item_name => "Rice",
                    message => minijinja::Value::from(()),
                    frontend_url => "x",
                },
            )
            .unwrap();
        assert!(!without_msg.contains("Their message"));
    }

    #[tokio::test]
    async fn test_disabled_service_skips_sending() {
        let email = EmailService::new_mock();
        email.send_welcome("user@example.com", "Ada").await.unwrap();
    }
}
