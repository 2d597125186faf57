//! Partyhub Email Service
//!
//! Delivers company invitation emails with support for:
//! - AWS SES integration for production email delivery
//! - Mock email service for testing and development
//! - LocalStack integration for local E2E testing

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod aws_ses;
pub mod content;
pub mod mock;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email validation error: {0}")]
    Validation(String),

    #[error("AWS SES error: {0}")]
    AwsSes(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl EmailMessage {
    pub fn new(to: String, from: String, subject: String, body_text: String) -> Self {
        Self {
            to,
            from,
            reply_to: None,
            subject,
            body_text,
            body_html: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_html(mut self, body_html: String) -> Self {
        self.body_html = Some(body_html);
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Add metadata for tracking
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Email delivery receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
    pub provider: String,
    pub metadata: HashMap<String, String>,
}

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email service provider (ses, mock)
    pub provider: String,
    pub aws_region: Option<String>,
    /// AWS endpoint URL (for LocalStack)
    pub aws_endpoint_url: Option<String>,
    pub default_from: String,
    /// Enable email sending (can disable for testing)
    pub enabled: bool,
    /// Base URL of the platform frontend, used for the registration link
    pub app_base_url: String,
}

impl EmailConfig {
    /// Create email config from environment variables
    pub fn from_env() -> Result<Self, EmailError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let aws_region = std::env::var("AWS_REGION").ok();
        let aws_endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();

        let default_from =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "invitations@partyhub.app".to_string());

        if !default_from.contains('@') {
            return Err(EmailError::Configuration(format!(
                "FROM_EMAIL is not an email address: {}",
                default_from
            )));
        }

        let enabled = std::env::var("EMAIL_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let app_base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "https://partyhub.app".to_string());

        Ok(Self {
            provider,
            aws_region,
            aws_endpoint_url,
            default_from,
            enabled,
            app_base_url,
        })
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            aws_region: None,
            aws_endpoint_url: None,
            default_from: "invitations@partyhub.app".to_string(),
            enabled: true,
            app_base_url: "https://partyhub.app".to_string(),
        }
    }
}

/// Email service trait for different implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Return the default "from" address for outgoing emails
    fn default_from(&self) -> String;

    /// Return the application base URL for building links
    fn app_base_url(&self) -> &str;

    /// Invite `recipient_email` to register with `company_name`.
    async fn send_company_invitation(
        &self,
        recipient_email: &str,
        sender_name: &str,
        company_name: &str,
        company_id: i64,
    ) -> Result<EmailReceipt, EmailError> {
        let registration_url = content::registration_url(self.app_base_url(), recipient_email);

        let subject = format!("Invitation to join {} on Partyhub", company_name);
        let body_text =
            content::company_invitation_text(sender_name, company_name, &registration_url);
        let body_html =
            content::company_invitation_html(sender_name, company_name, &registration_url);

        let message = EmailMessage::new(
            recipient_email.to_string(),
            self.default_from(),
            subject,
            body_text,
        )
        .with_html(body_html)
        .with_metadata("email_type", "company_invitation")
        .with_metadata("company_id", company_id.to_string());

        self.send_email(message).await
    }
}

/// Email service factory
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create email service based on configuration
    pub async fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email service disabled, using mock implementation");
            return Ok(Box::new(mock::MockEmailService::with_config(&config)));
        }

        match config.provider.as_str() {
            "ses" | "aws-ses" => {
                tracing::info!("Creating AWS SES email service");
                let ses_service = aws_ses::SesEmailService::new(config).await?;
                Ok(Box::new(ses_service))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::with_config(&config)))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: ses, mock",
                provider
            ))),
        }
    }
}
