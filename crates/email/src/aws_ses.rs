//! AWS SES Email Service Implementation
//!
//! Production email delivery through AWS Simple Email Service (SES),
//! with support for a LocalStack endpoint override.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_ses::config::SharedCredentialsProvider;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client as SesClient;
use chrono::Utc;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

/// AWS SES email service implementation
pub struct SesEmailService {
    client: SesClient,
    config: EmailConfig,
}

impl SesEmailService {
    pub async fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let region = config
            .aws_region
            .clone()
            .unwrap_or_else(|| "eu-central-1".to_string());

        let aws_config = match config.aws_endpoint_url.as_ref() {
            Some(endpoint_url) => {
                tracing::info!(endpoint = %endpoint_url, "Using custom AWS endpoint for SES");

                // LocalStack accepts any static credentials
                let credentials = Credentials::new(
                    "test-access-key",
                    "test-secret-key",
                    None,
                    None,
                    "localstack-email-provider",
                );

                aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(region))
                    .endpoint_url(endpoint_url)
                    .credentials_provider(SharedCredentialsProvider::new(credentials))
                    .load()
                    .await
            }
            None => {
                aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(region))
                    .load()
                    .await
            }
        };

        let client = SesClient::new(&aws_config);

        if let Err(e) = client.get_send_quota().send().await {
            // Not fatal: LocalStack may not have SES provisioned yet
            tracing::warn!(error = %e, "Failed to reach SES during startup");
        } else {
            tracing::info!("Successfully connected to AWS SES");
        }

        Ok(Self::from_client(client, config))
    }

    /// Wrap an already configured SES client
    pub fn from_client(client: SesClient, config: EmailConfig) -> Self {
        Self { client, config }
    }

    fn content(data: &str, part: &str) -> Result<Content, EmailError> {
        Content::builder()
            .data(data)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::AwsSes(format!("Failed to build {}: {}", part, e)))
    }

    fn build_ses_message(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let subject = Self::content(&message.subject, "subject")?;

        let text_body = Self::content(&message.body_text, "text body")?;
        let mut body_builder = Body::builder().text(text_body);

        if let Some(html_body) = &message.body_html {
            body_builder = body_builder.html(Self::content(html_body, "HTML body")?);
        }

        Ok(Message::builder()
            .subject(subject)
            .body(body_builder.build())
            .build())
    }
}

#[async_trait::async_trait]
impl EmailService for SesEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        if !message.to.contains('@') || !message.from.contains('@') {
            return Err(EmailError::Validation(
                "Invalid email address format".to_string(),
            ));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Sending email via AWS SES");

        let ses_message = self.build_ses_message(&message)?;
        let destination = Destination::builder().to_addresses(&message.to).build();

        let mut send_builder = self
            .client
            .send_email()
            .source(&message.from)
            .destination(destination)
            .message(ses_message);

        if let Some(reply_to) = &message.reply_to {
            send_builder = send_builder.reply_to_addresses(reply_to);
        }

        let result = send_builder
            .send()
            .await
            .map_err(|e| EmailError::AwsSes(format!("Failed to send email: {}", e)))?;

        let message_id = result.message_id().to_string();

        tracing::info!(message_id = %message_id, "Email sent via SES");

        Ok(EmailReceipt {
            message_id,
            sent_at: Utc::now(),
            provider: "aws-ses".to_string(),
            metadata: message.metadata.clone(),
        })
    }

    fn default_from(&self) -> String {
        self.config.default_from.clone()
    }

    fn app_base_url(&self) -> &str {
        &self.config.app_base_url
    }
}
