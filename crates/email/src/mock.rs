//! Mock Email Service Implementation
//!
//! Provides in-memory email capture for testing without external dependencies.
//! Can also be switched into a failing mode to exercise delivery errors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

/// Email captured by the mock service
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub message: EmailMessage,
    pub receipt: EmailReceipt,
    pub captured_at: DateTime<Utc>,
}

impl CapturedEmail {
    pub fn is_company_invitation(&self) -> bool {
        self.message
            .metadata
            .get("email_type")
            .map(|t| t == "company_invitation")
            .unwrap_or(false)
    }

    /// Company the invitation was sent for, from the tracking metadata
    pub fn company_id(&self) -> Option<i64> {
        self.message
            .metadata
            .get("company_id")
            .and_then(|id| id.parse().ok())
    }
}

/// Mock email service for testing
#[derive(Debug, Clone)]
pub struct MockEmailService {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    email_by_recipient: Arc<Mutex<HashMap<String, Vec<CapturedEmail>>>>,
    failing: Arc<AtomicBool>,
    default_from: String,
    app_base_url: String,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::with_config(&EmailConfig::default())
    }

    /// Mock service using the sender address and base URL from `config`
    pub fn with_config(config: &EmailConfig) -> Self {
        Self {
            emails: Arc::new(Mutex::new(Vec::new())),
            email_by_recipient: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(AtomicBool::new(false)),
            default_from: config.default_from.clone(),
            app_base_url: config.app_base_url.clone(),
        }
    }

    /// Mock service whose sends always fail with `EmailError::Delivery`
    pub fn new_failing() -> Self {
        let service = Self::new();
        service.set_failing(true);
        service
    }

    /// Toggle failing mode; clones share the flag
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get_all_emails(&self) -> Vec<CapturedEmail> {
        lock(&self.emails).clone()
    }

    pub fn get_emails_for_recipient(&self, email: &str) -> Vec<CapturedEmail> {
        lock(&self.email_by_recipient)
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    /// Get the most recent invitation email for a recipient
    pub fn get_latest_invitation_email(&self, email: &str) -> Option<CapturedEmail> {
        self.get_emails_for_recipient(email)
            .into_iter()
            .filter(CapturedEmail::is_company_invitation)
            .max_by_key(|e| e.captured_at)
    }

    pub fn was_invitation_sent_to(&self, email: &str) -> bool {
        self.get_latest_invitation_email(email).is_some()
    }

    pub fn email_count(&self) -> usize {
        lock(&self.emails).len()
    }

    pub fn clear(&self) {
        lock(&self.emails).clear();
        lock(&self.email_by_recipient).clear();
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            tracing::warn!(to = %message.to, "Mock email service in failing mode, rejecting send");
            return Err(EmailError::Delivery(format!(
                "mock delivery to {} rejected",
                message.to
            )));
        }

        tracing::info!("Mock email service capturing email to: {}", message.to);

        let receipt = EmailReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            sent_at: Utc::now(),
            provider: "mock".to_string(),
            metadata: message.metadata.clone(),
        };

        let captured = CapturedEmail {
            message: message.clone(),
            receipt: receipt.clone(),
            captured_at: Utc::now(),
        };

        lock(&self.emails).push(captured.clone());

        lock(&self.email_by_recipient)
            .entry(message.to)
            .or_default()
            .push(captured);

        Ok(receipt)
    }

    fn default_from(&self) -> String {
        self.default_from.clone()
    }

    fn app_base_url(&self) -> &str {
        &self.app_base_url
    }
}
