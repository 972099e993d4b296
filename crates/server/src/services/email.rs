//! Mail rendering, SMTP transport, and the dispatch worker.
//!
//! Request handlers never touch SMTP: they serialize an [`EmailTask`] onto
//! the task queue and move on. A single [`EmailDispatchWorker`], spawned
//! once at startup, drains the queue for the lifetime of the process.

use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tableside_core::{Email, OtpCode};

use super::queue::{QueueError, TaskQueue};
use crate::config::EmailConfig;

/// What the queued code is for; selects subject and template.
///
/// Defaults to `Verification` so entries queued before the kind tag was
/// introduced still parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    /// Account verification after signup.
    #[default]
    Verification,
    /// Forgot-password reset code.
    PasswordReset,
}

/// Wire shape of a queued notification job: `{"email", "otp", "kind"}`.
///
/// Immutable value object; dequeued once per delivery attempt and discarded
/// after the attempt whether or not delivery succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTask {
    /// Recipient address.
    pub email: String,
    /// The six-digit code to deliver.
    pub otp: String,
    /// Which template to render.
    #[serde(default)]
    pub kind: EmailKind,
}

impl EmailTask {
    /// Build a verification task.
    #[must_use]
    pub fn verification(email: &Email, otp: &OtpCode) -> Self {
        Self {
            email: email.as_str().to_owned(),
            otp: otp.as_str().to_owned(),
            kind: EmailKind::Verification,
        }
    }

    /// Build a password-reset task.
    #[must_use]
    pub fn password_reset(email: &Email, otp: &OtpCode) -> Self {
        Self {
            email: email.as_str().to_owned(),
            otp: otp.as_str().to_owned(),
            kind: EmailKind::PasswordReset,
        }
    }

    /// Serialize and enqueue this task.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if encoding or the queue push fails.
    pub async fn enqueue(&self, queue: &dyn TaskQueue) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(self)?;
        queue.push(payload).await?;
        tracing::info!(recipient = %self.email, kind = ?self.kind, "Notification task queued");
        Ok(())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// HTML template for the verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationCodeHtml<'a> {
    code: &'a str,
}

/// Plain text template for the verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.txt")]
struct VerificationCodeText<'a> {
    code: &'a str,
}

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    code: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    code: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Delivery seam the worker sends through.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Render the template for `kind` and deliver it to `to`.
    async fn send_otp(&self, kind: EmailKind, to: &str, code: &str) -> Result<(), EmailError>;
}

/// SMTP mailer over lettre with askama multipart templates.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay parameters are invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_owned()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_owned()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, kind: EmailKind, to: &str, code: &str) -> Result<(), EmailError> {
        match kind {
            EmailKind::Verification => {
                let html = VerificationCodeHtml { code }.render()?;
                let text = VerificationCodeText { code }.render()?;
                self.send_multipart_email(to, "Account Verification", &text, &html)
                    .await
            }
            EmailKind::PasswordReset => {
                let html = PasswordResetHtml { code }.render()?;
                let text = PasswordResetText { code }.render()?;
                self.send_multipart_email(to, "Reset Password OTP", &text, &html)
                    .await
            }
        }
    }
}

// =============================================================================
// Dispatch worker
// =============================================================================

/// Single long-running consumer that drains the task queue.
///
/// Delivery policy is at-most-once-attempt: a transport failure is logged
/// and the worker moves to the next task - no retry, no re-enqueue, no
/// backoff. Malformed payloads are logged and skipped; nothing is fatal to
/// the loop.
pub struct EmailDispatchWorker {
    queue: Arc<dyn TaskQueue>,
    mailer: Arc<dyn Mailer>,
}

impl EmailDispatchWorker {
    /// Create a worker over the given queue and mail transport.
    #[must_use]
    pub fn new(queue: Arc<dyn TaskQueue>, mailer: Arc<dyn Mailer>) -> Self {
        Self { queue, mailer }
    }

    /// Run until the queue is closed (which under normal operation means
    /// process shutdown).
    pub async fn run(self) {
        tracing::info!("Email dispatch worker started");

        loop {
            match self.queue.pop().await {
                Ok(payload) => self.process(&payload).await,
                Err(QueueError::Closed) => {
                    tracing::info!("Task queue closed, email dispatch worker exiting");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error popping from task queue");
                }
            }
        }
    }

    /// Handle one dequeued payload. Never propagates an error.
    async fn process(&self, payload: &[u8]) {
        let task: EmailTask = match serde_json::from_slice(payload) {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(error = %e, "Skipping malformed queue entry");
                return;
            }
        };

        if let Err(e) = self
            .mailer
            .send_otp(task.kind, &task.email, &task.otp)
            .await
        {
            tracing::error!(
                recipient = %task.email,
                kind = ?task.kind,
                error = %e,
                "Failed to send email"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_task_wire_shape() {
        let task = EmailTask {
            email: "a@b.com".to_owned(),
            otp: "123456".to_owned(),
            kind: EmailKind::Verification,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["otp"], "123456");
        assert_eq!(json["kind"], "verification");
    }

    #[test]
    fn test_untagged_task_defaults_to_verification() {
        // Entries queued before the kind tag existed carry only email+otp.
        let task: EmailTask =
            serde_json::from_str(r#"{"email":"a@b.com","otp":"123456"}"#).unwrap();
        assert_eq!(task.kind, EmailKind::Verification);
    }

    #[test]
    fn test_password_reset_kind_round_trip() {
        let email = Email::parse("a@b.com").unwrap();
        let otp = OtpCode::parse("654321").unwrap();
        let task = EmailTask::password_reset(&email, &otp);

        let bytes = serde_json::to_vec(&task).unwrap();
        let back: EmailTask = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, task);
        assert_eq!(back.kind, EmailKind::PasswordReset);
    }
}
