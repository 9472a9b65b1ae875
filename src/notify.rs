//! Status-change email notifications.
//!
//! The SMTP transport is built once at the composition root from optional
//! `SMTP_*` configuration and injected through `AppState`; when absent the
//! notification degrades to a log line. Sending happens on a spawned task and
//! never affects the request outcome.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::status::{self, ApplicationStatus};
use crate::SmtpConfig;

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let from: Mailbox = config.from.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Mailer { transport, from })
    }

    /// Queue a status-change notification. Build or send failures are logged
    /// and swallowed; the review action has already been persisted.
    pub fn send_status_change(
        &self,
        to_email: &str,
        first_name: &str,
        application_id: i64,
        new_status: ApplicationStatus,
    ) {
        let display = status::display(new_status);
        let to: Mailbox = match to_email.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                tracing::warn!("invalid recipient address {}: {}", to_email, err);
                return;
            }
        };

        let body = format!(
            "Hello {},\n\nYour funding application #{} is now: {}.\n\n\
             Sign in to your FemFund dashboard to see the full details.\n\n\
             The FemFund Team",
            first_name, application_id, display.label
        );
        let email = match Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Your funding application is {}", display.label))
            .header(ContentType::TEXT_PLAIN)
            .body(body)
        {
            Ok(email) => email,
            Err(err) => {
                tracing::warn!("failed to build notification email: {}", err);
                return;
            }
        };

        let transport = self.transport.clone();
        let recipient = to_email.to_string();
        tokio::spawn(async move {
            match transport.send(email).await {
                Ok(_) => tracing::info!("status notification sent to {}", recipient),
                Err(err) => tracing::error!("failed to send status notification: {}", err),
            }
        });
    }
}
