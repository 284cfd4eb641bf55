//! services/api/src/adapters/mailer.rs
//!
//! Delivers summaries over SMTP. Implements the `NotificationService` port
//! from the `core` crate.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use recap_core::{
    domain::{EmailAttachment, OutgoingEmail},
    ports::{NotificationService, PortError, PortResult},
};
use tracing::info;

use crate::config::SmtpConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds a pooled transport. Port 465 uses implicit TLS, anything else STARTTLS.
    pub fn new(config: &SmtpConfig) -> PortResult<Self> {
        let from = parse_mailbox(&config.from)?;
        let relay = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let builder =
            relay.map_err(|e| PortError::Unexpected(format!("Invalid SMTP relay: {}", e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport, from })
    }
}

fn parse_mailbox(address: &str) -> PortResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| PortError::Unexpected(format!("Invalid email address '{}': {}", address, e)))
}

fn attachment_part(attachment: EmailAttachment) -> PortResult<SinglePart> {
    let content_type = ContentType::parse(&attachment.content_type)
        .map_err(|e| PortError::Unexpected(format!("Invalid attachment type: {}", e)))?;
    Ok(Attachment::new(attachment.filename).body(attachment.bytes, content_type))
}

/// Assembles the MIME structure: plain text, optionally alongside HTML, and
/// optionally followed by an attachment.
pub(crate) fn build_message(from: Mailbox, email: OutgoingEmail) -> PortResult<Message> {
    let mut builder = Message::builder().from(from).subject(email.subject);
    for recipient in &email.recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }
    for copy in &email.cc {
        builder = builder.cc(parse_mailbox(copy)?);
    }

    let text = email.text_body;
    let body = match (email.html_body, email.attachment) {
        (Some(html), None) => MultiPart::alternative_plain_html(text, html),
        (Some(html), Some(attachment)) => MultiPart::mixed()
            .multipart(MultiPart::alternative_plain_html(text, html))
            .singlepart(attachment_part(attachment)?),
        (None, Some(attachment)) => MultiPart::mixed()
            .singlepart(SinglePart::plain(text))
            .singlepart(attachment_part(attachment)?),
        (None, None) => MultiPart::mixed().singlepart(SinglePart::plain(text)),
    };

    builder
        .multipart(body)
        .map_err(|e| PortError::Unexpected(format!("Failed to build email: {}", e)))
}

#[async_trait]
impl NotificationService for SmtpMailer {
    async fn send_email(&self, email: OutgoingEmail) -> PortResult<()> {
        let recipients = email.recipients.len();
        let message = build_message(self.from.clone(), email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| PortError::Unexpected(format!("SMTP delivery failed: {}", e)))?;
        info!(recipients, "email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(html: bool, pdf: bool) -> OutgoingEmail {
        OutgoingEmail {
            recipients: vec!["team@example.com".to_string()],
            cc: vec!["owner@example.com".to_string()],
            subject: "Meeting Summary: Kickoff".to_string(),
            text_body: "Decisions".to_string(),
            html_body: html.then(|| "<p>Decisions</p>".to_string()),
            attachment: pdf.then(|| EmailAttachment {
                filename: "kickoff.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"%PDF-1.4".to_vec(),
            }),
        }
    }

    fn rendered(html: bool, pdf: bool) -> String {
        let from = parse_mailbox("Recap <recap@example.com>").unwrap();
        let message = build_message(from, email(html, pdf)).unwrap();
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn html_only_is_an_alternative() {
        let raw = rendered(true, false);
        assert!(raw.contains("To: team@example.com"));
        assert!(raw.contains("Cc: owner@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(!raw.contains("kickoff.pdf"));
    }

    #[test]
    fn both_attaches_pdf_next_to_html() {
        let raw = rendered(true, true);
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("filename=\"kickoff.pdf\""));
    }

    #[test]
    fn rejects_malformed_addresses() {
        let from = parse_mailbox("recap@example.com").unwrap();
        let mut bad = email(false, false);
        bad.recipients = vec!["not an address".to_string()];
        assert!(matches!(build_message(from, bad), Err(PortError::Unexpected(_))));
    }
}
