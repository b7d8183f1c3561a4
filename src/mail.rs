//! Digest delivery by email.

use crate::error::{NewsError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{info, instrument};

/// Sends a message with a single file attached.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str, attachment: &Path) -> Result<()>;
}

/// SMTP relay authenticated with the sender's credentials.
pub struct SmtpMailer {
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, username: &str, password: &str) -> Result<Self> {
        let sender: Mailbox = username.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { sender, transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    #[instrument(level = "info", skip_all, fields(%recipient, attachment = %attachment.display()))]
    async fn send(&self, recipient: &str, subject: &str, body: &str, attachment: &Path) -> Result<()> {
        let contents = tokio::fs::read(attachment).await?;
        let filename = attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "digest.md".to_string());
        let message = build_message(&self.sender, recipient, subject, body, filename, contents)?;

        self.transport.send(message).await?;
        info!("Email sent");
        Ok(())
    }
}

/// Assemble a plain-text message carrying `contents` as an attachment.
pub fn build_message(
    sender: &Mailbox,
    recipient: &str,
    subject: &str,
    body: &str,
    filename: String,
    contents: Vec<u8>,
) -> Result<Message> {
    let content_type = ContentType::parse("text/markdown; charset=utf-8")
        .map_err(|e| NewsError::Mail(e.to_string()))?;
    let message = Message::builder()
        .from(sender.clone())
        .to(recipient.parse()?)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(Attachment::new(filename).body(contents, content_type)),
        )?;
    Ok(message)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_with_attachment() {
        let sender: Mailbox = "digest@example.com".parse().unwrap();
        let message = build_message(
            &sender,
            "reader@example.com",
            "20250506 세계 뉴스 요약",
            "오늘의 요약입니다.",
            "news_summary_20250506.md".to_string(),
            b"# digest".to_vec(),
        )
        .unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("reader@example.com"));
        assert!(raw.contains("digest@example.com"));
        assert!(raw.contains("news_summary_20250506.md"));
        assert!(raw.contains("text/markdown"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let sender: Mailbox = "digest@example.com".parse().unwrap();
        let result = build_message(&sender, "not an address", "s", "b", "f.md".into(), vec![]);
        assert!(matches!(result, Err(NewsError::Mail(_))));
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        assert!(SmtpMailer::new("smtp.example.com", "nobody", "pw").is_err());
    }
}
