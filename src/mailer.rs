use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_sdk_sesv2::{
    config::Region,
    primitives::Blob,
    types::{Destination, EmailContent, RawMessage},
    Client,
};

use crate::{config::MailConfig, users::repo_types::User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Escapes text for use in HTML content and attribute values.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn verification_email(user: &User, link: &str) -> OutgoingEmail {
    let link = escape_html(link);
    OutgoingEmail {
        to: user.email.clone(),
        subject: "Verify your email address".into(),
        html: format!(
            "<p>Hello {},</p>\
             <p>Please confirm your email address by following this link:</p>\
             <p><a href=\"{link}\">{link}</a></p>\
             <p>The link expires in one hour.</p>",
            escape_html(&user.first_name)
        ),
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()>;
}

/// Delivers mail through AWS SES v2 as a raw MIME message.
#[derive(Clone)]
pub struct SesMailer {
    client: Client,
    sender: String,
}

impl SesMailer {
    pub async fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .load()
            .await;

        Ok(Self {
            client: Client::new(&shared),
            sender: cfg.sender.clone(),
        })
    }

    fn mime(&self, email: &OutgoingEmail) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\n\
             Content-Type: text/html; charset=UTF-8\r\n\r\n{}",
            self.sender, email.to, email.subject, email.html
        )
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        let raw = RawMessage::builder()
            .data(Blob::new(self.mime(&email).into_bytes()))
            .build()
            .context("ses raw message")?;

        self.client
            .send_email()
            .from_email_address(&self.sender)
            .destination(Destination::builder().to_addresses(&email.to).build())
            .content(EmailContent::builder().raw(raw).build())
            .send()
            .await
            .context("ses send_email")?;

        tracing::info!(to = %email.to, "email sent");
        Ok(())
    }
}

/// Used when no sender is configured: the message is only logged.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        // the body carries a live verification token
        tracing::info!(to = %email.to, subject = %email.subject, "email not sent (no sender configured)");
        Ok(())
    }
}
