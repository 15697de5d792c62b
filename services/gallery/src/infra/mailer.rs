use serde::Serialize;

use crate::domain::repository::{Mailer, OtpMessage};
use crate::domain::types::OTP_TTL_SECS;
use crate::error::GalleryServiceError;

/// Transactional-mail HTTP API client.
#[derive(Clone)]
pub struct HttpMailer {
    pub http: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
    html: String,
}

/// Rendered OTP email content.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

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

pub fn render_otp_email(message: &OtpMessage) -> RenderedEmail {
    let minutes = OTP_TTL_SECS / 60;
    let date = message.event_starts_at.format("%A, %B %-d, %Y");
    let greeting = if message.guest_name.trim().is_empty() {
        "Hello".to_owned()
    } else {
        format!("Hello {}", message.guest_name.trim())
    };

    let subject = format!("Your verification code for {}", message.event_name);
    let text = format!(
        "{greeting},\n\n\
         Use this code to view the photo gallery for {event} ({date}):\n\n\
         {code}\n\n\
         The code expires in {minutes} minutes. If you did not request it, ignore this email.\n",
        event = message.event_name,
        code = message.code,
    );
    let html = format!(
        "<p>{greeting},</p>\
         <p>Use this code to view the photo gallery for <strong>{event}</strong> ({date}):</p>\
         <p style=\"font-size:28px;letter-spacing:6px;font-weight:bold\">{code}</p>\
         <p>The code expires in {minutes} minutes. If you did not request it, ignore this email.</p>",
        greeting = escape_html(&greeting),
        event = escape_html(&message.event_name),
        code = message.code,
    );

    RenderedEmail {
        subject,
        text,
        html,
    }
}

impl Mailer for HttpMailer {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), GalleryServiceError> {
        let rendered = render_otp_email(message);
        let body = SendEmailBody {
            from: &self.from,
            to: message.to.as_str(),
            subject: rendered.subject,
            text: rendered.text,
            html: rendered.html,
        };

        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "mail api request failed");
                GalleryServiceError::DeliveryError
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %detail, "mail api rejected message");
            return Err(GalleryServiceError::DeliveryError);
        }
        Ok(())
    }
}
