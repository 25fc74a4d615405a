//! Email delivery over SMTP.

pub mod handlers;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;
use crate::errors::AppError;

pub struct EmailAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<EmailAttachment>,
}

pub fn default_subject() -> String {
    "Your ATS-Optimized Resume from Rezoom".to_string()
}

pub fn default_body() -> String {
    "<html><body>\
     <h2>Your optimized resume is ready</h2>\
     <p>Attached is your ATS-optimized resume, tailored to the job description \
     you provided. Good luck with your application!</p>\
     <p>— The Rezoom team</p>\
     </body></html>"
        .to_string()
}

/// Cheap shape check used at the validation boundary; the full address is
/// parsed again when the message is built.
pub fn is_plausible_address(email: &str) -> bool {
    email.contains('@') && !email.trim().is_empty()
}

/// Blocking SMTP mailer. Callers on the async path wrap `send` in
/// `spawn_blocking`.
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        let from: Mailbox = self
            .config
            .from_email
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid sender address: {e}")))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient address: {e}")))?;

        let builder = Message::builder().from(from).to(to).subject(email.subject);

        let message = match email.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse("application/pdf")
                    .map_err(|e| AppError::Email(format!("Invalid attachment type: {e}")))?;
                builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(SinglePart::html(email.html_body))
                            .singlepart(
                                Attachment::new(attachment.filename)
                                    .body(attachment.bytes, content_type),
                            ),
                    )
                    .map_err(|e| AppError::Email(format!("Failed to build email: {e}")))?
            }
            None => builder
                .header(ContentType::TEXT_HTML)
                .body(email.html_body)
                .map_err(|e| AppError::Email(format!("Failed to build email: {e}")))?,
        };

        let transport = SmtpTransport::starttls_relay(&self.config.server)
            .map_err(|e| AppError::Email(format!("Invalid SMTP relay: {e}")))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        transport
            .send(&message)
            .map_err(|e| AppError::Email(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}
