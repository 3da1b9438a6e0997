use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Template selected for an outgoing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    Activation,
    PasswordReset,
}

impl MailTemplate {
    pub fn id(&self) -> &'static str {
        match self {
            MailTemplate::Activation => "register",
            MailTemplate::PasswordReset => "reset-password",
        }
    }
}

/// Values interpolated into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContext {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub template: MailTemplate,
    pub context: MailContext,
}

impl MailMessage {
    pub fn activation(to: &str, name: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Activate your account at {}", to),
            template: MailTemplate::Activation,
            context: MailContext {
                name: name.to_string(),
                code: code.to_string(),
            },
        }
    }

    pub fn password_reset(to: &str, name: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Change your password account at {}", to),
            template: MailTemplate::PasswordReset,
            context: MailContext {
                name: name.to_string(),
                code: code.to_string(),
            },
        }
    }

    pub fn render_body(&self, frontend_url: &str) -> String {
        match self.template {
            MailTemplate::Activation => format!(
                r#"
Hello {name},

Thank you for registering. Use the code below to activate your account:

{code}

You can also open {url}/verify and paste the code there.

The code expires in a few minutes. Request a new one if it has expired.
"#,
                name = self.context.name,
                code = self.context.code,
                url = frontend_url,
            ),
            MailTemplate::PasswordReset => format!(
                r#"
Hello {name},

We received a request to change the password of your account.
Use the code below to choose a new password:

{code}

The code expires in a few minutes.

If you did not request this, you can ignore this email.
"#,
                name = self.context.name,
                code = self.context.code,
            ),
        }
    }
}

/// Outbound mail collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<()>;
}

/// Sends `message` on a background task. Failures are logged, never returned.
pub fn dispatch(mailer: Arc<dyn Mailer>, message: MailMessage) {
    tokio::spawn(async move {
        let to = message.to.clone();
        let template = message.template.id();
        match mailer.send(message).await {
            Ok(()) => tracing::debug!(%to, template, "mail sent"),
            Err(err) => tracing::warn!(%to, template, error = %err, "mail delivery failed"),
        }
    });
}

pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    frontend_url: String,
    skip_send: bool,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mailer = if config.username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        } else {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
                .port(config.port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            frontend_url: config.frontend_url.clone(),
            skip_send: config.skip_send,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        if self.skip_send {
            tracing::info!(
                to = %message.to,
                template = message.template.id(),
                "SMTP_SKIP_SEND enabled, not sending mail"
            );
            return Ok(());
        }

        let body = message.render_body(&self.frontend_url);
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(message.to.parse()?)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(email).await?;
        Ok(())
    }
}
