use crate::config::SmtpConfig;
use crate::plugins::traits::Mailer;
use crate::utils::error::DeliveryError;
use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let sender = config
            .sender()
            .ok_or_else(|| DeliveryError::Message("No sender address configured".to_string()))?;
        let from = format!("{} <{}>", config.from_name, sender)
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::Address {
                address: sender.to_string(),
                message: e.to_string(),
            })?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, DeliveryError> {
        let recipient = to.parse::<Mailbox>().map_err(|e| DeliveryError::Address {
            address: to.to_string(),
            message: e.to_string(),
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::Message(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = self.build_message(to, subject, body)?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}
