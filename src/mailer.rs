use std::{fmt::Write as _, sync::Arc};

use async_trait::async_trait;
use mail_send::{SmtpClientBuilder, mail_builder::MessageBuilder};
use rust_decimal::Decimal;

use crate::{
    cart::CartLineView,
    config::{MailConfig, SmtpConfig},
    entity::users,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound notification channel.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    smtp: SmtpConfig,
    from: String,
}

impl SmtpMailer {
    pub fn new(smtp: SmtpConfig, from: String) -> Self {
        Self { smtp, from }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        let message = MessageBuilder::new()
            .from(("Marketplace", self.from.as_str()))
            .to(mail.to)
            .subject(mail.subject)
            .text_body(mail.body);

        SmtpClientBuilder::new(self.smtp.host.as_str(), self.smtp.port)
            .implicit_tls(self.smtp.implicit_tls)
            .credentials((self.smtp.username.as_str(), self.smtp.password.as_str()))
            .connect()
            .await?
            .send(message)
            .await?;
        Ok(())
    }
}

/// Writes mail to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, body = %mail.body, "mail (not delivered)");
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp.clone(), config.from.clone())),
        None => {
            tracing::warn!("SMTP_HOST not set; confirmation mail will only be logged");
            Arc::new(LogMailer)
        }
    }
}

pub fn order_confirmation(user: &users::Model, lines: &[CartLineView], total: Decimal) -> Mail {
    let mut body = format!(
        "Hello {} {},\n\nThank you for your order! Here is your order summary:\n\nORDER DETAILS:\n-------------\n",
        user.first_name, user.last_name
    );

    for line in lines {
        let _ = write!(
            body,
            "\nProduct: {}\nDescription: {}\nPrice: ${:.2}\nQuantity: {}\nSubtotal: ${:.2}\n-------------\n",
            line.product.name, line.product.description, line.price, line.quantity, line.total_price
        );
    }

    let _ = write!(
        body,
        "\n\nTOTAL: ${total:.2}\n\nYour order has been received and will be processed shortly.\n\nThank you for shopping with us!\n\nBest regards,\nMarketplace Team\n"
    );

    Mail {
        to: user.email.clone(),
        subject: format!("Order Confirmation - {}", user.username),
        body,
    }
}
