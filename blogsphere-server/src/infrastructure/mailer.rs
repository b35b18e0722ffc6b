use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::infrastructure::settings::Settings;

const MAILERSEND_URL: &str = "https://api.mailersend.com/v1/email";
const SENDER_NAME: &str = "BlogSphere";

#[derive(Debug, Error)]
pub(crate) enum MailError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail provider rejected message with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// Outbound account notifications. Callers dispatch these off the request path.
#[async_trait]
pub(crate) trait Notifier: Send + Sync + 'static {
    async fn send_welcome(&self, to_email: &str, username: &str) -> Result<(), MailError>;
    async fn send_account_deleted(&self, to_email: &str, username: &str)
    -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct AddressDto<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailDto<'a> {
    from: AddressDto<'a>,
    to: Vec<AddressDto<'a>>,
    subject: &'a str,
    text: String,
}

#[derive(Debug, Clone)]
struct MailerSendConfig {
    api_key: String,
    from_email: String,
}

#[derive(Debug, Clone)]
pub(crate) struct MailerSendNotifier {
    client: Client,
    config: Option<MailerSendConfig>,
}

impl MailerSendNotifier {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build mailer http client")?;

        let config = match (&settings.mailersend_api_key, &settings.from_email) {
            (Some(api_key), Some(from_email)) => Some(MailerSendConfig {
                api_key: api_key.clone(),
                from_email: from_email.clone(),
            }),
            _ => {
                warn!("MailerSend not configured, notifications will be skipped");
                None
            }
        };

        Ok(Self { client, config })
    }

    async fn send(
        &self,
        kind: &'static str,
        to_email: &str,
        username: &str,
        subject: &str,
        text: String,
    ) -> Result<(), MailError> {
        let Some(config) = &self.config else {
            info!(kind, "mailer disabled, skipping notification");
            return Ok(());
        };

        let message = EmailDto {
            from: AddressDto {
                email: &config.from_email,
                name: SENDER_NAME,
            },
            to: vec![AddressDto {
                email: to_email,
                name: username,
            }],
            subject,
            text,
        };

        let response = self
            .client
            .post(MAILERSEND_URL)
            .bearer_auth(&config.api_key)
            .json(&message)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status()));
        }

        info!(kind, "notification sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for MailerSendNotifier {
    async fn send_welcome(&self, to_email: &str, username: &str) -> Result<(), MailError> {
        let text = format!(
            "Hi {username},\n\nWelcome to BlogSphere! Your account is ready. \
             Start writing, follow topics you care about and join the conversation.\n\n\
             The BlogSphere team"
        );
        self.send(
            "welcome",
            to_email,
            username,
            "Welcome to BlogSphere - Start Your Developer Journey!",
            text,
        )
        .await
    }

    async fn send_account_deleted(
        &self,
        to_email: &str,
        username: &str,
    ) -> Result<(), MailError> {
        let text = format!(
            "Hi {username},\n\nYour BlogSphere account and all of its posts, comments \
             and likes have been deleted. We're sorry to see you go.\n\n\
             The BlogSphere team"
        );
        self.send(
            "account_deleted",
            to_email,
            username,
            "Your BlogSphere Account Has Been Deleted",
            text,
        )
        .await
    }
}
