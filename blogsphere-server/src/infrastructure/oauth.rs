use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::user::ProviderProfile;
use crate::infrastructure::settings::Settings;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email \
                             https://www.googleapis.com/auth/userinfo.profile";

#[derive(Debug, Error)]
pub(crate) enum OAuthError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected request with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("invalid provider url: {0}")]
    Url(String),
}

/// Authorization-code flow against an external identity provider.
#[async_trait]
pub(crate) trait IdentityProvider: Send + Sync {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError>;
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponseDto {
    access_token: String,
}

#[derive(Debug, Clone)]
pub(crate) struct GoogleOAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleOAuthClient {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build identity provider http client")?;

        Ok(Self {
            client,
            client_id: settings.google_client_id.clone(),
            client_secret: settings.google_client_secret.clone(),
            redirect_uri: settings.google_redirect_uri.clone(),
        })
    }

    async fn rejected(response: reqwest::Response) -> OAuthError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| format!("http status {status}"));
        OAuthError::Rejected { status, message }
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", GOOGLE_SCOPES),
                ("state", state),
                ("access_type", "online"),
            ],
        )
        .map_err(|err| OAuthError::Url(err.to_string()))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let dto = response.json::<TokenResponseDto>().await?;
        Ok(dto.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        Ok(response.json::<ProviderProfile>().await?)
    }
}

/// Anti-forgery value for the authorization redirect: 16 random bytes, URL-safe base64.
pub(crate) fn generate_oauth_state() -> String {
    let bytes: [u8; 16] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::{GoogleOAuthClient, IdentityProvider, generate_oauth_state};

    fn client() -> GoogleOAuthClient {
        GoogleOAuthClient {
            client: reqwest::Client::new(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:8080/api/v1/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn oauth_state_is_url_safe_and_unique() {
        let a = generate_oauth_state();
        let b = generate_oauth_state();

        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn authorize_url_carries_state_and_client() {
        let url = client()
            .authorize_url("abc_-123")
            .expect("url must build");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=abc_-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080"));
    }
}
