use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::principal::Principal;
use crate::domain::user::{NewUser, User};
use crate::infrastructure::jwt::{JwtService, TokenPair};
use crate::infrastructure::mailer::Notifier;
use crate::infrastructure::oauth::{IdentityProvider, generate_oauth_state};

#[derive(Debug, Clone)]
pub(crate) struct OAuthStart {
    pub(crate) state: String,
    pub(crate) redirect_url: String,
}

#[derive(Debug, Clone)]
pub(crate) struct LoginOutcome {
    pub(crate) user: User,
    pub(crate) tokens: TokenPair,
    pub(crate) created: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RefreshedAccess {
    pub(crate) access_token: String,
    pub(crate) expires_in: i64,
}

pub(crate) struct AuthService<U, P, N> {
    users: U,
    provider: P,
    jwt: JwtService,
    notifier: Arc<N>,
}

impl<U, P, N> AuthService<U, P, N>
where
    U: UserRepository,
    P: IdentityProvider,
    N: Notifier,
{
    pub(crate) fn new(users: U, provider: P, jwt: JwtService, notifier: Arc<N>) -> Self {
        Self {
            users,
            provider,
            jwt,
            notifier,
        }
    }

    /// Mints the anti-forgery state and the provider URL to redirect to. The
    /// caller binds `state` to the browser before redirecting.
    pub(crate) fn begin_login(&self) -> Result<OAuthStart, DomainError> {
        let state = generate_oauth_state();
        let redirect_url = self
            .provider
            .authorize_url(&state)
            .map_err(|err| DomainError::Upstream(format!("build authorize url: {err}")))?;
        Ok(OAuthStart {
            state,
            redirect_url,
        })
    }

    /// `expected_state` is the value bound to the browser, `returned_state` the
    /// one echoed back by the provider.
    pub(crate) async fn complete_login(
        &self,
        expected_state: Option<&str>,
        returned_state: Option<&str>,
        code: Option<&str>,
    ) -> Result<LoginOutcome, DomainError> {
        match (expected_state, returned_state) {
            (Some(expected), Some(returned)) if !expected.is_empty() && expected == returned => {}
            _ => {
                debug!("oauth state mismatch");
                return Err(DomainError::InvalidCredentials);
            }
        }
        let code = code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(DomainError::Validation {
                field: "code",
                message: "must not be empty",
            })?;

        let provider_token = self
            .provider
            .exchange_code(code)
            .await
            .map_err(|err| DomainError::Upstream(format!("exchange code: {err}")))?;
        let profile = self
            .provider
            .fetch_profile(&provider_token)
            .await
            .map_err(|err| DomainError::Upstream(format!("fetch user info: {err}")))?;

        let (user, created) = match self.users.find_by_google_id(&profile.id).await? {
            Some(user) => (user, false),
            None => self.register(NewUser::from_profile(profile)?).await?,
        };

        if created {
            self.send_welcome(&user);
        }

        let tokens = self.issue_tokens(&user)?;
        info!(user_id = %user.id, created, "user signed in");
        Ok(LoginOutcome {
            user,
            tokens,
            created,
        })
    }

    /// New access token for the principal of a valid refresh token. The refresh
    /// token itself stays valid until it expires.
    pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess, DomainError> {
        let principal = self
            .jwt
            .verify_refresh(refresh_token)
            .map_err(|_| DomainError::InvalidCredentials)?;
        self.existing(principal).await?;

        let access_token = self
            .jwt
            .issue_access(principal)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(RefreshedAccess {
            access_token,
            expires_in: self.jwt.access_ttl_seconds(),
        })
    }

    /// Verifies an access token and checks that its principal still exists.
    pub(crate) async fn authenticate(&self, access_token: &str) -> Result<Principal, DomainError> {
        let principal = self
            .jwt
            .verify_access(access_token)
            .map_err(|_| DomainError::InvalidCredentials)?;
        self.existing(principal).await
    }

    /// Public routes treat any credential problem as an anonymous viewer.
    pub(crate) async fn resolve_viewer(&self, access_token: Option<&str>) -> Option<Principal> {
        let token = access_token?;
        match self.authenticate(token).await {
            Ok(principal) => Some(principal),
            Err(err) => {
                debug!(error = %err, "ignoring credential on public route");
                None
            }
        }
    }

    async fn existing(&self, principal: Principal) -> Result<Principal, DomainError> {
        match self.users.find_by_id(principal.id()).await? {
            Some(_) => Ok(principal),
            None => Err(DomainError::InvalidCredentials),
        }
    }

    /// Creates the account. A concurrent sign-in for the same provider account
    /// resolves to the row it created; a taken username gets a short suffix.
    async fn register(&self, new_user: NewUser) -> Result<(User, bool), DomainError> {
        match self.users.create_user(new_user.clone()).await {
            Ok(user) => Ok((user, true)),
            Err(DomainError::AlreadyExists(resource)) if resource == "google account" => {
                let user = self
                    .users
                    .find_by_google_id(&new_user.google_id)
                    .await?
                    .ok_or_else(|| DomainError::Unexpected("user vanished after insert".into()))?;
                Ok((user, false))
            }
            Err(DomainError::AlreadyExists(resource)) if resource == "username" => {
                let suffix = Uuid::new_v4().simple().to_string();
                let retry = NewUser {
                    username: new_user
                        .username
                        .as_ref()
                        .map(|name| format!("{name}-{}", &suffix[..6])),
                    ..new_user
                };
                Ok((self.users.create_user(retry).await?, true))
            }
            Err(err) => Err(err),
        }
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        self.jwt
            .issue(Principal::new(user.id))
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn send_welcome(&self, user: &User) {
        let notifier = Arc::clone(&self.notifier);
        let user_id = user.id;
        let email = user.email.clone();
        let username = user.username.clone().unwrap_or_default();
        tokio::spawn(async move {
            if let Err(err) = notifier.send_welcome(&email, &username).await {
                warn!(error = %err, %user_id, "failed to send welcome email");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::AuthService;
    use crate::application::test_support::{FakeNotifier, FakeUserRepo, sample_user, settle};
    use crate::domain::error::DomainError;
    use crate::domain::principal::Principal;
    use crate::domain::user::ProviderProfile;
    use crate::infrastructure::jwt::JwtService;
    use crate::infrastructure::oauth::{IdentityProvider, OAuthError};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[derive(Clone)]
    struct FakeProvider {
        profile: ProviderProfile,
        exchanged: Arc<Mutex<Vec<String>>>,
        reject_code: bool,
    }

    impl FakeProvider {
        fn new(email: &str) -> Self {
            Self {
                profile: ProviderProfile {
                    id: "google-42".to_string(),
                    email: email.to_string(),
                    picture: None,
                },
                exchanged: Arc::new(Mutex::new(Vec::new())),
                reject_code: false,
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
            Ok(format!("https://provider.test/auth?state={state}"))
        }

        async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
            self.exchanged
                .lock()
                .expect("exchanged mutex poisoned")
                .push(code.to_string());
            if self.reject_code {
                return Err(OAuthError::Url("bad code".to_string()));
            }
            Ok("provider-token".to_string())
        }

        async fn fetch_profile(&self, _access_token: &str) -> Result<ProviderProfile, OAuthError> {
            Ok(self.profile.clone())
        }
    }

    fn service(
        users: FakeUserRepo,
        provider: FakeProvider,
        notifier: FakeNotifier,
    ) -> AuthService<FakeUserRepo, FakeProvider, FakeNotifier> {
        AuthService::new(
            users,
            provider,
            JwtService::new(SECRET, 60, 600),
            Arc::new(notifier),
        )
    }

    #[tokio::test]
    async fn begin_login_binds_state_into_redirect() {
        let service = service(
            FakeUserRepo::default(),
            FakeProvider::new("jane@example.com"),
            FakeNotifier::default(),
        );

        let start = service.begin_login().expect("begin must succeed");

        assert!(!start.state.is_empty());
        assert!(start.redirect_url.ends_with(&start.state));
    }

    #[tokio::test]
    async fn mismatched_state_is_rejected_before_provider_call() {
        let provider = FakeProvider::new("jane@example.com");
        let service = service(FakeUserRepo::default(), provider.clone(), FakeNotifier::default());

        for (expected, returned) in [
            (Some("abc"), Some("xyz")),
            (None, Some("abc")),
            (Some("abc"), None),
            (Some(""), Some("")),
        ] {
            let err = service
                .complete_login(expected, returned, Some("code"))
                .await
                .expect_err("state mismatch must fail");
            assert!(matches!(err, DomainError::InvalidCredentials));
        }
        assert!(
            provider
                .exchanged
                .lock()
                .expect("exchanged mutex poisoned")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn first_login_creates_user_and_sends_welcome() {
        let users = FakeUserRepo::default();
        let notifier = FakeNotifier::default();
        let service = service(
            users.clone(),
            FakeProvider::new("Jane.Doe@Example.com"),
            notifier.clone(),
        );

        let outcome = service
            .complete_login(Some("s1"), Some("s1"), Some("code-1"))
            .await
            .expect("login must succeed");
        settle().await;

        assert!(outcome.created);
        assert_eq!(outcome.user.username.as_deref(), Some("Jane.Doe"));
        assert_eq!(outcome.user.google_id, "google-42");
        assert_eq!(
            notifier.sent(),
            vec![("welcome", "jane.doe@example.com".to_string())]
        );

        let principal = service
            .authenticate(&outcome.tokens.access_token)
            .await
            .expect("issued access token must authenticate");
        assert_eq!(principal.id(), outcome.user.id);
    }

    #[tokio::test]
    async fn returning_user_is_not_recreated() {
        let mut existing = sample_user(Uuid::new_v4(), "jane");
        existing.google_id = "google-42".to_string();
        let users = FakeUserRepo::with(vec![existing.clone()]);
        let notifier = FakeNotifier::default();
        let service = service(users.clone(), FakeProvider::new("jane@example.com"), notifier.clone());

        let outcome = service
            .complete_login(Some("s"), Some("s"), Some("code"))
            .await
            .expect("login must succeed");
        settle().await;

        assert!(!outcome.created);
        assert_eq!(outcome.user.id, existing.id);
        assert!(users.created.lock().expect("created mutex poisoned").is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn taken_username_gets_suffix() {
        let taken = sample_user(Uuid::new_v4(), "jane");
        let users = FakeUserRepo::with(vec![taken]);
        let service = service(users, FakeProvider::new("jane@example.com"), FakeNotifier::default());

        let outcome = service
            .complete_login(Some("s"), Some("s"), Some("code"))
            .await
            .expect("login must succeed");

        let username = outcome.user.username.expect("username must be set");
        assert!(username.starts_with("jane-"));
        assert_eq!(username.len(), "jane-".len() + 6);
    }

    #[tokio::test]
    async fn provider_failure_is_upstream_error() {
        let mut provider = FakeProvider::new("jane@example.com");
        provider.reject_code = true;
        let service = service(FakeUserRepo::default(), provider, FakeNotifier::default());

        let err = service
            .complete_login(Some("s"), Some("s"), Some("code"))
            .await
            .expect_err("login must fail");
        assert!(matches!(err, DomainError::Upstream(_)));
    }

    #[tokio::test]
    async fn refresh_issues_access_token_for_same_principal() {
        let user = sample_user(Uuid::new_v4(), "jane");
        let service = service(
            FakeUserRepo::with(vec![user.clone()]),
            FakeProvider::new("jane@example.com"),
            FakeNotifier::default(),
        );
        let jwt = JwtService::new(SECRET, 60, 600);
        let pair = jwt.issue(Principal::new(user.id)).expect("issue must succeed");

        let refreshed = service
            .refresh(&pair.refresh_token)
            .await
            .expect("refresh must succeed");
        assert_eq!(refreshed.expires_in, 3600);
        let principal = service
            .authenticate(&refreshed.access_token)
            .await
            .expect("new access token must authenticate");
        assert_eq!(principal.id(), user.id);

        let err = service
            .refresh(&pair.access_token)
            .await
            .expect_err("access token must not refresh");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn deleted_user_cannot_authenticate_or_refresh() {
        let service = service(
            FakeUserRepo::default(),
            FakeProvider::new("jane@example.com"),
            FakeNotifier::default(),
        );
        let jwt = JwtService::new(SECRET, 60, 600);
        let pair = jwt
            .issue(Principal::new(Uuid::new_v4()))
            .expect("issue must succeed");

        assert!(matches!(
            service.authenticate(&pair.access_token).await,
            Err(DomainError::InvalidCredentials)
        ));
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(DomainError::InvalidCredentials)
        ));
        assert_eq!(service.resolve_viewer(Some(&pair.access_token)).await, None);
        assert_eq!(service.resolve_viewer(None).await, None);
    }
}
