use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) id: uuid::Uuid,
    pub(crate) google_id: String,
    pub(crate) username: Option<String>,
    pub(crate) email: String,
    pub(crate) avatar_url: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Profile document returned by the identity provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProviderProfile {
    pub(crate) id: String,
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewUser {
    pub(crate) google_id: String,
    pub(crate) username: Option<String>,
    pub(crate) email: String,
    pub(crate) avatar_url: Option<String>,
}

impl NewUser {
    /// The username is the local part of the e-mail address as the provider
    /// sent it; only the stored e-mail is lowercased.
    pub(crate) fn from_profile(profile: ProviderProfile) -> Result<Self, DomainError> {
        let google_id = profile.id.trim().to_string();
        if google_id.is_empty() {
            return Err(DomainError::Validation {
                field: "google_id",
                message: "must not be empty",
            });
        }
        let email = normalize_email(&profile.email)?;
        let username = profile
            .email
            .trim()
            .split_once('@')
            .map(|(local, _)| local.to_string())
            .filter(|local| !local.is_empty());
        let avatar_url = profile.picture.filter(|url| !url.trim().is_empty());

        Ok(Self {
            google_id,
            username,
            email,
            avatar_url,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdateDescriptionRequest {
    pub(crate) description: Option<String>,
}

impl UpdateDescriptionRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description.as_ref().is_some_and(|d| d.chars().count() > 500) {
            return Err(DomainError::Validation {
                field: "description",
                message: "must be at most 500 chars",
            });
        }
        Ok(Self { description })
    }
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{NewUser, ProviderProfile, UpdateDescriptionRequest, normalize_email};
    use crate::domain::error::DomainError;

    fn profile(email: &str) -> ProviderProfile {
        ProviderProfile {
            id: "1234567890".to_string(),
            email: email.to_string(),
            picture: Some("https://example.com/a.png".to_string()),
        }
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn new_user_takes_username_from_email_local_part() {
        let user = NewUser::from_profile(profile("Jane.Doe@Example.com")).expect("must build");
        assert_eq!(user.username.as_deref(), Some("Jane.Doe"));
        assert_eq!(user.email, "jane.doe@example.com");
        assert_eq!(user.avatar_url.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn userinfo_display_name_does_not_shape_the_user() {
        let profile: ProviderProfile = serde_json::from_str(
            r#"{"id":"42","email":"Sam@Example.com","name":"Someone Else","picture":""}"#,
        )
        .expect("userinfo must deserialize");

        let user = NewUser::from_profile(profile).expect("must build");
        assert_eq!(user.username.as_deref(), Some("Sam"));
        assert_eq!(user.email, "sam@example.com");
        assert_eq!(user.avatar_url, None);
    }

    #[test]
    fn new_user_rejects_invalid_email() {
        let err = NewUser::from_profile(profile("nope")).expect_err("must fail");
        assert!(matches!(err, DomainError::Validation { field: "email", .. }));
    }

    #[test]
    fn description_is_trimmed_and_blank_clears_it() {
        let req = UpdateDescriptionRequest {
            description: Some("   ".to_string()),
        };
        assert_eq!(req.validate().expect("must validate").description, None);

        let too_long = UpdateDescriptionRequest {
            description: Some("x".repeat(501)),
        };
        assert!(too_long.validate().is_err());
    }
}
