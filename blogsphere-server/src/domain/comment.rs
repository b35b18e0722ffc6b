use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: Uuid,
    pub(crate) post_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) parent_comment_id: Option<Uuid>,
    pub(crate) body: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) post_id: Uuid,
    pub(crate) parent_comment_id: Option<Uuid>,
    pub(crate) body: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            body: normalize_comment_body(&self.body)?,
            ..self
        })
    }
}

pub(crate) fn normalize_comment_body(body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() || body.chars().count() > 5000 {
        return Err(DomainError::Validation {
            field: "body",
            message: "must be 1..5000 chars",
        });
    }
    Ok(body.to_string())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{CreateCommentRequest, normalize_comment_body};

    #[test]
    fn comment_body_is_trimmed() {
        let req = CreateCommentRequest {
            post_id: Uuid::new_v4(),
            parent_comment_id: None,
            body: "  nice post  ".to_string(),
        };
        assert_eq!(req.validate().expect("must validate").body, "nice post");
    }

    #[test]
    fn comment_body_bounds_are_checked() {
        assert!(normalize_comment_body("   ").is_err());
        assert!(normalize_comment_body(&"x".repeat(5001)).is_err());
        assert!(normalize_comment_body(&"x".repeat(5000)).is_ok());
    }
}
