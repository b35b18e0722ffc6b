use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) body: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) category_ids: Vec<Uuid>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(self.category_ids.len());
        if !self.category_ids.iter().all(|id| seen.insert(*id)) {
            return Err(DomainError::Validation {
                field: "category_ids",
                message: "must not contain duplicates",
            });
        }
        Ok(Self {
            title: normalize_title(&self.title)?,
            body: normalize_body(&self.body)?,
            category_ids: self.category_ids,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) body: String,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            body: normalize_body(&self.body)?,
        })
    }
}

/// Feed filter; blank strings mean "no filter".
#[derive(Debug, Clone, Default)]
pub(crate) struct PostFilter {
    pub(crate) search: Option<String>,
    pub(crate) category_slug: Option<String>,
}

impl PostFilter {
    pub(crate) fn new(search: Option<String>, category_slug: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            search: clean(search),
            category_slug: clean(category_slug),
        }
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes.
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug with a short random suffix so equal titles never collide.
pub(crate) fn generate_slug(title: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let base = slugify(title);
    if base.is_empty() {
        return suffix[..12].to_string();
    }
    format!("{base}-{}", &suffix[..8])
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_body(body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation {
            field: "body",
            message: "must not be empty",
        });
    }
    Ok(body.to_string())
}
