//! Joined read models returned by the aggregation engine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::category::Category;
use super::comment::Comment;
use super::post::Post;
use super::user::User;

/// Author projection embedded in posts and comments. A missing author row
/// yields `AuthorProfile::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct AuthorProfile {
    pub(crate) id: Uuid,
    pub(crate) google_id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) avatar_url: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<&User> for AuthorProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            google_id: user.google_id.clone(),
            username: user.username.clone().unwrap_or_default(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone().unwrap_or_default(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryTag {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryTag {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PostCard {
    pub(crate) id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) body: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) author: AuthorProfile,
    pub(crate) categories: Vec<CategoryTag>,
    pub(crate) like_count: i64,
    pub(crate) comment_count: i64,
    pub(crate) user_has_liked: bool,
}

impl PostCard {
    pub(crate) fn new(post: Post, author: AuthorProfile) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            slug: post.slug,
            body: post.body,
            is_published: post.is_published,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author,
            categories: Vec::new(),
            like_count: 0,
            comment_count: 0,
            user_has_liked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CommentView {
    pub(crate) id: Uuid,
    pub(crate) post_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) parent_comment_id: Option<Uuid>,
    pub(crate) body: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) author: AuthorProfile,
}

impl CommentView {
    pub(crate) fn new(comment: Comment, author: AuthorProfile) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            parent_comment_id: comment.parent_comment_id,
            body: comment.body,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            author,
        }
    }
}

/// Primary rows the engine can enrich: each carries a key and an author key.
pub(crate) trait Authored {
    fn key(&self) -> Uuid;
    fn author_key(&self) -> Uuid;
}

impl Authored for Post {
    fn key(&self) -> Uuid {
        self.id
    }

    fn author_key(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    fn key(&self) -> Uuid {
        self.id
    }

    fn author_key(&self) -> Uuid {
        self.user_id
    }
}
