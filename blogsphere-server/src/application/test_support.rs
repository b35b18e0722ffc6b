//! Hand-written fakes shared by the service test modules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::data::relation_gateway::{PostCategoryRow, PostCount, RelationGateway};
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{NewUser, User};
use crate::infrastructure::mailer::{MailError, Notifier};

pub(crate) fn sample_user(id: Uuid, username: &str) -> User {
    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    User {
        id,
        google_id: format!("google-{username}"),
        username: Some(username.to_string()),
        email: format!("{username}@example.com"),
        avatar_url: Some(format!("https://example.com/{username}.png")),
        description: None,
        created_at: ts,
        updated_at: ts,
    }
}

pub(crate) fn sample_post(id: Uuid, author_id: Uuid, title: &str) -> Post {
    let ts = Utc.with_ymd_and_hms(2025, 2, 1, 8, 30, 0).unwrap();
    Post {
        id,
        author_id,
        title: title.to_string(),
        slug: format!("{}-0000", title.to_lowercase().replace(' ', "-")),
        body: format!("body of {title}"),
        is_published: true,
        created_at: ts,
        updated_at: ts,
    }
}

pub(crate) fn sample_comment(id: Uuid, post_id: Uuid, user_id: Uuid, body: &str) -> Comment {
    let ts = Utc.with_ymd_and_hms(2025, 2, 2, 9, 0, 0).unwrap();
    Comment {
        id,
        post_id,
        user_id,
        parent_comment_id: None,
        body: body.to_string(),
        created_at: ts,
        updated_at: ts,
    }
}

pub(crate) fn sample_category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_lowercase(),
        description: None,
        icon: None,
        created_at: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap(),
    }
}

/// In-memory relation gateway. Every call is appended to `calls` under the
/// relation name the engine reports it with; `fail_on` makes that relation
/// error and `stall_on` makes it never complete.
#[derive(Clone, Default)]
pub(crate) struct FakeRelationGateway {
    pub(crate) users: Arc<Mutex<Vec<User>>>,
    pub(crate) categories: Arc<Mutex<Vec<PostCategoryRow>>>,
    pub(crate) like_counts: Arc<Mutex<Vec<PostCount>>>,
    pub(crate) comment_counts: Arc<Mutex<Vec<PostCount>>>,
    pub(crate) likes: Arc<Mutex<Vec<(Uuid, Uuid)>>>,
    pub(crate) calls: Arc<Mutex<Vec<&'static str>>>,
    pub(crate) fail_on: Arc<Mutex<Option<&'static str>>>,
    pub(crate) stall_on: Arc<Mutex<Option<&'static str>>>,
}

impl FakeRelationGateway {
    pub(crate) fn with_users(users: Vec<User>) -> Self {
        let gateway = Self::default();
        *gateway.users.lock().expect("users mutex poisoned") = users;
        gateway
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(crate) fn fail_on(&self, relation: &'static str) {
        *self.fail_on.lock().expect("fail_on mutex poisoned") = Some(relation);
    }

    pub(crate) fn stall_on(&self, relation: &'static str) {
        *self.stall_on.lock().expect("stall_on mutex poisoned") = Some(relation);
    }

    async fn enter(&self, relation: &'static str) -> Result<(), DomainError> {
        self.calls.lock().expect("calls mutex poisoned").push(relation);
        let fail = *self.fail_on.lock().expect("fail_on mutex poisoned") == Some(relation);
        let stall = *self.stall_on.lock().expect("stall_on mutex poisoned") == Some(relation);

        if stall {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(DomainError::Unexpected(format!("{relation} store down")));
        }
        Ok(())
    }
}

#[async_trait]
impl RelationGateway for FakeRelationGateway {
    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError> {
        self.enter("authors").await?;
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn categories_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCategoryRow>, DomainError> {
        self.enter("categories").await?;
        Ok(self
            .categories
            .lock()
            .expect("categories mutex poisoned")
            .iter()
            .filter(|row| post_ids.contains(&row.post_id))
            .cloned()
            .collect())
    }

    async fn like_counts_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCount>, DomainError> {
        self.enter("like_counts").await?;
        Ok(self
            .like_counts
            .lock()
            .expect("like_counts mutex poisoned")
            .iter()
            .filter(|row| post_ids.contains(&row.post_id))
            .copied()
            .collect())
    }

    async fn comment_counts_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCount>, DomainError> {
        self.enter("comment_counts").await?;
        Ok(self
            .comment_counts
            .lock()
            .expect("comment_counts mutex poisoned")
            .iter()
            .filter(|row| post_ids.contains(&row.post_id))
            .copied()
            .collect())
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DomainError> {
        self.enter("liked_posts").await?;
        Ok(self
            .likes
            .lock()
            .expect("likes mutex poisoned")
            .iter()
            .filter(|(user, post)| *user == user_id && post_ids.contains(post))
            .map(|(_, post)| *post)
            .collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeUserRepo {
    pub(crate) users: Arc<Mutex<HashMap<Uuid, User>>>,
    pub(crate) created: Arc<Mutex<Vec<NewUser>>>,
    pub(crate) deleted: Arc<Mutex<Vec<Uuid>>>,
}

impl FakeUserRepo {
    pub(crate) fn with(users: Vec<User>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.users.lock().expect("users mutex poisoned");
            for user in users {
                map.insert(user.id, user);
            }
        }
        repo
    }
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        self.created
            .lock()
            .expect("created mutex poisoned")
            .push(input.clone());

        let mut users = self.users.lock().expect("users mutex poisoned");
        if users.values().any(|u| u.username == input.username) {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        let mut user = sample_user(Uuid::new_v4(), "placeholder");
        user.google_id = input.google_id;
        user.username = input.username;
        user.email = input.email;
        user.avatar_url = input.avatar_url;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .get(&id)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .values()
            .find(|u| u.google_id == google_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn update_description(
        &self,
        id: Uuid,
        description: Option<String>,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        Ok(users.get_mut(&id).map(|user| {
            user.description = description;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DomainError> {
        self.deleted.lock().expect("deleted mutex poisoned").push(id);
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .remove(&id)
            .is_some())
    }
}

/// Records every notification as `(kind, email)`.
#[derive(Clone, Default)]
pub(crate) struct FakeNotifier {
    pub(crate) sent: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl FakeNotifier {
    pub(crate) fn sent(&self) -> Vec<(&'static str, String)> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_welcome(&self, to_email: &str, _username: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(("welcome", to_email.to_string()));
        Ok(())
    }

    async fn send_account_deleted(
        &self,
        to_email: &str,
        _username: &str,
    ) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(("account_deleted", to_email.to_string()));
        Ok(())
    }
}

/// Spawned notifications run on the test runtime; give them a chance to finish.
pub(crate) async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
