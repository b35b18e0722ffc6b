use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::aggregation::Enricher;
use crate::data::post_repository::PostRepository;
use crate::data::relation_gateway::RelationGateway;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::feed::PostCard;
use crate::domain::principal::Principal;
use crate::domain::user::{UpdateDescriptionRequest, User};
use crate::infrastructure::mailer::Notifier;

pub(crate) struct UserService<U, P, G, N> {
    users: U,
    posts: P,
    enricher: Enricher<G>,
    notifier: Arc<N>,
}

impl<U, P, G, N> UserService<U, P, G, N>
where
    U: UserRepository,
    P: PostRepository,
    G: RelationGateway,
    N: Notifier,
{
    pub(crate) fn new(users: U, posts: P, gateway: G, notifier: Arc<N>) -> Self {
        Self {
            users,
            posts,
            enricher: Enricher::new(gateway),
            notifier,
        }
    }

    pub(crate) async fn get_user_by_id(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))
    }

    pub(crate) async fn get_user_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("username: {username}")))
    }

    pub(crate) async fn current_user(&self, principal: Principal) -> Result<User, DomainError> {
        self.get_user_by_id(principal.id()).await
    }

    pub(crate) async fn update_description(
        &self,
        actor: Principal,
        user_id: Uuid,
        req: UpdateDescriptionRequest,
    ) -> Result<User, DomainError> {
        if actor.id() != user_id {
            return Err(DomainError::Forbidden);
        }
        let req = req.validate()?;

        self.users
            .update_description(user_id, req.description)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    /// Deletes the account (posts, comments and likes cascade) and sends the
    /// farewell notification in the background.
    pub(crate) async fn delete_user(
        &self,
        actor: Principal,
        user_id: Uuid,
    ) -> Result<(), DomainError> {
        if actor.id() != user_id {
            return Err(DomainError::Forbidden);
        }
        let user = self.get_user_by_id(user_id).await?;

        if !self.users.delete_user(user_id).await? {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        info!(%user_id, "user deleted");

        let notifier = Arc::clone(&self.notifier);
        let email = user.email;
        let username = user.username.unwrap_or_default();
        tokio::spawn(async move {
            if let Err(err) = notifier.send_account_deleted(&email, &username).await {
                warn!(error = %err, %user_id, "failed to send account deletion email");
            }
        });
        Ok(())
    }

    pub(crate) async fn posts_by_username(
        &self,
        username: &str,
        viewer: Option<Principal>,
    ) -> Result<Vec<PostCard>, DomainError> {
        self.get_user_by_username(username).await?;
        let posts = self.posts.list_by_author_username(username).await?;
        self.enricher.enrich_posts(posts, viewer).await
    }

    pub(crate) async fn liked_posts_by_username(
        &self,
        username: &str,
        viewer: Option<Principal>,
    ) -> Result<Vec<PostCard>, DomainError> {
        self.get_user_by_username(username).await?;
        let posts = self.posts.list_liked_by_username(username).await?;
        self.enricher.enrich_posts(posts, viewer).await
    }
}
