use uuid::Uuid;

use crate::application::aggregation::Enricher;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::relation_gateway::RelationGateway;
use crate::domain::comment::{Comment, CreateCommentRequest, normalize_comment_body};
use crate::domain::error::DomainError;
use crate::domain::feed::CommentView;
use crate::domain::principal::Principal;

pub(crate) struct CommentService<C, G> {
    repo: C,
    enricher: Enricher<G>,
}

impl<C: CommentRepository, G: RelationGateway> CommentService<C, G> {
    pub(crate) fn new(repo: C, gateway: G) -> Self {
        Self {
            repo,
            enricher: Enricher::new(gateway),
        }
    }

    /// Oldest first.
    pub(crate) async fn comments_for_post(&self, slug: &str) -> Result<Vec<CommentView>, DomainError> {
        let comments = self.repo.list_by_post_slug(slug).await?;
        self.enricher.enrich_comments(comments).await
    }

    pub(crate) async fn create_comment(
        &self,
        author: Principal,
        req: CreateCommentRequest,
    ) -> Result<CommentView, DomainError> {
        let req = req.validate()?;
        let comment = self
            .repo
            .create_comment(NewComment {
                post_id: req.post_id,
                user_id: author.id(),
                parent_comment_id: req.parent_comment_id,
                body: req.body,
            })
            .await?;

        self.enrich_one(comment).await
    }

    pub(crate) async fn update_comment(
        &self,
        actor: Principal,
        comment_id: Uuid,
        body: &str,
    ) -> Result<CommentView, DomainError> {
        let body = normalize_comment_body(body)?;
        self.owned_comment(actor, comment_id).await?;

        let comment = self
            .repo
            .update_comment(comment_id, &body)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        self.enrich_one(comment).await
    }

    pub(crate) async fn delete_comment(
        &self,
        actor: Principal,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        self.owned_comment(actor, comment_id).await?;

        if !self.repo.delete_comment(comment_id).await? {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }
        Ok(())
    }

    async fn owned_comment(
        &self,
        actor: Principal,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .repo
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;

        if comment.user_id != actor.id() {
            return Err(DomainError::Forbidden);
        }
        Ok(comment)
    }

    async fn enrich_one(&self, comment: Comment) -> Result<CommentView, DomainError> {
        self.enricher
            .enrich_comments(vec![comment])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Unexpected("enriched comment missing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::CommentService;
    use crate::application::test_support::{FakeRelationGateway, sample_comment, sample_user};
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::domain::comment::{Comment, CreateCommentRequest};
    use crate::domain::error::DomainError;
    use crate::domain::principal::Principal;

    /// `posts` maps post slug to post id; unknown post ids fail like the FK would.
    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        comments: Arc<Mutex<Vec<Comment>>>,
        posts: Arc<Mutex<Vec<(String, Uuid)>>>,
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
            if !self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .iter()
                .any(|(_, id)| *id == input.post_id)
            {
                return Err(DomainError::NotFound("post".to_string()));
            }
            let mut comment =
                sample_comment(Uuid::new_v4(), input.post_id, input.user_id, &input.body);
            comment.parent_comment_id = input.parent_comment_id;
            self.comments
                .lock()
                .expect("comments mutex poisoned")
                .push(comment.clone());
            Ok(comment)
        }

        async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
            Ok(self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn update_comment(
            &self,
            id: Uuid,
            body: &str,
        ) -> Result<Option<Comment>, DomainError> {
            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            Ok(comments.iter_mut().find(|c| c.id == id).map(|c| {
                c.body = body.to_string();
                c.clone()
            }))
        }

        async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            let before = comments.len();
            comments.retain(|c| c.id != id);
            Ok(comments.len() != before)
        }

        async fn list_by_post_slug(&self, slug: &str) -> Result<Vec<Comment>, DomainError> {
            let post_id = self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .iter()
                .find(|(s, _)| s == slug)
                .map(|(_, id)| *id);
            Ok(self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .iter()
                .filter(|c| Some(c.post_id) == post_id)
                .cloned()
                .collect())
        }
    }

    fn setup() -> (FakeCommentRepo, Uuid, Principal, FakeRelationGateway) {
        let repo = FakeCommentRepo::default();
        let post_id = Uuid::new_v4();
        repo.posts
            .lock()
            .expect("posts mutex poisoned")
            .push(("hello-world-1234".to_string(), post_id));
        let alice = sample_user(Uuid::new_v4(), "alice");
        let gateway = FakeRelationGateway::with_users(vec![alice.clone()]);
        (repo, post_id, Principal::new(alice.id), gateway)
    }

    #[tokio::test]
    async fn create_comment_is_enriched_with_author() {
        let (repo, post_id, alice, gateway) = setup();
        let service = CommentService::new(repo, gateway);

        let view = service
            .create_comment(
                alice,
                CreateCommentRequest {
                    post_id,
                    parent_comment_id: None,
                    body: "  great read ".to_string(),
                },
            )
            .await
            .expect("create must succeed");

        assert_eq!(view.body, "great read");
        assert_eq!(view.author.username, "alice");

        let listed = service
            .comments_for_post("hello-world-1234")
            .await
            .expect("list must succeed");
        assert_eq!(listed, vec![view]);
    }

    #[tokio::test]
    async fn create_comment_on_missing_post_is_not_found() {
        let (repo, _, alice, gateway) = setup();
        let service = CommentService::new(repo, gateway);

        let err = service
            .create_comment(
                alice,
                CreateCommentRequest {
                    post_id: Uuid::new_v4(),
                    parent_comment_id: None,
                    body: "hi".to_string(),
                },
            )
            .await
            .expect_err("create must fail");

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_the_author_may_edit_or_delete() {
        let (repo, post_id, alice, gateway) = setup();
        let service = CommentService::new(repo, gateway);
        let created = service
            .create_comment(
                alice,
                CreateCommentRequest {
                    post_id,
                    parent_comment_id: None,
                    body: "first".to_string(),
                },
            )
            .await
            .expect("create must succeed");
        let stranger = Principal::new(Uuid::new_v4());

        let err = service
            .update_comment(stranger, created.id, "hijack")
            .await
            .expect_err("stranger must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));

        let err = service
            .delete_comment(stranger, created.id)
            .await
            .expect_err("stranger must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));

        let updated = service
            .update_comment(alice, created.id, " edited ")
            .await
            .expect("author update must succeed");
        assert_eq!(updated.body, "edited");

        service
            .delete_comment(alice, created.id)
            .await
            .expect("author delete must succeed");
        let err = service
            .delete_comment(alice, created.id)
            .await
            .expect_err("second delete must be not found");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
