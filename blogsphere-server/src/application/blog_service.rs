use tracing::info;
use uuid::Uuid;

use crate::application::aggregation::Enricher;
use crate::application::like_toggle::{LikeState, LikeToggle};
use crate::application::transaction::execute_atomic;
use crate::data::like_repository::LikeRepository;
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::relation_gateway::RelationGateway;
use crate::data::transaction::{UnitOfWork, WriteTransaction};
use crate::domain::error::DomainError;
use crate::domain::feed::PostCard;
use crate::domain::post::{CreatePostRequest, Post, PostFilter, UpdatePostRequest, generate_slug};
use crate::domain::principal::Principal;

#[derive(Debug, Clone)]
pub(crate) struct FeedPage {
    pub(crate) posts: Vec<PostCard>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) has_more: bool,
}

pub(crate) struct BlogService<R, G, L, U> {
    repo: R,
    enricher: Enricher<G>,
    likes: LikeToggle<L>,
    uow: U,
}

impl<R, G, L, U> BlogService<R, G, L, U>
where
    R: PostRepository,
    G: RelationGateway,
    L: LikeRepository,
    U: UnitOfWork,
{
    pub(crate) fn new(repo: R, gateway: G, likes: L, uow: U) -> Self {
        Self {
            repo,
            enricher: Enricher::new(gateway),
            likes: LikeToggle::new(likes),
            uow,
        }
    }

    pub(crate) async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
        viewer: Option<Principal>,
    ) -> Result<FeedPage, DomainError> {
        let posts = self.repo.list_posts(&filter, pagination).await?;
        let has_more = posts.len() == pagination.limit as usize;
        let posts = self.enricher.enrich_posts(posts, viewer).await?;

        Ok(FeedPage {
            posts,
            page: pagination.page,
            limit: pagination.limit,
            has_more,
        })
    }

    pub(crate) async fn get_post(
        &self,
        slug: &str,
        viewer: Option<Principal>,
    ) -> Result<PostCard, DomainError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))?;
        self.enrich_one(post, viewer).await
    }

    /// Inserts the post and its category links as one unit; the result is
    /// enriched from the author's point of view.
    pub(crate) async fn create_post(
        &self,
        author: Principal,
        req: CreatePostRequest,
    ) -> Result<PostCard, DomainError> {
        let req = req.validate()?;
        let new_post = NewPost {
            slug: generate_slug(&req.title),
            title: req.title,
            body: req.body,
            author_id: author.id(),
            is_published: true,
        };
        let category_ids = req.category_ids;

        let post = execute_atomic(&self.uow, move |tx| {
            Box::pin(async move {
                let post = tx.insert_post(new_post).await?;
                tx.link_categories(post.id, &category_ids).await?;
                Ok::<_, DomainError>(post)
            })
        })
        .await?;

        info!(post_id = %post.id, author_id = %author, "post created");
        self.enrich_one(post, Some(author)).await
    }

    pub(crate) async fn update_post(
        &self,
        actor: Principal,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<PostCard, DomainError> {
        let req = req.validate()?;
        self.owned_post(actor, post_id).await?;

        let patch = PostPatch {
            title: req.title,
            body: req.body,
        };
        let post = self
            .repo
            .update_post_owned(post_id, actor.id(), patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        self.enrich_one(post, Some(actor)).await
    }

    pub(crate) async fn delete_post(
        &self,
        actor: Principal,
        post_id: Uuid,
    ) -> Result<(), DomainError> {
        self.owned_post(actor, post_id).await?;

        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        info!(%post_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn toggle_like(
        &self,
        post_id: Uuid,
        viewer: Principal,
    ) -> Result<LikeState, DomainError> {
        self.likes.toggle(post_id, viewer).await
    }

    async fn owned_post(&self, actor: Principal, post_id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        if post.author_id != actor.id() {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    async fn enrich_one(
        &self,
        post: Post,
        viewer: Option<Principal>,
    ) -> Result<PostCard, DomainError> {
        self.enricher
            .enrich_posts(vec![post], viewer)
            .await?
            .pop()
            .ok_or_else(|| DomainError::Unexpected("enriched post missing".to_string()))
    }
}
