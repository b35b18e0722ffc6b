use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;

use crate::data::relation_gateway::{PostCategoryRow, PostCount, RelationGateway};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::feed::{AuthorProfile, Authored, CategoryTag, CommentView, PostCard};
use crate::domain::post::Post;
use crate::domain::principal::Principal;
use crate::domain::user::User;

/// Joins primary rows with their related data. All secondary fetches of one call
/// are polled concurrently on the caller's task; the first failure aborts the rest
/// and nothing partial is returned.
#[derive(Debug, Clone)]
pub(crate) struct Enricher<G> {
    gateway: G,
}

impl<G: RelationGateway> Enricher<G> {
    pub(crate) fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub(crate) async fn enrich_posts(
        &self,
        posts: Vec<Post>,
        viewer: Option<Principal>,
    ) -> Result<Vec<PostCard>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(Authored::key).collect();
        let author_ids = distinct_author_ids(&posts);
        let gateway = &self.gateway;

        let (users, categories, like_counts, comment_counts, liked) = tokio::try_join!(
            async {
                gateway
                    .users_by_ids(&author_ids)
                    .await
                    .map_err(DomainError::aggregation("authors"))
            },
            async {
                gateway
                    .categories_by_post_ids(&post_ids)
                    .await
                    .map_err(DomainError::aggregation("categories"))
            },
            async {
                gateway
                    .like_counts_by_post_ids(&post_ids)
                    .await
                    .map_err(DomainError::aggregation("like counts"))
            },
            async {
                gateway
                    .comment_counts_by_post_ids(&post_ids)
                    .await
                    .map_err(DomainError::aggregation("comment counts"))
            },
            async {
                match viewer {
                    Some(viewer) => gateway
                        .liked_post_ids(viewer.id(), &post_ids)
                        .await
                        .map_err(DomainError::aggregation("liked posts")),
                    None => Ok(Vec::new()),
                }
            },
        )?;

        let authors = author_index(users);
        let mut categories = category_index(categories);
        let like_counts = count_index(like_counts);
        let comment_counts = count_index(comment_counts);
        let liked: HashSet<Uuid> = liked.into_iter().collect();

        debug!(
            posts = posts.len(),
            authors = authors.len(),
            viewer = viewer.is_some(),
            "posts enriched"
        );

        Ok(posts
            .into_iter()
            .map(|post| {
                let id = post.id;
                let author = authors.get(&post.author_id).cloned().unwrap_or_default();
                let mut card = PostCard::new(post, author);
                card.categories = categories.remove(&id).unwrap_or_default();
                card.like_count = like_counts.get(&id).copied().unwrap_or(0);
                card.comment_count = comment_counts.get(&id).copied().unwrap_or(0);
                card.user_has_liked = liked.contains(&id);
                card
            })
            .collect())
    }

    pub(crate) async fn enrich_comments(
        &self,
        comments: Vec<Comment>,
    ) -> Result<Vec<CommentView>, DomainError> {
        if comments.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids = distinct_author_ids(&comments);
        let users = self
            .gateway
            .users_by_ids(&author_ids)
            .await
            .map_err(DomainError::aggregation("authors"))?;
        let authors = author_index(users);

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.user_id).cloned().unwrap_or_default();
                CommentView::new(comment, author)
            })
            .collect())
    }
}

fn distinct_author_ids<T: Authored>(rows: &[T]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .map(Authored::author_key)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn author_index(users: Vec<User>) -> HashMap<Uuid, AuthorProfile> {
    users
        .iter()
        .map(|user| (user.id, AuthorProfile::from(user)))
        .collect()
}

fn category_index(rows: Vec<PostCategoryRow>) -> HashMap<Uuid, Vec<CategoryTag>> {
    let mut index: HashMap<Uuid, Vec<CategoryTag>> = HashMap::new();
    for row in rows {
        index
            .entry(row.post_id)
            .or_default()
            .push(CategoryTag::from(row.category));
    }
    index
}

fn count_index(rows: Vec<PostCount>) -> HashMap<Uuid, i64> {
    rows.into_iter().map(|row| (row.post_id, row.count)).collect()
}
