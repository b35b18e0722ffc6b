use tracing::debug;
use uuid::Uuid;

use crate::data::like_repository::LikeRepository;
use crate::domain::error::DomainError;
use crate::domain::principal::Principal;

/// Per (post, viewer) state. `NotLiked` is the absence of a like row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikeState {
    Liked,
    NotLiked,
}

impl LikeState {
    pub(crate) fn is_liked(self) -> bool {
        matches!(self, LikeState::Liked)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LikeToggle<L> {
    likes: L,
}

impl<L: LikeRepository> LikeToggle<L> {
    pub(crate) fn new(likes: L) -> Self {
        Self { likes }
    }

    /// Flips the viewer's like on a post and returns the resulting state.
    ///
    /// The unique (post, user) constraint decides concurrent toggles: losing the
    /// insert race means another request already liked the post, so the result
    /// is `Liked` either way.
    pub(crate) async fn toggle(
        &self,
        post_id: Uuid,
        viewer: Principal,
    ) -> Result<LikeState, DomainError> {
        if self.likes.has_like(post_id, viewer.id()).await? {
            let removed = self.likes.delete_like(post_id, viewer.id()).await?;
            if !removed {
                debug!(%post_id, "like already removed by a concurrent request");
            }
            return Ok(LikeState::NotLiked);
        }

        match self.likes.insert_like(post_id, viewer.id()).await {
            Ok(()) => Ok(LikeState::Liked),
            Err(DomainError::AlreadyExists(_)) => {
                debug!(%post_id, "like already inserted by a concurrent request");
                Ok(LikeState::Liked)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::data::like_repository::LikeRepository;
    use crate::domain::error::DomainError;

    /// `posts` lists the posts that exist; `race_insert` makes the next insert
    /// behave as if another request won the unique constraint.
    #[derive(Clone, Default)]
    pub(crate) struct FakeLikeRepo {
        pub(crate) rows: Arc<Mutex<HashSet<(Uuid, Uuid)>>>,
        pub(crate) posts: Arc<Mutex<HashSet<Uuid>>>,
        pub(crate) race_insert: Arc<Mutex<bool>>,
    }

    impl FakeLikeRepo {
        pub(crate) fn with_post(post_id: Uuid) -> Self {
            let repo = Self::default();
            repo.posts.lock().expect("posts mutex poisoned").insert(post_id);
            repo
        }
    }

    #[async_trait]
    impl LikeRepository for FakeLikeRepo {
        async fn has_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
            Ok(self
                .rows
                .lock()
                .expect("rows mutex poisoned")
                .contains(&(post_id, user_id)))
        }

        async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
            if !self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .contains(&post_id)
            {
                return Err(DomainError::NotFound("post".to_string()));
            }
            let mut race = self.race_insert.lock().expect("race_insert mutex poisoned");
            let mut rows = self.rows.lock().expect("rows mutex poisoned");
            if *race {
                *race = false;
                rows.insert((post_id, user_id));
                return Err(DomainError::AlreadyExists("like".to_string()));
            }
            if !rows.insert((post_id, user_id)) {
                return Err(DomainError::AlreadyExists("like".to_string()));
            }
            Ok(())
        }

        async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
            Ok(self
                .rows
                .lock()
                .expect("rows mutex poisoned")
                .remove(&(post_id, user_id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::fakes::FakeLikeRepo;
    use super::{LikeState, LikeToggle};
    use crate::domain::error::DomainError;
    use crate::domain::principal::Principal;

    #[tokio::test]
    async fn two_toggles_like_then_unlike() {
        let post_id = Uuid::new_v4();
        let viewer = Principal::new(Uuid::new_v4());
        let repo = FakeLikeRepo::with_post(post_id);
        let toggle = LikeToggle::new(repo.clone());

        let first = toggle.toggle(post_id, viewer).await.expect("toggle must succeed");
        let second = toggle.toggle(post_id, viewer).await.expect("toggle must succeed");

        assert_eq!(first, LikeState::Liked);
        assert_eq!(second, LikeState::NotLiked);
        assert!(repo.rows.lock().expect("rows mutex poisoned").is_empty());
    }

    #[tokio::test]
    async fn lost_insert_race_reports_liked() {
        let post_id = Uuid::new_v4();
        let viewer = Principal::new(Uuid::new_v4());
        let repo = FakeLikeRepo::with_post(post_id);
        *repo.race_insert.lock().expect("race_insert mutex poisoned") = true;

        let state = LikeToggle::new(repo.clone())
            .toggle(post_id, viewer)
            .await
            .expect("toggle must succeed");

        assert!(state.is_liked());
        assert_eq!(repo.rows.lock().expect("rows mutex poisoned").len(), 1);
    }

    #[tokio::test]
    async fn likes_are_tracked_per_viewer() {
        let post_id = Uuid::new_v4();
        let alice = Principal::new(Uuid::new_v4());
        let bob = Principal::new(Uuid::new_v4());
        let toggle = LikeToggle::new(FakeLikeRepo::with_post(post_id));

        assert!(toggle.toggle(post_id, alice).await.expect("toggle").is_liked());
        assert!(toggle.toggle(post_id, bob).await.expect("toggle").is_liked());
        assert!(!toggle.toggle(post_id, alice).await.expect("toggle").is_liked());
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let toggle = LikeToggle::new(FakeLikeRepo::default());

        let err = toggle
            .toggle(Uuid::new_v4(), Principal::new(Uuid::new_v4()))
            .await
            .expect_err("toggle must fail");

        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
