pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod like_repository;
pub(crate) mod post_repository;
pub(crate) mod relation_gateway;
pub(crate) mod transaction;
pub(crate) mod user_repository;
