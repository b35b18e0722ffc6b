pub(crate) mod aggregation;
pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod category_service;
pub(crate) mod comment_service;
pub(crate) mod like_toggle;
pub(crate) mod transaction;
pub(crate) mod user_service;

#[cfg(test)]
pub(crate) mod test_support;
