pub(crate) mod category;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod feed;
pub(crate) mod post;
pub(crate) mod principal;
pub(crate) mod user;
