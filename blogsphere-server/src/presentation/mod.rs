use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::category_service::CategoryService;
use crate::application::comment_service::CommentService;
use crate::application::user_service::UserService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::like_repository::PostgresLikeRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::relation_gateway::PostgresRelationGateway;
use crate::data::repositories::postgres::transaction::PostgresUnitOfWork;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::mailer::MailerSendNotifier;
use crate::infrastructure::oauth::GoogleOAuthClient;
use cookies::CookiePolicy;

pub(crate) mod app_error;
pub(crate) mod cookies;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type PgAuthService =
    AuthService<PostgresUserRepository, GoogleOAuthClient, MailerSendNotifier>;
pub(crate) type PgBlogService = BlogService<
    PostgresPostRepository,
    PostgresRelationGateway,
    PostgresLikeRepository,
    PostgresUnitOfWork,
>;
pub(crate) type PgCommentService = CommentService<PostgresCommentRepository, PostgresRelationGateway>;
pub(crate) type PgUserService = UserService<
    PostgresUserRepository,
    PostgresPostRepository,
    PostgresRelationGateway,
    MailerSendNotifier,
>;
pub(crate) type PgCategoryService = CategoryService<PostgresCategoryRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<PgAuthService>,
    pub(crate) blog_service: Arc<PgBlogService>,
    pub(crate) comment_service: Arc<PgCommentService>,
    pub(crate) user_service: Arc<PgUserService>,
    pub(crate) category_service: Arc<PgCategoryService>,
    pub(crate) cookies: CookiePolicy,
    pub(crate) oauth_success_redirect: Arc<str>,
}
