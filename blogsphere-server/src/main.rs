use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::blog_service::BlogService;
use application::category_service::CategoryService;
use application::comment_service::CommentService;
use application::user_service::UserService;
use data::repositories::postgres::category_repository::PostgresCategoryRepository;
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::like_repository::PostgresLikeRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::relation_gateway::PostgresRelationGateway;
use data::repositories::postgres::transaction::PostgresUnitOfWork;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::mailer::MailerSendNotifier;
use infrastructure::oauth::GoogleOAuthClient;
use infrastructure::settings::Settings;
use presentation::AppState;
use presentation::cookies::CookiePolicy;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings).await?;
    run_migrations(&pool).await?;
    info!("migrations applied");

    let users = PostgresUserRepository::new(pool.clone());
    let posts = PostgresPostRepository::new(pool.clone());
    let gateway = PostgresRelationGateway::new(pool.clone());
    let likes = PostgresLikeRepository::new(pool.clone());
    let comments = PostgresCommentRepository::new(pool.clone());
    let categories = PostgresCategoryRepository::new(pool.clone());
    let uow = PostgresUnitOfWork::new(pool);

    let jwt = JwtService::new(
        &settings.jwt_secret,
        settings.access_token_ttl_minutes,
        settings.refresh_token_ttl_minutes,
    );
    let provider = GoogleOAuthClient::from_settings(&settings)?;
    let notifier = Arc::new(MailerSendNotifier::from_settings(&settings)?);

    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            users.clone(),
            provider,
            jwt,
            Arc::clone(&notifier),
        )),
        blog_service: Arc::new(BlogService::new(
            posts.clone(),
            gateway.clone(),
            likes,
            uow,
        )),
        comment_service: Arc::new(CommentService::new(comments, gateway.clone())),
        user_service: Arc::new(UserService::new(users, posts, gateway, notifier)),
        category_service: Arc::new(CategoryService::new(categories)),
        cookies: CookiePolicy::new(settings.cookie_secure),
        oauth_success_redirect: Arc::from(settings.oauth_success_redirect.as_str()),
    };

    server::run_http(&settings, state).await
}
