use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_idle_timeout_secs: u64,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,
    pub cookie_secure: bool,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub oauth_success_redirect: String,
    pub mailersend_api_key: Option<String>,
    pub from_email: Option<String>,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let db_max_connections = parse_u32_env("DB_MAX_CONNECTIONS", 30)?;
        let db_min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("Failed to parse DB_MIN_CONNECTIONS, expecting integer")?;
        if db_min_connections > db_max_connections {
            return Err(anyhow!(
                "DB_MIN_CONNECTIONS must be <= DB_MAX_CONNECTIONS"
            ));
        }
        let db_idle_timeout_secs = parse_u64_env("DB_IDLE_TIMEOUT_SECS", 15 * 60)?;

        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }
        let access_token_ttl_minutes = parse_ttl_minutes_env("ACCESS_TOKEN_EXPIRE_MINUTES", 24 * 60)?;
        let refresh_token_ttl_minutes =
            parse_ttl_minutes_env("REFRESH_TOKEN_EXPIRE_MINUTES", 7 * 24 * 60)?;
        let cookie_secure = parse_bool_env("COOKIE_SECURE", true)?;

        let google_client_id =
            get_required("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID is required")?;
        let google_client_secret =
            get_required("GOOGLE_CLIENT_SECRET").context("GOOGLE_CLIENT_SECRET is required")?;
        let google_redirect_uri =
            get_required("GOOGLE_REDIRECT_URI").context("GOOGLE_REDIRECT_URI is required")?;
        let oauth_success_redirect = std::env::var("OAUTH_SUCCESS_REDIRECT")
            .unwrap_or_else(|_| "http://localhost:5173/".to_string());

        let mailersend_api_key = get_optional("MAILERSEND_API_KEY");
        let from_email = get_optional("FROM_EMAIL");

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 60)?;

        Ok(Self {
            database_url,
            db_max_connections,
            db_min_connections,
            db_idle_timeout_secs,
            jwt_secret,
            access_token_ttl_minutes,
            refresh_token_ttl_minutes,
            cookie_secure,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            oauth_success_redirect,
            mailersend_api_key,
            from_email,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_i64_env(key: &str, default: i64) -> Result<i64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<i64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value <= 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

fn parse_ttl_minutes_env(key: &str, default: i64) -> Result<i64> {
    check_ttl_minutes(key, parse_i64_env(key, default)?)
}

fn check_ttl_minutes(key: &str, minutes: i64) -> Result<i64> {
    if minutes > MAX_TOKEN_TTL_MINUTES {
        return Err(anyhow!("{key} must be <= {MAX_TOKEN_TTL_MINUTES} (one year)"));
    }
    Ok(minutes)
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<bool>()
            .with_context(|| format!("Failed to parse {key}, expecting true or false")),
        Err(_) => Ok(default),
    }
}
