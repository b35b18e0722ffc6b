use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// `RUST_LOG` wins over the configured level.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(default_level)))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives("info")));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

// sqlx logs every statement at info; outbound HTTP clients are chatty at debug.
fn filter_directives(level: &str) -> String {
    format!("{},sqlx=warn,hyper_util=info,reqwest=info", level.trim())
}
