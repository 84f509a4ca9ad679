use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const PRODUCTION_CREDENTIALS_VAR: &str = "FIREBASE_PRODUCTION_CREDENTIALS_BASE64";
pub const DEVELOPMENT_CREDENTIALS_VAR: &str = "FIREBASE_DEVELOPMENT_CREDENTIALS_BASE64";
pub const ENVIRONMENT_VAR: &str = "FIREBASE_ENVIRONMENT";
pub const BUCKET_VAR: &str = "FIREBASE_STORAGE_BUCKET";
pub const REPORTS_DIR_VAR: &str = "REPORTS_DIR";
pub const REPORTS_PATTERN_VAR: &str = "REPORTS_PATTERN";

pub const DEFAULT_REPORTS_DIR: &str = "./reports";
pub const DEFAULT_REPORTS_PATTERN: &str = "*.csv";

/// Reads a variable from the process environment, treating blank values as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daily_report_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
