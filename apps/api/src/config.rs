use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Shared secret the auth provider signs access tokens with.
    pub auth_jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
    pub environment: String,
    /// Empty means permissive CORS.
    pub cors_origins: Vec<String>,
    pub run_migrations: bool,
    pub enable_llm_span_fallback: bool,
    pub compile_worker_enabled: bool,
    pub latex_compiler: String,
    pub compile_timeout_secs: u64,
    pub signed_url_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            auth_jwt_secret: require_env("AUTH_JWT_SECRET")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            run_migrations: parse_bool_env("RUN_MIGRATIONS", true)?,
            enable_llm_span_fallback: parse_bool_env("ENABLE_LLM_SPAN_FALLBACK", true)?,
            compile_worker_enabled: parse_bool_env("COMPILE_WORKER_ENABLED", false)?,
            latex_compiler: std::env::var("LATEX_COMPILER")
                .unwrap_or_else(|_| "tectonic".to_string()),
            compile_timeout_secs: parse_env("COMPILE_TIMEOUT_SECS", 60)?,
            signed_url_ttl_secs: parse_env("SIGNED_URL_TTL_SECS", 3600)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw).with_context(|| format!("{key} must be true/false, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "*")
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    /// Configuration for tests that never touch real infrastructure.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/jobtrack_test".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            s3_bucket: "resumes".to_string(),
            s3_endpoint: "http://127.0.0.1:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            auth_jwt_secret: crate::auth::tests::SECRET.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            environment: "test".to_string(),
            cors_origins: vec![],
            run_migrations: false,
            enable_llm_span_fallback: false,
            compile_worker_enabled: false,
            latex_compiler: "tectonic".to_string(),
            compile_timeout_secs: 5,
            signed_url_ttl_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_list_skips_wildcard_and_blanks() {
        assert_eq!(
            parse_list("https://a.example, ,https://b.example,*"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_list("*").is_empty());
    }
}
