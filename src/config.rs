use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,

    // Thread categories, one table each
    pub categories: Vec<String>,

    // Build info
    pub version: String,
    pub build_date: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            ),
            request_body_limit_bytes: env::var("REQUEST_BODY_LIMIT_BYTES")
                .unwrap_or_else(|_| "65536".to_string())
                .parse()
                .unwrap_or(65536),
            allowed_origins: split_list(
                &env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            categories: parse_categories(
                &env::var("CATEGORIES").unwrap_or_else(|_| "misc".to_string()),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_date: env::var("BUILD_DATE")
                .unwrap_or_else(|_| chrono::Utc::now().to_rfc3339()),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_categories(raw: &str) -> Vec<String> {
    split_list(raw)
        .into_iter()
        .filter(|category| {
            let valid = is_valid_category(category);
            if !valid {
                tracing::warn!("Ignoring invalid thread category {:?}", category);
            }
            valid
        })
        .collect()
}

/// Category names end up in table names, so only lowercase ascii letters, digits and
/// underscores are allowed.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category.len() <= 32
        && category
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/threadboard_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(5),
            request_body_limit_bytes: 65536,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            bcrypt_cost: 4,
            categories: vec!["misc".to_string()],
            version: "test".to_string(),
            build_date: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }
}
