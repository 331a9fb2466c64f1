//! Server configuration

use thiserror::Error;

/// Configuration errors raised at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set in {environment} environment")]
    MissingSecret { name: String, environment: String },

    #[error("invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// Where outgoing email goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    /// Amazon SES v2
    Ses,
    /// Log the message and drop it
    Log,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 signing secret
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    /// Access token lifetime
    pub access_token_minutes: i64,
    /// Refresh token lifetime
    pub refresh_token_days: i64,
    /// Lifetime of email verification and password reset links
    pub email_token_minutes: i64,
    /// Frontend base URL, target of the email verification redirect
    pub frontend_url: String,
    /// Public base URL of this API, used for absolute links
    pub public_base_url: String,
    /// Offset from UTC used to decide what "today" is (Asia/Tehran by default)
    pub utc_offset_minutes: i32,
    pub email_backend: EmailBackend,
    /// SES sender email address
    pub ses_from_email: String,
    /// Superuser created at startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub log_level: String,
    pub log_json: bool,
    /// Directory for rotating log files; console only when absent
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            http_port: 8000,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            jwt_issuer: "restaurant-api".into(),
            jwt_audience: "restaurant-clients".into(),
            access_token_minutes: 60,
            refresh_token_days: 7,
            email_token_minutes: 60,
            frontend_url: "http://localhost:3000".into(),
            public_base_url: "http://localhost:8000".into(),
            utc_offset_minutes: 210,
            email_backend: EmailBackend::Log,
            ses_from_email: "noreply@restaurant.local".into(),
            admin_email: None,
            admin_password: None,
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let environment = var("ENVIRONMENT").unwrap_or(defaults.environment);

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "development" => defaults.jwt_secret,
            None => {
                return Err(ConfigError::MissingSecret {
                    name: "JWT_SECRET".into(),
                    environment,
                });
            }
        };

        let email_backend = match var("EMAIL_BACKEND").as_deref() {
            None if environment == "development" => EmailBackend::Log,
            None | Some("ses") => EmailBackend::Ses,
            Some("log") => EmailBackend::Log,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "EMAIL_BACKEND".into(),
                    value: other.into(),
                });
            }
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            http_port: parse(&var, "HTTP_PORT", defaults.http_port)?,
            jwt_secret,
            jwt_issuer: var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            jwt_audience: var("JWT_AUDIENCE").unwrap_or(defaults.jwt_audience),
            access_token_minutes: parse(
                &var,
                "ACCESS_TOKEN_MINUTES",
                defaults.access_token_minutes,
            )?,
            refresh_token_days: parse(&var, "REFRESH_TOKEN_DAYS", defaults.refresh_token_days)?,
            email_token_minutes: parse(
                &var,
                "EMAIL_TOKEN_MINUTES",
                defaults.email_token_minutes,
            )?,
            frontend_url: var("FRONTEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            public_base_url: var("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            utc_offset_minutes: parse(&var, "UTC_OFFSET_MINUTES", defaults.utc_offset_minutes)?,
            email_backend,
            ses_from_email: var("SES_FROM_EMAIL").unwrap_or(defaults.ses_from_email),
            admin_email: var("ADMIN_EMAIL"),
            admin_password: var("ADMIN_PASSWORD"),
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse(&var, "LOG_JSON", environment != "development")?,
            log_dir: var("LOG_DIR"),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse<T, F>(var: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.into(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.is_development());
        assert!(config.database_url.is_none());
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.utc_offset_minutes, 210);
        assert_eq!(config.email_backend, EmailBackend::Log);
        assert!(!config.log_json);
    }

    #[test]
    fn test_production_requires_secret() {
        let err = load(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret { .. }));

        let config = load(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.email_backend, EmailBackend::Ses);
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("HTTP_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "HTTP_PORT"));
    }

    #[test]
    fn test_urls_are_trimmed() {
        let config = load(&[
            ("PUBLIC_BASE_URL", "https://api.example.com/"),
            ("FRONTEND_URL", "https://example.com/"),
            ("DATABASE_URL", "postgres://localhost/restaurant"),
        ])
        .unwrap();
        assert_eq!(config.public_base_url, "https://api.example.com");
        assert_eq!(config.frontend_url, "https://example.com");
        assert!(config.database_url.is_some());
    }

    #[test]
    fn test_unknown_email_backend() {
        assert!(load(&[("EMAIL_BACKEND", "smtp")]).is_err());
        let config = load(&[("EMAIL_BACKEND", "ses")]).unwrap();
        assert_eq!(config.email_backend, EmailBackend::Ses);
    }
}
