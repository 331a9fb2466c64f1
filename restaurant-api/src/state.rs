//! Application state

use chrono::NaiveDate;
use std::sync::Arc;

use crate::auth::{JwtConfig, JwtService, RateLimiter};
use crate::config::{Config, EmailBackend};
use crate::db::{MemoryStore, NewUser, PgStore, Store};
use crate::email::{self, EmailQueue, LogMailer, Mailer, SesMailer};
use crate::util::{hash_password, normalize_email, today_at_offset};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,
    /// JWT issuing/validation
    pub jwt: JwtService,
    /// Outgoing email queue
    pub emails: EmailQueue,
    /// Rate limiter for login, registration and password reset routes
    pub rate_limiter: RateLimiter,
    pub config: Arc<Config>,
}

impl AppState {
    /// Assemble state from already-built parts
    pub fn from_parts(config: Config, store: Arc<dyn Store>, emails: EmailQueue) -> Self {
        Self {
            store,
            jwt: JwtService::with_config(JwtConfig::from(&config)),
            emails,
            rate_limiter: RateLimiter::new(),
            config: Arc::new(config),
        }
    }

    /// Connect the store, start the email worker and seed the admin account
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url).await?;
                tracing::info!("PostgreSQL store ready");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
                Arc::new(MemoryStore::new())
            }
        };

        let mailer: Arc<dyn Mailer> = match config.email_backend {
            EmailBackend::Ses => Arc::new(SesMailer::from_env(config.ses_from_email.clone()).await),
            EmailBackend::Log => Arc::new(LogMailer),
        };
        let (emails, rx) = EmailQueue::new(email::QUEUE_CAPACITY);
        email::spawn_worker(rx, mailer);

        let state = Self::from_parts(config, store, emails);
        state.seed_admin().await?;
        Ok(state)
    }

    /// Create the configured superuser unless that email already exists
    async fn seed_admin(&self) -> anyhow::Result<()> {
        let (Some(email), Some(password)) = (&self.config.admin_email, &self.config.admin_password)
        else {
            return Ok(());
        };
        let email = normalize_email(email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Ok(());
        }
        let password_hash =
            hash_password(password).map_err(|e| anyhow::anyhow!("hashing admin password: {e}"))?;
        self.store
            .create_user(NewUser {
                email: email.clone(),
                password_hash,
                is_verified: true,
                is_staff: true,
                is_superuser: true,
            })
            .await?;
        tracing::info!(email = %email, "Admin user created");
        Ok(())
    }

    /// Today's date in the restaurant's time zone
    pub fn today(&self) -> NaiveDate {
        today_at_offset(self.config.utc_offset_minutes)
    }

    /// Absolute URL for an API path starting with `/`
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.config.public_base_url, path)
    }

    /// Frontend URL for a path starting with `/`
    pub fn frontend_url(&self, path: &str) -> String {
        format!("{}{}", self.config.frontend_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let config = Config {
            admin_email: Some("Admin@Example.com".into()),
            admin_password: Some("pass1234".into()),
            ..Config::default()
        };
        let (emails, _rx) = EmailQueue::new(4);
        let state = AppState::from_parts(config, Arc::new(MemoryStore::new()), emails);
        state.seed_admin().await.unwrap();
        state.seed_admin().await.unwrap();

        let users = state.store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "admin@example.com");
        assert!(users[0].is_superuser && users[0].is_verified);
    }

    #[test]
    fn test_urls() {
        let (emails, _rx) = EmailQueue::new(1);
        let state = AppState::from_parts(Config::default(), Arc::new(MemoryStore::new()), emails);
        assert_eq!(
            state.absolute_url("/menu/api/V1/menu-items/"),
            "http://localhost:8000/menu/api/V1/menu-items/"
        );
        assert_eq!(
            state.frontend_url("/email-verified?status=success"),
            "http://localhost:3000/email-verified?status=success"
        );
    }
}
