//! Shared helpers for the API integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use restaurant_api::auth::TokenType;
use restaurant_api::db::{MemoryStore, NewUser, Store};
use restaurant_api::email::EmailQueue;
use restaurant_api::email::EmailJob;
use restaurant_api::util::hash_password;
use restaurant_api::{AppState, Config, build_app};
use serde_json::Value;
use shared::models::{ProfileUpdate, User};
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub emails: mpsc::Receiver<EmailJob>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// App over an in-memory store; queued emails stay in `emails`
    pub fn new() -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let (queue, emails) = EmailQueue::new(64);
        let state = AppState::from_parts(Config::default(), store, queue);
        Self {
            app: build_app(state.clone()),
            state,
            emails,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), token).await
    }

    /// Insert a user directly, bypassing registration and its rate limit
    pub async fn create_user(&self, email: &str, verified: bool, admin: bool) -> User {
        self.state
            .store
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: hash_password(PASSWORD).unwrap(),
                is_verified: verified,
                is_staff: admin,
                is_superuser: false,
            })
            .await
            .unwrap()
    }

    /// Verified user with a phone number on the profile
    pub async fn create_customer(&self, email: &str) -> User {
        let user = self.create_user(email, true, false).await;
        self.state
            .store
            .update_profile(
                user.id,
                &ProfileUpdate {
                    phone_number: Some("09123456789".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        user
    }

    pub fn access_token(&self, user: &User) -> String {
        self.state.jwt.issue(user, TokenType::Access).unwrap()
    }

    /// Next queued email, if any
    pub fn next_email(&mut self) -> Option<EmailJob> {
        self.emails.try_recv().ok()
    }

    /// Path part of an absolute link built by the API
    pub fn link_path(&self, link: &str) -> String {
        link.strip_prefix(&self.state.config.public_base_url)
            .unwrap()
            .to_string()
    }
}
