//! Application-layer rate limiting for login, registration and password reset

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::state::AppState;

/// Requests allowed per window for one client on one route group
#[derive(Debug, Clone, Copy)]
pub struct Limit {
    pub route: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

pub const LOGIN: Limit = Limit {
    route: "login",
    max_requests: 5,
    window: Duration::from_secs(60),
};

pub const REGISTER: Limit = Limit {
    route: "register",
    max_requests: 3,
    window: Duration::from_secs(60),
};

pub const PASSWORD_RESET: Limit = Limit {
    route: "password_reset",
    max_requests: 3,
    window: Duration::from_secs(60),
};

/// Entries idle for longer than this are dropped by [`RateLimiter::cleanup`]
const IDLE_CUTOFF: Duration = Duration::from_secs(300);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(&self, limit: Limit, ip: &str) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(limit.route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) >= limit.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= limit.max_requests
    }

    /// Remove entries whose window started more than five minutes ago
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < IDLE_CUTOFF);
        }

        map.retain(|_, route_map| !route_map.is_empty());
    }

    /// Spawn the periodic cleanup task
    pub fn spawn_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(IDLE_CUTOFF);
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        })
    }

    #[cfg(test)]
    async fn tracked(&self, route: &'static str) -> usize {
        self.inner.lock().await.get(route).map_or(0, HashMap::len)
    }
}

/// Extract client IP: X-Forwarded-For header first (reverse proxy), then peer address.
fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // X-Forwarded-For can be comma-separated; first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    // Fallback: peer address from extensions (ConnectInfo)
    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn enforce(state: &AppState, limit: Limit, request: Request, next: Next) -> Response {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check(limit, &ip).await {
        crate::security_log!(WARN, "rate_limited", route = limit.route, ip = %ip);
        return AppError::too_many_requests().into_response();
    }
    next.run(request).await
}

/// Rate limit middleware for login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, LOGIN, request, next).await
}

/// Rate limit middleware for registration and resend: 3 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, REGISTER, request, next).await
}

/// Rate limit middleware for password reset requests: 3 requests/minute per IP
pub async fn password_reset_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, PASSWORD_RESET, request, next).await
}
