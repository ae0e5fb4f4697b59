//! Login rate limiting middleware.
//!
//! In-memory fixed window per client IP. Slows down password guessing
//! without touching the credential store.
//!
//! The client IP is the peer address. Behind a reverse proxy every peer is the
//! proxy, so all callers would share one bucket and a single client could lock
//! everyone out of login. Deployments behind a proxy turn on
//! `trust_forwarded_for`, which keys the bucket on the last `X-Forwarded-For`
//! hop instead (the address the proxy itself saw). Never enable it when the
//! server is reachable directly: the header is then client-controlled.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed per window.
    pub max_requests: u32,
    pub window: Duration,
    /// Key buckets on `X-Forwarded-For` (set by a trusted proxy).
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
            trust_forwarded_for: false,
        }
    }

    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(20)
    }
}

/// Per-IP attempt counters, shared by all clones.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum RateLimitResult {
    Allowed { remaining: u32 },
    Exceeded { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut state = self.state.lock();

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.config.max_requests {
            let reset_at = entry.window_start + self.config.window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else {
            RateLimitResult::Allowed {
                remaining: self.config.max_requests - entry.count,
            }
        }
    }

    fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now())
    }

    /// Drop idle entries. Call periodically from a background task.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.state
            .lock()
            .retain(|_, entry| now.duration_since(entry.window_start) < window * 2);
    }

    pub fn tracked_clients(&self) -> usize {
        self.state.lock().len()
    }

    /// Bucket key for a request. Falls back to the peer address, then to a
    /// single shared bucket when neither is known.
    fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
        if self.config.trust_forwarded_for {
            if let Some(ip) = last_forwarded_hop(headers) {
                return ip;
            }
        }
        peer.map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

fn last_forwarded_hop(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .last()
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = limiter.client_ip(
        request.headers(),
        connect_info.map(|ConnectInfo(addr)| addr),
    );

    match limiter.check(ip) {
        RateLimitResult::Allowed { .. } => next.run(request).await,
        RateLimitResult::Exceeded { retry_after } => {
            let retry_secs = retry_after.as_secs().max(1);
            warn!(
                ip = %ip,
                path = %request.uri().path(),
                retry_after_secs = retry_secs,
                "Rate limit exceeded"
            );

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_secs.to_string())],
                Json(json!({
                    "message": "Too many attempts. Please try again later.",
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::post, Router};
    use tower::ServiceExt;

    fn ip() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(RateLimitConfig::per_minute(3));
        let now = Instant::now();

        assert_eq!(
            limiter.check_at(ip(), now),
            RateLimitResult::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.check_at(ip(), now),
            RateLimitResult::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check_at(ip(), now),
            RateLimitResult::Allowed { remaining: 0 }
        );
        assert!(matches!(
            limiter.check_at(ip(), now),
            RateLimitResult::Exceeded { .. }
        ));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(RateLimitConfig::per_minute(1));
        let now = Instant::now();

        assert!(matches!(
            limiter.check_at(ip(), now),
            RateLimitResult::Allowed { .. }
        ));
        assert!(matches!(
            limiter.check_at(ip(), now),
            RateLimitResult::Exceeded { .. }
        ));
        assert!(matches!(
            limiter.check_at(ip(), now + Duration::from_secs(61)),
            RateLimitResult::Allowed { .. }
        ));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(RateLimitConfig::per_minute(1));
        let other: IpAddr = "10.0.0.7".parse().unwrap();

        assert!(matches!(limiter.check(ip()), RateLimitResult::Allowed { .. }));
        assert!(matches!(limiter.check(ip()), RateLimitResult::Exceeded { .. }));
        assert!(matches!(limiter.check(other), RateLimitResult::Allowed { .. }));
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.cleanup();
        assert_eq!(limiter.tracked_clients(), 2);
    }

    fn create_test_app(config: RateLimitConfig) -> Router {
        let limiter = RateLimiter::new(config);
        Router::new()
            .route("/auth/login", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
    }

    async fn login_from(app: &Router, forwarded_for: &str) -> StatusCode {
        app.clone()
            .oneshot(
                Request::post("/auth/login")
                    .header("x-forwarded-for", forwarded_for)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_trusted_proxy_clients_get_own_buckets() {
        let app = create_test_app(RateLimitConfig::per_minute(1).trusting_forwarded_for(true));

        assert_eq!(login_from(&app, "203.0.113.5").await, StatusCode::OK);
        assert_eq!(
            login_from(&app, "203.0.113.5").await,
            StatusCode::TOO_MANY_REQUESTS
        );
        // one client exhausting its bucket does not lock out another
        assert_eq!(login_from(&app, "198.51.100.9").await, StatusCode::OK);
        // the hop appended by the proxy counts, not a client-supplied prefix
        assert_eq!(
            login_from(&app, "10.9.9.9, 198.51.100.20").await,
            StatusCode::OK
        );
        assert_eq!(
            login_from(&app, "10.9.9.9, 203.0.113.5").await,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_forwarded_for_ignored_unless_trusted() {
        let app = create_test_app(RateLimitConfig::per_minute(1));

        assert_eq!(login_from(&app, "203.0.113.5").await, StatusCode::OK);
        assert_eq!(
            login_from(&app, "198.51.100.9").await,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_unparseable_forwarded_for_falls_back_to_peer() {
        let limiter = RateLimiter::new(RateLimitConfig::default().trusting_forwarded_for(true));
        let peer: SocketAddr = "192.0.2.1:4000".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "unknown".parse().unwrap());
        assert_eq!(limiter.client_ip(&headers, Some(peer)), peer.ip());
        assert_eq!(
            limiter.client_ip(&HeaderMap::new(), None),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }
}
