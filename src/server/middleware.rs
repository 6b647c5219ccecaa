//! Layers that accept or reject a request before any status check runs.

use crate::config::RateLimitConfig;
use crate::server::handlers::error_response;
use crate::utils::error::{RelayError, Result};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const API_KEY_HEADER: &str = "x-api-key";

const RATE_LIMIT_MESSAGE: &str =
    "Too many requests from this IP, please try again a minute later.";

// Above this many tracked clients, expired windows are swept once per window.
const SWEEP_THRESHOLD: usize = 1024;

pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([HeaderName::from_static(API_KEY_HEADER)]);

    if allowed_origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|e| {
                RelayError::InvalidConfigValueError {
                    field: "server.allowed_origins".to_string(),
                    value: origin.clone(),
                    reason: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Clients {
    windows: HashMap<IpAddr, Window>,
    last_sweep: Instant,
}

/// Fixed-window request counter keyed by client IP.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Arc<Mutex<Clients>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: config.window(),
            max_requests: config.max_requests,
            clients: Arc::new(Mutex::new(Clients {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Counts the request and reports whether it fits in the client's window.
    pub fn admit(&self, client: IpAddr) -> bool {
        self.admit_at(client, Instant::now())
    }

    fn admit_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());

        // At most one sweep per window, however many clients are tracked.
        if clients.windows.len() > SWEEP_THRESHOLD
            && now.duration_since(clients.last_sweep) >= self.window
        {
            let window = self.window;
            clients
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            clients.last_sweep = now;
        }

        let entry = clients.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_requests
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    // Without connect info (e.g. behind a custom service) all callers share a bucket.
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !limiter.admit(client) {
        tracing::warn!(client = %client, "rate limit exceeded");
        return error_response(RATE_LIMIT_MESSAGE, StatusCode::TOO_MANY_REQUESTS).into_response();
    }

    next.run(request).await
}

/// Shared-secret gate on the `x-api-key` header. A gate without a key admits everything.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGate {
    key: Option<Arc<str>>,
}

impl ApiKeyGate {
    pub fn new(key: Option<&str>) -> Self {
        Self {
            key: key.map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    fn check(&self, presented: Option<&HeaderValue>) -> std::result::Result<(), Response> {
        let Some(expected) = self.key.as_deref() else {
            return Ok(());
        };

        match presented {
            None => Err(error_response("API key is missing", StatusCode::BAD_REQUEST).into_response()),
            Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
            Some(_) => Err(
                error_response("Forbidden: Invalid API key", StatusCode::FORBIDDEN).into_response(),
            ),
        }
    }
}

pub async fn require_api_key(
    State(gate): State<ApiKeyGate>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(rejection) = gate.check(request.headers().get(API_KEY_HEADER)) {
        tracing::debug!(status = %rejection.status(), "request rejected by API key gate");
        return rejection;
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_ms: u64, max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_ms,
            max_requests,
        })
    }

    #[test]
    fn test_rate_limiter_blocks_after_ceiling() {
        let limiter = limiter(60_000, 2);
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let now = Instant::now();

        assert!(limiter.admit_at(client, now));
        assert!(limiter.admit_at(client, now));
        assert!(!limiter.admit_at(client, now));
    }

    #[test]
    fn test_rate_limiter_resets_after_window() {
        let limiter = limiter(1_000, 1);
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let now = Instant::now();

        assert!(limiter.admit_at(client, now));
        assert!(!limiter.admit_at(client, now + Duration::from_millis(500)));
        assert!(limiter.admit_at(client, now + Duration::from_millis(1_000)));
    }

    #[test]
    fn test_rate_limiter_tracks_clients_separately() {
        let limiter = limiter(60_000, 1);
        let now = Instant::now();

        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), now));
        assert!(!limiter.admit_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
    }

    fn tracked(limiter: &RateLimiter) -> usize {
        limiter.clients.lock().unwrap().windows.len()
    }

    #[test]
    fn test_rate_limiter_sweeps_expired_clients_once_per_window() {
        let limiter = limiter(1_000, 5);
        let start = Instant::now();

        for i in 0..=SWEEP_THRESHOLD as u32 {
            assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::from(i)), start));
        }
        assert_eq!(tracked(&limiter), SWEEP_THRESHOLD + 1);

        // Still inside the first window: nothing has expired, map only grows.
        let late = start + Duration::from_millis(999);
        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1)), late));
        assert_eq!(tracked(&limiter), SWEEP_THRESHOLD + 2);

        // One window later every earlier entry has expired and is dropped.
        let next = start + Duration::from_millis(2_000);
        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 2)), next));
        assert_eq!(tracked(&limiter), 1);

        // Right after a sweep the map is small again, so no sweep work happens.
        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 3)), next));
        assert_eq!(tracked(&limiter), 2);
    }

    #[test]
    fn test_rate_limiter_skips_sweep_until_window_elapses() {
        let limiter = limiter(1_000, 5);
        let start = Instant::now();
        {
            let mut clients = limiter.clients.lock().unwrap();
            clients.last_sweep = start + Duration::from_millis(1_500);
            for i in 0..=SWEEP_THRESHOLD as u32 {
                clients.windows.insert(
                    IpAddr::V4(Ipv4Addr::from(i)),
                    Window {
                        started: start,
                        count: 1,
                    },
                );
            }
        }

        // Every entry is expired, but the previous sweep was only 500ms ago.
        let now = start + Duration::from_millis(2_000);
        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)), now));
        assert_eq!(tracked(&limiter), SWEEP_THRESHOLD + 2);

        let later = start + Duration::from_millis(2_500);
        assert!(limiter.admit_at(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2)), later));
        assert_eq!(tracked(&limiter), 2);
    }

    #[test]
    fn test_gate_without_key_admits_everything() {
        let gate = ApiKeyGate::new(None);
        assert!(!gate.is_enabled());
        assert!(gate.check(None).is_ok());
    }

    #[test]
    fn test_gate_statuses() {
        let gate = ApiKeyGate::new(Some("s3cret"));

        let missing = gate.check(None).unwrap_err();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let wrong = HeaderValue::from_static("nope");
        assert_eq!(gate.check(Some(&wrong)).unwrap_err().status(), StatusCode::FORBIDDEN);

        let right = HeaderValue::from_static("s3cret");
        assert!(gate.check(Some(&right)).is_ok());
    }

    #[test]
    fn test_cors_rejects_invalid_origin_header() {
        assert!(cors_layer(&["https://ok.example.com".to_string()]).is_ok());
        assert!(cors_layer(&["*".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
