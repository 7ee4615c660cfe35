//! Access gate middleware: path exclusion, API-key auth, write rate limiting.
//!
//! The check order is load-bearing. Exclusion runs first so health and docs
//! paths stay reachable unauthenticated; auth runs before rate limiting so
//! an attacker cannot burn a victim's rate budget without already holding
//! the victim's key; only then do write-class requests consult the limiter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use tower::{Layer, Service};
use tracing::warn;

use crate::rate_limit::FixedWindowLimiter;

/// Header carrying the caller's key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared gate state: expected key, exclusions, limiter, failure counters
pub struct GateState {
    expected_key: String,
    exclude_paths: Vec<String>,
    limiter: FixedWindowLimiter,
    auth_failures: AtomicU64,
    rate_limited: AtomicU64,
}

impl GateState {
    /// Build gate state from configuration
    pub fn new(expected_key: String, exclude_paths: Vec<String>, limiter: FixedWindowLimiter) -> Self {
        Self {
            expected_key,
            exclude_paths,
            limiter,
            auth_failures: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
        }
    }

    /// Whether a path bypasses all gate checks.
    ///
    /// A pattern ending in `/**` matches any path starting with the pattern
    /// minus that suffix; otherwise exact match or prefix match applies.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths.iter().any(|pattern| {
            if pattern.is_empty() {
                return false;
            }
            if let Some(prefix) = pattern.strip_suffix("/**") {
                path.starts_with(prefix)
            } else {
                path == pattern || path.starts_with(pattern)
            }
        })
    }

    /// Requests rejected for a missing or wrong key
    pub fn auth_failures(&self) -> u64 {
        self.auth_failures.load(Ordering::Relaxed)
    }

    /// Requests rejected by the rate limiter
    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }
}

/// Access gate layer
#[derive(Clone)]
pub struct ApiKeyGateLayer {
    state: Arc<GateState>,
}

impl ApiKeyGateLayer {
    /// Wrap shared gate state into a layer
    pub fn new(state: Arc<GateState>) -> Self {
        Self { state }
    }

    /// Handle on the shared state (for inspection in tests and health)
    pub fn state(&self) -> Arc<GateState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for ApiKeyGateLayer {
    type Service = ApiKeyGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyGateService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Access gate service
#[derive(Clone)]
pub struct ApiKeyGateService<S> {
    inner: S,
    state: Arc<GateState>,
}

impl<S> Service<Request<Body>> for ApiKeyGateService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();
            if state.is_excluded(&path) {
                return inner.call(req).await;
            }

            let provided: Option<String> = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let key = match provided {
                Some(key) if !key.is_empty() && key == state.expected_key => key,
                _ => {
                    state.auth_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(path = %path, "Rejected request: missing or invalid API key");
                    return Ok(error_response(
                        StatusCode::UNAUTHORIZED,
                        "UNAUTHORIZED",
                        "Missing or invalid API key",
                        None,
                    ));
                }
            };

            // Rate limiting applies to write-class methods only
            let method = req.method();
            let is_write = method != Method::GET && method != Method::HEAD;
            if is_write && !state.limiter.allow(&key) {
                state.rate_limited.fetch_add(1, Ordering::Relaxed);
                warn!(path = %path, "Rate limit exceeded");
                return Ok(error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "Rate limit exceeded",
                    Some(state.limiter.window_secs()),
                ));
            }

            inner.call(req).await
        })
    }
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    retry_after_secs: Option<u64>,
) -> Response {
    let body = serde_json::json!({
        "error": code,
        "message": message,
        "field": null,
    });

    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        axum::http::header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("application/json"),
    );
    if let Some(secs) = retry_after_secs {
        if let Ok(value) = axum::http::HeaderValue::from_str(&secs.to_string()) {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(excludes: &[&str]) -> GateState {
        GateState::new(
            "expected-key".to_string(),
            excludes.iter().map(|s| s.to_string()).collect(),
            FixedWindowLimiter::new(10),
        )
    }

    #[test]
    fn test_exclusion_wildcard_strips_literal_suffix() {
        let state = state(&["/health", "/docs/**"]);

        assert!(state.is_excluded("/health"));
        assert!(state.is_excluded("/docs"));
        assert!(state.is_excluded("/docs/openapi.json"));
        assert!(!state.is_excluded("/v1/facts"));
    }

    #[test]
    fn test_plain_pattern_matches_exact_or_prefix() {
        let state = state(&["/actuator"]);
        assert!(state.is_excluded("/actuator"));
        assert!(state.is_excluded("/actuator/health"));
        assert!(!state.is_excluded("/v1/facts"));
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let state = state(&[""]);
        assert!(!state.is_excluded("/v1/facts"));
        assert!(!state.is_excluded("/"));
    }
}
