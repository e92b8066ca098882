//! Request-scoped middleware: request IDs and bearer-token auth.

use std::{collections::HashSet, sync::Arc};

use airadar_core::AppConfig;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID for the current request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer tokens accepted on protected routes. `None` turns auth off.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    keys: Option<Arc<HashSet<String>>>,
}

impl AuthState {
    /// Accept the API keys from the loaded config.
    ///
    /// Config loading already refuses an empty key list outside development,
    /// so an empty list here means a local server with auth switched off.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let auth = Self::from_keys(config.api_keys.iter().cloned());
        if !auth.is_enabled() {
            tracing::warn!(env = %config.env, "AIRADAR_API_KEYS not set; bearer auth disabled");
        }
        auth
    }

    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = String>) -> Self {
        let keys: HashSet<String> = keys.into_iter().collect();
        if keys.is_empty() {
            return Self::disabled();
        }
        Self {
            keys: Some(Arc::new(keys)),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { keys: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.keys.is_some()
    }

    fn permits(&self, headers: &HeaderMap) -> bool {
        match &self.keys {
            None => true,
            Some(keys) => bearer_token(headers).is_some_and(|token| keys.contains(token)),
        }
    }
}

/// Reuse the caller's `x-request-id` or mint a `UUIDv4`, expose it to
/// handlers as [`RequestId`] and echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Reject requests without an accepted bearer token using the standard
/// error envelope.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if auth.permits(req.headers()) {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::debug!(
        request_id = %request_id,
        path = %req.uri().path(),
        "rejected unauthenticated request"
    );
    ApiError::new(request_id, "unauthorized", "missing or invalid bearer token").into_response()
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::StatusCode,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn headers(authorization: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(authorization));
        headers
    }

    fn guarded(auth: AuthState) -> Router {
        Router::new()
            .route("/guarded", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(auth, require_bearer_auth))
            .layer(axum::middleware::from_fn(request_id))
    }

    fn secret_auth() -> AuthState {
        AuthState::from_keys(["alpha".to_string(), "beta".to_string()])
    }

    #[test]
    fn bearer_token_is_read_from_authorization_header() {
        assert_eq!(bearer_token(&headers("Bearer test-token")), Some("test-token"));
        assert_eq!(bearer_token(&headers("bearer test-token")), Some("test-token"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_key_list_disables_auth() {
        let auth = AuthState::from_keys(Vec::new());
        assert!(!auth.is_enabled());
        assert!(auth.permits(&HeaderMap::new()));
    }

    #[test]
    fn listed_keys_are_accepted() {
        let auth = secret_auth();
        assert!(auth.is_enabled());
        assert!(auth.permits(&headers("Bearer alpha")));
        assert!(auth.permits(&headers("Bearer beta")));
        assert!(!auth.permits(&headers("Bearer gamma")));
    }

    #[tokio::test]
    async fn missing_token_gets_unauthorized_envelope_with_request_id() {
        let response = guarded(secret_auth())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/guarded")
                    .header(REQUEST_ID_HEADER, "req-denied")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("req-denied")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["error"]["code"], "unauthorized");
        assert_eq!(json["meta"]["request_id"], "req-denied");
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler() {
        let response = guarded(secret_auth())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/guarded")
                    .header(AUTHORIZATION, "Bearer beta")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
