//! Authentication and cookie gate
//!
//! Credential validation against a fixed pair plus the middleware that
//! redirects unauthenticated page requests to `/login`.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// `Set-Cookie` value marking the session authenticated.
pub const SESSION_COOKIE: &str = "auth=true; Path=/; Secure";

/// `Set-Cookie` value clearing the auth flag on logout.
pub const CLEAR_COOKIE: &str = "auth=; Path=/; Max-Age=0";

/// Validates submitted credentials against the configured pair.
pub struct AuthService {
    username: String,
    password: String,
}

impl AuthService {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Whether the request carries the auth cookie flag.
pub fn is_authenticated(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|cookies| {
            cookies
                .split(';')
                .any(|cookie| cookie.trim() == "auth=true")
        })
        .unwrap_or(false)
}

/// Only page routes are gated; API endpoints and probes pass through.
fn is_gated(path: &str) -> bool {
    !(path.starts_with("/api") || path == "/health" || path == "/ready" || path == "/favicon.ico")
}

/// Cookie gate: unauthenticated page requests land on `/login`;
/// authenticated requests to `/login` bounce back home.
pub async fn require_auth(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !is_gated(&path) {
        return next.run(request).await;
    }

    let authenticated = is_authenticated(request.headers());

    if !authenticated && !path.starts_with("/login") {
        return Redirect::to("/login").into_response();
    }
    if authenticated && path.starts_with("/login") {
        return Redirect::to("/").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn verify_accepts_only_the_configured_pair() {
        let auth = AuthService::new("admin", "s3cret");
        assert!(auth.verify("admin", "s3cret"));
        assert!(!auth.verify("admin", "wrong"));
        assert!(!auth.verify("root", "s3cret"));
        assert!(!auth.verify("", ""));
    }

    #[test]
    fn auth_cookie_is_recognized_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth=true; lang=en"),
        );
        assert!(is_authenticated(&headers));
    }

    #[test]
    fn missing_or_false_cookie_is_unauthenticated() {
        let headers = HeaderMap::new();
        assert!(!is_authenticated(&headers));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("auth=false"));
        assert!(!is_authenticated(&headers));

        // Value must match exactly, not by prefix.
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("auth=truely"));
        assert!(!is_authenticated(&headers));
    }

    #[test]
    fn api_and_probe_routes_are_not_gated() {
        assert!(!is_gated("/api/auth"));
        assert!(!is_gated("/api/webrtc-token"));
        assert!(!is_gated("/health"));
        assert!(!is_gated("/ready"));
        assert!(!is_gated("/favicon.ico"));

        assert!(is_gated("/"));
        assert!(is_gated("/login"));
    }
}
