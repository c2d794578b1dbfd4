//! API handlers for the dial-pad endpoints
//!
//! Wire shapes match the browser client: `{success, error?}` for auth,
//! `{token}` / `{error}` for the token proxy, provider pass-through for
//! call origination.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::{auth, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Auth Handlers
// =============================================================================

/// Credential check; sets the auth cookie on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuthResponse {
                success: false,
                error: Some("Authentication failed".to_string()),
            }),
        )
            .into_response();
    };

    if state.auth.verify(&request.username, &request.password) {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, auth::SESSION_COOKIE)],
            Json(AuthResponse {
                success: true,
                error: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse {
                success: false,
                error: Some("Invalid credentials".to_string()),
            }),
        )
            .into_response()
    }
}

/// Clears the auth cookie.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, auth::CLEAR_COOKIE)],
        Json(AuthResponse {
            success: true,
            error: None,
        }),
    )
}

// =============================================================================
// Provider Proxy Handlers
// =============================================================================

/// Issue a WebRTC token for the browser client.
pub async fn webrtc_token(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.provider.request_token().await {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        Err(e) => {
            error!(error = %e, "Token generation error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Originate an outbound call; passes the provider response through.
pub async fn make_call(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallRequest>, JsonRejection>,
) -> impl IntoResponse {
    let failed = || {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to make call".to_string(),
            }),
        )
            .into_response()
    };

    let Ok(Json(request)) = payload else {
        return failed();
    };

    match state.provider.initiate_call(&request.phone_number).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            error!(error = %e, "Call origination error");
            failed()
        }
    }
}

// =============================================================================
// Health Handlers
// =============================================================================

/// Health check
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy"
        })),
    )
}

/// Readiness check
pub async fn ready_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready"
        })),
    )
}

// =============================================================================
// Page Shells
// =============================================================================

const DIALPAD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Web Calling Helper</title>
  <script src="https://rtc.cdn.infobip.com/2/latest/infobip.rtc.js" async></script>
</head>
<body>
  <main class="dialpad">
    <h1>Web Calling Helper</h1>
    <p class="call-status" aria-live="polite"></p>
    <input type="tel" inputmode="numeric" placeholder="Enter phone number" autocomplete="off">
    <div class="keypad">
      <button>1</button><button>2</button><button>3</button>
      <button>4</button><button>5</button><button>6</button>
      <button>7</button><button>8</button><button>9</button>
      <button>*</button><button>0</button><button>#</button>
    </div>
    <div class="actions">
      <button class="clear">Clear</button>
      <button class="call">Call</button>
    </div>
  </main>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Web Calling Helper - Login</title>
</head>
<body>
  <main class="login">
    <h1>Web Calling Helper</h1>
    <form class="login-form">
      <input type="text" name="username" placeholder="Username" required>
      <input type="password" name="password" placeholder="Password" required>
      <button type="submit">Login</button>
    </form>
  </main>
</body>
</html>
"#;

pub async fn dialpad_page() -> Html<&'static str> {
    Html(DIALPAD_PAGE)
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthService;
    use crate::provider::ProviderClient;
    use crate::DialpadConfig;
    use axum::body::to_bytes;

    fn test_state() -> Arc<AppState> {
        let config = DialpadConfig {
            provider_api_key: "test-api-key".to_string(),
            provider_base_url: "https://api.example.com".to_string(),
            caller_number: "38613626000".to_string(),
            calls_configuration_id: "test-configuration-1".to_string(),
            application_id: "calls_test_application_id".to_string(),
            webrtc_token: None,
            auth_username: "admin".to_string(),
            auth_password: "s3cret".to_string(),
        };
        Arc::new(AppState {
            auth: AuthService::new(&config.auth_username, &config.auth_password),
            provider: ProviderClient::new(&config),
        })
    }

    fn login_request(username: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn valid_credentials_set_the_auth_cookie() {
        let response = login(State(test_state()), Ok(login_request("admin", "s3cret")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login must set the auth cookie")
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("auth=true"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn invalid_credentials_are_rejected_without_a_cookie() {
        let response = login(State(test_state()), Ok(login_request("admin", "wrong")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn logout_clears_the_auth_cookie() {
        let response = logout().await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("logout must clear the auth cookie")
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("auth="));
        assert!(cookie.contains("Max-Age=0"));
    }
}
