//! Dialpad Service
//!
//! Backend for the browser dial-pad calling helper:
//! - Credential check behind an auth cookie gate
//! - WebRTC token issuance (provider proxy holding the API key)
//! - Outbound call origination (provider proxy)
//! - Page shells for the dial pad and login views

#![allow(dead_code)]

use std::sync::Arc;
use tracing::info;
use webdial_core::{
    DependencyStatus, HealthStatus, ReadinessStatus, Result, ServiceRuntime, WebdialService,
};

mod auth;
mod handlers;
mod provider;
mod provider_tests;

use auth::AuthService;
use provider::ProviderClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    info!("Starting Dialpad Service");

    let config = DialpadConfig::from_env()?;
    let service = Arc::new(DialpadService::new(config));
    ServiceRuntime::run(service).await
}

/// Dialpad service configuration
#[derive(Debug, Clone)]
pub struct DialpadConfig {
    pub provider_api_key: String,
    pub provider_base_url: String,
    /// Caller ID presented on outbound calls.
    pub caller_number: String,
    pub calls_configuration_id: String,
    pub application_id: String,
    /// Optional WebRTC token forwarded on call origination.
    pub webrtc_token: Option<String>,
    pub auth_username: String,
    pub auth_password: String,
}

impl DialpadConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            provider_api_key: std::env::var("PROVIDER_API_KEY").unwrap_or_default(),
            provider_base_url: std::env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://api.infobip.com".to_string()),
            caller_number: std::env::var("CALLS_FROM_NUMBER")
                .unwrap_or_else(|_| "38613626000".to_string()),
            calls_configuration_id: std::env::var("CALLS_CONFIGURATION_ID")
                .unwrap_or_else(|_| "test-configuration-1".to_string()),
            application_id: std::env::var("CALLS_APPLICATION_ID")
                .unwrap_or_else(|_| "calls_test_application_id".to_string()),
            webrtc_token: std::env::var("CALLS_WEBRTC_TOKEN").ok(),
            auth_username: std::env::var("AUTH_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            auth_password: std::env::var("AUTH_PASSWORD")
                .unwrap_or_else(|_| "infobip2024".to_string()),
        })
    }
}

/// State shared by the HTTP handlers.
pub struct AppState {
    pub auth: AuthService,
    pub provider: ProviderClient,
}

/// Dialpad Service
pub struct DialpadService {
    state: Arc<AppState>,
    start_time: std::time::Instant,
}

impl DialpadService {
    pub fn new(config: DialpadConfig) -> Self {
        let auth = AuthService::new(&config.auth_username, &config.auth_password);
        let provider = ProviderClient::new(&config);

        Self {
            state: Arc::new(AppState { auth, provider }),
            start_time: std::time::Instant::now(),
        }
    }
}

#[async_trait::async_trait]
impl WebdialService for DialpadService {
    fn service_id(&self) -> &'static str {
        "dialpad-service"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: true,
            dependencies: vec![DependencyStatus {
                name: "telephony-provider".to_string(),
                available: true,
                latency_ms: None,
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Dialpad Service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let http_bind = std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        info!(bind = %http_bind, "Starting Dialpad Service HTTP server");

        let app = axum::Router::new()
            // Pages (behind the cookie gate)
            .route("/", axum::routing::get(handlers::dialpad_page))
            .route("/login", axum::routing::get(handlers::login_page))
            // API endpoints
            .route("/api/auth", axum::routing::post(handlers::login))
            .route("/api/logout", axum::routing::post(handlers::logout))
            .route("/api/webrtc-token", axum::routing::get(handlers::webrtc_token))
            .route("/api/call", axum::routing::post(handlers::make_call))
            // Health endpoints
            .route("/health", axum::routing::get(handlers::health_check))
            .route("/ready", axum::routing::get(handlers::ready_check))
            .layer(axum::middleware::from_fn(auth::require_auth))
            .with_state(self.state.clone());

        let listener = tokio::net::TcpListener::bind(&http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
