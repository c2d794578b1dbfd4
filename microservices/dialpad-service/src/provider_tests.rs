//! Unit tests for the provider client

#[cfg(test)]
mod tests {
    use crate::provider::{parse_token_response, ProviderClient, ProviderError};
    use crate::DialpadConfig;

    fn test_config() -> DialpadConfig {
        DialpadConfig {
            provider_api_key: "test-api-key-0123456789".to_string(),
            provider_base_url: "https://api.example.com".to_string(),
            caller_number: "38613626000".to_string(),
            calls_configuration_id: "test-configuration-1".to_string(),
            application_id: "calls_test_application_id".to_string(),
            webrtc_token: None,
            auth_username: "admin".to_string(),
            auth_password: "secret".to_string(),
        }
    }

    #[test]
    fn token_payload_scopes_a_browser_identity() {
        let client = ProviderClient::new(&test_config());
        let payload = client.token_payload();

        let identity = payload["identity"].as_str().unwrap();
        assert!(identity.starts_with("browser-"));
        assert_eq!(payload["name"], "Browser User");
        assert_eq!(payload["applicationId"], "calls_test_application_id");
    }

    #[test]
    fn call_payload_targets_a_phone_endpoint() {
        let client = ProviderClient::new(&test_config());
        let payload = client.call_payload("+38640111222");

        assert_eq!(payload["endpoint"]["type"], "PHONE");
        assert_eq!(payload["endpoint"]["phoneNumber"], "+38640111222");
        assert_eq!(payload["from"], "38613626000");
        assert_eq!(payload["callsConfigurationId"], "test-configuration-1");
        assert_eq!(payload["platform"]["applicationId"], "calls_test_application_id");
        assert_eq!(payload["webrtc"]["enabled"], true);
        assert!(payload["webrtc"].get("token").is_none());
    }

    #[test]
    fn call_payload_forwards_a_configured_webrtc_token() {
        let mut config = test_config();
        config.webrtc_token = Some("wrtc-token".to_string());
        let client = ProviderClient::new(&config);

        let payload = client.call_payload("+38640111222");
        assert_eq!(payload["webrtc"]["token"], "wrtc-token");
    }

    #[test]
    fn token_is_extracted_from_a_success_response() {
        let token = parse_token_response(true, "200 OK", r#"{"token":"abc123"}"#).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn success_without_a_token_is_rejected() {
        let err = parse_token_response(true, "200 OK", r#"{"expirationTime":"soon"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MissingToken));
        assert_eq!(err.to_string(), "No token in response");
    }

    #[test]
    fn service_exception_text_is_surfaced() {
        let body = r#"{"requestError":{"serviceException":{"messageId":"UNAUTHORIZED","text":"Invalid login details"}}}"#;
        let err = parse_token_response(false, "401 Unauthorized", body).unwrap_err();
        assert_eq!(err.to_string(), "Failed to get token: Invalid login details");
    }

    #[test]
    fn message_id_is_used_when_text_is_missing() {
        let body = r#"{"requestError":{"serviceException":{"messageId":"UNAUTHORIZED"}}}"#;
        let err = parse_token_response(false, "401 Unauthorized", body).unwrap_err();
        assert_eq!(err.to_string(), "Failed to get token: UNAUTHORIZED");
    }

    #[test]
    fn top_level_message_is_the_next_fallback() {
        let body = r#"{"message":"quota exceeded"}"#;
        let err = parse_token_response(false, "429 Too Many Requests", body).unwrap_err();
        assert_eq!(err.to_string(), "Failed to get token: quota exceeded");
    }

    #[test]
    fn http_status_is_the_last_fallback() {
        let err = parse_token_response(false, "503 Service Unavailable", "{}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to get token: 503 Service Unavailable"
        );
    }

    #[test]
    fn non_json_bodies_are_invalid() {
        let err = parse_token_response(true, "200 OK", "<html>gateway error</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
        assert_eq!(err.to_string(), "Invalid response format");
    }
}
