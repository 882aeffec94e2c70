pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers::handle_auth_callback;
use crate::career::handlers::handle_analyze_career;
use crate::speech::handlers::{handle_elevenlabs_tts, handle_openai_tts};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Career analysis
        .route("/api/analyze-career", post(handle_analyze_career))
        // Text-to-speech proxies
        .route("/api/tts/openai", post(handle_openai_tts))
        .route("/api/tts/elevenlabs", post(handle_elevenlabs_tts))
        // OAuth
        .route("/auth/callback", get(handle_auth_callback))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::identity::{
        AccountType, IdentityError, IdentityProvider, IdentitySession, IdentityUser,
    };
    use crate::career::pipeline::doubles::ScriptedProvider;
    use crate::career::validator::fixtures::valid_document;
    use crate::career::CareerAnalyzer;
    use crate::config::Config;
    use crate::llm_client::LlmError;

    const GRADUATE_PROFILE: &str = "Computer science graduate with a six-month web development \
        internship building React and Node.js apps for a fintech startup.";

    fn config(pairs: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    fn unconfigured_state() -> AppState {
        AppState::from_config(config(&[])).unwrap()
    }

    fn state_with_provider(provider: Arc<ScriptedProvider>) -> AppState {
        let mut state = unconfigured_state();
        state.career = Some(CareerAnalyzer::new(provider, Duration::from_secs(30)));
        state
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> Response {
        build_router(state).oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Health
    // ────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let response = send(unconfigured_state(), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    // ────────────────────────────────────────────────────────────────────────
    // Career analysis
    // ────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_analyze_career_end_to_end() {
        assert!(GRADUATE_PROFILE.chars().count() >= 100);
        let provider = Arc::new(ScriptedProvider::with_text(valid_document().to_string()));
        let body = json!({ "input": GRADUATE_PROFILE }).to_string();

        let response = send(
            state_with_provider(provider.clone()),
            post_json("/api/analyze-career", &body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let result = json_body(response).await;
        assert!(result["currentRole"].as_str().is_some());
        assert!((3..=5).contains(&result["strengths"].as_array().unwrap().len()));
        assert!((3..=5).contains(&result["recommendations"].as_array().unwrap().len()));
        let stages = result["careerPaths"].as_array().unwrap();
        assert!((4..=5).contains(&stages.len()));
        for stage in stages {
            for field in ["title", "yearsExperience", "description", "salaryRange"] {
                assert!(!stage[field].as_str().unwrap().is_empty(), "{field} empty");
            }
            assert!((4..=6).contains(&stage["keySkills"].as_array().unwrap().len()));
        }
        assert_eq!(result, valid_document());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_short_input_is_rejected_before_upstream() {
        let provider = Arc::new(ScriptedProvider::with_text(valid_document().to_string()));
        let response = send(
            state_with_provider(provider.clone()),
            post_json("/api/analyze-career", r#"{"input": "short"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Please provide a detailed description (at least 50 characters)" })
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_or_non_text_input_is_bad_request() {
        for body in [r#"{}"#, r#"{"input": 42}"#, r#"{"input": null}"#, "not json", "[1, 2]"] {
            let response = send(unconfigured_state(), post_json("/api/analyze-career", body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        }
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let body = json!({ "input": GRADUATE_PROFILE }).to_string();
        let response = send(unconfigured_state(), post_json("/api/analyze-career", &body)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "error": "Service not configured" }));
        assert!(!body.to_string().contains("OPENAI"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error_without_retry() {
        let provider = Arc::new(ScriptedProvider::replying(|| {
            Err(LlmError::Api {
                status: 429,
                message: "Rate limit reached for gpt-4o-mini".to_string(),
            })
        }));
        let body = json!({ "input": GRADUATE_PROFILE }).to_string();
        let response = send(
            state_with_provider(provider.clone()),
            post_json("/api/analyze-career", &body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(!body.to_string().contains("Rate limit"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_not_echoed() {
        let raw = r#"{"currentRole": "SECRET-PROMPT-ECHO", "strengths": ["a","#;
        let provider = Arc::new(ScriptedProvider::with_text(raw.to_string()));
        let body = json!({ "input": GRADUATE_PROFILE }).to_string();
        let response = send(state_with_provider(provider), post_json("/api/analyze-career", &body)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
        assert!(!body.to_string().contains("SECRET-PROMPT-ECHO"));
    }

    /// In-memory sink for `fmt` output.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_malformed_reply_logs_carry_request_id() {
        let provider = Arc::new(ScriptedProvider::with_text("{\"currentRole\": \"Dev".into()));
        let state = state_with_provider(provider);
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let body = json!({ "input": GRADUATE_PROFILE }).to_string();
        let response = send(state, post_json("/api/analyze-career", &body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
        assert!(lines.iter().any(|l| l.contains("not valid JSON")), "{output}");
        assert!(lines.iter().any(|l| l.contains("Malformed model output")), "{output}");
        for line in lines {
            assert!(line.contains("request_id="), "line without request id: {line}");
        }
    }

    #[tokio::test]
    async fn test_schema_violating_reply_is_server_error() {
        let mut document = valid_document();
        document["careerPaths"] = json!([]);
        let provider = Arc::new(ScriptedProvider::with_text(document.to_string()));
        let body = json!({ "input": GRADUATE_PROFILE }).to_string();
        let response = send(state_with_provider(provider), post_json("/api/analyze-career", &body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ────────────────────────────────────────────────────────────────────────
    // Text-to-speech
    // ────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_tts_requires_text() {
        for uri in ["/api/tts/openai", "/api/tts/elevenlabs"] {
            for body in [r#"{}"#, r#"{"text": "  "}"#, "garbage"] {
                let response = send(unconfigured_state(), post_json(uri, body)).await;
                assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
                assert_eq!(json_body(response).await, json!({ "error": "Text is required" }));
            }
        }
    }

    #[tokio::test]
    async fn test_tts_without_credential_is_configuration_error() {
        for uri in ["/api/tts/openai", "/api/tts/elevenlabs"] {
            let response = send(unconfigured_state(), post_json(uri, r#"{"text": "Hello"}"#)).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Service not configured" })
            );
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // OAuth callback
    // ────────────────────────────────────────────────────────────────────────

    struct FakeIdentity {
        stored_type: Option<&'static str>,
        fail_exchange: bool,
        exchanged: Mutex<Vec<(String, Option<String>)>>,
        updates: Mutex<Vec<AccountType>>,
    }

    impl FakeIdentity {
        fn new(stored_type: Option<&'static str>) -> Self {
            Self {
                stored_type,
                fail_exchange: false,
                exchanged: Mutex::new(Vec::new()),
                updates: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn exchange_code(
            &self,
            code: &str,
            code_verifier: Option<&str>,
        ) -> Result<IdentitySession, IdentityError> {
            self.exchanged
                .lock()
                .unwrap()
                .push((code.to_string(), code_verifier.map(str::to_string)));
            if self.fail_exchange {
                return Err(IdentityError::Api {
                    status: 400,
                    message: "invalid flow state".to_string(),
                });
            }
            let mut user_metadata = serde_json::Map::new();
            if let Some(stored) = self.stored_type {
                user_metadata.insert("user_type".to_string(), json!(stored));
            }
            Ok(IdentitySession {
                access_token: "token".to_string(),
                user: IdentityUser {
                    id: "user-1".to_string(),
                    user_metadata,
                },
            })
        }

        async fn update_user_type(
            &self,
            _session: &IdentitySession,
            account_type: AccountType,
        ) -> Result<(), IdentityError> {
            self.updates.lock().unwrap().push(account_type);
            Ok(())
        }
    }

    fn state_with_identity(identity: Arc<FakeIdentity>, env: &'static [(&'static str, &'static str)]) -> AppState {
        let mut state = AppState::from_config(config(env)).unwrap();
        state.identity = Some(identity);
        state
    }

    #[tokio::test]
    async fn test_callback_routes_by_stored_account_type() {
        let identity = Arc::new(FakeIdentity::new(Some("employer")));
        let mut request = get("/auth/callback?code=abc");
        request
            .headers_mut()
            .insert(header::COOKIE, "auth-code-verifier=v123".parse().unwrap());

        let response = send(state_with_identity(identity.clone(), &[]), request).await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "http://localhost:8080/employer/dashboard");
        assert_eq!(
            identity.exchanged.lock().unwrap()[0],
            ("abc".to_string(), Some("v123".to_string()))
        );
        assert!(identity.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_callback_records_requested_account_type() {
        let identity = Arc::new(FakeIdentity::new(None));
        let response = send(
            state_with_identity(identity.clone(), &[]),
            get("/auth/callback?code=abc&user_type=job_seeker"),
        )
        .await;

        assert_eq!(location(&response), "http://localhost:8080/dashboard");
        assert_eq!(*identity.updates.lock().unwrap(), vec![AccountType::JobSeeker]);
    }

    #[tokio::test]
    async fn test_callback_without_account_type_uses_next_or_onboarding() {
        let identity = Arc::new(FakeIdentity::new(None));
        let response = send(
            state_with_identity(identity.clone(), &[]),
            get("/auth/callback?code=abc&next=/career-path"),
        )
        .await;
        assert_eq!(location(&response), "http://localhost:8080/career-path");

        let response = send(
            state_with_identity(identity, &[]),
            get("/auth/callback?code=abc&next=//evil.example"),
        )
        .await;
        assert_eq!(location(&response), "http://localhost:8080/onboarding");
    }

    #[tokio::test]
    async fn test_callback_uses_forwarded_host_in_production() {
        let identity = Arc::new(FakeIdentity::new(Some("job_seeker")));
        let mut request = get("/auth/callback?code=abc");
        request
            .headers_mut()
            .insert("x-forwarded-host", "careers.example.com".parse().unwrap());

        let response = send(
            state_with_identity(identity, &[("APP_ENV", "production")]),
            request,
        )
        .await;
        assert_eq!(location(&response), "https://careers.example.com/dashboard");
    }

    #[tokio::test]
    async fn test_callback_failures_redirect_to_error_page() {
        // no code
        let identity = Arc::new(FakeIdentity::new(Some("employer")));
        let response = send(state_with_identity(identity.clone(), &[]), get("/auth/callback")).await;
        assert_eq!(location(&response), "http://localhost:8080/auth/auth-code-error");
        assert!(identity.exchanged.lock().unwrap().is_empty());

        // provider error parameter
        let response = send(
            state_with_identity(identity.clone(), &[]),
            get("/auth/callback?error=access_denied&error_description=denied"),
        )
        .await;
        assert_eq!(location(&response), "http://localhost:8080/auth/auth-code-error");

        // failed exchange
        let mut failing = FakeIdentity::new(None);
        failing.fail_exchange = true;
        let response = send(
            state_with_identity(Arc::new(failing), &[]),
            get("/auth/callback?code=expired"),
        )
        .await;
        assert_eq!(location(&response), "http://localhost:8080/auth/auth-code-error");

        // identity provider not configured
        let response = send(unconfigured_state(), get("/auth/callback?code=abc")).await;
        assert_eq!(location(&response), "http://localhost:8080/auth/auth-code-error");
    }
}
