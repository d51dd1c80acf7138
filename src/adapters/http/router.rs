//! Top-level router: mounts each feature router with its own state and
//! applies the cross-cutting tower layers.

use std::time::Duration;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::billing::{billing_routes, BillingAppState};
use super::health::{health_routes, HealthAppState};
use super::middleware::{auth_middleware, AuthState};
use super::payments::{payment_routes, PaymentsAppState};
use super::webhooks::{webhook_routes, WebhooksAppState};

/// Everything the HTTP surface needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub payments: PaymentsAppState,
    pub webhooks: WebhooksAppState,
    pub billing: BillingAppState,
    pub health: HealthAppState,
    pub sessions: AuthState,
}

/// Routes without transport layers, for tests and embedding.
///
/// Only the payment routes pass through session auth; webhooks and the
/// billing trigger carry their own credentials.
pub fn api_router(state: AppState) -> Router {
    let payments = payment_routes()
        .with_state(state.payments)
        .layer(axum::middleware::from_fn_with_state(
            state.sessions,
            auth_middleware,
        ));

    Router::new()
        .nest("/api/payments", payments)
        .nest("/api/webhooks", webhook_routes().with_state(state.webhooks))
        .nest("/api/billing", billing_routes().with_state(state.billing))
        .merge(health_routes().with_state(state.health))
}

/// Adds request ids, tracing, a request timeout and CORS.
pub fn with_http_layers(router: Router, request_timeout: Duration, cors_origins: &[String]) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    router
        .layer(cors_layer(cors_origins))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| !o.is_empty())
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() {
        // Callers are the storefront's server and the providers; browsers
        // only need CORS when origins are configured.
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryBillingReader, InMemoryIntentStore};
    use crate::adapters::providers::CashOnDeliveryAdapter;
    use crate::application::handlers::billing::{RunBillingSweepHandler, SweepSettings};
    use crate::application::handlers::payment::{CreateIntentHandler, ReconcileWebhookHandler};
    use crate::domain::billing::RunMode;
    use crate::domain::foundation::{AuthenticatedUser, UserId};
    use crate::domain::payment::{sign_body, ProviderId, SignatureEncoding};
    use crate::ports::{IntentStore, ProviderRegistry, StoreError};

    const CHAPA_SECRET: &str = "chapa-webhook-secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct TestApp {
        router: Router,
        store: Arc<InMemoryIntentStore>,
    }

    fn test_app(run_mode: RunMode, trigger_key: Option<&str>) -> TestApp {
        let store = Arc::new(InMemoryIntentStore::new());
        let intents: Arc<dyn IntentStore> = store.clone();
        let registry = ProviderRegistry::new().with(Arc::new(CashOnDeliveryAdapter));
        let create_intent = Arc::new(CreateIntentHandler::new(
            intents.clone(),
            registry,
            "https://return.yenefresh.com/pay/return",
        ));
        let reconciler = ReconcileWebhookHandler::new(intents.clone())
            .with_secret(ProviderId::Chapa, SecretString::new(CHAPA_SECRET.to_string()));
        let sweep = RunBillingSweepHandler::new(
            Arc::new(InMemoryBillingReader::new()),
            create_intent.clone(),
            Arc::new(InMemoryEventBus::new()),
            SweepSettings {
                run_mode,
                ..SweepSettings::default()
            },
        );
        let sessions = MockSessionValidator::new().with_user(
            "good-token",
            AuthenticatedUser::new(UserId::new("user-1").unwrap(), None, None),
        );

        let router = api_router(AppState {
            payments: PaymentsAppState { create_intent },
            webhooks: WebhooksAppState {
                reconciler: Arc::new(reconciler),
            },
            billing: BillingAppState {
                sweep: Arc::new(sweep),
                trigger_key: trigger_key.map(|k| SecretString::new(k.to_string())),
            },
            health: HealthAppState { store: intents },
            sessions: Arc::new(sessions),
        });

        TestApp { router, store }
    }

    fn intent_body() -> Value {
        json!({
            "amount_cents": 50000,
            "currency": "ETB",
            "provider_id": "cod",
            "address_id": "6f1c1c1e-8a51-4bb4-9c37-61a3f3b2a001",
            "delivery_window_id": "0b9a3c3a-2f0e-4a55-9d0d-0f3f1f7c9b02",
            "idempotency_key": "yf_router-test"
        })
    }

    fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn read_body(response: axum::response::Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Payments
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_intent_returns_pending_cod_intent() {
        let app = test_app(RunMode::Dry, None);

        let response = app
            .router
            .oneshot(post_json("/api/payments/intents", Some("good-token"), &intent_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["replayed"], false);
        assert_eq!(app.store.intent_count(), 1);
    }

    #[tokio::test]
    async fn create_intent_without_session_is_401() {
        let app = test_app(RunMode::Dry, None);

        let response = app
            .router
            .oneshot(post_json("/api/payments/intents", None, &intent_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.store.intent_count(), 0);
    }

    #[tokio::test]
    async fn create_intent_with_bad_uuid_is_400() {
        let app = test_app(RunMode::Dry, None);
        let mut body = intent_body();
        body["address_id"] = json!("home");

        let response = app
            .router
            .oneshot(post_json("/api/payments/intents", Some("good-token"), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(json["error_code"], "VALIDATION_FAILED");
        assert_eq!(json["details"]["field"], "address_id");
    }

    #[tokio::test]
    async fn anonymous_request_with_bad_uuid_is_still_401() {
        let app = test_app(RunMode::Dry, None);
        let mut body = intent_body();
        body["address_id"] = json!("home");

        let response = app
            .router
            .oneshot(post_json("/api/payments/intents", None, &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.store.intent_count(), 0);
    }

    #[tokio::test]
    async fn create_intent_for_unregistered_provider_is_400() {
        let app = test_app(RunMode::Dry, None);
        let mut body = intent_body();
        body["provider_id"] = json!("chapa");

        let response = app
            .router
            .oneshot(post_json("/api/payments/intents", Some("good-token"), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.store.intent_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhooks
    // ════════════════════════════════════════════════════════════════════════════

    async fn seeded_intent(app: &TestApp) -> String {
        let response = app
            .router
            .clone()
            .oneshot(post_json("/api/payments/intents", Some("good-token"), &intent_body()))
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        json["intent_id"].as_str().unwrap().to_string()
    }

    fn chapa_webhook(body: &[u8], signature: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/webhooks/chapa")
            .header("chapa-signature", signature)
            .body(Body::from(body.to_vec()))
            .unwrap()
    }

    #[tokio::test]
    async fn signed_webhook_reconciles_intent() {
        let app = test_app(RunMode::Dry, None);
        let intent_id = seeded_intent(&app).await;
        let body = json!({"tx_ref": intent_id, "status": "success"}).to_string();
        let signature = sign_body(body.as_bytes(), CHAPA_SECRET.as_bytes(), SignatureEncoding::Hex);

        let response = app
            .router
            .clone()
            .oneshot(chapa_webhook(body.as_bytes(), &signature))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_body(response).await, b"ok");
        let intent = app.store.intent(&intent_id).unwrap();
        assert_eq!(intent.status.as_str(), "succeeded");
    }

    #[tokio::test]
    async fn forged_webhook_is_403() {
        let app = test_app(RunMode::Dry, None);
        let body = br#"{"tx_ref":"x","status":"success"}"#;

        let response = app
            .router
            .oneshot(chapa_webhook(body, "deadbeef"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_body(response).await, b"invalid signature");
    }

    #[tokio::test]
    async fn webhook_for_unconfigured_provider_is_404() {
        let app = test_app(RunMode::Dry, None);

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/telebirr")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn webhook_for_unknown_intent_is_400() {
        let app = test_app(RunMode::Dry, None);
        let body = json!({"tx_ref": "yf_nobody", "status": "success"}).to_string();
        let signature = sign_body(body.as_bytes(), CHAPA_SECRET.as_bytes(), SignatureEncoding::Hex);

        let response = app
            .router
            .oneshot(chapa_webhook(body.as_bytes(), &signature))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_body(response).await, b"no intent");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Billing and health
    // ════════════════════════════════════════════════════════════════════════════

    fn billing_run(cron_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/api/billing/run");
        if let Some(key) = cron_key {
            builder = builder.header("X-Cron-Key", key);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn live_billing_requires_cron_key() {
        let app = test_app(RunMode::Live, Some("cron-secret"));

        let response = app.router.clone().oneshot(billing_run(Some("guess"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(json, json!({"ok": false, "error": "forbidden: bad cron key"}));

        let response = app.router.oneshot(billing_run(Some("cron-secret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dry_billing_is_never_gated() {
        let app = test_app(RunMode::Dry, Some("cron-secret"));

        let response = app.router.oneshot(billing_run(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(json["mode"], "dry");
        assert_eq!(json["notes"][0], "No active subs due in window.");
    }

    #[tokio::test]
    async fn readiness_follows_store() {
        let app = test_app(RunMode::Dry, None);

        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        app.store.fail_ping(StoreError::unavailable("connection refused"));
        let response = app
            .router
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_is_always_up() {
        let app = test_app(RunMode::Dry, None);
        let response = app
            .router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
