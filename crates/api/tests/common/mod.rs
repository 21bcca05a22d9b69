//! Shared harness for API integration tests.
//!
//! Builds the full application router with the production middleware
//! stack, but swaps redis and the payment gateway for in-memory doubles
//! so the suite needs nothing but the Postgres instance `#[sqlx::test]`
//! provides.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use basho_api::auth::jwt::JwtConfig;
use basho_api::auth::password::hash_password;
use basho_api::config::ServerConfig;
use basho_api::router::build_app_router;
use basho_api::state::AppState;
use basho_cache::{CacheError, RateLimit, TicketCache, TicketSnapshot};
use basho_core::types::DbId;
use basho_db::models::user::{CreateUser, User};
use basho_gateway::{
    CheckoutSession, CheckoutSessionParams, GatewayError, PaymentProvider, StripeConfig,
};

/// Webhook signing secret shared between tests and the test config.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// JWT signing secret shared between tests and the test config.
pub const TEST_JWT_SECRET: &str = "integration-test-jwt-secret";

// ---------------------------------------------------------------------------
// In-memory doubles
// ---------------------------------------------------------------------------

/// Counting rate limiter that honours limits but ignores windows.
///
/// Counters never expire within a single test, which is exactly the
/// closed-window behaviour the 429 tests need.
#[derive(Default)]
pub struct InMemoryRateLimit {
    counts: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl RateLimit for InMemoryRateLimit {
    async fn allow(
        &self,
        action: &str,
        client: &str,
        limit: u32,
        _window_secs: i64,
    ) -> Result<bool, CacheError> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(format!("{action}:{client}")).or_insert(0);
        *count += 1;
        Ok(*count <= limit)
    }
}

/// Hash-map ticket cache; TTLs are accepted and ignored.
#[derive(Default)]
pub struct InMemoryTicketCache {
    entries: Mutex<HashMap<DbId, TicketSnapshot>>,
}

impl InMemoryTicketCache {
    /// Direct read for assertions.
    pub fn peek(&self, ticket_id: DbId) -> Option<TicketSnapshot> {
        self.entries.lock().unwrap().get(&ticket_id).cloned()
    }

    /// Seed an entry without going through the API.
    pub fn seed(&self, snapshot: TicketSnapshot) {
        self.entries
            .lock()
            .unwrap()
            .insert(snapshot.ticket_id, snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl TicketCache for InMemoryTicketCache {
    async fn get(&self, ticket_id: DbId) -> Result<Option<TicketSnapshot>, CacheError> {
        Ok(self.peek(ticket_id))
    }

    async fn put(&self, snapshot: &TicketSnapshot, _ttl_secs: u64) -> Result<(), CacheError> {
        self.seed(snapshot.clone());
        Ok(())
    }

    async fn remove(&self, ticket_id: DbId) -> Result<(), CacheError> {
        self.entries.lock().unwrap().remove(&ticket_id);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Scripted payment provider: returns sequential session ids and counts
/// calls so tests can assert "the gateway was never contacted".
#[derive(Default)]
pub struct StubGateway {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl StubGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent session creations fail like an upstream outage.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentProvider for StubGateway {
    async fn create_checkout_session(
        &self,
        _params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 500,
                body: "stub outage".to_string(),
            });
        }
        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: format!("https://checkout.test/pay/cs_test_{n}"),
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Handles to the doubles behind a test app, for assertions.
pub struct TestContext {
    pub app: Router,
    pub cache: Arc<InMemoryTicketCache>,
    pub gateway: Arc<StubGateway>,
    pub config: ServerConfig,
}

/// Build a test `ServerConfig` with safe defaults and known secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:5173".to_string(),
        hold_ttl_mins: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 24,
        },
        stripe: StripeConfig {
            secret_key: "sk_test_dummy".to_string(),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            api_base: "http://stripe.invalid".to_string(),
        },
    }
}

/// Build the application with in-memory doubles, returning handles to
/// them for assertions.
pub fn build_test_context(pool: PgPool) -> TestContext {
    let config = test_config();
    let cache = Arc::new(InMemoryTicketCache::default());
    let gateway = Arc::new(StubGateway::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        limiter: Arc::new(InMemoryRateLimit::default()),
        cache: Arc::clone(&cache) as Arc<dyn TicketCache>,
        gateway: Arc::clone(&gateway) as Arc<dyn PaymentProvider>,
        notifier: None,
    };

    TestContext {
        app: build_app_router(state, &config),
        cache,
        gateway,
        config,
    }
}

/// Build just the router, for tests that do not inspect the doubles.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_context(pool).app
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Plaintext password used by [`create_user`] fixtures.
pub const TEST_PASSWORD: &str = "Sunfl0wer9";

/// Create a user directly in the database with the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    basho_db::repositories::UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash,
            full_name: "Test Person".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Create an event directly in the database.
///
/// Starts one week out so it shows up in the upcoming listing.
pub async fn create_event(
    pool: &PgPool,
    title: &str,
    price_cents: i64,
    capacity: Option<i32>,
    status: &str,
) -> basho_db::models::event::Event {
    basho_db::repositories::EventRepo::create(
        pool,
        None,
        &basho_db::models::event::CreateEvent {
            title: title.to_string(),
            description: Some("A test event".to_string()),
            starts_at: chrono::Utc::now() + chrono::Duration::days(7),
            location: "Riverside Hall".to_string(),
            price_cents: Some(price_cents),
            image_url: None,
            capacity,
            category: None,
            status: Some(status.to_string()),
        },
    )
    .await
    .expect("event creation should succeed")
}

/// Issue a bearer token for a user, signed with the test JWT secret.
pub fn token_for(user: &User) -> String {
    basho_api::auth::jwt::generate_access_token(
        user.id,
        &user.email,
        &user.role,
        &test_config().jwt,
    )
    .expect("token generation should succeed")
}

/// Build a `stripe-signature` header value for a raw webhook body.
pub fn sign_webhook(body: &str) -> String {
    let timestamp = "1700000000";
    let sig = basho_core::signature::sign_payload(TEST_WEBHOOK_SECRET, timestamp, body);
    format!("t={timestamp},v1={sig}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a raw webhook body with a `stripe-signature` header.
pub async fn post_webhook(app: Router, body: &str, signature: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payment")
        .header("content-type", "application/json")
        .header("stripe-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read and parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// Assert status and return the parsed body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
