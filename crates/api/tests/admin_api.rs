//! Integration tests for the `/admin` resource and the public `/donate`
//! endpoint.

mod common;

use axum::http::StatusCode;
use basho_core::roles::{ROLE_ADMIN, ROLE_USER};
use basho_core::status::event_status;
use basho_db::repositories::LedgerRepo;
use common::{
    create_event, create_user, delete_auth, expect_status, get, get_auth, post_json,
    post_json_auth, put_json_auth, token_for,
};
use sqlx::PgPool;
use uuid::Uuid;

fn event_body(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": "An evening of taiko drumming",
        "starts_at": (chrono::Utc::now() + chrono::Duration::days(14)).to_rfc3339(),
        "location": "Riverside Hall",
        "price_cents": 2500,
        "capacity": 150,
        "category": "music",
        "status": "active",
    })
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_endpoints_refuse_non_admins(pool: PgPool) {
    let user = create_user(&pool, "plain@example.com", ROLE_USER).await;
    let app = common::build_test_app(pool);

    // No token at all.
    let response = get(app.clone(), "/admin/stats").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid token, wrong role.
    let response = get_auth(app.clone(), "/admin/stats", &token_for(&user)).await;
    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["code"], "FORBIDDEN");

    let response = post_json_auth(
        app,
        "/admin/events",
        &token_for(&user),
        event_body("Sneaky Event"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn stats_reports_platform_totals(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let buyer = create_user(&pool, "buyer@example.com", ROLE_USER).await;
    let event = create_event(&pool, "Taiko Night", 2500, Some(100), event_status::ACTIVE).await;
    create_event(&pool, "Unannounced", 1000, None, event_status::DRAFT).await;

    LedgerRepo::issue(
        &pool,
        event.id,
        buyer.id,
        &["STATS-0001".to_string(), "STATS-0002".to_string()],
        Some("pi_stats"),
    )
    .await
    .expect("issue should succeed");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/admin/stats", &token_for(&admin)).await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["total_users"], 2);
    assert_eq!(json["data"]["active_events"], 1);
    assert_eq!(json["data"]["valid_tickets"], 2);
    assert_eq!(json["data"]["revenue_cents"], 5000);
}

// ---------------------------------------------------------------------------
// Event management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_listing_includes_all_statuses_with_sales(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let buyer = create_user(&pool, "buyer@example.com", ROLE_USER).await;
    let active = create_event(&pool, "Taiko Night", 2500, Some(100), event_status::ACTIVE).await;
    create_event(&pool, "Unannounced", 1000, None, event_status::DRAFT).await;

    LedgerRepo::issue(&pool, active.id, buyer.id, &["SALES-0001".to_string()], None)
        .await
        .expect("issue should succeed");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/admin/events", &token_for(&admin)).await;
    let json = expect_status(response, StatusCode::OK).await;

    let events = json["data"].as_array().unwrap();
    assert_eq!(events.len(), 2);

    let sold = events
        .iter()
        .find(|e| e["title"] == "Taiko Night")
        .expect("active event should be listed");
    assert_eq!(sold["tickets_sold"], 1);
    assert_eq!(sold["revenue_cents"], 2500);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_event_returns_created_row(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/admin/events",
        &token_for(&admin),
        event_body("Autumn Matsuri"),
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;

    assert_eq!(json["data"]["title"], "Autumn Matsuri");
    assert_eq!(json["data"]["capacity"], 150);
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["created_by"], serde_json::json!(admin.id));

    // It shows up in the public listing right away.
    let response = get(app, "/events").await;
    let json = expect_status(response, StatusCode::OK).await;
    assert!(json["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["title"] == "Autumn Matsuri"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_event_rejects_bad_payloads(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let app = common::build_test_app(pool);
    let token = token_for(&admin);

    // Misspelled field is a 400, not silently dropped.
    let mut body = event_body("Typo Event");
    body["capactiy"] = 50.into();
    body.as_object_mut().unwrap().remove("capacity");
    let response = post_json_auth(app.clone(), "/admin/events", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Negative price.
    let mut body = event_body("Negative Event");
    body["price_cents"] = (-100).into();
    let response = post_json_auth(app.clone(), "/admin/events", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown status value.
    let mut body = event_body("Postponed Event");
    body["status"] = "postponed".into();
    let response = post_json_auth(app.clone(), "/admin/events", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Zero capacity (omit for unlimited).
    let mut body = event_body("Empty Venue");
    body["capacity"] = 0.into();
    let response = post_json_auth(app, "/admin/events", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_event_applies_partial_changes(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let event = create_event(&pool, "Taiko Night", 2500, Some(100), event_status::ACTIVE).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "title": "Taiko Night (Rescheduled)", "status": "cancelled" });
    let response = put_json_auth(
        app,
        &format!("/admin/events/{}", event.id),
        &token_for(&admin),
        body,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["title"], "Taiko Night (Rescheduled)");
    assert_eq!(json["data"]["status"], "cancelled");
    // Untouched field survives.
    assert_eq!(json["data"]["price_cents"], 2500);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_unknown_event_is_404(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/admin/events/{}", Uuid::new_v4()),
        &token_for(&admin),
        serde_json::json!({ "title": "Ghost" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn archive_removes_event_from_public_listing(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let event = create_event(&pool, "Taiko Night", 2500, Some(100), event_status::ACTIVE).await;
    let app = common::build_test_app(pool);

    let response = delete_auth(
        app.clone(),
        &format!("/admin/events/{}", event.id),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), "/events").await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    // A truly unknown id is the 404 case.
    let response = delete_auth(
        app,
        &format!("/admin/events/{}", Uuid::new_v4()),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn donation_creates_anonymous_checkout_session(pool: PgPool) {
    let ctx = common::build_test_context(pool);

    let body = serde_json::json!({ "amount_cents": 1500, "email": "giver@example.com" });
    let response = post_json(ctx.app, "/donate", body).await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["session_id"], "cs_test_1");
    assert!(json["url"].is_string());
    assert_eq!(ctx.gateway.calls(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn donation_is_rate_limited_per_client(pool: PgPool) {
    let ctx = common::build_test_context(pool);

    // Budget is 10 per window per client; all requests share the
    // "unknown" client identity here.
    let body = serde_json::json!({ "amount_cents": 500 });
    for _ in 0..10 {
        let response = post_json(ctx.app.clone(), "/donate", body.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = post_json(ctx.app, "/donate", body).await;
    let json = expect_status(response, StatusCode::TOO_MANY_REQUESTS).await;
    assert_eq!(json["code"], "TOO_MANY_REQUESTS");
    assert_eq!(ctx.gateway.calls(), 10, "the throttled attempt must not reach the gateway");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn donation_rejects_sub_minimum_amount_and_bad_email(pool: PgPool) {
    let ctx = common::build_test_context(pool);

    let body = serde_json::json!({ "amount_cents": 99 });
    let response = post_json(ctx.app.clone(), "/donate", body).await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let body = serde_json::json!({ "amount_cents": 500, "email": "not-an-email" });
    let response = post_json(ctx.app, "/donate", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(ctx.gateway.calls(), 0);
}
