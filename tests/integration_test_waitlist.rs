mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn join(app: &TestApp, service_id: &str, email: &str, start: &str, end: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/waitlist")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "service_id": service_id,
                "name": "Waiting Customer",
                "email": email,
                "start_date": start,
                "end_date": end
            }).to_string())).unwrap()
    ).await.unwrap()
}

async fn scan(app: &TestApp) -> Value {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/cron/waitlist-scan")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

async fn request_status(app: &TestApp, id: &str) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/waitlist")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let list = parse_body(res).await;
    list.as_array().unwrap().iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("Request {} missing from list", id))
        ["status"].as_str().unwrap().to_string()
}

/// Starts two days out so the window is strictly in the future in any
/// business timezone; otherwise a match on "today" races the clock.
fn window() -> (String, String) {
    let start = Utc::now().date_naive() + Duration::days(2);
    let end = start + Duration::days(10);
    (start.format("%Y-%m-%d").to_string(), end.format("%Y-%m-%d").to_string())
}

#[tokio::test]
async fn test_scan_notifies_first_opening() {
    let app = TestApp::new().await;
    // Only Fridays are open, so the match lands on one.
    app.set_single_open_day(5, "10:00", "18:00").await;
    let svc = app.create_service("Keratin Treatment", 60).await;

    let (start, end) = window();
    let created = parse_body(join(&app, &svc, "w1@example.com", &start, &end).await).await;
    let request_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "PENDING");

    let outcome = scan(&app).await;
    assert_eq!(outcome["processed"], 1);
    assert_eq!(outcome["notified"], 1);

    let notices = app.notifier.waitlist_notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    let notice = &notices[0];
    assert_eq!(notice.customer_email, "w1@example.com");
    assert_eq!(notice.service_name, "Keratin Treatment");
    assert_eq!(notice.matched_date.weekday(), Weekday::Fri);
    assert_eq!(notice.matched_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert!(notice.booking_link.contains(&format!("serviceId={}", svc)));
    assert!(notice.booking_link.contains(&format!("waitlistRequestId={}", request_id)));
    assert!(notice.booking_link.contains("time=10:00"));
    drop(notices);

    assert_eq!(request_status(&app, &request_id).await, "NOTIFIED");

    // The hold expires 48 hours after the notification.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/waitlist").body(Body::empty()).unwrap()
    ).await.unwrap();
    let list = parse_body(res).await;
    let row = list.as_array().unwrap().iter().find(|r| r["id"] == request_id).unwrap();
    let expires_at: DateTime<Utc> = row["expires_at"].as_str().unwrap().parse().unwrap();
    let hold = expires_at - Utc::now();
    assert!(hold > Duration::hours(47) && hold < Duration::hours(49), "Unexpected hold window: {}", hold);

    // Notified requests leave the pending queue.
    let second = scan(&app).await;
    assert_eq!(second["processed"], 0);
    assert_eq!(second["notified"], 0);
}

#[tokio::test]
async fn test_scan_offers_earliest_date_and_slot() {
    let app = TestApp::new().await;
    let svc = app.create_service("Root Touch-Up", 60).await;

    // Find the next open day (seed hours: Tue..Sat) and take its first slot.
    let mut first_open = Utc::now().date_naive() + Duration::days(2);
    while matches!(first_open.weekday(), Weekday::Sun | Weekday::Mon) {
        first_open += Duration::days(1);
    }
    app.create_booking(&svc, &first_open.format("%Y-%m-%d").to_string(), "10:00").await;

    // Window starts on the booked day so the scan must begin there.
    let start = first_open.format("%Y-%m-%d").to_string();
    let end = (first_open + Duration::days(3)).format("%Y-%m-%d").to_string();
    parse_body(join(&app, &svc, "early@example.com", &start, &end).await).await;

    let outcome = scan(&app).await;
    assert_eq!(outcome["notified"], 1);

    let notices = app.notifier.waitlist_notices.lock().unwrap();
    assert_eq!(notices[0].matched_date, first_open, "Scan should not skip past the first open date");
    // 10:00 is taken, 10:15..10:45 collide with it, 11:00 is the first fit.
    assert_eq!(notices[0].matched_time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
}

#[tokio::test]
async fn test_scan_processes_oldest_first() {
    let app = TestApp::new().await;
    app.set_single_open_day(5, "10:00", "18:00").await;
    let svc = app.create_service("Brow Lamination", 30).await;

    let (start, end) = window();
    join(&app, &svc, "first@example.com", &start, &end).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    join(&app, &svc, "second@example.com", &start, &end).await;

    let outcome = scan(&app).await;
    assert_eq!(outcome["processed"], 2);
    assert_eq!(outcome["notified"], 2);

    let notices = app.notifier.waitlist_notices.lock().unwrap();
    assert_eq!(notices[0].customer_email, "first@example.com");
    assert_eq!(notices[1].customer_email, "second@example.com");
}

#[tokio::test]
async fn test_scan_skips_inactive_service() {
    let app = TestApp::new().await;
    let svc = app.create_service("Discontinued Spa Day", 120).await;
    let (start, end) = window();
    let created = parse_body(join(&app, &svc, "w@example.com", &start, &end).await).await;
    let request_id = created["id"].as_str().unwrap();

    app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/services/{}", svc))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"active": false}).to_string())).unwrap()
    ).await.unwrap();

    let outcome = scan(&app).await;
    assert_eq!(outcome["processed"], 1);
    assert_eq!(outcome["notified"], 0);
    assert_eq!(request_status(&app, request_id).await, "PENDING");
    assert!(app.notifier.waitlist_notices.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_send_keeps_request_pending() {
    let app = TestApp::new().await;
    app.set_single_open_day(5, "10:00", "18:00").await;
    let svc = app.create_service("Silk Press", 60).await;
    let (start, end) = window();
    let created = parse_body(join(&app, &svc, "w@example.com", &start, &end).await).await;
    let request_id = created["id"].as_str().unwrap();

    app.notifier.fail_sends.store(true, std::sync::atomic::Ordering::SeqCst);
    let outcome = scan(&app).await;
    assert_eq!(outcome["processed"], 1);
    assert_eq!(outcome["notified"], 0);
    // The send never went out, so the match is not burned.
    assert_eq!(request_status(&app, request_id).await, "PENDING");

    app.notifier.fail_sends.store(false, std::sync::atomic::Ordering::SeqCst);
    let retry = scan(&app).await;
    assert_eq!(retry["notified"], 1);
    assert_eq!(request_status(&app, request_id).await, "NOTIFIED");
}

#[tokio::test]
async fn test_window_without_opening_stays_pending() {
    let app = TestApp::new().await;
    let svc = app.create_service("Scalp Massage", 30).await;

    // Seed hours close Sunday and Monday; the window covers only those.
    let mut sunday = Utc::now().date_naive() + Duration::days(2);
    while sunday.weekday() != Weekday::Sun {
        sunday += Duration::days(1);
    }
    let monday = sunday + Duration::days(1);

    let created = parse_body(join(
        &app, &svc, "w@example.com",
        &sunday.format("%Y-%m-%d").to_string(),
        &monday.format("%Y-%m-%d").to_string(),
    ).await).await;
    let request_id = created["id"].as_str().unwrap();

    let outcome = scan(&app).await;
    assert_eq!(outcome["processed"], 1);
    assert_eq!(outcome["notified"], 0);
    assert_eq!(request_status(&app, request_id).await, "PENDING");
}

#[tokio::test]
async fn test_disabled_waitlist_rejects_and_skips() {
    let app = TestApp::new().await;
    let svc = app.create_service("Glaze", 30).await;
    let (start, end) = window();

    // Join while enabled, then switch off.
    join(&app, &svc, "w@example.com", &start, &end).await;
    app.update_settings("America/Los_Angeles", 0, None, false).await;

    let res = join(&app, &svc, "late@example.com", &start, &end).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The scan reports zeros without touching the queue.
    let outcome = scan(&app).await;
    assert_eq!(outcome["processed"], 0);
    assert_eq!(outcome["notified"], 0);
}

#[tokio::test]
async fn test_join_validations() {
    let app = TestApp::new().await;
    let svc = app.create_service("Trim", 15).await;
    let (start, end) = window();

    let res = join(&app, "missing-service", "w@example.com", &start, &end).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = join(&app, &svc, "w@example.com", &end, &start).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let past_start = (Utc::now().date_naive() - Duration::days(14)).format("%Y-%m-%d").to_string();
    let past_end = (Utc::now().date_naive() - Duration::days(7)).format("%Y-%m-%d").to_string();
    let res = join(&app, &svc, "w@example.com", &past_start, &past_end).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["error"], "Date window is entirely in the past");
}
