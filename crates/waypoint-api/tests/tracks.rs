mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

const POINTS: &str = r#"[{"lat":39.9042,"lng":116.4074,"timestamp":"2024-05-01T08:00:00Z"},{"lat":39.9050,"lng":116.4100,"timestamp":"2024-05-01T08:05:00Z"}]"#;

#[tokio::test]
async fn points_round_trip_verbatim() {
    let app = TestApp::new().await;
    let token = app.user("alice").await;

    let body = format!(
        r#"{{"name":"Morning walk","points":{},"start_time":"2024-05-01T08:00:00Z","end_time":"2024-05-01T08:05:00Z","distance":1200}}"#,
        POINTS
    );
    let created = app.call_raw("POST", "/api/track/", Some(&token), body).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text());
    assert!(created.text().contains(POINTS));

    let track = created.json();
    assert_eq!(track["name"], "Morning walk");
    assert_eq!(track["start_time"], "2024-05-01T08:00:00Z");
    assert_eq!(track["end_time"], "2024-05-01T08:05:00Z");
    assert_eq!(track["distance"].as_f64(), Some(1200.0));

    let list = app.call("GET", "/api/track", Some(&token), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.text().contains(POINTS));
    assert_eq!(list.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn defaults_fill_name_and_distance() {
    let app = TestApp::new().await;
    let token = app.user("alice").await;

    let created = app
        .call(
            "POST",
            "/api/track",
            Some(&token),
            Some(json!({"points": [], "start_time": "2024-05-01 08:00"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text());
    let track = created.json();
    assert!(track["name"].as_str().unwrap().starts_with("Track "));
    assert_eq!(track["distance"].as_f64(), Some(0.0));
    assert_eq!(track["end_time"], json!(null));
    assert_eq!(track["points"], json!([]));
}

#[tokio::test]
async fn required_fields_are_checked() {
    let app = TestApp::new().await;
    let token = app.user("alice").await;

    let no_start = app
        .call("POST", "/api/track/", Some(&token), Some(json!({"points": []})))
        .await;
    assert_eq!(no_start.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_start.json()["error"], "start_time is required");

    let no_points = app
        .call(
            "POST",
            "/api/track/",
            Some(&token),
            Some(json!({"start_time": "2024-05-01T08:00:00Z"})),
        )
        .await;
    assert_eq!(no_points.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_points.json()["error"], "points is required");

    let bad_time = app
        .call(
            "POST",
            "/api/track/",
            Some(&token),
            Some(json!({"points": [], "start_time": "yesterday"})),
        )
        .await;
    assert_eq!(bad_time.status, StatusCode::BAD_REQUEST);

    let bad_points = app
        .call(
            "POST",
            "/api/track/",
            Some(&token),
            Some(json!({"points": [{"lat": 1.0}], "start_time": "2024-05-01T08:00:00Z"})),
        )
        .await;
    assert_eq!(bad_points.status, StatusCode::BAD_REQUEST);

    let list = app.call("GET", "/api/track/", Some(&token), None).await;
    assert_eq!(list.json(), json!([]));
}

#[tokio::test]
async fn update_and_delete_are_scoped() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let id = app
        .call(
            "POST",
            "/api/track/",
            Some(&alice),
            Some(json!({"name": "Ride", "points": [], "start_time": "2024-05-01T08:00:00Z"})),
        )
        .await
        .json()["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/track/{}", id);

    let foreign = app
        .call("PUT", &uri, Some(&bob), Some(json!({"name": "Stolen"})))
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let updated = app
        .call(
            "PUT",
            &uri,
            Some(&alice),
            Some(json!({"end_time": "2024-05-01T09:30:00Z", "distance": 25.5})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text());
    let track = updated.json();
    assert_eq!(track["name"], "Ride");
    assert_eq!(track["end_time"], "2024-05-01T09:30:00Z");
    assert_eq!(track["distance"].as_f64(), Some(25.5));

    assert_eq!(app.call("DELETE", &uri, Some(&bob), None).await.status, StatusCode::NOT_FOUND);
    let deleted = app.call("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["message"], "Track deleted");
    assert_eq!(app.call("GET", "/api/track/", Some(&alice), None).await.json(), json!([]));
}
