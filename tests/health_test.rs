//! Integration tests for the health and presence endpoints.

mod helpers;

use axum::http::StatusCode;

use mentorlink_entity::user::UserRole;

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = helpers::TestApp::new();

    let res = app.request("GET", "/api/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.data()["status"], "ok");
    assert_eq!(res.data()["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_detailed_health_reports_bus_state() {
    let app = helpers::TestApp::new();
    let omar = app.user("Omar", UserRole::Mentor);
    let (_handle, _rx) = app
        .state
        .realtime
        .connections
        .register(omar.id, UserRole::Mentor, "Omar".into());

    let res = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    let data = res.data();
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "connected");
    assert_eq!(data["wsConnections"], 1);
    assert_eq!(data["onlineUsers"], 1);
    assert_eq!(data["activeRooms"], 0);
    assert_eq!(data["bus"]["connectionsActive"], 1);
}

#[tokio::test]
async fn test_presence_lists_connected_users() {
    let app = helpers::TestApp::new();
    let mia = app.user("Mia", UserRole::Mentee);
    let omar = app.user("Omar", UserRole::Mentor);

    let unauthenticated = app.request("GET", "/api/presence", None, None).await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unauthenticated.error(), "AUTHENTICATION");

    let (_handle, _rx) = app
        .state
        .realtime
        .connections
        .register(omar.id, UserRole::Mentor, "Omar".into());

    let res = app.request("GET", "/api/presence", None, Some(&mia.token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["count"], 1);
    assert_eq!(res.data()["onlineUserIds"][0], omar.id.to_string());
}
