//! Live notification bus tests over real WebSocket connections.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use mentorlink_core::types::RoomKey;
use mentorlink_entity::user::UserRole;

use helpers::{TestApp, TestUser};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, user: &TestUser) -> Client {
    let url = format!("ws://{addr}/ws?token={}", user.token);
    let (ws, _) = connect_async(url).await.expect("handshake failed");
    ws
}

async fn connect_with_header(addr: SocketAddr, user: &TestUser) -> Client {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", user.token).parse().unwrap(),
    );
    let (ws, _) = connect_async(request).await.expect("handshake failed");
    ws
}

async fn send(ws: &mut Client, event: Value) {
    ws.send(Message::text(event.to_string())).await.unwrap();
}

/// Next event named `name`, skipping others.
async fn expect_event(ws: &mut Client, name: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let msg = ws.next().await.expect("socket closed").expect("socket error");
            if let Message::Text(text) = msg {
                let event: Value = serde_json::from_str(text.as_str()).unwrap();
                if event["event"] == name {
                    return event["data"].clone();
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
}

/// Next event of any name.
async fn next_event(ws: &mut Client) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let msg = ws.next().await.expect("socket closed").expect("socket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    })
    .await
    .expect("timed out waiting for an event")
}

#[tokio::test]
async fn test_handshake_requires_token() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    for url in [format!("ws://{addr}/ws"), format!("ws://{addr}/ws?token=garbage")] {
        match connect_async(url).await {
            Err(WsError::Http(response)) => {
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED.as_u16());
            }
            other => panic!("expected refused handshake, got {:?}", other.map(|_| ())),
        }
    }
}

#[tokio::test]
async fn test_request_notifications_reach_private_channels() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let mia = app.user("Mia", UserRole::Mentee);
    let omar = app.user("Omar", UserRole::Mentor);

    let mut omar_ws = connect(addr, &omar).await;
    let mut mia_ws = connect_with_header(addr, &mia).await;

    let online = expect_event(&mut omar_ws, "user_status").await;
    let online = if online["userId"] == omar.id.to_string() {
        expect_event(&mut omar_ws, "user_status").await
    } else {
        online
    };
    assert_eq!(online, json!({"userId": mia.id.to_string(), "status": "online"}));

    let sent = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({"from": mia.id.to_string(), "to": omar.id.to_string()})),
            Some(&mia.token),
        )
        .await;
    let id = sent.data()["id"].as_str().unwrap().to_string();

    let received = expect_event(&mut omar_ws, "newRequest").await;
    assert_eq!(received["id"], id.as_str());
    assert_eq!(received["from"]["name"], "Mia");

    app.request("POST", &format!("/api/requests/{id}/accept"), None, Some(&omar.token))
        .await;
    let updated = expect_event(&mut mia_ws, "requestUpdated").await;
    assert_eq!(updated["status"], "accepted");

    mia_ws.close(None).await.unwrap();
    let offline = expect_event(&mut omar_ws, "user_status").await;
    assert_eq!(offline, json!({"userId": mia.id.to_string(), "status": "offline"}));
}

#[tokio::test]
async fn test_chat_room_relay_without_self_echo() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let mia = app.user("Mia", UserRole::Mentee);
    let omar = app.user("Omar", UserRole::Mentor);
    let room = RoomKey::for_pair(mia.id, omar.id);

    let mut mia_ws = connect(addr, &mia).await;
    let mut omar_ws = connect(addr, &omar).await;
    // Frames are handled in order, so the error reply to a bogus frame
    // confirms the join before it was processed.
    for ws in [&mut mia_ws, &mut omar_ws] {
        send(ws, json!({"event": "join_chat", "data": {"roomId": room.as_str()}})).await;
        send(ws, json!({"event": "unknown", "data": {}})).await;
        expect_event(ws, "error").await;
    }

    let typing = json!({
        "event": "typing_indicator",
        "data": {"roomId": room.as_str(), "userId": mia.id.to_string(), "isTyping": true}
    });
    send(&mut mia_ws, typing.clone()).await;
    assert_eq!(expect_event(&mut omar_ws, "typing_indicator").await, typing["data"]);

    send(
        &mut mia_ws,
        json!({
            "event": "send_message",
            "data": {
                "sender": mia.id.to_string(),
                "recipient": omar.id.to_string(),
                "content": "Ready when you are",
                "roomId": room.as_str()
            }
        }),
    )
    .await;
    let message = expect_event(&mut omar_ws, "receive_message").await;
    assert_eq!(message["content"], "Ready when you are");
    assert_eq!(message["sender"]["name"], "Mia");

    // The sender saw neither relay: its next event is the reply to a bad frame.
    send(&mut mia_ws, json!({"event": "unknown", "data": {}})).await;
    let mut event = next_event(&mut mia_ws).await;
    while event["event"] == "user_status" {
        event = next_event(&mut mia_ws).await;
    }
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], "INVALID_INPUT");

    let unread = app
        .request(
            "GET",
            &format!("/api/messages/unread/{}/{}", omar.id, mia.id),
            None,
            Some(&omar.token),
        )
        .await;
    assert_eq!(unread.data()["count"], 1);
}
