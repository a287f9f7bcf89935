//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use mentorlink_core::types::UserId;
use mentorlink_entity::user::UserRole;
use mentorlink_service::RequestContext;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A frame queued for the socket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Serialized event envelope.
    Text(String),
    /// Transport-level keepalive ping.
    Ping,
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender channel for pushing frames to the socket writer,
/// plus metadata about the connected user.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// User's role, from the identity token
    pub role: UserRole,
    /// Display name, from the identity token
    pub display_name: String,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<Frame>,
    last_pong_ms: AtomicI64,
    alive: AtomicBool,
    close: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(
        user_id: UserId,
        role: UserRole,
        display_name: String,
        sender: mpsc::Sender<Frame>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            display_name,
            connected_at: now,
            sender,
            last_pong_ms: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
            close: CancellationToken::new(),
        }
    }

    /// Queue a frame without waiting.
    ///
    /// Returns `false` when the frame was dropped: the buffer is full, or
    /// the writer is gone, in which case the handle is marked dead.
    pub fn send(&self, frame: Frame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Queue a serialized event.
    pub fn send_text(&self, text: String) -> bool {
        self.send(Frame::Text(text))
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark the connection dead and tell the socket task to shut down.
    pub fn close(&self) {
        self.mark_dead();
        self.close.cancel();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.close.is_cancelled()
    }

    /// Resolves once the connection has been closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.close.cancelled()
    }

    /// Record a pong response
    pub fn record_pong(&self) {
        self.last_pong_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    /// When the last pong arrived, or the connect time if none has.
    pub fn last_pong(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_pong_ms.load(Ordering::SeqCst))
            .unwrap_or(self.connected_at)
    }

    /// The acting user for commands issued over this connection.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.user_id, self.role, self.display_name.clone())
    }
}
