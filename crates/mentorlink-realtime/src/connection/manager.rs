//! Connection manager: the single owner of presence and room state.
//!
//! Socket tasks and the event bridge only go through the methods here.
//! Presence transitions (first connect, last disconnect) run under one
//! lifecycle lock so a user's online/offline announcements never interleave.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use mentorlink_core::config::RealtimeConfig;
use mentorlink_core::error::AppError;
use mentorlink_core::types::{RoomKey, UserId};
use mentorlink_entity::user::UserRole;
use mentorlink_service::{ConversationService, PostMessage};

use super::handle::{ConnectionHandle, ConnectionId, Frame};
use super::pool::ConnectionPool;
use crate::message::types::{
    InboundEvent, JoinPayload, OutboundEvent, RoomPayload, SendMessagePayload, TypingIndicator,
};
use crate::message::validator::parse_inbound;
use crate::metrics::EngineMetrics;
use crate::presence::tracker::{OnlineUser, PresenceTracker};
use crate::room::RoomRegistry;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: ConnectionPool,
    rooms: RoomRegistry,
    presence: Arc<PresenceTracker>,
    metrics: Arc<EngineMetrics>,
    conversations: Arc<ConversationService>,
    config: RealtimeConfig,
    lifecycle: Mutex<()>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        presence: Arc<PresenceTracker>,
        metrics: Arc<EngineMetrics>,
        conversations: Arc<ConversationService>,
    ) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            presence,
            metrics,
            conversations,
            config,
            lifecycle: Mutex::new(()),
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Returns the connection handle and the receiver the socket writer
    /// drains. The user's first connection announces them online.
    pub fn register(
        &self,
        user_id: UserId,
        role: UserRole,
        display_name: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, role, display_name, tx));

        let _guard = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        let existing = self.pool.user_connections(&user_id);
        let already_online = !existing.is_empty();
        if existing.len() >= self.config.max_connections_per_user.max(1) {
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user_id,
                    conn_id = %oldest.id,
                    max = self.config.max_connections_per_user,
                    "User at max connections, closing oldest"
                );
                self.detach(oldest.id);
                self.metrics.connection_evicted();
            }
        }

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        if !already_online {
            let announcement = self
                .presence
                .set_online(user_id, role, &handle.display_name);
            self.broadcast_all(&announcement);
        }

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            connections = self.pool.connection_count(),
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection and drops its room memberships.
    ///
    /// The user's last connection announces them offline. Calling this for
    /// a connection that is already gone is a no-op.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        let _guard = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(handle) = self.detach(*conn_id) else {
            return;
        };

        if self.pool.user_connection_count(&handle.user_id) == 0 {
            let announcement = self.presence.set_offline(handle.user_id);
            self.broadcast_all(&announcement);
        }

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            "WebSocket connection unregistered"
        );
    }

    /// Remove a connection from the pool and every room, and close it.
    fn detach(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let handle = self.pool.remove(&conn_id)?;
        handle.close();
        let left = self.rooms.leave_all(conn_id);
        self.metrics.connection_closed();
        debug!(conn_id = %conn_id, rooms = left.len(), "Connection detached");
        Some(handle)
    }

    /// Processes an inbound frame from a client.
    ///
    /// Failures are logged and answered with an `error` event; the
    /// connection stays open.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };
        self.metrics.message_received();

        let result = match parse_inbound(raw, self.config.max_message_bytes) {
            Ok(event) => {
                let name = event.name();
                self.dispatch(&handle, event)
                    .await
                    .map_err(|e| (Some(name), e))
            }
            Err(e) => Err((None, e)),
        };

        if let Err((event, err)) = result {
            warn!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                event = event.unwrap_or("unparsed"),
                error = %err,
                "Inbound event rejected"
            );
            self.metrics.inbound_error();
            self.send_to_connection(&handle, &OutboundEvent::from(&err));
        }
    }

    async fn dispatch(&self, handle: &ConnectionHandle, event: InboundEvent) -> Result<(), AppError> {
        match event {
            InboundEvent::Join(JoinPayload { user_id }) => {
                if user_id != handle.user_id {
                    return Err(AppError::forbidden(
                        "Cannot join another user's private channel",
                    ));
                }
                debug!(conn_id = %handle.id, "Private channel join acknowledged");
                Ok(())
            }
            InboundEvent::JoinChat(RoomPayload { room_id }) => self.join_room(handle, room_id),
            InboundEvent::LeaveChat(RoomPayload { room_id }) => {
                self.leave_room(handle, &room_id);
                Ok(())
            }
            InboundEvent::TypingIndicator(typing) => self.relay_typing(handle, typing),
            InboundEvent::SendMessage(payload) => self.relay_message(handle, payload).await,
        }
    }

    /// Adds a connection to a room that includes its user. Idempotent.
    ///
    /// Runs under the lifecycle lock so a connection detached concurrently
    /// can never be left behind as a room member.
    pub fn join_room(&self, handle: &ConnectionHandle, room: RoomKey) -> Result<(), AppError> {
        let _guard = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        if self.pool.get(&handle.id).is_none() {
            return Err(AppError::not_found(format!(
                "Connection {} is closed",
                handle.id
            )));
        }
        if !room.includes(handle.user_id) {
            return Err(AppError::forbidden(format!(
                "Not a participant of room {room}"
            )));
        }
        if !self.rooms.is_member(&room, handle.id)
            && self.rooms.membership_count(handle.id) >= self.config.max_rooms_per_connection
        {
            return Err(AppError::invalid_input(format!(
                "Room limit of {} reached",
                self.config.max_rooms_per_connection
            )));
        }

        if self.rooms.join(room.clone(), handle.id) {
            debug!(conn_id = %handle.id, room = %room, "Joined room");
        }
        Ok(())
    }

    /// Removes a connection from a room. Idempotent.
    pub fn leave_room(&self, handle: &ConnectionHandle, room: &RoomKey) {
        if self.rooms.leave(room, handle.id) {
            debug!(conn_id = %handle.id, room = %room, "Left room");
        }
    }

    fn relay_typing(
        &self,
        handle: &ConnectionHandle,
        typing: TypingIndicator,
    ) -> Result<(), AppError> {
        if typing.user_id != handle.user_id {
            return Err(AppError::forbidden("Typing indicator must name the caller"));
        }
        if !self.rooms.is_member(&typing.room_id, handle.id) {
            return Err(AppError::forbidden(format!(
                "Join room {} before sending to it",
                typing.room_id
            )));
        }

        let room = typing.room_id.clone();
        self.broadcast_to_room(&room, &OutboundEvent::TypingIndicator(typing), Some(handle.id));
        Ok(())
    }

    async fn relay_message(
        &self,
        handle: &ConnectionHandle,
        payload: SendMessagePayload,
    ) -> Result<(), AppError> {
        if payload.sender != handle.user_id {
            return Err(AppError::forbidden("sender must be the connected user"));
        }
        if payload.sender == payload.recipient
            || payload.room_id != RoomKey::for_pair(payload.sender, payload.recipient)
        {
            return Err(AppError::invalid_input(
                "roomId does not match sender and recipient",
            ));
        }

        let view = self
            .conversations
            .post_message(
                &handle.context(),
                PostMessage {
                    sender: Some(payload.sender.to_string()),
                    recipient: Some(payload.recipient.to_string()),
                    content: Some(payload.content),
                },
            )
            .await?;

        let delivered = self.broadcast_to_room(
            &payload.room_id,
            &OutboundEvent::ReceiveMessage(view),
            Some(handle.id),
        );
        debug!(room = %payload.room_id, delivered, "Chat message relayed");
        Ok(())
    }

    /// Sends an event to every live connection of a user.
    ///
    /// Returns the number of connections the event was queued for; an
    /// offline user yields zero and the event is gone.
    pub fn send_to_user(&self, user_id: UserId, event: &OutboundEvent) -> usize {
        let connections = self.pool.user_connections(&user_id);
        if connections.is_empty() {
            debug!(user_id = %user_id, event = event.name(), "User offline, event skipped");
            return 0;
        }
        let Some(text) = encode(event) else {
            return 0;
        };
        self.fan_out(connections.iter().map(Arc::as_ref), &text)
    }

    /// Sends an event to every member of a room except `exclude`.
    pub fn broadcast_to_room(
        &self,
        room: &RoomKey,
        event: &OutboundEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let members: Vec<Arc<ConnectionHandle>> = self
            .rooms
            .members(room)
            .into_iter()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| self.pool.get(&id))
            .collect();
        if members.is_empty() {
            return 0;
        }
        let Some(text) = encode(event) else {
            return 0;
        };
        self.fan_out(members.iter().map(Arc::as_ref), &text)
    }

    /// Sends an event to every connection.
    pub fn broadcast_all(&self, event: &OutboundEvent) -> usize {
        let all = self.pool.all_connections();
        let Some(text) = encode(event) else {
            return 0;
        };
        self.fan_out(all.iter().map(Arc::as_ref), &text)
    }

    fn send_to_connection(&self, handle: &ConnectionHandle, event: &OutboundEvent) {
        if let Some(text) = encode(event) {
            self.fan_out(std::iter::once(handle), &text);
        }
    }

    fn fan_out<'a>(&self, targets: impl Iterator<Item = &'a ConnectionHandle>, text: &str) -> usize {
        let (mut sent, mut dropped) = (0u64, 0u64);
        for conn in targets {
            if conn.send_text(text.to_owned()) {
                sent += 1;
            } else {
                dropped += 1;
            }
        }
        self.metrics.messages_sent(sent);
        if dropped > 0 {
            self.metrics.events_dropped(dropped);
        }
        sent as usize
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let _guard = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let all = self.pool.all_connections();
        for conn in &all {
            if self.detach(conn.id).is_some() {
                self.presence.set_offline(conn.user_id);
            }
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Returns all connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.pool.connected_user_ids()
    }

    /// Online users with display details.
    pub fn online_users(&self) -> Vec<OnlineUser> {
        self.presence.all_online()
    }

    /// Checks if a user is currently connected.
    pub fn is_user_connected(&self, user_id: UserId) -> bool {
        self.pool.user_connection_count(&user_id) > 0
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> Vec<RoomKey> {
        self.rooms.rooms_of(conn_id).into_iter().collect()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.room_count()
    }
}

fn encode(event: &OutboundEvent) -> Option<String> {
    serde_json::to_string(event)
        .map_err(|e| error!(event = event.name(), error = %e, "Failed to serialize outbound event"))
        .ok()
}
