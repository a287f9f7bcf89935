//! Membership tracking: which rooms each connection has joined.

use std::collections::HashSet;

use dashmap::DashMap;

use mentorlink_core::types::RoomKey;

use crate::connection::handle::ConnectionId;

/// Connection → joined rooms (reverse index of the registry).
#[derive(Debug, Default)]
pub struct MembershipTracker {
    conn_to_rooms: DashMap<ConnectionId, HashSet<RoomKey>>,
}

impl MembershipTracker {
    /// Creates a new membership tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a membership. Returns `false` if it already existed.
    pub fn add(&self, conn_id: ConnectionId, room: RoomKey) -> bool {
        self.conn_to_rooms.entry(conn_id).or_default().insert(room)
    }

    /// Removes a membership.
    pub fn remove(&self, conn_id: ConnectionId, room: &RoomKey) -> bool {
        let removed = self
            .conn_to_rooms
            .get_mut(&conn_id)
            .map(|mut rooms| rooms.remove(room))
            .unwrap_or(false);
        self.conn_to_rooms
            .remove_if(&conn_id, |_, rooms| rooms.is_empty());
        removed
    }

    /// Rooms a connection has joined.
    pub fn rooms(&self, conn_id: ConnectionId) -> HashSet<RoomKey> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns the number of rooms a connection has joined.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes every membership of a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<RoomKey> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
