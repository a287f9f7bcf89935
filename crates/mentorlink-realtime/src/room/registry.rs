//! Room registry: two-party chat rooms and their member connections.

use std::collections::HashSet;

use dashmap::DashMap;

use mentorlink_core::types::RoomKey;

use super::membership::MembershipTracker;
use crate::connection::handle::ConnectionId;

/// Registry of rooms with at least one member.
///
/// Rooms exist only while joined; the last leave removes the entry.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room key → member connections.
    rooms: DashMap<RoomKey, HashSet<ConnectionId>>,
    /// Reverse index for disconnect cleanup.
    memberships: MembershipTracker,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room. Returns `false` if it was already a member.
    pub fn join(&self, room: RoomKey, conn_id: ConnectionId) -> bool {
        self.rooms.entry(room.clone()).or_default().insert(conn_id);
        self.memberships.add(conn_id, room)
    }

    /// Removes a connection from a room. Returns `false` if it was not a member.
    pub fn leave(&self, room: &RoomKey, conn_id: ConnectionId) -> bool {
        self.detach(room, conn_id);
        self.memberships.remove(conn_id, room)
    }

    /// Removes a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) -> Vec<RoomKey> {
        let rooms: Vec<RoomKey> = self.memberships.remove_all(conn_id).into_iter().collect();
        for room in &rooms {
            self.detach(room, conn_id);
        }
        rooms
    }

    fn detach(&self, room: &RoomKey, conn_id: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn_id);
        }
        self.rooms.remove_if(room, |_, members| members.is_empty());
    }

    /// Member connections of a room.
    pub fn members(&self, room: &RoomKey) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|entry| entry.value().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection has joined a room.
    pub fn is_member(&self, room: &RoomKey, conn_id: ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|entry| entry.value().contains(&conn_id))
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<RoomKey> {
        self.memberships.rooms(conn_id)
    }

    /// Number of rooms a connection has joined.
    pub fn membership_count(&self, conn_id: ConnectionId) -> usize {
        self.memberships.count(conn_id)
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use mentorlink_core::types::UserId;

    #[test]
    fn test_join_is_idempotent() {
        let registry = RoomRegistry::new();
        let room = RoomKey::for_pair(UserId::new(), UserId::new());
        let conn = Uuid::new_v4();

        assert!(registry.join(room.clone(), conn));
        assert!(!registry.join(room.clone(), conn));
        assert_eq!(registry.members(&room), vec![conn]);
        assert_eq!(registry.membership_count(conn), 1);
    }

    #[test]
    fn test_last_leave_drops_room() {
        let registry = RoomRegistry::new();
        let room = RoomKey::for_pair(UserId::new(), UserId::new());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        registry.join(room.clone(), a);
        registry.join(room.clone(), b);
        assert!(registry.leave(&room, a));
        assert!(!registry.leave(&room, a));
        assert_eq!(registry.room_count(), 1);

        registry.leave(&room, b);
        assert_eq!(registry.room_count(), 0);
        assert!(!registry.is_member(&room, b));
    }

    #[test]
    fn test_leave_all_cleans_every_room() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();
        let r1 = RoomKey::for_pair(UserId::new(), UserId::new());
        let r2 = RoomKey::for_pair(UserId::new(), UserId::new());

        registry.join(r1.clone(), conn);
        registry.join(r2.clone(), conn);
        registry.join(r2.clone(), other);

        let left = registry.leave_all(conn);
        assert_eq!(left.len(), 2);
        assert!(registry.rooms_of(conn).is_empty());
        assert_eq!(registry.members(&r2), vec![other]);
        assert!(registry.members(&r1).is_empty());
    }
}
