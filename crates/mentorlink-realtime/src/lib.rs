//! # mentorlink-realtime
//!
//! Real-time WebSocket bus for MentorLink. Provides:
//!
//! - WebSocket connection management with JWT authentication
//! - Per-user private channels fed by the coordination engines
//! - Two-party chat rooms with typing indicators and message relay
//! - Online/offline presence broadcast
//! - Ping/pong heartbeat with dead-connection eviction

pub mod bridge;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod room;
pub mod server;

pub use bridge::EventBridge;
pub use connection::manager::ConnectionManager;
pub use message::{InboundEvent, OutboundEvent};
pub use presence::tracker::PresenceTracker;
pub use server::RealtimeEngine;
