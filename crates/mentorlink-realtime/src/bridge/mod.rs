//! Domain event delivery onto the bus.

pub mod event_bridge;

pub use event_bridge::EventBridge;
