//! Bus metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Bus-level counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    connections_evicted: AtomicU64,
    heartbeat_timeouts: AtomicU64,
    messages_received: AtomicU64,
    messages_sent: AtomicU64,
    events_dropped: AtomicU64,
    inbound_errors: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection closed to make room for a newer one
    pub fn connection_evicted(&self) {
        self.connections_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection closed for missing pongs
    pub fn heartbeat_timeout(&self) {
        self.heartbeat_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound frame
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record frames queued for delivery
    pub fn messages_sent(&self, count: u64) {
        self.messages_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Record frames that could not be queued
    pub fn events_dropped(&self, count: u64) {
        self.events_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an inbound frame answered with an error
    pub fn inbound_error(&self) {
        self.inbound_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: opened,
            connections_closed: closed,
            connections_active: opened.saturating_sub(closed),
            connections_evicted: self.connections_evicted.load(Ordering::Relaxed),
            heartbeat_timeouts: self.heartbeat_timeouts.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            inbound_errors: self.inbound_errors.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_opened: u64,
    /// Connections unregistered
    pub connections_closed: u64,
    /// Currently registered connections
    pub connections_active: u64,
    /// Connections closed by the per-user limit
    pub connections_evicted: u64,
    /// Connections closed for missing pongs
    pub heartbeat_timeouts: u64,
    /// Inbound frames
    pub messages_received: u64,
    /// Outbound frames queued
    pub messages_sent: u64,
    /// Outbound frames dropped on full or closed buffers
    pub events_dropped: u64,
    /// Inbound frames answered with an error
    pub inbound_errors: u64,
}
