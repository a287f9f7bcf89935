//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use mentorlink_auth::jwt::JwtDecoder;
use mentorlink_core::config::RealtimeConfig;
use mentorlink_service::ConversationService;

use crate::bridge::EventBridge;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::heartbeat::{HeartbeatConfig, HeartbeatExit, run_heartbeat};
use crate::connection::{ConnectionHandle, ConnectionManager};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::presence::PresenceTracker;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Event bridge (domain events → private channels).
    pub event_bridge: Arc<EventBridge>,
    /// Token check for the upgrade request.
    pub authenticator: WsAuthenticator,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    config: RealtimeConfig,
    shutdown: CancellationToken,
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        decoder: Arc<JwtDecoder>,
        conversations: Arc<ConversationService>,
    ) -> Self {
        let metrics = Arc::new(EngineMetrics::new());
        let presence = Arc::new(PresenceTracker::new());
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            presence.clone(),
            metrics.clone(),
            conversations,
        ));
        let event_bridge = Arc::new(EventBridge::new(connections.clone()));

        info!(
            max_connections_per_user = config.max_connections_per_user,
            ping_interval_seconds = config.ping_interval_seconds,
            "Real-time engine initialized"
        );

        Self {
            connections,
            presence,
            event_bridge,
            authenticator: WsAuthenticator::new(decoder),
            metrics,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Heartbeat timings derived from the configuration.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Spawns the keepalive loop for a connection.
    pub fn spawn_heartbeat(&self, handle: Arc<ConnectionHandle>) -> JoinHandle<()> {
        let config = self.heartbeat_config();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            if run_heartbeat(handle, config).await == HeartbeatExit::TimedOut {
                metrics.heartbeat_timeout();
            }
        })
    }

    /// Cancelled once [`shutdown`](Self::shutdown) runs; socket tasks select on it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Point-in-time counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown.cancel();
        self.connections.close_all();
        info!("Real-time engine shut down");
    }
}
