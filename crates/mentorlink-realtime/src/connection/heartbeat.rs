//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use mentorlink_core::config::RealtimeConfig;

use super::handle::{ConnectionHandle, Frame};

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Extra grace after a missed interval before the connection is closed
    pub ping_timeout: Duration,
}

impl HeartbeatConfig {
    /// Longest silence tolerated since the last pong.
    pub fn deadline(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Why a heartbeat loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatExit {
    /// The connection was closed elsewhere.
    Closed,
    /// No pong arrived within the deadline; the connection was closed.
    TimedOut,
}

/// Run heartbeat loop for a connection.
///
/// Sends a ping every interval and closes the handle once no pong has been
/// seen for `ping_interval + ping_timeout`. Closing the handle makes the
/// socket task exit, which runs the normal disconnect cleanup.
pub async fn run_heartbeat(
    handle: Arc<ConnectionHandle>,
    config: HeartbeatConfig,
) -> HeartbeatExit {
    let start = time::Instant::now() + config.ping_interval;
    let mut interval = time::interval_at(start, config.ping_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            _ = handle.closed() => break HeartbeatExit::Closed,
            _ = interval.tick() => {}
        }

        if !handle.is_alive() {
            break HeartbeatExit::Closed;
        }

        let silence = (Utc::now() - handle.last_pong())
            .to_std()
            .unwrap_or_default();
        if silence > config.deadline() {
            warn!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                silence_ms = silence.as_millis() as u64,
                "Heartbeat timeout, closing connection"
            );
            handle.close();
            break HeartbeatExit::TimedOut;
        }

        if !handle.send(Frame::Ping) && !handle.is_alive() {
            break HeartbeatExit::Closed;
        }
    };

    debug!(conn_id = %handle.id, ?exit, "Heartbeat loop ended");
    exit
}
