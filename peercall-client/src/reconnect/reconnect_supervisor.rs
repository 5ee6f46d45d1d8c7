use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reconnect once `at` is reached.
    Retry { at: Instant },
    /// The drop was requested locally; stay offline.
    Stop,
}

/// Decides when the relay connection is re-established.
///
/// Retries forever at a fixed interval. A drop preceded by
/// [`expect_disconnect`](ReconnectSupervisor::expect_disconnect) is not
/// retried.
#[derive(Debug)]
pub struct ReconnectSupervisor {
    interval: Duration,
    expected_disconnect: bool,
    retry_at: Option<Instant>,
    attempts: u32,
}

impl ReconnectSupervisor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            expected_disconnect: false,
            retry_at: None,
            attempts: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Consecutive reconnect attempts scheduled since the last successful
    /// connection.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    /// The next disconnect is ours (leave or shutdown).
    pub fn expect_disconnect(&mut self) {
        self.expected_disconnect = true;
        self.retry_at = None;
    }

    pub fn on_connected(&mut self) {
        if self.attempts > 0 {
            info!("Relay connection restored after {} attempt(s)", self.attempts);
        }
        self.attempts = 0;
        self.retry_at = None;
        self.expected_disconnect = false;
    }

    pub fn on_disconnected(&mut self, now: Instant) -> ReconnectDecision {
        if std::mem::take(&mut self.expected_disconnect) {
            debug!("Relay disconnected as requested");
            self.retry_at = None;
            return ReconnectDecision::Stop;
        }

        warn!("Relay connection lost unexpectedly");
        self.schedule(now)
    }

    /// A connection attempt failed. Always retried: nothing asked for it.
    pub fn on_connect_failed(&mut self, now: Instant) -> ReconnectDecision {
        self.expected_disconnect = false;
        self.schedule(now)
    }

    /// Clears and reports the pending retry if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.retry_at {
            Some(at) if at <= now => {
                self.retry_at = None;
                true
            }
            _ => false,
        }
    }

    fn schedule(&mut self, now: Instant) -> ReconnectDecision {
        let at = now + self.interval;
        self.attempts += 1;
        self.retry_at = Some(at);
        info!(
            "Reconnecting in {:?} (attempt {})",
            self.interval, self.attempts
        );
        ReconnectDecision::Retry { at }
    }
}
