//! Periodic reclamation of idle sessions and expired remember-me tokens.
//!
//! Expiry is always enforced lazily on access; the sweep only frees memory
//! held by records nobody has touched since they expired.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use crate::remember_me::RememberMeTokenManager;

use super::registry::SessionRegistry;

/// Counts of records removed by one sweep cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Idle-expired sessions removed.
    pub sessions: usize,
    /// Expired remember-me tokens removed.
    pub tokens: usize,
}

/// Runs the sweep on a fixed interval until shutdown is signalled.
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    registry: Arc<SessionRegistry>,
    remember_me: Arc<RememberMeTokenManager>,
    interval: Duration,
}

impl SessionSweeper {
    /// Creates a sweeper running every `interval`.
    pub fn new(
        registry: Arc<SessionRegistry>,
        remember_me: Arc<RememberMeTokenManager>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            remember_me,
            interval,
        }
    }

    /// Runs a single sweep cycle.
    pub fn run_once(&self) -> SweepReport {
        let report = SweepReport {
            sessions: self.registry.sweep_expired(),
            tokens: self.remember_me.sweep_expired(),
        };

        if report.sessions > 0 || report.tokens > 0 {
            info!(
                sessions = report.sessions,
                tokens = report.tokens,
                "Expired session state reclaimed"
            );
        } else {
            debug!("Sweep found nothing to reclaim");
        }

        report
    }

    /// Sweeps until the cancel signal flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Session sweeper started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Session sweeper received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.run_once();
                }
            }
        }

        info!("Session sweeper stopped");
    }
}
