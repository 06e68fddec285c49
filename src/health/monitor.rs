//! Periodic health checking.
//!
//! # Responsibilities
//! - Run the health service on a fixed interval
//! - Publish the latest report for readers (HTTP endpoint, CLI)

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::broadcast;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::health::service::{HealthCheckService, HealthReport};
use crate::health::types::HealthStatus;

/// Latest published report, readable without locking.
#[derive(Debug, Clone, Default)]
pub struct LatestReport {
    inner: Arc<ArcSwapOption<HealthReport>>,
}

impl LatestReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Option<Arc<HealthReport>> {
        self.inner.load_full()
    }

    pub fn publish(&self, report: HealthReport) {
        self.inner.store(Some(Arc::new(report)));
    }
}

pub struct HealthMonitor {
    service: Arc<HealthCheckService>,
    interval: Duration,
    latest: LatestReport,
    cancellation: CancellationToken,
}

impl HealthMonitor {
    /// `cancellation` is the parent of every check run; cancelling it stops
    /// in-flight checks and the loop.
    pub fn new(
        service: Arc<HealthCheckService>,
        interval: Duration,
        latest: LatestReport,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            service,
            interval,
            latest,
            cancellation,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            checks = self.service.registrations().len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    self.cancellation.cancel();
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = self.cancellation.cancelled() => {
                    tracing::info!("Health monitor cancelled, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.check_once() => {}
                        _ = shutdown.recv() => {
                            self.cancellation.cancel();
                            tracing::info!("Health monitor received shutdown signal during checks, exiting loop");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn check_once(&self) {
        let report = self
            .service
            .check_health_filtered(|_| true, &self.cancellation)
            .await;
        if self.cancellation.is_cancelled() {
            // Entries of an interrupted run only say "cancelled".
            return;
        }

        for (name, entry) in &report.entries {
            if entry.status != HealthStatus::Healthy {
                tracing::warn!(
                    check = %name,
                    status = %entry.status,
                    description = entry.description.as_deref().unwrap_or(""),
                    "Check not healthy"
                );
            }
        }

        self.latest.publish(report);
    }
}
