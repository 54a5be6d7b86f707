//! Expiry sweeper.
//!
//! The sweeper is the time-driven half of the reservation lifecycle:
//! - `reserved` orders past `reserved_until` become `expired`, returning
//!   their unit to the offer's stock;
//! - `paid` orders whose offer's `pickup_end` plus a grace period has
//!   passed become `no_show`, each minting one active strike.
//!
//! Both batches are applied inside a single transaction, but every order's
//! transition carries its own conditional guard: a candidate that was paid
//! (or already swept) between the select and the update simply matches zero
//! rows and is skipped. Running a pass twice is therefore harmless.

use crate::entities::offer::Offer;
use crate::entities::order::{FindOverduePickups, FindOverdueReservations, Order};
use crate::entities::strike::Strike;
use crate::framework::DatabaseProcessor;
use crate::utils::clock::now_utc;
use kanau::processor::Processor;
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{error, info};

/// Sweeper tunables, loaded from the server config.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Disable the background task entirely (test execution mode). The
    /// manual tick endpoint still works.
    pub enabled: bool,
    /// Time between passes. The first pass runs immediately on startup.
    pub interval: std::time::Duration,
    /// Upper bound per candidate batch in one pass.
    pub batch_size: i64,
    /// How long after `pickup_end` a paid order may still be collected.
    pub grace: time::Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: std::time::Duration::from_secs(30),
            batch_size: 200,
            grace: time::Duration::minutes(30),
        }
    }
}

/// Counts of transitions actually applied by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SweepSummary {
    pub expired_orders: u64,
    pub no_show_orders: u64,
}

impl SweepSummary {
    pub fn is_empty(&self) -> bool {
        self.expired_orders == 0 && self.no_show_orders == 0
    }
}

/// The instant before which a paid order's pickup window counts as missed.
pub fn no_show_cutoff(
    now: time::PrimitiveDateTime,
    grace: time::Duration,
) -> time::PrimitiveDateTime {
    now - grace
}

/// Periodic task driving the time-based lifecycle transitions.
pub struct ExpirySweeper {
    pool: PgPool,
    config: SweeperConfig,
    shutdown_rx: watch::Receiver<bool>,
}

impl ExpirySweeper {
    pub fn new(pool: PgPool, config: SweeperConfig, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            pool,
            config,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signaled. Storage errors are logged and the
    /// timer continues; the batch that failed is retried on the next tick.
    pub async fn run(mut self) {
        if !self.config.enabled {
            info!("ExpirySweeper disabled by config");
            return;
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            grace_minutes = self.config.grace.whole_minutes(),
            "ExpirySweeper started"
        );

        // The first tick of a tokio interval completes immediately, which
        // doubles as the startup pass.
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("ExpirySweeper received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    match sweep_once(&self.pool, &self.config).await {
                        Ok(summary) if !summary.is_empty() => {
                            info!(
                                expired_orders = summary.expired_orders,
                                no_show_orders = summary.no_show_orders,
                                grace_minutes = self.config.grace.whole_minutes(),
                                "Sweep pass applied transitions"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!(error = %e, "Sweep pass failed, retrying next tick");
                        }
                    }
                }
            }
        }

        info!("ExpirySweeper shutdown complete");
    }
}

/// One sweep pass at the current wall-clock time. Also the entry point for
/// the admin tick endpoint.
pub async fn sweep_once(pool: &PgPool, config: &SweeperConfig) -> Result<SweepSummary, sqlx::Error> {
    sweep_at(pool, config, now_utc()).await
}

/// One sweep pass at an injected instant.
pub async fn sweep_at(
    pool: &PgPool,
    config: &SweeperConfig,
    now: time::PrimitiveDateTime,
) -> Result<SweepSummary, sqlx::Error> {
    let processor = DatabaseProcessor { pool: pool.clone() };

    let overdue_reservations = processor
        .process(FindOverdueReservations {
            now,
            limit: config.batch_size,
        })
        .await?;

    let overdue_pickups = processor
        .process(FindOverduePickups {
            cutoff: no_show_cutoff(now, config.grace),
            limit: config.batch_size,
        })
        .await?;

    if overdue_reservations.is_empty() && overdue_pickups.is_empty() {
        return Ok(SweepSummary::default());
    }

    let mut summary = SweepSummary::default();
    let mut tx = pool.begin().await?;

    for candidate in &overdue_reservations {
        // Guard re-checks status and deadline at commit time; a payment
        // that landed in between wins and the candidate is skipped.
        if Order::expire_tx(&mut tx, candidate.id, now).await? == 1 {
            Offer::restock_unit_tx(&mut tx, candidate.offer_id).await?;
            summary.expired_orders += 1;
        }
    }

    for candidate in &overdue_pickups {
        if Order::mark_no_show_tx(&mut tx, candidate.id).await? == 1 {
            Strike::record_no_show_tx(&mut tx, candidate.customer_user_id).await?;
            summary.no_show_orders += 1;
        }
    }

    tx.commit().await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn cutoff_subtracts_grace_from_now() {
        let now = datetime!(2026-08-26 12:00:00);
        assert_eq!(
            no_show_cutoff(now, time::Duration::minutes(30)),
            datetime!(2026-08-26 11:30:00)
        );
        assert_eq!(
            no_show_cutoff(now, time::Duration::minutes(0)),
            now
        );
    }

    #[test]
    fn summary_is_empty_only_when_both_counts_are_zero() {
        assert!(SweepSummary::default().is_empty());
        assert!(
            !SweepSummary {
                expired_orders: 1,
                no_show_orders: 0
            }
            .is_empty()
        );
        assert!(
            !SweepSummary {
                expired_orders: 0,
                no_show_orders: 3
            }
            .is_empty()
        );
    }

    #[test]
    fn default_config_matches_documented_tunables() {
        let config = SweeperConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval, std::time::Duration::from_secs(30));
        assert_eq!(config.batch_size, 200);
        assert_eq!(config.grace, time::Duration::minutes(30));
    }
}
