//! Self-unblock flow.
//!
//! A customer blocked by repeated no-shows pays a fixed penalty fee by
//! manual bank transfer: `initiate` opens an attempt (cooldown-gated),
//! `mark_proof` records that the customer claims to have transferred, and
//! `confirm` is the admin's verification step that lifts the block by
//! reducing the customer's active no-show strikes.
//!
//! `confirm` deliberately checks payment expiry before the idempotency
//! check, and its post-race re-classification maps states slightly
//! differently than the first pass (a rejected payment lands in the state
//! catch-all there). Both orderings are load-bearing, replicated from the
//! flow this service is contractually compatible with, and pinned by the
//! unit tests below.

use crate::entities::penalty_payment::{
    GetLastConfirmedPenaltyPayment, GetPenaltyPaymentById, InsertPenaltyPayment, MarkPenaltyProof,
    PenaltyPayment, PenaltyStatus,
};
use crate::entities::strike::Strike;
use crate::entities::user::UserUnblockState;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Self-unblock tunables, loaded from the server config.
#[derive(Debug, Clone)]
pub struct UnblockConfig {
    /// Minimum days between successive confirmed self-unblocks.
    pub cooldown_days: i64,
    /// Fixed penalty fee in minor units.
    pub amount_cents: i32,
    pub currency: String,
    /// Days until an open attempt expires.
    pub payment_expiry_days: i64,
    /// How many of the most recent active no-show strikes survive a
    /// confirmation.
    pub keep_active_strikes: usize,
}

impl Default for UnblockConfig {
    fn default() -> Self {
        Self {
            cooldown_days: 10,
            amount_cents: 500,
            currency: "ALL".to_owned(),
            payment_expiry_days: 3,
            keep_active_strikes: 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum UnblockError {
    /// Absent, or owned by someone else; the two are indistinguishable on
    /// purpose so non-owners cannot probe for existence.
    #[error("penalty payment not found")]
    NotFound,
    #[error("self-unblock cooldown active until {ends_at}")]
    CooldownActive { ends_at: time::PrimitiveDateTime },
    #[error("cannot confirm an expired penalty payment")]
    ConfirmNotAllowedExpired,
    #[error("cannot confirm a payment in status {status:?}")]
    ConfirmNotAllowed { status: PenaltyStatus },
    #[error("cannot confirm before transfer proof is submitted")]
    ConfirmRequiresProof,
    #[error("payment is not awaiting verification (current status {status:?})")]
    ConfirmNotAllowedState { status: PenaltyStatus },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a (possibly idempotent) confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmOutcome {
    pub payment_id: Uuid,
    pub status: PenaltyStatus,
    pub bank_txn_ref: Option<String>,
    pub last_self_unblock_at: Option<time::PrimitiveDateTime>,
}

// ---------------------------------------------------------------------------
// Pure decision logic
// ---------------------------------------------------------------------------

/// When a customer's cooldown window ends, anchored on the confirmed
/// attempt's creation time.
pub fn cooldown_ends_at(
    confirmed_created_at: time::PrimitiveDateTime,
    cooldown_days: i64,
) -> time::PrimitiveDateTime {
    confirmed_created_at + time::Duration::days(cooldown_days)
}

/// First-pass gate for `confirm`. Expiry is checked before anything else,
/// including idempotency: a confirmed payment past its `expires_at` is
/// forced toward `expired` rather than returning the stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmGate {
    /// Past `expires_at`: persist `expired` and fail.
    ForceExpire,
    /// Already confirmed and not past expiry: return the stored result.
    AlreadyConfirmed,
    /// Rejected or expired by status: refuse.
    NotAllowed(PenaltyStatus),
    /// Proof was never submitted: refuse.
    RequiresProof,
    /// Awaiting verification: attempt the conditional update.
    Proceed,
}

fn classify(
    status: PenaltyStatus,
    expires_at: time::PrimitiveDateTime,
    now: time::PrimitiveDateTime,
) -> ConfirmGate {
    if expires_at < now {
        return ConfirmGate::ForceExpire;
    }
    match status {
        PenaltyStatus::Confirmed => ConfirmGate::AlreadyConfirmed,
        PenaltyStatus::Rejected | PenaltyStatus::Expired => ConfirmGate::NotAllowed(status),
        PenaltyStatus::Initiated => ConfirmGate::RequiresProof,
        PenaltyStatus::PendingVerification => ConfirmGate::Proceed,
    }
}

/// Post-race gate: the conditional update matched zero rows, so another
/// actor moved the row between our read and write. The mapping differs
/// from [`classify`]: rejection falls into the state catch-all here, and
/// expiry is judged by status rather than by clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RaceGate {
    AlreadyConfirmed,
    RequiresProof,
    Expired,
    OtherState(PenaltyStatus),
}

fn reclassify(status: PenaltyStatus) -> RaceGate {
    match status {
        PenaltyStatus::Confirmed => RaceGate::AlreadyConfirmed,
        PenaltyStatus::Initiated => RaceGate::RequiresProof,
        PenaltyStatus::Expired => RaceGate::Expired,
        other => RaceGate::OtherState(other),
    }
}

/// The ids that stay active after a confirmation: the first `keep` of a
/// newest-first list.
fn keep_most_recent(ids: &[Uuid], keep: usize) -> Vec<Uuid> {
    ids[..ids.len().min(keep)].to_vec()
}

/// Human-readable transfer reference, quoted by the customer in their bank
/// transfer. `UB-` plus six uppercase alphanumerics.
pub fn penalty_reference() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("UB-{suffix}")
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Open a new self-unblock attempt for a customer.
pub async fn initiate(
    pool: &PgPool,
    config: &UnblockConfig,
    user_id: Uuid,
    now: time::PrimitiveDateTime,
) -> Result<PenaltyPayment, UnblockError> {
    let processor = DatabaseProcessor { pool: pool.clone() };

    if let Some(last) = processor
        .process(GetLastConfirmedPenaltyPayment { user_id })
        .await?
    {
        let ends_at = cooldown_ends_at(last.created_at, config.cooldown_days);
        if ends_at > now {
            return Err(UnblockError::CooldownActive { ends_at });
        }
    }

    let payment = processor
        .process(InsertPenaltyPayment {
            user_id,
            amount_cents: config.amount_cents,
            currency: config.currency.clone(),
            reference: penalty_reference(),
            expires_at: now + time::Duration::days(config.payment_expiry_days),
        })
        .await?;

    Ok(payment)
}

/// Record that the owning customer claims to have made the transfer.
pub async fn mark_proof(
    pool: &PgPool,
    payment_id: Uuid,
    user_id: Uuid,
) -> Result<PenaltyPayment, UnblockError> {
    let processor = DatabaseProcessor { pool: pool.clone() };

    let existing = processor
        .process(GetPenaltyPaymentById { payment_id })
        .await?
        .ok_or(UnblockError::NotFound)?;
    if existing.user_id != user_id {
        return Err(UnblockError::NotFound);
    }

    processor
        .process(MarkPenaltyProof { payment_id })
        .await?
        .ok_or(UnblockError::NotFound)
}

/// Admin verification of a bank transfer. On success the customer's active
/// no-show strikes are reduced to the configured keep count and their
/// `last_self_unblock_at` is stamped, all in one transaction with the
/// confirming conditional update. Safe to retry: a repeat call returns the
/// stored result without re-applying side effects.
pub async fn confirm(
    pool: &PgPool,
    config: &UnblockConfig,
    payment_id: Uuid,
    bank_txn_ref: &str,
    now: time::PrimitiveDateTime,
) -> Result<ConfirmOutcome, UnblockError> {
    let mut tx = pool.begin().await?;

    let existing = PenaltyPayment::get_by_id_tx(&mut tx, payment_id)
        .await?
        .ok_or(UnblockError::NotFound)?;

    match classify(existing.status, existing.expires_at, now) {
        ConfirmGate::ForceExpire => {
            if existing.status != PenaltyStatus::Expired {
                PenaltyPayment::force_expire_tx(&mut tx, payment_id).await?;
            }
            // The forced status must outlive the refusal.
            tx.commit().await?;
            Err(UnblockError::ConfirmNotAllowedExpired)
        }
        ConfirmGate::AlreadyConfirmed => {
            let user = UserUnblockState::get_tx(&mut tx, existing.user_id).await?;
            Ok(ConfirmOutcome {
                payment_id: existing.id,
                status: existing.status,
                bank_txn_ref: existing.bank_txn_ref,
                last_self_unblock_at: user.and_then(|u| u.last_self_unblock_at),
            })
        }
        ConfirmGate::NotAllowed(status) => Err(UnblockError::ConfirmNotAllowed { status }),
        ConfirmGate::RequiresProof => Err(UnblockError::ConfirmRequiresProof),
        ConfirmGate::Proceed => {
            if PenaltyPayment::confirm_tx(&mut tx, payment_id, bank_txn_ref).await? != 1 {
                let again = PenaltyPayment::get_by_id_tx(&mut tx, payment_id)
                    .await?
                    .ok_or(UnblockError::NotFound)?;
                return match reclassify(again.status) {
                    RaceGate::AlreadyConfirmed => {
                        let user = UserUnblockState::get_tx(&mut tx, again.user_id).await?;
                        Ok(ConfirmOutcome {
                            payment_id: again.id,
                            status: again.status,
                            bank_txn_ref: again.bank_txn_ref,
                            last_self_unblock_at: user.and_then(|u| u.last_self_unblock_at),
                        })
                    }
                    RaceGate::RequiresProof => Err(UnblockError::ConfirmRequiresProof),
                    RaceGate::Expired => Err(UnblockError::ConfirmNotAllowedExpired),
                    RaceGate::OtherState(status) => {
                        Err(UnblockError::ConfirmNotAllowedState { status })
                    }
                };
            }

            let active = Strike::active_no_show_ids_newest_first_tx(&mut tx, existing.user_id).await?;
            let keep_ids = keep_most_recent(&active, config.keep_active_strikes);
            Strike::retain_active_no_show_tx(&mut tx, existing.user_id, &keep_ids).await?;
            UserUnblockState::set_last_self_unblock_tx(&mut tx, existing.user_id, now).await?;

            tx.commit().await?;
            Ok(ConfirmOutcome {
                payment_id,
                status: PenaltyStatus::Confirmed,
                bank_txn_ref: Some(bank_txn_ref.to_owned()),
                last_self_unblock_at: Some(now),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: time::PrimitiveDateTime = datetime!(2026-08-26 12:00:00);
    const FUTURE: time::PrimitiveDateTime = datetime!(2026-08-29 12:00:00);
    const PAST: time::PrimitiveDateTime = datetime!(2026-08-25 12:00:00);

    #[test]
    fn classify_checks_expiry_before_everything_else() {
        // A confirmed payment past its deadline is forced to expire
        // instead of hitting the idempotency branch.
        assert_eq!(
            classify(PenaltyStatus::Confirmed, PAST, NOW),
            ConfirmGate::ForceExpire
        );
        assert_eq!(
            classify(PenaltyStatus::PendingVerification, PAST, NOW),
            ConfirmGate::ForceExpire
        );
        assert_eq!(
            classify(PenaltyStatus::Initiated, PAST, NOW),
            ConfirmGate::ForceExpire
        );
    }

    #[test]
    fn classify_unexpired_states() {
        assert_eq!(
            classify(PenaltyStatus::Confirmed, FUTURE, NOW),
            ConfirmGate::AlreadyConfirmed
        );
        assert_eq!(
            classify(PenaltyStatus::Rejected, FUTURE, NOW),
            ConfirmGate::NotAllowed(PenaltyStatus::Rejected)
        );
        assert_eq!(
            classify(PenaltyStatus::Expired, FUTURE, NOW),
            ConfirmGate::NotAllowed(PenaltyStatus::Expired)
        );
        assert_eq!(
            classify(PenaltyStatus::Initiated, FUTURE, NOW),
            ConfirmGate::RequiresProof
        );
        assert_eq!(
            classify(PenaltyStatus::PendingVerification, FUTURE, NOW),
            ConfirmGate::Proceed
        );
    }

    #[test]
    fn reclassify_maps_rejection_to_the_state_catch_all() {
        // Asymmetry with the first pass: after a lost race, a rejected
        // payment reports the generic state error, not NotAllowed.
        assert_eq!(
            reclassify(PenaltyStatus::Rejected),
            RaceGate::OtherState(PenaltyStatus::Rejected)
        );
        assert_eq!(
            reclassify(PenaltyStatus::Confirmed),
            RaceGate::AlreadyConfirmed
        );
        assert_eq!(
            reclassify(PenaltyStatus::Initiated),
            RaceGate::RequiresProof
        );
        assert_eq!(reclassify(PenaltyStatus::Expired), RaceGate::Expired);
        assert_eq!(
            reclassify(PenaltyStatus::PendingVerification),
            RaceGate::OtherState(PenaltyStatus::PendingVerification)
        );
    }

    #[test]
    fn cooldown_window_is_anchored_on_creation_time() {
        let created = datetime!(2026-08-20 09:00:00);
        let ends = cooldown_ends_at(created, 10);
        assert_eq!(ends, datetime!(2026-08-30 09:00:00));
        // 6 days in: still cooling down.
        assert!(ends > datetime!(2026-08-26 09:00:00));
        // 10 days and a second later: free to initiate.
        assert!(ends < datetime!(2026-08-30 09:00:01));
    }

    #[test]
    fn keep_most_recent_respects_the_cutoff() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        assert_eq!(keep_most_recent(&ids, 2), ids[..2].to_vec());
        assert_eq!(keep_most_recent(&ids, 5), ids);
        assert_eq!(keep_most_recent(&ids, 9), ids);
        assert_eq!(keep_most_recent(&ids[..1], 2), ids[..1].to_vec());
        assert!(keep_most_recent(&[], 2).is_empty());
        assert!(keep_most_recent(&ids, 0).is_empty());
    }

    #[test]
    fn penalty_reference_shape() {
        for _ in 0..32 {
            let reference = penalty_reference();
            assert_eq!(reference.len(), 9);
            assert!(reference.starts_with("UB-"));
            assert!(
                reference[3..]
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn default_config_matches_documented_tunables() {
        let config = UnblockConfig::default();
        assert_eq!(config.cooldown_days, 10);
        assert_eq!(config.amount_cents, 500);
        assert_eq!(config.currency, "ALL");
        assert_eq!(config.payment_expiry_days, 3);
        assert_eq!(config.keep_active_strikes, 2);
    }
}
