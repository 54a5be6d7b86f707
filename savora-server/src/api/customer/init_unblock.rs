use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use savora_core::entities::UserRole;
use savora_core::unblock;
use savora_core::utils::clock::now_utc;
use serde::Serialize;

use super::{CustomerApiError, PenaltyPaymentResponse, penalty_to_response};
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// Static transfer instructions the customer needs to actually pay:
/// where the money goes and what to quote.
#[derive(Debug, Serialize)]
pub(super) struct BankInstructions {
    pub beneficiary_name: String,
    pub iban: String,
    pub bank_name: String,
    pub reference: String,
    pub amount_cents: i32,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub(super) struct InitUnblockResponse {
    pub payment: PenaltyPaymentResponse,
    pub bank_instructions: BankInstructions,
}

/// `POST /me/self-unblock/bank-transfer/init` — open a penalty payment
/// attempt, cooldown permitting, and return the transfer instructions.
pub(super) async fn init_unblock(
    state: State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, CustomerApiError> {
    if auth.role != UserRole::Customer {
        return Err(CustomerApiError::Forbidden);
    }

    let payment = unblock::initiate(&state.db, &state.config.unblock, auth.id, now_utc()).await?;

    let bank = &state.config.bank;
    let bank_instructions = BankInstructions {
        beneficiary_name: bank.beneficiary_name.clone(),
        iban: bank.iban.clone(),
        bank_name: bank.bank_name.clone(),
        reference: payment.reference.clone(),
        amount_cents: payment.amount_cents,
        currency: payment.currency.clone(),
    };

    Ok((
        StatusCode::CREATED,
        Json(InitUnblockResponse {
            payment: penalty_to_response(&payment),
            bank_instructions,
        }),
    ))
}
