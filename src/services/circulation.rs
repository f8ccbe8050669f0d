//! Checkout and return handling

use std::sync::Arc;

use chrono::Duration;
use validator::Validate;

use crate::{
    config::LoanConfig,
    error::{AppError, AppResult},
    models::{Checkout, CheckoutRequest, NewCheckout, NewReturn, ReturnOutcome, ReturnRecord},
    repository::store::CirculationStore,
};

use super::penalty_engine::PenaltyDerivationEngine;

#[derive(Clone)]
pub struct CirculationService {
    store: Arc<dyn CirculationStore>,
    engine: PenaltyDerivationEngine,
    loans: LoanConfig,
}

impl CirculationService {
    pub fn new(
        store: Arc<dyn CirculationStore>,
        engine: PenaltyDerivationEngine,
        loans: LoanConfig,
    ) -> Self {
        Self {
            store,
            engine,
            loans,
        }
    }

    pub fn engine(&self) -> &PenaltyDerivationEngine {
        &self.engine
    }

    /// Lend a book to a member
    pub async fn checkout_book(&self, request: CheckoutRequest) -> AppResult<Checkout> {
        request.validate()?;

        let due_date = match request.due_date {
            Some(due_date) => due_date,
            None => request
                .checkout_date
                .checked_add_signed(Duration::days(i64::from(self.loans.default_duration_days)))
                .ok_or_else(|| AppError::Validation("due date is out of range".to_string()))?,
        };

        let checkout = NewCheckout {
            book_id: request.book_id,
            member_id: request.member_id,
            librarian_id: request.librarian_id,
            checkout_date: request.checkout_date,
            due_date,
        };
        checkout.validate()?;

        let checkout = self.store.open_checkout(checkout).await?;
        tracing::info!(
            checkout_id = checkout.id,
            book_id = checkout.book_id,
            member_id = checkout.member_id,
            due_date = %checkout.due_date,
            "Book checked out"
        );
        Ok(checkout)
    }

    /// Record the return of a checkout, issuing a penalty when it is late.
    ///
    /// Never retries: a [`AppError::PersistenceConflict`] goes back to the
    /// caller, who should re-read the checkout state.
    pub async fn return_checkout(&self, request: NewReturn) -> AppResult<ReturnOutcome> {
        let checkout = self.store.get_checkout(request.checkout_id).await?;

        if checkout.is_returned() || self.store.find_return(checkout.id).await?.is_some() {
            tracing::warn!(checkout_id = checkout.id, "Rejected return of a returned checkout");
            return Err(AppError::DuplicateReturn {
                checkout_id: checkout.id,
            });
        }

        let penalty = self.engine.evaluate_return(&checkout, &request)?;

        let outcome = match self.store.record_return(request, penalty).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_retryable() {
                    tracing::warn!(
                        checkout_id = checkout.id,
                        error = %err,
                        "Concurrent return detected while recording"
                    );
                }
                return Err(err);
            }
        };

        match &outcome.penalty {
            Some(penalty) => tracing::info!(
                checkout_id = checkout.id,
                return_id = outcome.return_record.id,
                member_id = penalty.member_id,
                late_days = penalty.late_days,
                amount = %penalty.amount,
                "Late return recorded with penalty"
            ),
            None => tracing::info!(
                checkout_id = checkout.id,
                return_id = outcome.return_record.id,
                "Return recorded"
            ),
        }

        Ok(outcome)
    }

    pub async fn get_checkout(&self, checkout_id: i32) -> AppResult<Checkout> {
        self.store.get_checkout(checkout_id).await
    }

    /// Return recorded for a checkout together with its penalty, if any
    pub async fn get_return_for_checkout(&self, checkout_id: i32) -> AppResult<Option<ReturnOutcome>> {
        let Some(return_record) = self.store.find_return(checkout_id).await? else {
            return Ok(None);
        };
        let penalty = self.store.find_penalty(return_record.id).await?;
        Ok(Some(ReturnOutcome {
            return_record,
            penalty,
        }))
    }

    /// The return alone, without its penalty
    pub async fn find_return(&self, checkout_id: i32) -> AppResult<Option<ReturnRecord>> {
        self.store.find_return(checkout_id).await
    }
}
