//! Late-return penalty derivation
//!
//! A returned checkout is late when its return date falls after the due
//! date. Each late day costs the configured per-day rate. The engine only
//! decides; persisting the return and its penalty as one unit is the job of
//! the [`CirculationStore`](crate::repository::store::CirculationStore).

use rust_decimal::Decimal;

use crate::{
    config::PenaltyConfig,
    error::{AppError, AppResult},
    models::{
        Checkout, NewPenalty, NewReturn, PenaltyDecision, LATE_RETURN_REASON,
        MAX_PENALTY_AMOUNT,
    },
};

#[derive(Debug, Clone)]
pub struct PenaltyDerivationEngine {
    per_day_rate: Decimal,
}

impl PenaltyDerivationEngine {
    pub fn new(config: &PenaltyConfig) -> AppResult<Self> {
        config.check_rate().map_err(AppError::Validation)?;
        Ok(Self {
            per_day_rate: config.per_day_rate,
        })
    }

    pub fn per_day_rate(&self) -> Decimal {
        self.per_day_rate
    }

    /// Decide whether returning `checkout` as described by `candidate` owes a penalty
    pub fn evaluate_return(
        &self,
        checkout: &Checkout,
        candidate: &NewReturn,
    ) -> AppResult<Option<NewPenalty>> {
        if candidate.checkout_id != checkout.id {
            return Err(AppError::Validation(format!(
                "return references checkout {} but checkout {} was supplied",
                candidate.checkout_id, checkout.id
            )));
        }

        if checkout.is_returned() {
            return Err(AppError::DuplicateReturn {
                checkout_id: checkout.id,
            });
        }

        // The checkout date is the lower bound; an early return is not an error
        if candidate.return_date < checkout.checkout_date {
            return Err(AppError::InvalidDateRange {
                checkout_date: checkout.checkout_date,
                return_date: candidate.return_date,
            });
        }

        let late_days = (candidate.return_date - checkout.due_date).num_days().max(0);
        if late_days == 0 {
            return Ok(None);
        }

        let late_days = i32::try_from(late_days).map_err(|_| {
            AppError::Validation(format!("{} late days is out of range", late_days))
        })?;

        // Capped at what the amount column can hold
        let amount = self
            .per_day_rate
            .checked_mul(Decimal::from(late_days))
            .map_or(MAX_PENALTY_AMOUNT, |amount| amount.min(MAX_PENALTY_AMOUNT));

        Ok(Some(NewPenalty {
            late_days,
            amount,
            reason: LATE_RETURN_REASON.to_string(),
            issued_date: candidate.return_date,
        }))
    }

    /// Same rule as [`evaluate_return`](Self::evaluate_return), shaped for the calling layer
    pub fn decide(&self, checkout: &Checkout, candidate: &NewReturn) -> AppResult<PenaltyDecision> {
        let penalty = self.evaluate_return(checkout, candidate)?;
        Ok(PenaltyDecision::from(penalty.as_ref()))
    }
}
