//! Return model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::penalty::{Penalty, PenaltyDecision};

/// Record that a checkout's book was brought back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReturnRecord {
    pub id: i32,
    pub checkout_id: i32,
    pub librarian_id: Option<i32>,
    pub return_date: NaiveDate,
}

/// Return submission for a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReturn {
    pub checkout_id: i32,
    pub return_date: NaiveDate,
    #[serde(default)]
    pub librarian_id: Option<i32>,
}

/// Persisted return together with the penalty it produced, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnOutcome {
    pub return_record: ReturnRecord,
    pub penalty: Option<Penalty>,
}

impl ReturnOutcome {
    /// Boundary view of the outcome
    pub fn decision(&self) -> PenaltyDecision {
        match &self.penalty {
            Some(penalty) => PenaltyDecision::created(penalty.amount, penalty.reason.clone()),
            None => PenaltyDecision::none(),
        }
    }
}
