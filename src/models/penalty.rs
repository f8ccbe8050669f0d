//! Penalty model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reason recorded on every late-return penalty
pub const LATE_RETURN_REASON: &str = "late return";

/// Largest amount the `penalties.amount` column (`NUMERIC(10, 2)`) holds
pub const MAX_PENALTY_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Penalty owned by exactly one return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Penalty {
    pub id: i32,
    pub return_id: i32,
    pub member_id: i32,
    pub late_days: i32,
    pub amount: Decimal,
    pub reason: String,
    pub issued_date: NaiveDate,
}

/// Penalty derived for a return that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPenalty {
    pub late_days: i32,
    pub amount: Decimal,
    pub reason: String,
    pub issued_date: NaiveDate,
}

/// `{penaltyCreated, amount?, reason?}` as handed back to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyDecision {
    pub penalty_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PenaltyDecision {
    pub fn created(amount: Decimal, reason: impl Into<String>) -> Self {
        Self {
            penalty_created: true,
            amount: Some(amount),
            reason: Some(reason.into()),
        }
    }

    pub fn none() -> Self {
        Self {
            penalty_created: false,
            amount: None,
            reason: None,
        }
    }
}

impl From<Option<&NewPenalty>> for PenaltyDecision {
    fn from(penalty: Option<&NewPenalty>) -> Self {
        match penalty {
            Some(p) => PenaltyDecision::created(p.amount, p.reason.clone()),
            None => PenaltyDecision::none(),
        }
    }
}

/// Penalty totals for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPenaltySummary {
    pub member_id: i32,
    pub penalty_count: i64,
    pub total_amount: Decimal,
}
