//! Checkout (borrow) model and lifecycle

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// Checkout lifecycle. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum CheckoutStatus {
    Active = 0,
    Returned = 1,
}

impl TryFrom<i16> for CheckoutStatus {
    type Error = AppError;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(CheckoutStatus::Active),
            1 => Ok(CheckoutStatus::Returned),
            other => Err(AppError::Internal(format!("unknown checkout status {}", other))),
        }
    }
}

impl From<CheckoutStatus> for i16 {
    fn from(s: CheckoutStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CheckoutStatus::Active => "active",
            CheckoutStatus::Returned => "returned",
        };
        write!(f, "{}", label)
    }
}

/// Checkout row as stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct CheckoutRow {
    id: i32,
    book_id: i32,
    member_id: i32,
    librarian_id: Option<i32>,
    checkout_date: NaiveDate,
    due_date: NaiveDate,
    status: i16,
}

impl TryFrom<CheckoutRow> for Checkout {
    type Error = AppError;

    fn try_from(row: CheckoutRow) -> Result<Self, Self::Error> {
        let status = CheckoutStatus::try_from(row.status).map_err(|err| {
            tracing::error!(checkout_id = row.id, status = row.status, "Unreadable checkout row");
            err
        })?;
        Ok(Checkout {
            id: row.id,
            book_id: row.book_id,
            member_id: row.member_id,
            librarian_id: row.librarian_id,
            checkout_date: row.checkout_date,
            due_date: row.due_date,
            status,
        })
    }
}

/// A book borrowed by a member with an agreed due date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub librarian_id: Option<i32>,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: CheckoutStatus,
}

impl Checkout {
    pub fn is_returned(&self) -> bool {
        self.status == CheckoutStatus::Returned
    }

    /// Whether the checkout is still out past its due date on `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_returned() && today > self.due_date
    }
}

/// Checkout request coming from the calling layer.
/// A missing `due_date` is filled in from the configured loan duration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_request_dates"))]
pub struct CheckoutRequest {
    #[validate(range(min = 1))]
    pub book_id: i32,
    #[validate(range(min = 1))]
    pub member_id: i32,
    pub librarian_id: Option<i32>,
    pub checkout_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

fn validate_request_dates(request: &CheckoutRequest) -> Result<(), ValidationError> {
    match request.due_date {
        Some(due) if due <= request.checkout_date => {
            Err(ValidationError::new("due_date_not_after_checkout_date"))
        }
        _ => Ok(()),
    }
}

/// Fully resolved checkout ready to be stored
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_new_checkout_dates"))]
pub struct NewCheckout {
    #[validate(range(min = 1))]
    pub book_id: i32,
    #[validate(range(min = 1))]
    pub member_id: i32,
    pub librarian_id: Option<i32>,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
}

fn validate_new_checkout_dates(checkout: &NewCheckout) -> Result<(), ValidationError> {
    if checkout.due_date <= checkout.checkout_date {
        return Err(ValidationError::new("due_date_not_after_checkout_date"));
    }
    Ok(())
}
