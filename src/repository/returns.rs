//! Returns repository
//!
//! A return, its penalty, the copy count and the checkout status are written
//! in one transaction. The checkout row is locked first so concurrent
//! submissions for the same checkout serialize; the unique constraints on
//! `returns.checkout_id` and `penalties.return_id` back this up.

use sqlx::{Pool, Postgres};

use crate::{
    error::{unique_violation_or, AppError, AppResult},
    models::{
        checkout::{Checkout, CheckoutRow, CheckoutStatus},
        penalty::{NewPenalty, Penalty},
        return_record::{NewReturn, ReturnOutcome, ReturnRecord},
    },
};

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the return recorded for a checkout, if any
    pub async fn get_by_checkout(&self, checkout_id: i32) -> AppResult<Option<ReturnRecord>> {
        let row = sqlx::query_as::<_, ReturnRecord>("SELECT * FROM returns WHERE checkout_id = $1")
            .bind(checkout_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Persist a return and its derived penalty atomically
    pub async fn record(
        &self,
        new_return: &NewReturn,
        penalty: Option<&NewPenalty>,
    ) -> AppResult<ReturnOutcome> {
        let mut tx = self.pool.begin().await?;

        let checkout: Checkout =
            sqlx::query_as::<_, CheckoutRow>("SELECT * FROM checkouts WHERE id = $1 FOR UPDATE")
                .bind(new_return.checkout_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Checkout with id {} not found",
                        new_return.checkout_id
                    ))
                })?
                .try_into()?;

        if checkout.is_returned() {
            return Err(AppError::DuplicateReturn {
                checkout_id: checkout.id,
            });
        }

        let return_record = sqlx::query_as::<_, ReturnRecord>(
            r#"
            INSERT INTO returns (checkout_id, librarian_id, return_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(new_return.checkout_id)
        .bind(new_return.librarian_id)
        .bind(new_return.return_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation_or(e, AppError::PersistenceConflict))?;

        let penalty = match penalty {
            Some(penalty) => Some(
                sqlx::query_as::<_, Penalty>(
                    r#"
                    INSERT INTO penalties (return_id, member_id, late_days, amount, reason, issued_date)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                    "#,
                )
                .bind(return_record.id)
                .bind(checkout.member_id)
                .bind(penalty.late_days)
                .bind(penalty.amount)
                .bind(&penalty.reason)
                .bind(penalty.issued_date)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| unique_violation_or(e, AppError::PersistenceConflict))?,
            ),
            None => None,
        };

        sqlx::query("UPDATE checkouts SET status = $1 WHERE id = $2")
            .bind(i16::from(CheckoutStatus::Returned))
            .bind(checkout.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE books SET available_copies = available_copies + 1
            WHERE id = $1 AND available_copies < total_copies
            "#,
        )
        .bind(checkout.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| unique_violation_or(e, AppError::PersistenceConflict))?;

        Ok(ReturnOutcome {
            return_record,
            penalty,
        })
    }
}
