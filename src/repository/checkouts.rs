//! Checkouts repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{foreign_key_violation_or, AppError, AppResult},
    models::checkout::{Checkout, CheckoutRow, CheckoutStatus, NewCheckout},
};

#[derive(Clone)]
pub struct CheckoutsRepository {
    pool: Pool<Postgres>,
}

impl CheckoutsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get checkout by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Checkout> {
        sqlx::query_as::<_, CheckoutRow>("SELECT * FROM checkouts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Checkout with id {} not found", id)))?
            .try_into()
    }

    /// Active checkouts of a member, oldest due date first
    pub async fn list_active_for_member(&self, member_id: i32) -> AppResult<Vec<Checkout>> {
        let rows = sqlx::query_as::<_, CheckoutRow>(
            "SELECT * FROM checkouts WHERE member_id = $1 AND status = $2 ORDER BY due_date",
        )
        .bind(member_id)
        .bind(i16::from(CheckoutStatus::Active))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Checkout::try_from).collect()
    }

    /// Create a checkout and take one copy off the shelf in the same transaction
    pub async fn open(&self, checkout: &NewCheckout) -> AppResult<Checkout> {
        let mut tx = self.pool.begin().await?;

        let member_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
                .bind(checkout.member_id)
                .fetch_one(&mut *tx)
                .await?;
        if !member_exists {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                checkout.member_id
            )));
        }

        let taken: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books SET available_copies = available_copies - 1
            WHERE id = $1 AND available_copies > 0
            RETURNING id
            "#,
        )
        .bind(checkout.book_id)
        .fetch_optional(&mut *tx)
        .await?;

        if taken.is_none() {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(checkout.book_id)
                .fetch_one(&mut *tx)
                .await?;

            return Err(if exists {
                AppError::BusinessRule(format!("No copy of book {} is available", checkout.book_id))
            } else {
                AppError::NotFound(format!("Book with id {} not found", checkout.book_id))
            });
        }

        let row = sqlx::query_as::<_, CheckoutRow>(
            r#"
            INSERT INTO checkouts (book_id, member_id, librarian_id, checkout_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(checkout.book_id)
        .bind(checkout.member_id)
        .bind(checkout.librarian_id)
        .bind(checkout.checkout_date)
        .bind(checkout.due_date)
        .bind(i16::from(CheckoutStatus::Active))
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| foreign_key_violation_or(err, AppError::NotFound))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Count active checkouts
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM checkouts WHERE status = $1")
            .bind(i16::from(CheckoutStatus::Active))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count active checkouts whose due date is before `today`
    pub async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM checkouts WHERE status = $1 AND due_date < $2",
        )
        .bind(i16::from(CheckoutStatus::Active))
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
