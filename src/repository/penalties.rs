//! Penalties repository (read side)

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::penalty::{MemberPenaltySummary, Penalty},
};

#[derive(Clone)]
pub struct PenaltiesRepository {
    pool: Pool<Postgres>,
}

impl PenaltiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Penalty attached to a return, if the return was late
    pub async fn get_by_return(&self, return_id: i32) -> AppResult<Option<Penalty>> {
        let penalty = sqlx::query_as::<_, Penalty>("SELECT * FROM penalties WHERE return_id = $1")
            .bind(return_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(penalty)
    }

    /// Penalties issued to a member, newest first
    pub async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<Penalty>> {
        let penalties = sqlx::query_as::<_, Penalty>(
            "SELECT * FROM penalties WHERE member_id = $1 ORDER BY issued_date DESC, id DESC",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(penalties)
    }

    /// Number and total amount of a member's penalties
    pub async fn summary_for_member(&self, member_id: i32) -> AppResult<MemberPenaltySummary> {
        let (penalty_count, total_amount): (i64, Option<Decimal>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(amount) FROM penalties WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MemberPenaltySummary {
            member_id,
            penalty_count,
            total_amount: total_amount.unwrap_or(Decimal::ZERO),
        })
    }
}
