//! Members repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{unique_violation_or, AppError, AppResult},
    models::member::{CreateMember, Member},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Find the member linked to an external identity
    pub async fn get_by_identity(&self, identity_ref: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE identity_ref = $1")
            .bind(identity_ref)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (identity_ref, name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&member.identity_ref)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            unique_violation_or(e, |_| {
                AppError::Conflict(format!(
                    "A member is already linked to identity '{}'",
                    member.identity_ref
                ))
            })
        })
    }
}
