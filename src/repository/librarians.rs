//! Librarians repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{unique_violation_or, AppError, AppResult},
    models::member::{CreateLibrarian, Librarian},
};

#[derive(Clone)]
pub struct LibrariansRepository {
    pool: Pool<Postgres>,
}

impl LibrariansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Librarian> {
        sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Librarian>> {
        let librarians = sqlx::query_as::<_, Librarian>("SELECT * FROM librarians ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(librarians)
    }

    pub async fn create(&self, librarian: &CreateLibrarian) -> AppResult<Librarian> {
        sqlx::query_as::<_, Librarian>(
            "INSERT INTO librarians (identity_ref, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(&librarian.identity_ref)
        .bind(&librarian.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            unique_violation_or(e, |_| {
                AppError::Conflict(format!(
                    "A librarian is already linked to identity '{}'",
                    librarian.identity_ref
                ))
            })
        })
    }
}
