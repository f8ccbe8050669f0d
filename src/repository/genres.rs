//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{unique_violation_or, AppError, AppResult},
    models::genre::{CreateGenre, Genre},
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    /// List all genres by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Create a genre; names are unique
    pub async fn create(&self, genre: &CreateGenre) -> AppResult<Genre> {
        let name = genre.normalized_name();
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                unique_violation_or(e, |_| {
                    AppError::Conflict(format!("Genre '{}' already exists", name))
                })
            })
    }

    /// Insert the genre unless one with this name exists. Returns true when inserted.
    pub async fn ensure_exists(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query("INSERT INTO genres (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete a genre that no book references
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE genre_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if book_count > 0 {
            return Err(AppError::BusinessRule(format!(
                "Genre {} is still used by {} book(s)",
                id, book_count
            )));
        }

        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre with id {} not found", id)));
        }
        Ok(())
    }
}
