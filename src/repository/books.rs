//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books, optionally restricted to one genre
    pub async fn list(&self, genre_id: Option<i32>) -> AppResult<Vec<Book>> {
        let books = match genre_id {
            Some(genre_id) => {
                sqlx::query_as::<_, Book>("SELECT * FROM books WHERE genre_id = $1 ORDER BY title")
                    .bind(genre_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(books)
    }

    /// Create a new book with every copy available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre_id, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre_id)
        .bind(book.total_copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Apply an update, keeping `available_copies <= total_copies`.
    ///
    /// The row stays locked until commit so a concurrent checkout or return
    /// cannot move `available_copies` between the read and the write.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let total = update.total_copies.unwrap_or(current.total_copies);
        let available = match update.available_copies {
            Some(available) => available,
            // Keep the number of copies on loan when only the total changes
            None => total - current.copies_on_loan(),
        };

        if available < 0 || available > total {
            return Err(AppError::Validation(format!(
                "available copies ({}) must be between 0 and total copies ({})",
                available, total
            )));
        }

        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, genre_id = $3, total_copies = $4, available_copies = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(update.title.as_ref().unwrap_or(&current.title))
        .bind(update.author.as_ref().unwrap_or(&current.author))
        .bind(update.genre_id.unwrap_or(current.genre_id))
        .bind(total)
        .bind(available)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row)
    }

    /// Delete a book that has no checkout history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_checkouts: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM checkouts WHERE book_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if has_checkouts {
            return Err(AppError::BusinessRule(format!(
                "Book {} has checkouts and cannot be deleted",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
