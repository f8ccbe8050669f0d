//! Catalog service: genres and books

use validator::Validate;

use crate::{
    error::AppResult,
    models::{Book, CreateBook, CreateGenre, Genre, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    /// Create a genre; duplicate names are a conflict
    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        genre.validate()?;
        let genre = self.repository.genres.create(&genre).await?;
        tracing::info!(genre_id = genre.id, name = %genre.name, "Genre created");
        Ok(genre)
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    /// Create the configured genres that do not exist yet. Returns how many were added.
    pub async fn seed_genres(&self, names: &[String]) -> AppResult<usize> {
        let mut created = 0;
        for name in names {
            let genre = CreateGenre::new(name.as_str());
            genre.validate()?;
            if self.repository.genres.ensure_exists(genre.normalized_name()).await? {
                created += 1;
            }
        }
        if created > 0 {
            tracing::info!(created, "Seeded default genres");
        }
        Ok(created)
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn list_books(&self, genre_id: Option<i32>) -> AppResult<Vec<Book>> {
        self.repository.books.list(genre_id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        // Verify genre exists
        self.repository.genres.get_by_id(book.genre_id).await?;
        let book = self.repository.books.create(&book).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book added to catalog");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        if let Some(genre_id) = update.genre_id {
            self.repository.genres.get_by_id(genre_id).await?;
        }
        self.repository.books.update(id, &update).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
