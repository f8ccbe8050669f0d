//! Repository layer for database operations

pub mod books;
pub mod checkouts;
pub mod genres;
pub mod librarians;
pub mod members;
pub mod memory;
pub mod penalties;
pub mod returns;
pub mod store;

use sqlx::{Pool, Postgres};

pub use memory::MemoryStore;
pub use store::CirculationStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub genres: genres::GenresRepository,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub librarians: librarians::LibrariansRepository,
    pub checkouts: checkouts::CheckoutsRepository,
    pub returns: returns::ReturnsRepository,
    pub penalties: penalties::PenaltiesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: genres::GenresRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            librarians: librarians::LibrariansRepository::new(pool.clone()),
            checkouts: checkouts::CheckoutsRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            penalties: penalties::PenaltiesRepository::new(pool.clone()),
            pool,
        }
    }
}
