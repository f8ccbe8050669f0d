//! In-process circulation store
//!
//! Keeps members, books, checkouts, returns and penalties behind one async mutex, so
//! each operation sees and writes a consistent snapshot. Enforces the same
//! uniqueness rules as the PostgreSQL schema.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{
        Book, Checkout, CheckoutStatus, CreateBook, CreateMember, Member, NewCheckout, NewPenalty,
        NewReturn, Penalty, ReturnOutcome, ReturnRecord,
    },
};

use super::store::CirculationStore;

#[derive(Default)]
struct Tables {
    last_id: i32,
    members: HashMap<i32, Member>,
    books: HashMap<i32, Book>,
    checkouts: HashMap<i32, Checkout>,
    returns: HashMap<i32, ReturnRecord>,
    // checkout_id -> return id
    return_by_checkout: HashMap<i32, i32>,
    penalties: HashMap<i32, Penalty>,
    // return_id -> penalty id
    penalty_by_return: HashMap<i32, i32>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, member: &CreateMember) -> Member {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let member = Member {
            id,
            identity_ref: member.identity_ref.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
        };
        tables.members.insert(id, member.clone());
        member
    }

    /// Add a book with all copies available
    pub async fn add_book(&self, book: &CreateBook) -> Book {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let book = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            genre_id: book.genre_id,
            total_copies: book.total_copies,
            available_copies: book.total_copies,
        };
        tables.books.insert(id, book.clone());
        book
    }

    pub async fn get_book(&self, book_id: i32) -> AppResult<Book> {
        self.tables
            .lock()
            .await
            .books
            .get(&book_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    /// All stored returns, ordered by id
    pub async fn returns(&self) -> Vec<ReturnRecord> {
        let tables = self.tables.lock().await;
        let mut returns: Vec<ReturnRecord> = tables.returns.values().cloned().collect();
        returns.sort_by_key(|r| r.id);
        returns
    }

    /// All stored penalties, ordered by id
    pub async fn penalties(&self) -> Vec<Penalty> {
        let tables = self.tables.lock().await;
        let mut penalties: Vec<Penalty> = tables.penalties.values().cloned().collect();
        penalties.sort_by_key(|p| p.id);
        penalties
    }
}

#[async_trait]
impl CirculationStore for MemoryStore {
    async fn get_checkout(&self, checkout_id: i32) -> AppResult<Checkout> {
        self.tables
            .lock()
            .await
            .checkouts
            .get(&checkout_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Checkout with id {} not found", checkout_id)))
    }

    async fn find_return(&self, checkout_id: i32) -> AppResult<Option<ReturnRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .return_by_checkout
            .get(&checkout_id)
            .and_then(|id| tables.returns.get(id))
            .cloned())
    }

    async fn find_penalty(&self, return_id: i32) -> AppResult<Option<Penalty>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .penalty_by_return
            .get(&return_id)
            .and_then(|id| tables.penalties.get(id))
            .cloned())
    }

    async fn open_checkout(&self, checkout: NewCheckout) -> AppResult<Checkout> {
        let mut tables = self.tables.lock().await;

        if !tables.members.contains_key(&checkout.member_id) {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                checkout.member_id
            )));
        }

        let book = tables.books.get_mut(&checkout.book_id).ok_or_else(|| {
            AppError::NotFound(format!("Book with id {} not found", checkout.book_id))
        })?;
        if !book.is_available() {
            return Err(AppError::BusinessRule(format!(
                "No copy of book {} is available",
                checkout.book_id
            )));
        }
        book.available_copies -= 1;

        let id = tables.next_id();
        let stored = Checkout {
            id,
            book_id: checkout.book_id,
            member_id: checkout.member_id,
            librarian_id: checkout.librarian_id,
            checkout_date: checkout.checkout_date,
            due_date: checkout.due_date,
            status: CheckoutStatus::Active,
        };
        tables.checkouts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn record_return(
        &self,
        new_return: NewReturn,
        penalty: Option<NewPenalty>,
    ) -> AppResult<ReturnOutcome> {
        let mut tables = self.tables.lock().await;

        let checkout = tables
            .checkouts
            .get(&new_return.checkout_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Checkout with id {} not found",
                    new_return.checkout_id
                ))
            })?;

        if checkout.is_returned() {
            return Err(AppError::DuplicateReturn {
                checkout_id: checkout.id,
            });
        }
        if tables.return_by_checkout.contains_key(&checkout.id) {
            return Err(AppError::PersistenceConflict(
                "returns_checkout_id_key".to_string(),
            ));
        }

        let return_id = tables.next_id();
        let return_record = ReturnRecord {
            id: return_id,
            checkout_id: checkout.id,
            librarian_id: new_return.librarian_id,
            return_date: new_return.return_date,
        };

        let penalty = penalty.map(|p| Penalty {
            id: tables.next_id(),
            return_id,
            member_id: checkout.member_id,
            late_days: p.late_days,
            amount: p.amount,
            reason: p.reason,
            issued_date: p.issued_date,
        });

        // All checks passed; apply every write together
        tables.returns.insert(return_id, return_record.clone());
        tables.return_by_checkout.insert(checkout.id, return_id);
        if let Some(p) = &penalty {
            tables.penalty_by_return.insert(return_id, p.id);
            tables.penalties.insert(p.id, p.clone());
        }
        if let Some(c) = tables.checkouts.get_mut(&checkout.id) {
            c.status = CheckoutStatus::Returned;
        }
        if let Some(book) = tables.books.get_mut(&checkout.book_id) {
            if book.available_copies < book.total_copies {
                book.available_copies += 1;
            }
        }

        Ok(ReturnOutcome {
            return_record,
            penalty,
        })
    }
}
