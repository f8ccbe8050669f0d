//! PostgreSQL store tests
//!
//! Need a migrated database: DATABASE_URL=postgres://... cargo test -- --ignored

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;

use circulation_server::{
    config::AppConfig,
    models::{CheckoutRequest, CreateBook, CreateGenre, CreateMember, NewReturn, UpdateBook},
    repository::Repository,
    AppError, AppState,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn state() -> AppState {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    AppState::new(AppConfig::default(), Repository::new(pool)).unwrap()
}

/// Creates a genre, a single-copy book and a member with unique names
async fn fixtures(state: &AppState, tag: &str) -> (i32, i32) {
    let services = &state.services;
    let genre = services
        .catalog
        .create_genre(CreateGenre::new(format!("genre-{tag}")))
        .await
        .unwrap();
    let book = services
        .catalog
        .create_book(CreateBook {
            title: format!("book-{tag}"),
            author: "Test Author".to_string(),
            genre_id: genre.id,
            total_copies: 1,
        })
        .await
        .unwrap();
    let member = services
        .members
        .create_member(CreateMember {
            identity_ref: format!("identity-{tag}"),
            name: "Test Member".to_string(),
            email: None,
            phone: None,
        })
        .await
        .unwrap();
    (book.id, member.id)
}

fn unique_tag() -> String {
    format!("{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore]
async fn test_late_return_persists_penalty() {
    let state = state().await;
    let (book_id, member_id) = fixtures(&state, &unique_tag()).await;
    let circulation = &state.services.circulation;

    let checkout = circulation
        .checkout_book(CheckoutRequest {
            book_id,
            member_id,
            librarian_id: None,
            checkout_date: date(2024, 1, 1),
            due_date: Some(date(2024, 1, 15)),
        })
        .await
        .unwrap();

    let outcome = circulation
        .return_checkout(NewReturn {
            checkout_id: checkout.id,
            return_date: date(2024, 1, 20),
            librarian_id: None,
        })
        .await
        .unwrap();

    let penalty = state
        .services
        .penalties
        .get_for_return(outcome.return_record.id)
        .await
        .unwrap()
        .expect("penalty must be stored");
    assert_eq!(penalty.amount, dec!(5.00));

    let summary = state.services.penalties.member_summary(member_id).await.unwrap();
    assert_eq!(summary.penalty_count, 1);
    assert_eq!(summary.total_amount, dec!(5.00));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_returns_store_one_penalty() {
    let state = Arc::new(state().await);
    let (book_id, member_id) = fixtures(&state, &unique_tag()).await;

    let checkout = state
        .services
        .circulation
        .checkout_book(CheckoutRequest {
            book_id,
            member_id,
            librarian_id: None,
            checkout_date: date(2024, 1, 1),
            due_date: Some(date(2024, 1, 15)),
        })
        .await
        .unwrap();
    let checkout_id = checkout.id;

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state
                    .services
                    .circulation
                    .return_checkout(NewReturn {
                        checkout_id,
                        return_date: date(2024, 1, 22),
                        librarian_id: None,
                    })
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::DuplicateReturn { .. }) | Err(AppError::PersistenceConflict(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(succeeded, 1);

    let penalties = state.services.penalties.list_for_member(member_id).await.unwrap();
    assert_eq!(penalties.len(), 1);

    let book = state.services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_genre_is_a_conflict() {
    let state = state().await;
    let name = format!("genre-{}", unique_tag());

    state
        .services
        .catalog
        .create_genre(CreateGenre::new(name.clone()))
        .await
        .unwrap();
    let err = state
        .services
        .catalog
        .create_genre(CreateGenre::new(name))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore]
async fn test_checkout_for_unknown_member_is_not_found() {
    let state = state().await;
    let (book_id, _) = fixtures(&state, &unique_tag()).await;

    let err = state
        .services
        .circulation
        .checkout_book(CheckoutRequest {
            book_id,
            member_id: i32::MAX,
            librarian_id: None,
            checkout_date: date(2024, 1, 1),
            due_date: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let book = state.services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_book_updates_do_not_lose_concurrent_checkouts() {
    let state = Arc::new(state().await);
    let tag = unique_tag();
    let (_, member_id) = fixtures(&state, &tag).await;
    let genre = state
        .services
        .catalog
        .create_genre(CreateGenre::new(format!("genre-many-{tag}")))
        .await
        .unwrap();
    let book = state
        .services
        .catalog
        .create_book(CreateBook {
            title: format!("book-many-{tag}"),
            author: "Test Author".to_string(),
            genre_id: genre.id,
            total_copies: 40,
        })
        .await
        .unwrap();
    let book_id = book.id;

    let checkouts: Vec<_> = (0..16)
        .map(|_| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state
                    .services
                    .circulation
                    .checkout_book(CheckoutRequest {
                        book_id,
                        member_id,
                        librarian_id: None,
                        checkout_date: date(2024, 1, 1),
                        due_date: None,
                    })
                    .await
            })
        })
        .collect();
    let updates: Vec<_> = (0..16)
        .map(|i| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state
                    .services
                    .catalog
                    .update_book(
                        book_id,
                        UpdateBook {
                            title: Some(format!("edition {i}")),
                            ..UpdateBook::default()
                        },
                    )
                    .await
            })
        })
        .collect();

    let mut checked_out = 0;
    for handle in checkouts {
        if handle.await.unwrap().is_ok() {
            checked_out += 1;
        }
    }
    for handle in updates {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(checked_out, 16);

    let book = state.services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.total_copies, 40);
    assert_eq!(book.available_copies, 40 - checked_out);
    assert_eq!(book.copies_on_loan(), checked_out);
}
