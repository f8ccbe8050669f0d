//! Checkout/return flows against the in-process store

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tokio_test::{assert_err, assert_ok};

use circulation_server::{
    config::{LoanConfig, PenaltyConfig},
    models::{CheckoutRequest, CreateBook, CreateMember, NewReturn},
    repository::{CirculationStore, MemoryStore},
    services::{circulation::CirculationService, PenaltyDerivationEngine},
    AppError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service(store: &MemoryStore) -> CirculationService {
    let engine = PenaltyDerivationEngine::new(&PenaltyConfig {
        per_day_rate: dec!(1.00),
    })
    .unwrap();
    CirculationService::new(Arc::new(store.clone()), engine, LoanConfig::default())
}

async fn add_book(store: &MemoryStore, copies: i32) -> i32 {
    store
        .add_book(&CreateBook {
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            genre_id: 1,
            total_copies: copies,
        })
        .await
        .id
}

async fn add_member(store: &MemoryStore, identity_ref: &str) -> i32 {
    store
        .add_member(&CreateMember {
            identity_ref: identity_ref.to_string(),
            name: "Genly Ai".to_string(),
            email: None,
            phone: None,
        })
        .await
        .id
}

async fn checkout(
    service: &CirculationService,
    book_id: i32,
    member_id: i32,
    due: NaiveDate,
) -> i32 {
    service
        .checkout_book(CheckoutRequest {
            book_id,
            member_id,
            librarian_id: Some(1),
            checkout_date: date(2024, 1, 1),
            due_date: Some(due),
        })
        .await
        .unwrap()
        .id
}

fn return_on(checkout_id: i32, return_date: NaiveDate) -> NewReturn {
    NewReturn {
        checkout_id,
        return_date,
        librarian_id: Some(1),
    }
}

#[tokio::test]
async fn test_late_return_creates_one_penalty() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 2).await;
    let member_id = add_member(&store, "member-a").await;
    let checkout_id = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 1);

    let outcome = service
        .return_checkout(return_on(checkout_id, date(2024, 1, 20)))
        .await
        .unwrap();

    let penalty = outcome.penalty.clone().expect("late return must carry a penalty");
    assert_eq!(penalty.return_id, outcome.return_record.id);
    assert_eq!(penalty.member_id, member_id);
    assert_eq!(penalty.amount, dec!(5.00));
    assert_eq!(penalty.reason, "late return");

    assert_eq!(store.penalties().await.len(), 1);
    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 2);
    assert!(service.get_checkout(checkout_id).await.unwrap().is_returned());

    let stored = service.get_return_for_checkout(checkout_id).await.unwrap().unwrap();
    assert_eq!(stored, outcome);
}

#[tokio::test]
async fn test_return_on_due_date_has_no_penalty() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 1).await;
    let member_id = add_member(&store, "member-a").await;
    let checkout_id = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    let outcome = service
        .return_checkout(return_on(checkout_id, date(2024, 1, 15)))
        .await
        .unwrap();

    assert_eq!(outcome.penalty, None);
    assert!(!outcome.decision().penalty_created);
    assert!(store.penalties().await.is_empty());
}

#[tokio::test]
async fn test_return_before_checkout_date_is_rejected_and_nothing_stored() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 1).await;
    let member_id = add_member(&store, "member-a").await;
    let checkout_id = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    let result = service
        .return_checkout(return_on(checkout_id, date(2023, 12, 31)))
        .await;
    assert!(matches!(result, Err(AppError::InvalidDateRange { .. })));

    assert!(store.returns().await.is_empty());
    assert!(!service.get_checkout(checkout_id).await.unwrap().is_returned());
    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 0);
}

#[tokio::test]
async fn test_retried_return_is_rejected() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 1).await;
    let member_id = add_member(&store, "member-a").await;
    let checkout_id = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    assert_ok!(
        service
            .return_checkout(return_on(checkout_id, date(2024, 1, 18)))
            .await
    );
    let err = assert_err!(
        service
            .return_checkout(return_on(checkout_id, date(2024, 1, 18)))
            .await
    );
    assert!(matches!(err, AppError::DuplicateReturn { .. }));

    assert_eq!(store.returns().await.len(), 1);
    assert_eq!(store.penalties().await.len(), 1);
    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_returns_store_at_most_one_penalty() {
    let store = MemoryStore::new();
    let service = Arc::new(service(&store));
    let book_id = add_book(&store, 1).await;
    let member_id = add_member(&store, "member-a").await;
    let checkout_id = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .return_checkout(return_on(checkout_id, date(2024, 1, 25)))
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
    assert_eq!(store.returns().await.len(), 1);
    let penalties = store.penalties().await;
    assert_eq!(penalties.len(), 1);
    assert_eq!(penalties[0].amount, dec!(10));
    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 1);
}

#[tokio::test]
async fn test_returns_of_different_checkouts_are_independent() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 2).await;
    let member_id = add_member(&store, "member-a").await;
    let first = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;
    let second = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    let (a, b) = tokio::join!(
        service.return_checkout(return_on(first, date(2024, 1, 17))),
        service.return_checkout(return_on(second, date(2024, 1, 14))),
    );

    assert_eq!(a.unwrap().penalty.map(|p| p.amount), Some(dec!(2)));
    assert_eq!(b.unwrap().penalty, None);
    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 2);
}

#[tokio::test]
async fn test_checkout_requires_available_copy() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 1).await;
    let first = add_member(&store, "member-a").await;
    let second = add_member(&store, "member-b").await;
    checkout(&service, book_id, first, date(2024, 1, 15)).await;

    let result = service
        .checkout_book(CheckoutRequest {
            book_id,
            member_id: second,
            librarian_id: None,
            checkout_date: date(2024, 1, 2),
            due_date: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::BusinessRule(_))));
}

#[tokio::test]
async fn test_store_rejects_second_return_directly() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 1).await;
    let member_id = add_member(&store, "member-a").await;
    let checkout_id = checkout(&service, book_id, member_id, date(2024, 1, 15)).await;

    assert_ok!(store.record_return(return_on(checkout_id, date(2024, 1, 10)), None).await);
    let err = assert_err!(store.record_return(return_on(checkout_id, date(2024, 1, 10)), None).await);
    assert!(matches!(err, AppError::DuplicateReturn { .. }));
}

#[tokio::test]
async fn test_checkout_for_unknown_member_is_not_found() {
    let store = MemoryStore::new();
    let service = service(&store);
    let book_id = add_book(&store, 1).await;

    let result = service
        .checkout_book(CheckoutRequest {
            book_id,
            member_id: 999,
            librarian_id: None,
            checkout_date: date(2024, 1, 1),
            due_date: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    // No copy was taken off the shelf
    assert_eq!(store.get_book(book_id).await.unwrap().available_copies, 1);
}
