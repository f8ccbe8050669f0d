//! Storage seam used by the circulation service

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Checkout, NewCheckout, NewPenalty, NewReturn, Penalty, ReturnOutcome, ReturnRecord},
};

use super::Repository;

/// Persistence required by checkout and return handling.
///
/// Implementations guarantee at most one return per checkout and at most
/// one penalty per return, and write a return together with its penalty
/// atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CirculationStore: Send + Sync {
    async fn get_checkout(&self, checkout_id: i32) -> AppResult<Checkout>;

    async fn find_return(&self, checkout_id: i32) -> AppResult<Option<ReturnRecord>>;

    async fn find_penalty(&self, return_id: i32) -> AppResult<Option<Penalty>>;

    /// Store a checkout, taking one available copy of the book
    async fn open_checkout(&self, checkout: NewCheckout) -> AppResult<Checkout>;

    /// Store a return and its penalty, put the copy back and close the checkout
    async fn record_return(
        &self,
        new_return: NewReturn,
        penalty: Option<NewPenalty>,
    ) -> AppResult<ReturnOutcome>;
}

#[async_trait]
impl CirculationStore for Repository {
    async fn get_checkout(&self, checkout_id: i32) -> AppResult<Checkout> {
        self.checkouts.get_by_id(checkout_id).await
    }

    async fn find_return(&self, checkout_id: i32) -> AppResult<Option<ReturnRecord>> {
        self.returns.get_by_checkout(checkout_id).await
    }

    async fn find_penalty(&self, return_id: i32) -> AppResult<Option<Penalty>> {
        self.penalties.get_by_return(return_id).await
    }

    async fn open_checkout(&self, checkout: NewCheckout) -> AppResult<Checkout> {
        self.checkouts.open(&checkout).await
    }

    async fn record_return(
        &self,
        new_return: NewReturn,
        penalty: Option<NewPenalty>,
    ) -> AppResult<ReturnOutcome> {
        self.returns.record(&new_return, penalty.as_ref()).await
    }
}
