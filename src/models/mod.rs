//! Data models for library circulation

pub mod book;
pub mod checkout;
pub mod genre;
pub mod member;
pub mod penalty;
pub mod return_record;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use checkout::{Checkout, CheckoutRequest, CheckoutStatus, NewCheckout};
pub use genre::{CreateGenre, Genre};
pub use member::{CreateLibrarian, CreateMember, Librarian, Member};
pub use penalty::{
    MemberPenaltySummary, NewPenalty, Penalty, PenaltyDecision, LATE_RETURN_REASON,
    MAX_PENALTY_AMOUNT,
};
pub use return_record::{NewReturn, ReturnOutcome, ReturnRecord};
