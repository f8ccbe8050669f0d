//! Member and librarian models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Library member; `identity_ref` points at the external identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i32,
    pub identity_ref: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 255))]
    pub identity_ref: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

/// Librarian, kept for auditing who handled checkouts and returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Librarian {
    pub id: i32,
    pub identity_ref: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLibrarian {
    #[validate(length(min = 1, max = 255))]
    pub identity_ref: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}
