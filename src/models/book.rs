//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Book from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre_id: i32,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl Book {
    /// Number of copies currently out on loan
    pub fn copies_on_loan(&self) -> i32 {
        self.total_copies - self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Create book request; all copies start on the shelf
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    pub genre_id: i32,
    #[validate(range(min = 1))]
    pub total_copies: i32,
}

/// Update book request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_copy_counts"))]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub author: Option<String>,
    pub genre_id: Option<i32>,
    #[validate(range(min = 1))]
    pub total_copies: Option<i32>,
    #[validate(range(min = 0))]
    pub available_copies: Option<i32>,
}

fn validate_copy_counts(update: &UpdateBook) -> Result<(), ValidationError> {
    if let (Some(total), Some(available)) = (update.total_copies, update.available_copies) {
        if available > total {
            return Err(ValidationError::new("available_exceeds_total"));
        }
    }
    Ok(())
}
