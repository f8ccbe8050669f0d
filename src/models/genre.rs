//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Book genre; names are unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Create genre request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGenre {
    #[validate(custom(function = "validate_genre_name"))]
    pub name: String,
}

/// The stored name is the trimmed one, so that is what gets measured
fn validate_genre_name(name: &str) -> Result<(), ValidationError> {
    let length = name.trim().chars().count();
    if length == 0 || length > 120 {
        return Err(ValidationError::new("length"));
    }
    Ok(())
}

impl CreateGenre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name with surrounding whitespace removed
    pub fn normalized_name(&self) -> &str {
        self.name.trim()
    }
}
