//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book availability state, stored as an integer in the legacy schema
///
/// This is the only state machine in the system that cycles: a book goes
/// back to `Available` every time its loan is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum BookStatus {
    Available = 0,
    Loaned = 1,
}

impl From<i32> for BookStatus {
    fn from(v: i32) -> Self {
        match v {
            1 => BookStatus::Loaned,
            _ => BookStatus::Available,
        }
    }
}

impl From<BookStatus> for i32 {
    fn from(status: BookStatus) -> Self {
        status as i32
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    id: i32,
    title: String,
    author: String,
    isbn: String,
    estado: i32,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            status: BookStatus::from(row.estado),
        }
    }
}

/// Full book model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub status: BookStatus,
}

/// Create book request
///
/// New books always start as `Available`; the status column is never set
/// directly, it only moves through check-out and check-in.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10 to 17 characters"))]
    pub isbn: String,
}

/// Update book request (availability state is not editable)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10 to 17 characters"))]
    pub isbn: String,
}
