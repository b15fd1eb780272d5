use serde::{Deserialize, Serialize};

pub type BookId = i32;

/// Path of the books resource, relative to the API base url
pub const BOOKS_PATH: &str = "/books";

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// A book record.
/// `id` is present only once the backend has stored the book, it is never generated on the client
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
}

impl Book {
    /// Copy of the book without its id, the shape sent when creating
    pub fn without_id(&self) -> Book {
        Book {
            id: None,
            ..self.clone()
        }
    }
}
