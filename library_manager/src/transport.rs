use reqwest::{Method, StatusCode};

use crate::api::{Book, BookId};

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        #[source]
        source: reqwest_middleware::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to decode response of {method} {url}: {source}")]
    Decode {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Status code returned by the server, if the request got that far
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations on the books resource of the remote store.
/// None of them retries; a failure is returned to the caller as is
#[async_trait::async_trait]
pub trait BooksTransport: Send + Sync {
    /// Fetches every book, in the order chosen by the server
    async fn list_books(&self) -> Result<Vec<Book>, TransportError>;
    /// Stores a new book, returns it with the id assigned by the server
    async fn add_book(&self, book: &Book) -> Result<Book, TransportError>;
    /// Replaces all fields of the book with the given id, returns the book echoed by the server
    async fn update_book(&self, book_id: BookId, book: &Book) -> Result<Book, TransportError>;
    async fn delete_book(&self, book_id: BookId) -> Result<(), TransportError>;
}
