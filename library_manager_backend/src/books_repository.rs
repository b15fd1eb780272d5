pub use in_memory_books_repository::InMemoryBookRepository;

use crate::api::{Book, BookId};

mod in_memory_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("Book {0} not found")]
    NotFound(BookId),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Adds book to repository, returns the book with the id assigned to it
    async fn add_book(&self, book: Book) -> Result<Book, BookRepositoryError>;
    /// Replaces all fields of an existing book, returns the stored book
    async fn replace_book(&self, book_id: BookId, book: Book) -> Result<Book, BookRepositoryError>;
    /// Retrieves the book from repository
    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError>;
    /// Lists all books in the repository, in the order they were added
    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError>;
    /// Removes the book from repository
    async fn delete_book(&self, book_id: BookId) -> Result<(), BookRepositoryError>;
}
