use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{Book, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

/// Keeps books in a map ordered by id, ids are handed out from 1 upwards and never reused
pub struct InMemoryBookRepository {
    book_sequence_generator: AtomicI32,
    books: parking_lot::RwLock<BTreeMap<BookId, Book>>,
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self {
            book_sequence_generator: AtomicI32::new(1),
            books: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, book: Book) -> Result<Book, BookRepositoryError> {
        let id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed);
        let stored = Book {
            id: Some(id),
            ..book
        };
        self.books.write().insert(id, stored.clone());
        Ok(stored)
    }

    async fn replace_book(&self, book_id: BookId, book: Book) -> Result<Book, BookRepositoryError> {
        let mut locked_books = self.books.write();
        let current = locked_books
            .get_mut(&book_id)
            .ok_or(BookRepositoryError::NotFound(book_id))?;
        *current = Book {
            id: Some(book_id),
            ..book
        };
        Ok(current.clone())
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self.books.read().values().cloned().collect())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<(), BookRepositoryError> {
        self.books
            .write()
            .remove(&book_id)
            .map(|_| ())
            .ok_or(BookRepositoryError::NotFound(book_id))
    }
}
