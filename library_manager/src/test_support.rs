use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::{Method, StatusCode};

use crate::api::{Book, BookId};
use crate::transport::{BooksTransport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    List,
    Add(Book),
    Update(BookId, Book),
    Delete(BookId),
}

struct State {
    books: Vec<Book>,
    next_id: BookId,
    calls: Vec<TransportCall>,
    failing_list: bool,
    failing_mutations: bool,
}

/// Transport keeping books in memory and recording every call made to it
pub struct RecordingTransport {
    state: Mutex<State>,
}

impl RecordingTransport {
    pub fn with_books(books: Vec<Book>) -> Arc<Self> {
        let next_id = books.iter().filter_map(|book| book.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            state: Mutex::new(State {
                books,
                next_id,
                calls: vec![],
                failing_list: false,
                failing_mutations: false,
            }),
        })
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::List))
            .count()
    }

    /// Calls other than listing
    pub fn mutations(&self) -> Vec<TransportCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, TransportCall::List))
            .collect()
    }

    pub fn books(&self) -> Vec<Book> {
        self.state.lock().books.clone()
    }

    pub fn fail_list(&self, failing: bool) {
        self.state.lock().failing_list = failing;
    }

    pub fn fail_mutations(&self, failing: bool) {
        self.state.lock().failing_mutations = failing;
    }

    fn record(&self, call: TransportCall) -> parking_lot::MutexGuard<'_, State> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state
    }
}

pub fn server_error(method: Method, book_id: Option<BookId>) -> TransportError {
    TransportError::Status {
        method,
        url: match book_id {
            Some(book_id) => format!("http://books.test/books/{}", book_id),
            None => "http://books.test/books".to_string(),
        },
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "Network error".to_string(),
    }
}

fn not_found(method: Method, book_id: BookId) -> TransportError {
    TransportError::Status {
        method,
        url: format!("http://books.test/books/{}", book_id),
        status: StatusCode::NOT_FOUND,
        body: String::new(),
    }
}

#[async_trait::async_trait]
impl BooksTransport for RecordingTransport {
    async fn list_books(&self) -> Result<Vec<Book>, TransportError> {
        // answered with the books as they were when the request was made
        let (failing, books) = {
            let state = self.record(TransportCall::List);
            (state.failing_list, state.books.clone())
        };
        // suspend once, like a real round trip would
        tokio::task::yield_now().await;
        if failing {
            return Err(server_error(Method::GET, None));
        }
        Ok(books)
    }

    async fn add_book(&self, book: &Book) -> Result<Book, TransportError> {
        let mut state = self.record(TransportCall::Add(book.clone()));
        if state.failing_mutations {
            return Err(server_error(Method::POST, None));
        }
        let stored = Book {
            id: Some(state.next_id),
            ..book.clone()
        };
        state.next_id += 1;
        state.books.push(stored.clone());
        Ok(stored)
    }

    async fn update_book(&self, book_id: BookId, book: &Book) -> Result<Book, TransportError> {
        let mut state = self.record(TransportCall::Update(book_id, book.clone()));
        if state.failing_mutations {
            return Err(server_error(Method::PUT, Some(book_id)));
        }
        let current = state
            .books
            .iter_mut()
            .find(|stored| stored.id == Some(book_id))
            .ok_or_else(|| not_found(Method::PUT, book_id))?;
        *current = Book {
            id: Some(book_id),
            ..book.clone()
        };
        Ok(current.clone())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<(), TransportError> {
        let mut state = self.record(TransportCall::Delete(book_id));
        if state.failing_mutations {
            return Err(server_error(Method::DELETE, Some(book_id)));
        }
        let before = state.books.len();
        state.books.retain(|stored| stored.id != Some(book_id));
        if state.books.len() == before {
            return Err(not_found(Method::DELETE, book_id));
        }
        Ok(())
    }
}

pub fn sample_books() -> Vec<Book> {
    vec![
        Book {
            id: Some(1),
            title: "Book 1".to_string(),
            author: "Author 1".to_string(),
            genre: "Fiction".to_string(),
            description: "Description 1".to_string(),
        },
        Book {
            id: Some(2),
            title: "Book 2".to_string(),
            author: "Author 2".to_string(),
            genre: "Non-Fiction".to_string(),
            description: "Description 2".to_string(),
        },
    ]
}
