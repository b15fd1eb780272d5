use std::sync::Arc;

use crate::api::{Book, BookId};
use crate::book_form::{BookForm, FormError};
use crate::books_cache::BooksCache;
use crate::transport::{BooksTransport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub book: Book,
    /// Whether the full description is shown
    pub expanded: bool,
}

/// What the list shows for the current cache state
#[derive(Debug, Clone)]
pub enum ListView {
    Loading,
    Error(Arc<TransportError>),
    Books(Vec<BookEntry>),
}

/// State of the books screen: the cached collection plus the local UI state around it
pub struct BookList {
    transport: Arc<dyn BooksTransport>,
    cache: Arc<BooksCache>,
    expanded: Option<BookId>,
    form: Option<BookForm>,
    pending_delete: Option<Book>,
}

impl BookList {
    pub fn new(transport: Arc<dyn BooksTransport>, cache: Arc<BooksCache>) -> Self {
        Self {
            transport,
            cache,
            expanded: None,
            form: None,
            pending_delete: None,
        }
    }

    /// Loads the collection the first time the list is shown
    pub async fn mount(&self) {
        // a failure ends up in the cache and is rendered by `view`
        let _ = self.cache.load().await;
    }

    /// Re-fetches the collection on user request
    pub async fn refresh(&self) {
        let _ = self.cache.revalidate().await;
    }

    pub fn view(&self) -> ListView {
        let records = self.cache.records();
        if self.cache.is_loading() && records.is_none() {
            return ListView::Loading;
        }
        if let Some(error) = self.cache.error() {
            return ListView::Error(error);
        }
        match records {
            Some(books) => ListView::Books(
                books
                    .into_iter()
                    .map(|book| BookEntry {
                        expanded: book.id.is_some() && book.id == self.expanded,
                        book,
                    })
                    .collect(),
            ),
            // not fetched yet
            None => ListView::Loading,
        }
    }

    pub fn expanded(&self) -> Option<BookId> {
        self.expanded
    }

    /// Shows the description of the book, hiding the one shown before.
    /// Toggling the expanded book collapses it
    pub fn toggle_expand(&mut self, book_id: BookId) {
        self.expanded = if self.expanded == Some(book_id) {
            None
        } else {
            Some(book_id)
        };
    }

    pub fn open_create(&mut self) {
        self.form = Some(BookForm::create());
    }

    pub fn open_edit(&mut self, book: &Book) {
        self.form = Some(BookForm::edit(book));
    }

    pub fn form(&self) -> Option<&BookForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut BookForm> {
        self.form.as_mut()
    }

    /// Closes the form, dropping whatever was entered
    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Submits the open form and closes it once the book is saved and the cache revalidated
    pub async fn submit_form(&mut self) -> Result<Book, FormError> {
        let form = self.form.as_mut().ok_or(FormError::NotOpen)?;
        let saved = form.submit(self.transport.as_ref(), &self.cache).await?;
        self.form = None;
        Ok(saved)
    }

    /// Asks for confirmation before deleting the book
    pub fn request_delete(&mut self, book: &Book) {
        if book.id.is_none() {
            tracing::warn!("Ignoring delete of unsaved book {}", book.title);
            return;
        }
        self.pending_delete = Some(book.clone());
    }

    pub fn pending_delete(&self) -> Option<&Book> {
        self.pending_delete.as_ref()
    }

    /// Confirmation question for the pending delete
    pub fn delete_prompt(&self) -> Option<String> {
        self.pending_delete
            .as_ref()
            .map(|book| format!("Are you sure you want to delete \"{}\"?", book.title))
    }

    pub fn decline_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the pending book and revalidates the cache.
    /// On failure the prompt stays open so the delete can be confirmed again
    pub async fn confirm_delete(&mut self) -> Result<(), TransportError> {
        let Some(book_id) = self.pending_delete.as_ref().and_then(|book| book.id) else {
            return Ok(());
        };

        if let Err(err) = self.transport.delete_book(book_id).await {
            tracing::error!("Error deleting book: {}", err);
            return Err(err);
        }
        tracing::info!("Deleted book {}", book_id);

        let _ = self.cache.revalidate_after_mutation().await;
        self.pending_delete = None;
        if self.expanded == Some(book_id) {
            self.expanded = None;
        }
        Ok(())
    }
}
