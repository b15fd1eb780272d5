use std::collections::{BTreeMap, BTreeSet};

use crate::api::{Book, BookId};
use crate::books_cache::BooksCache;
use crate::transport::{BooksTransport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookField {
    Title,
    Author,
    Genre,
    Description,
}

impl BookField {
    /// Fields in the order they are shown
    pub const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::Genre,
        BookField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Genre => "Genre",
            BookField::Description => "Description",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: BookField,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum FormError {
    #[error("{} field(s) are invalid", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error("Error submitting form: {0}")]
    Transport(#[from] TransportError),

    #[error("No book form is open")]
    NotOpen,
}

/// Editor state of a single book.
/// Errors are recomputed on every change and blur but only reported for touched fields
#[derive(Debug, Clone)]
pub struct BookForm {
    book_id: Option<BookId>,
    values: Book,
    touched: BTreeSet<BookField>,
    errors: BTreeMap<BookField, ValidationError>,
}

impl BookForm {
    /// Empty form, submitting it creates a new book
    pub fn create() -> Self {
        Self::with_values(Book::default())
    }

    /// Form pre-populated with the book, submitting it updates the book
    pub fn edit(book: &Book) -> Self {
        Self::with_values(book.clone())
    }

    fn with_values(values: Book) -> Self {
        Self {
            book_id: values.id,
            values,
            touched: Default::default(),
            errors: Default::default(),
        }
    }

    pub fn book_id(&self) -> Option<BookId> {
        self.book_id
    }

    pub fn is_edit(&self) -> bool {
        self.book_id.is_some()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_edit() {
            "Edit Book"
        } else {
            "Add New Book"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_edit() {
            "Update Book"
        } else {
            "Add Book"
        }
    }

    pub fn values(&self) -> &Book {
        &self.values
    }

    pub fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.values.title,
            BookField::Author => &self.values.author,
            BookField::Genre => &self.values.genre,
            BookField::Description => &self.values.description,
        }
    }

    pub fn set_value(&mut self, field: BookField, value: impl Into<String>) {
        let value = value.into();
        match field {
            BookField::Title => self.values.title = value,
            BookField::Author => self.values.author = value,
            BookField::Genre => self.values.genre = value,
            BookField::Description => self.values.description = value,
        }
        self.validate();
    }

    pub fn blur(&mut self, field: BookField) {
        self.touched.insert(field);
        self.validate();
    }

    pub fn is_touched(&self, field: BookField) -> bool {
        self.touched.contains(&field)
    }

    /// Error shown next to the field, `None` until the field has been touched
    pub fn error(&self, field: BookField) -> Option<&ValidationError> {
        if self.is_touched(field) {
            self.errors.get(&field)
        } else {
            None
        }
    }

    /// Re-evaluates every field, returns the errors found
    pub fn validate(&mut self) -> Vec<ValidationError> {
        self.errors = BookField::ALL
            .into_iter()
            .filter(|field| self.value(*field).is_empty())
            .map(|field| {
                (
                    field,
                    ValidationError {
                        field,
                        message: format!("{} is required", field.label()),
                    },
                )
            })
            .collect();
        self.errors.values().cloned().collect()
    }

    /// Saves the book and revalidates the cache.
    /// Invalid values never reach the transport; on any failure the form keeps what was entered
    pub async fn submit(
        &mut self,
        transport: &dyn BooksTransport,
        cache: &BooksCache,
    ) -> Result<Book, FormError> {
        self.touched.extend(BookField::ALL);
        let errors = self.validate();
        if !errors.is_empty() {
            tracing::debug!("Book form blocked by {} invalid field(s)", errors.len());
            return Err(FormError::Invalid(errors));
        }

        let result = match self.book_id {
            Some(book_id) => transport.update_book(book_id, &self.values).await,
            None => transport.add_book(&self.values).await,
        };
        let saved = result.map_err(|err| {
            tracing::error!("Error submitting form: {}", err);
            FormError::from(err)
        })?;
        tracing::info!("Saved book {:?}", saved.id);

        // a failed refresh is recorded by the cache itself, the save already happened
        let _ = cache.revalidate_after_mutation().await;
        Ok(saved)
    }
}
