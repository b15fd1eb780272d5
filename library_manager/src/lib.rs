//! Client side of the personal library manager.
//!
//! [`transport::BooksTransport`] is the seam to the remote store, implemented over HTTP by
//! [`client::BooksClient`]. [`books_cache::BooksCache`] holds the one cached copy of the
//! collection; [`book_list::BookList`] and [`book_form::BookForm`] are the screen and the
//! editor built on top of it, and [`terminal`] drives them from a terminal.

pub mod api;
pub mod book_form;
pub mod book_list;
pub mod books_cache;
pub mod client;
pub mod settings;
pub mod telemetry;
pub mod terminal;
pub mod transport;

#[cfg(test)]
mod test_support;
