use anyhow::Context;
use reqwest::Method;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{Book, BookId, BOOKS_PATH};
use crate::transport::{BooksTransport, TransportError};

/// HTTP implementation of [`BooksTransport`] against `{url}/books`
pub struct BooksClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BooksClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn books_url(&self) -> String {
        format!("{}{}", self.url, BOOKS_PATH)
    }

    fn book_url(&self, book_id: BookId) -> String {
        format!("{}{}/{}", self.url, BOOKS_PATH, book_id)
    }

    /// Sends the request and turns any non-success status into [`TransportError::Status`]
    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Book>,
    ) -> Result<reqwest::Response, TransportError> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(book) = body {
            request = request.json(book);
        }

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} {} returned {}", method, url, status);
            return Err(TransportError::Status {
                method: method.clone(),
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(response)
    }

    async fn send_and_decode<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<&Book>,
    ) -> Result<T, TransportError> {
        let response = self.send(&method, &url, body).await?;
        response
            .json()
            .await
            .map_err(|source| TransportError::Decode {
                method,
                url,
                source,
            })
    }
}

#[async_trait::async_trait]
impl BooksTransport for BooksClient {
    /// Calls GET /books endpoint
    async fn list_books(&self) -> Result<Vec<Book>, TransportError> {
        self.send_and_decode(Method::GET, self.books_url(), None)
            .await
    }

    /// Calls POST /books endpoint
    /// The id of the given book is never sent, the server assigns one
    async fn add_book(&self, book: &Book) -> Result<Book, TransportError> {
        self.send_and_decode(Method::POST, self.books_url(), Some(&book.without_id()))
            .await
    }

    /// Calls PUT /books/{book_id} endpoint with the full book, including its id
    async fn update_book(&self, book_id: BookId, book: &Book) -> Result<Book, TransportError> {
        let book = Book {
            id: Some(book_id),
            ..book.clone()
        };
        self.send_and_decode(Method::PUT, self.book_url(book_id), Some(&book))
            .await
    }

    /// Calls DELETE /books/{book_id} endpoint
    async fn delete_book(&self, book_id: BookId) -> Result<(), TransportError> {
        self.send(&Method::DELETE, &self.book_url(book_id), None)
            .await
            .map(|_| ())
    }
}
