use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{Book, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_books(
    books_repository: Data<Arc<dyn BookRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.list_books().await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => {
            tracing::error!("Get all books failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book: web::Json<Book>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.add_book(book.into_inner()).await {
        Ok(book) => {
            tracing::info!("Added book {:?}", book.id);
            let location = book
                .id
                .map(|book_id| format!("/books/{}", book_id))
                .unwrap_or_default();
            HttpResponse::Created()
                .append_header((LOCATION, location))
                .json(book)
        }
        Err(err) => {
            tracing::error!("Add book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn update_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
    book: web::Json<Book>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository
            .replace_book(book_id.into_inner(), book.into_inner())
            .await
        {
            Ok(book) => HttpResponse::Ok().json(book),
            Err(BookRepositoryError::NotFound(_)) => HttpResponse::NotFound().finish(),
        },
    )
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.get_book(book_id.into_inner()).await {
            Ok(book) => HttpResponse::Ok().json(book),
            Err(BookRepositoryError::NotFound(_)) => HttpResponse::NotFound().finish(),
        },
    )
}

#[api_v2_operation]
pub async fn delete_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.delete_book(book_id.into_inner()).await {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(BookRepositoryError::NotFound(_)) => HttpResponse::NotFound().finish(),
        },
    )
}
