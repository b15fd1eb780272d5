//! In-memory `/books` REST backend used for local development of the library manager
//! and as the peer of its client tests.

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer};
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use crate::app_config::config_app;
use crate::books_repository::BookRepository;

pub mod api;
pub mod app_config;
pub mod books_repository;
pub mod settings;
pub mod telemetry;

mod handlers;

/// Builds the HTTP server on an already bound listener; the returned server has to be awaited or spawned
pub fn run(
    listener: TcpListener,
    books_repository: Arc<dyn BookRepository>,
) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .listen(listener)?
    .run();
    Ok(server)
}
