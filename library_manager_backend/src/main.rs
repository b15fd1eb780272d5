use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use library_manager_backend::books_repository::{BookRepository, InMemoryBookRepository};
use library_manager_backend::settings::BackendSettings;
use library_manager_backend::telemetry::init_telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = BackendSettings::load()?;
    init_telemetry(&settings)?;

    let listener = TcpListener::bind((settings.host.as_str(), settings.port))
        .with_context(|| format!("Failed to bind {}:{}", settings.host, settings.port))?;
    tracing::info!(
        "starting HTTP server at http://{}",
        listener.local_addr().context("Failed to read bound address")?
    );

    let books_repository: Arc<dyn BookRepository> = Arc::new(InMemoryBookRepository::default());
    library_manager_backend::run(listener, books_repository)?
        .await
        .context("HTTP server failed")
}
