use std::sync::Arc;

use tokio::io::BufReader;

use library_manager::book_list::BookList;
use library_manager::books_cache::BooksCache;
use library_manager::client::BooksClient;
use library_manager::settings::ClientSettings;
use library_manager::telemetry::init_telemetry;
use library_manager::terminal::Terminal;
use library_manager::transport::BooksTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let settings = ClientSettings::load()?;
    init_telemetry(&settings)?;

    let client = BooksClient::new(&settings.api_url)?;
    tracing::info!("Using books API at {}", client.url());
    println!("Personal Library Manager ({})", client.url());

    let transport: Arc<dyn BooksTransport> = Arc::new(client);
    let cache = Arc::new(BooksCache::new(transport.clone()));
    let mut books = BookList::new(transport, cache);

    let mut terminal = Terminal::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    terminal.run(&mut books).await
}
