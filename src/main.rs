use std::net::TcpListener;

use anyhow::Context;
use tracing::info;

use article_counter::common::init_sqlite_connection;
use article_counter::common::word_count::WordCounter;
use article_counter::configuration::ApplicationConfiguration;
use article_counter::observability::{get_subscriber, init_subscriber};
use article_counter::startup::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init dotenv
    dotenvy::dotenv().ok();

    let configuration = ApplicationConfiguration::from_env()?;

    let subscriber = get_subscriber("article_counter", &configuration.observability)
        .context("Could not set up the tracing")?;
    init_subscriber(subscriber)?;

    let db = init_sqlite_connection(&configuration.database)
        .await
        .context("Could not open the database")?;
    let word_counter = WordCounter::from_settings(&configuration.fetch)
        .context("Could not build the HTTP client")?;

    let listener = TcpListener::bind(&configuration.listen_on)
        .with_context(|| format!("Could not listen on {}", configuration.listen_on))?;
    info!("Listening on {}", configuration.listen_on);

    startup::startup(AppState::new(db, word_counter), &configuration, listener).await
}
