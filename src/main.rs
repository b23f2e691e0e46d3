#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = leadbox_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Leadbox API in {:?} mode", config.environment);

    leadbox_api::server::serve().await;
}
