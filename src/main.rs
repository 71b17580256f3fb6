use roster::{app, settings::Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "roster={level},tower_http={level}",
            level = settings.app.level
        ))
    });
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("connecting to {}", settings.database.url);
    let listener = tokio::net::TcpListener::bind(settings.server.bind).await?;
    let ctx = app::AppContext::connect(settings).await?;

    app::serve(ctx, listener).await?;

    Ok(())
}
