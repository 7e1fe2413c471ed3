use swaggen::{init_tracing, DocConfig, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let settings = Settings::load("application.yaml")?;
    let config = DocConfig::from_settings(&settings)?;
    let port: u16 = settings.get_or("app.port", 8080);

    let app = petstore::app(config)?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "pet store listening");
    axum::serve(listener, app).await?;
    Ok(())
}
