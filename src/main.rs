use commune::{App, Config};
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("configuration");

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = Pool::builder().build(manager).expect("database pool");

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("TcpListener");
    tracing::info!(port = config.port, "listening");

    let app = App::new(&config, pool);
    app.run(listener).await
}
