use folio_server::config::ServerConfig;
use folio_server::{app, open_store, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    let store = open_store(&config)?;
    if config.caps.is_open() {
        warn!("no capability keys configured, create endpoints are unauthenticated");
    }

    let http_addr = config.http_addr;
    let tls = config.tls.clone();
    let router = app(AppState::new(store, config));

    match tls {
        Some(paths) => {
            let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&paths.cert, &paths.key)
                .await?;
            info!("https listening on {}", http_addr);
            axum_server::bind_rustls(http_addr, tls)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            info!("http listening on {}", http_addr);
            axum_server::bind(http_addr)
                .serve(router.into_make_service())
                .await?;
        }
    }
    Ok(())
}
