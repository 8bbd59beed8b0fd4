use anyhow::{Context, Result};
use pdfbrief::{api, config, logging, processing::DocumentService};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing(&config.log_file);
    tracing::debug!(
        pdf_api_url = %config.pdf_api_url,
        gemini_api_url = %config.gemini_api_url,
        gemini_model = %config.gemini_model,
        has_gemini_key = config.gemini_api_key.is_some(),
        bucket = %config.s3_bucket,
        region = %config.s3_region,
        log_file = %config.log_file.display(),
        "Loaded configuration"
    );
    let service = DocumentService::new(config)
        .await
        .context("failed to initialize document service")?;
    let app = api::create_router(Arc::new(service));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}

async fn bind_listener(configured: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8080..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8080-8099",
    ))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
