use crate::{config::Config, error, info, server};

/// Runs the HTTP service, optionally overriding the configured bind address.
pub async fn serve(mut config: Config, addr: Option<String>) {
    if let Some(addr) = addr {
        config.server_addr = addr;
    }

    info!("Starting tunebroker on {}", config.server_addr);
    if let Err(e) = server::start_api_server(config).await {
        error!("Server failed: {}", e);
    }
}
