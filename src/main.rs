mod api;
mod config;
mod http;
mod permission;
mod plugin;

use crate::api::{build_api, AppState};
use crate::config::Config;
use crate::http::{ApiClient, HttpError};
use crate::permission::service::DatasourcePermission;
use crate::plugin::executor::OpenAiExecutor;
use clap::Parser;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run(config).await {
        error!("{}", err);
        std::process::exit(1);
    }
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to build http client: {0}")]
    Client(#[from] HttpError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server stopped: {0}")]
    Serve(#[from] std::io::Error),
}

async fn run(config: Config) -> Result<(), StartupError> {
    let api_client = ApiClient::new(config.request_timeout())?;
    let app_state = AppState {
        executor: Arc::new(OpenAiExecutor::new(
            Arc::new(api_client),
            config.default_base_url.clone(),
        )),
        permissions: DatasourcePermission,
    };
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, build_api(app_state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_reports_bind_failure() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = taken.local_addr().expect("should have address").to_string();
        let config = Config::try_parse_from(["openai-plugin", "--bind-addr", addr.as_str()])
            .expect("flags should parse");

        let result = run(config).await;

        match result {
            Err(err @ StartupError::Bind { .. }) => {
                assert!(err.to_string().starts_with(&format!("failed to bind {}", addr)));
            }
            other => panic!("expected bind failure, got {:?}", other),
        }
    }
}
