pub mod auth;
pub mod config;
pub mod gate;
pub mod odds;
pub mod rewards;
pub mod signal;
pub mod usage;

use std::future::Future;

use sportsedge_core::services::{credentials, ApiClient};
use sportsedge_core::storage::Config;

/// Run a future to completion on a single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, std::io::Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Backend client from config, with the stored token if the keyring has one.
pub fn api_client(config: &Config) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let token = credentials::api_token().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "keyring unavailable, continuing without API token");
        None
    });
    Ok(ApiClient::new(&config.api)?.with_token(token))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
