use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client for all fixture requests. The timeout can be
/// raised for slow upstreams via FETCH_TIMEOUT_SECS; it is read once, when
/// the client is first built.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let timeout = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("failed to build http client")
    })
}
