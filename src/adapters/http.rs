use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "pif-gen";

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Downloads `url` fully into memory, failing on non-success status.
pub async fn download(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
    tracing::info!("Downloading: {}", url);

    let response = client.get(url).timeout(timeout).send().await?;
    tracing::debug!("Download response status: {}", response.status());

    let bytes = response.error_for_status()?.bytes().await?;
    tracing::debug!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
