use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

const APP_USER_AGENT: &str = concat!("PiLauncher/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// Anything that can fetch a URL into memory.
///
/// The resolver and installer only talk to the network through this seam,
/// one request at a time.
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// GET `url` and return the full body. Non-2xx responses are errors.
    async fn get_bytes(&self, url: &str) -> LauncherResult<Vec<u8>>;
}

#[async_trait]
impl HttpSource for Client {
    async fn get_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
