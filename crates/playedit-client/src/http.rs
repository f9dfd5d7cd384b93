use std::time::Duration;

use crate::error::ClientError;

/// Default timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport settings shared by the authenticator and the API client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Proxy URL for all traffic.
    pub proxy: Option<String>,
    /// Skip TLS certificate verification (only honoured with a proxy).
    pub proxy_insecure: bool,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            proxy: None,
            proxy_insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds the shared `reqwest` client.
pub fn build_http_client(settings: &HttpSettings) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder().timeout(settings.timeout);

    if let Some(url) = settings.proxy.as_deref().filter(|u| !u.is_empty()) {
        let proxy = reqwest::Proxy::all(url).map_err(|source| ClientError::InvalidProxy {
            url: url.to_string(),
            source,
        })?;
        builder = builder
            .proxy(proxy)
            .danger_accept_invalid_certs(settings.proxy_insecure);
    }

    builder.build().map_err(ClientError::Build)
}
