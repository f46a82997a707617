//! HTTP access to the serverinfo endpoint.

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use nc_core::{decode_snapshot, Credentials, ExporterConfig, Snapshot};

use crate::error::ScrapeError;

const USER_AGENT: &str = concat!("nextcloud-exporter/", env!("CARGO_PKG_VERSION"));

/// Client for a single serverinfo endpoint.
///
/// Cheap to share: the underlying reqwest client pools connections and is
/// only read from.
#[derive(Debug, Clone)]
pub struct ServerInfoClient {
    client: reqwest::Client,
    url: Url,
    credentials: Option<Credentials>,
}

impl ServerInfoClient {
    /// Build a client bounded by the configured timeout.
    pub fn new(config: &ExporterConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: config.info_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Perform one GET and decode the body.
    pub async fn fetch(&self) -> Result<Snapshot, ScrapeError> {
        let mut request = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json");

        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::HttpStatus { status });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), url = %self.url, "serverinfo response received");

        Ok(decode_snapshot(&body)?)
    }
}
