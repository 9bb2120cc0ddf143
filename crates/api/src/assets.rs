//! External asset host client.
//!
//! Profile pictures and resumes are not stored in Postgres; they are
//! uploaded to an external file host which answers with a public URL. Only
//! that URL is persisted. The host is an external collaborator: an upload
//! failure is surfaced as an upstream error and never rolls back the
//! already-committed document fields.

use serde::Deserialize;

/// Error type for asset upload failures.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// `ASSET_HOST_URL` is not set; file uploads cannot be served.
    #[error("asset host is not configured")]
    NotConfigured,

    /// Transport-level failure talking to the host.
    #[error("asset host request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("asset host rejected the upload with status {0}")]
    Rejected(u16),
}

/// Configuration for the external asset host.
#[derive(Debug, Clone)]
pub struct AssetHostConfig {
    /// Upload endpoint, e.g. `https://assets.example.com/upload`.
    pub upload_url: String,
    /// Optional bearer credential for the host.
    pub api_key: Option<String>,
}

impl AssetHostConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `ASSET_HOST_URL` is not set, signalling that file
    /// uploads are not available in this deployment.
    ///
    /// | Variable         | Required | Default |
    /// |------------------|----------|---------|
    /// | `ASSET_HOST_URL` | yes      | —       |
    /// | `ASSET_HOST_KEY` | no       | —       |
    pub fn from_env() -> Option<Self> {
        let upload_url = std::env::var("ASSET_HOST_URL").ok()?;
        Some(Self {
            upload_url,
            api_key: std::env::var("ASSET_HOST_KEY").ok(),
        })
    }
}

/// Shape of the host's upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Client for the external asset host.
pub struct AssetStore {
    config: Option<AssetHostConfig>,
    client: reqwest::Client,
}

impl AssetStore {
    /// Build a store from the environment; unconfigured deployments still
    /// get a store, whose uploads fail with [`UploadError::NotConfigured`].
    pub fn from_env() -> Self {
        Self {
            config: AssetHostConfig::from_env(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a store pointing at an explicit host (used by tests).
    pub fn new(config: Option<AssetHostConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Whether uploads can be attempted at all.
    pub fn configured(&self) -> bool {
        self.config.is_some()
    }

    /// Upload one file, returning its public URL.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        let config = self.config.as_ref().ok_or(UploadError::NotConfigured)?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&config.upload_url).multipart(form);
        if let Some(key) = &config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(UploadError::Rejected(response.status().as_u16()));
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(filename, url = %body.url, "Asset uploaded");
        Ok(body.url)
    }
}
