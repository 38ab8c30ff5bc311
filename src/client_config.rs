//! Runtime configuration for the contact form client.
//!
//! The blob is read once before the form becomes interactive. A blob that is
//! simply absent leaves the client [`ClientConfig::Unconfigured`]; anything
//! else that goes wrong is a [`ClientConfigError`].
use reqwest::{StatusCode, Url};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ClientSettings {
    pub api: ApiSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiSettings {
    pub endpoint: Url,
    #[serde(default)]
    pub region: Option<String>,
    pub api_key: Secret<String>,
    #[serde(
        default = "default_timeout_milliseconds",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub timeout_milliseconds: u64,
}

fn default_timeout_milliseconds() -> u64 {
    10_000
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Remote(Url),
}

impl ConfigSource {
    /// `http(s)://` locations are fetched, everything else is a local path.
    pub fn parse(location: &str) -> Result<Self, url::ParseError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(Self::Remote(Url::parse(location)?))
        } else {
            Ok(Self::File(PathBuf::from(location)))
        }
    }
}

#[derive(Debug)]
pub enum ClientConfig {
    Configured(ClientSettings),
    Unconfigured,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to fetch the client configuration: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Malformed client configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn parse(bytes: &[u8]) -> Result<ClientConfig, ClientConfigError> {
    Ok(ClientConfig::Configured(serde_json::from_slice(bytes)?))
}

#[tracing::instrument(name = "Loading the client configuration")]
pub async fn load_client_config(source: &ConfigSource) -> Result<ClientConfig, ClientConfigError> {
    match source {
        ConfigSource::File(path) => match std::fs::read(path) {
            Ok(bytes) => parse(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("No client configuration found, the form stays unconfigured");
                Ok(ClientConfig::Unconfigured)
            }
            Err(source) => Err(ClientConfigError::Read {
                path: path.clone(),
                source,
            }),
        },
        ConfigSource::Remote(url) => {
            let response = reqwest::get(url.clone()).await?;
            if response.status() == StatusCode::NOT_FOUND {
                tracing::warn!("No client configuration published, the form stays unconfigured");
                return Ok(ClientConfig::Unconfigured);
            }
            let bytes = response.error_for_status()?.bytes().await?;
            parse(&bytes)
        }
    }
}
