use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

/// Public SF mobile food facility permit dataset.
pub const DEFAULT_DATA_URL: &str = "https://data.sfgov.org/resource/rqzj-sfat.json";

pub const DEFAULT_USER_AGENT: &str = concat!("truckfinder/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read data file: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON array of permits from {origin}")]
    NotAnArray { origin: String },
}

/// Where the permit array comes from. Fetched once per session.
pub trait RecordSource {
    fn fetch_records(&self) -> impl Future<Output = Result<Vec<Value>, FetchError>> + Send;
}

fn decode_array(origin: &str, bytes: &[u8]) -> Result<Vec<Value>, FetchError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| FetchError::Decode {
        origin: origin.to_string(),
        source,
    })?;
    match value {
        Value::Array(values) => Ok(values),
        _ => Err(FetchError::NotAnArray {
            origin: origin.to_string(),
        }),
    }
}

#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

#[derive(Clone, Debug)]
pub struct HttpOptions<'a> {
    pub timeout_seconds: u64,
    pub proxy: Option<&'a str>,
    pub user_agent: &'a str,
}

impl Default for HttpOptions<'_> {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT,
        }
    }
}

impl HttpSource {
    pub fn new(url: impl Into<String>, options: HttpOptions<'_>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(options.user_agent.to_string())
            .timeout(Duration::from_secs(options.timeout_seconds.max(1)));
        if let Some(proxy) = options.proxy.filter(|p| !p.trim().is_empty()) {
            let proxy_cfg = reqwest::Proxy::all(proxy).map_err(|source| FetchError::ProxySetup {
                proxy: proxy.to_string(),
                source,
            })?;
            builder = builder.proxy(proxy_cfg);
        }
        let client = builder
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RecordSource for HttpSource {
    async fn fetch_records(&self) -> Result<Vec<Value>, FetchError> {
        info!("fetching permits from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Request {
            url: self.url.clone(),
            source,
        })?;
        debug!("received {} bytes from {}", body.len(), self.url);
        decode_array(&self.url, &body)
    }
}

/// A JSON array on disk, for offline use.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    async fn fetch_records(&self) -> Result<Vec<Value>, FetchError> {
        let origin = self.path.display().to_string();
        info!("reading permits from {origin}");
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::FileRead {
                path: origin.clone(),
                source,
            })?;
        decode_array(&origin, &bytes)
    }
}

#[derive(Clone, Debug)]
pub enum DataSource {
    Http(HttpSource),
    File(FileSource),
    Inline(Vec<Value>),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Http(source) => source.url().to_string(),
            DataSource::File(source) => source.path.display().to_string(),
            DataSource::Inline(values) => format!("{} inline permits", values.len()),
        }
    }
}

impl RecordSource for DataSource {
    async fn fetch_records(&self) -> Result<Vec<Value>, FetchError> {
        match self {
            DataSource::Http(source) => source.fetch_records().await,
            DataSource::File(source) => source.fetch_records().await,
            DataSource::Inline(values) => Ok(values.clone()),
        }
    }
}
