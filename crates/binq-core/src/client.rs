//! Index-server client.
//!
//! A server publishes item manifests at `<server>/<path>` and an index at
//! its root (or `<server>/index.json`) mapping names to those paths.

use binq_schema::{INDEX_FILE_NAME, Index, Item, SchemaError};
use reqwest::{Client, StatusCode, header};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ClientConfig;

/// Errors raised while querying an index server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("HTTP response is not OK. Code: {status}, URL: {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: StatusCode,
    },

    /// Neither the item nor an index entry for it exists.
    #[error("item not found: {0}")]
    NotFound(String),

    /// The index points the name back at the URL that already failed.
    #[error("index path for {0} is the name itself; won't retry")]
    SelfReference(String),

    /// The response body is not a valid manifest or index.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Fetches items and indexes from one server.
#[derive(Debug, Clone)]
pub struct IndexClient {
    http: Client,
    server: String,
}

impl IndexClient {
    /// Builds a client for `config.server`.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: config.index_client()?,
            server: config.server.clone(),
        })
    }

    /// Server base URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.server.clone()
        } else {
            format!("{}/{path}", self.server)
        }
    }

    /// GETs `path`; `None` on 404.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let url = self.url_for(path);
        info!(url = %url, "GET");
        let res = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        match res.status() {
            StatusCode::OK => Ok(Some(res.bytes().await?.to_vec())),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ClientError::Status { url, status }),
        }
    }

    /// The server's index, from the root or `index.json`.
    pub async fn index(&self) -> Result<Index, ClientError> {
        let body = match self.get("").await? {
            Some(body) => body,
            None => {
                debug!("no index at server root, trying {INDEX_FILE_NAME}");
                self.get(INDEX_FILE_NAME)
                    .await?
                    .ok_or_else(|| ClientError::NotFound(self.url_for(INDEX_FILE_NAME)))?
            }
        };
        Ok(Index::decode(&body)?)
    }

    /// The manifest for `name`.
    ///
    /// Tries `<server>/<name>` first, then resolves `name` through the index.
    pub async fn item(&self, name: &str) -> Result<Item, ClientError> {
        if let Some(body) = self.get(name).await? {
            return Ok(Item::decode(&body)?);
        }

        debug!(name, "item not at its name, consulting index");
        let index = self.index().await?;
        let path = index
            .find_path(name)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ClientError::NotFound(name.to_string()))?;
        if path == name {
            return Err(ClientError::SelfReference(name.to_string()));
        }

        let body = self
            .get(path)
            .await?
            .ok_or_else(|| ClientError::NotFound(self.url_for(path)))?;
        Ok(Item::decode(&body)?)
    }
}
