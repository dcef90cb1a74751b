// src/repository/http.rs

//! HTTP access to remote Maven repositories
//!
//! Wraps reqwest's blocking client with a request timeout and retries.
//! Transport failures and 5xx responses are retried with a linearly growing
//! delay; a 404 is reported immediately as [`Error::NotFoundError`].

use crate::error::{Error, Result};
use crate::hash::{Hash, Hasher, ManifestAlgorithm};
use crate::maven::ensure_slash_end;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_LENGTH;
use reqwest::StatusCode;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{RepositoryOptions, RepositorySource};

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Repository served over http or https
pub struct HttpRepository {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpRepository {
    /// Create a client for the repository at `url`
    pub fn new(url: &str, options: &RepositoryOptions) -> Result<Self> {
        let base_url = Url::parse(&ensure_slash_end(url))
            .map_err(|e| Error::UnsupportedRepository(format!("{}: {}", url, e)))?;

        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("pom2feed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            max_retries: options.retries.max(1),
            retry_delay: options.retry_delay,
        })
    }

    /// Send a request, retrying transport errors and server errors
    fn send_with_retry(&self, url: &str, build: impl Fn(&Client) -> RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let failure = match build(&self.client).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(Error::NotFoundError(url.to_string()));
                    }
                    if !status.is_server_error() {
                        return Err(Error::DownloadError(format!("HTTP {} from {}", status, url)));
                    }
                    format!("HTTP {}", status)
                }
                Err(e) => e.to_string(),
            };

            if attempt >= self.max_retries {
                return Err(Error::DownloadError(format!(
                    "Failed to fetch {url} after {attempt} attempts: {failure}"
                )));
            }
            warn!("Request to {} failed (attempt {}): {}, retrying...", url, attempt, failure);
            std::thread::sleep(self.retry_delay * attempt);
        }
    }
}

impl RepositorySource for HttpRepository {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn is_remote(&self) -> bool {
        true
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let response = self.send_with_retry(&url, |client| client.get(&url))?;
        let bytes = response
            .bytes()
            .map_err(|e| Error::DownloadError(format!("Failed to read response from {}: {}", url, e)))?;

        Ok(bytes.to_vec())
    }

    /// Size from a HEAD request's Content-Length, falling back to a download
    fn size(&self, path: &str) -> Result<u64> {
        let url = self.url_for(path)?;
        debug!("HEAD {}", url);

        let response = self.send_with_retry(&url, |client| client.head(&url))?;
        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|len| *len > 0);

        match length {
            Some(len) => Ok(len),
            None => {
                debug!("No Content-Length for {}, downloading to measure", url);
                Ok(self.fetch(path)?.len() as u64)
            }
        }
    }

    /// Stream the file through the hasher without buffering it in memory
    fn hash_file(&self, path: &str, algorithm: ManifestAlgorithm) -> Result<Hash> {
        let url = self.url_for(path)?;
        debug!("Hashing {}", url);

        let mut response = self.send_with_retry(&url, |client| client.get(&url))?;
        let mut hasher = Hasher::new(algorithm);
        let mut buffer = [0u8; STREAM_BUFFER_SIZE];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| Error::IoError(format!("Failed to read response: {e}")))?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finalize())
    }
}
