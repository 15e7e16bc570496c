//! Loading a saved or remote page to scan.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use classfetch_shared::{ClassFetchError, Result};

/// Maximum number of redirects to follow when fetching a page.
const MAX_REDIRECTS: usize = 5;

/// Timeout in seconds for fetching a page.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Maximum page size we are willing to parse (20 MB).
const MAX_PAGE_SIZE: u64 = 20 * 1024 * 1024;

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("classfetch/", env!("CARGO_PKG_VERSION"));

/// Where a page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Remote(Url),
}

impl PageSource {
    /// `http(s)` URLs are remote; anything else is a local path.
    pub fn parse(source: &str) -> Self {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(source)),
        }
    }
}

/// HTML ready to be turned into a snapshot tree.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub html: String,
    /// Base for resolving relative links. `None` for local files.
    pub base_url: Option<Url>,
}

/// Load a page from a file path or an `http(s)` URL.
#[instrument(skip_all, fields(source = source))]
pub async fn load_page(source: &str) -> Result<LoadedPage> {
    let page = match PageSource::parse(source) {
        PageSource::File(path) => {
            debug!(path = %path.display(), "reading saved page");
            let html = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ClassFetchError::io(&path, e))?;
            LoadedPage {
                html,
                base_url: None,
            }
        }
        PageSource::Remote(url) => {
            let client = build_client()?;
            let (html, final_url) = fetch_html(&client, &url, MAX_PAGE_SIZE).await?;
            LoadedPage {
                html,
                base_url: Some(final_url),
            }
        }
    };

    info!(bytes = page.html.len(), "page loaded");
    Ok(page)
}

fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| ClassFetchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch a page body, returning it with the URL it was finally served from.
///
/// Bodies over `max_bytes` are rejected, whether or not the server declared
/// a length up front.
async fn fetch_html(client: &Client, url: &Url, max_bytes: u64) -> Result<(String, Url)> {
    debug!(%url, "fetching page");

    let mut response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| ClassFetchError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClassFetchError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(too_large(url, len, max_bytes));
        }
    }

    let final_url = response.url().clone();
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ClassFetchError::Network(format!("{url}: body read failed: {e}")))?
    {
        let read = (body.len() + chunk.len()) as u64;
        if read > max_bytes {
            return Err(too_large(url, read, max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((String::from_utf8_lossy(&body).into_owned(), final_url))
}

fn too_large(url: &Url, len: u64, max_bytes: u64) -> ClassFetchError {
    ClassFetchError::validation(format!(
        "{url}: page too large ({len} bytes, max {max_bytes})"
    ))
}
