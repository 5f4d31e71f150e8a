//! Download of shared count exports.
//!
//! Shared links (OneDrive, SharePoint, Dropbox) serve an HTML preview unless
//! the query asks for the raw file with `download=1`. [`download_url`]
//! rewrites a link into its direct-download form; [`Fetcher`] performs the
//! GET and classifies failures into [`LoadError`] variants.

use std::time::Duration;

use url::Url;

use crate::error::LoadError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("countboard/", env!("CARGO_PKG_VERSION"));

/// Return `link` with `download=1` in its query, appending the pair unless
/// it is already present.
pub fn download_url(link: &str) -> Result<String, LoadError> {
    let mut url = Url::parse(link.trim()).map_err(|e| LoadError::InvalidLink {
        link: link.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(LoadError::InvalidLink {
                link: link.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            })
        }
    }

    let has_download = url.query_pairs().any(|(k, v)| k == "download" && v == "1");
    if !has_download {
        url.query_pairs_mut().append_pair("download", "1");
    }
    Ok(url.into())
}

pub struct Fetcher {
    http: reqwest::blocking::Client,
}

impl Fetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, LoadError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LoadError::Http(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// GET the direct-download form of `link` and return the body.
    /// Anything other than 200 is a failure; there is no retry.
    pub fn download(&self, link: &str) -> Result<Vec<u8>, LoadError> {
        let url = download_url(link)?;
        log::info!("downloading {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| LoadError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        log::debug!("HTTP {status} from {url}");
        if status != 200 {
            return Err(LoadError::HttpStatus { status, url });
        }

        let bytes = resp
            .bytes()
            .map_err(|e| LoadError::Http(format!("failed to read response body: {e}")))?;
        Ok(bytes.to_vec())
    }
}
