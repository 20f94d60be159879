//! Manifest transport.
//!
//! A fetch never touches registry state directly. The fetcher sends a [`FetchCompletion`] down a
//! channel and the registry applies it on its own thread, so completions cannot interleave with
//! a tick.

use std::time::Duration;

use crossbeam_channel::Sender;
use url::Url;

use crate::clock::{Clock as _, SystemClock};
use crate::foundation::{
    error::{OverlayError, OverlayResult},
    math::to_base36,
};

/// Dedup key for a manifest URL: origin plus path, no query or fragment.
pub fn normalize_url(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Parses `raw` and returns its dedup key, or `raw` itself if it is not an absolute URL.
pub fn normalize_str(raw: &str) -> String {
    Url::parse(raw)
        .map(|u| normalize_url(&u))
        .unwrap_or_else(|_| raw.to_owned())
}

/// Appends `date=<base36(floor(now / period))>` to `url`.
pub fn cache_busted(url: &Url, now_ms: i64, period_ms: u64) -> Url {
    let window = (now_ms.max(0) as u64) / period_ms.max(1);
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("date", &to_base36(window));
    busted
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Fully formed URL, cache-busting parameter included.
    pub url: Url,
    /// Registry generation the request was issued under.
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub body: Vec<u8>,
    /// Raw value of the `date` response header, if the server sent one.
    pub date: Option<String>,
    /// Local Unix time in milliseconds at which the response headers arrived. Clock samples are
    /// taken against this, not against the time the registry gets around to the completion.
    pub received_ms: i64,
}

#[derive(Debug)]
pub struct FetchCompletion {
    pub request: FetchRequest,
    pub result: OverlayResult<FetchResponse>,
}

/// Starts a manifest fetch and eventually reports it on `completions`.
///
/// Implementations may complete synchronously or from another thread. A dropped receiver is not
/// an error; the result is discarded.
pub trait ManifestFetcher {
    fn fetch(&self, request: FetchRequest, completions: Sender<FetchCompletion>);
}

/// Blocking `reqwest` client, one short-lived worker thread per request.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> OverlayResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dither-overlay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OverlayError::network_failure(format!("build http client: {e}")))?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &Url) -> OverlayResult<FetchResponse> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| OverlayError::network_failure(format!("GET {url}: {e}")))?;
        let received_ms = SystemClock.now_ms();
        let status = resp.status();
        if !status.is_success() {
            return Err(OverlayError::network_failure(format!(
                "GET {url}: status {status}"
            )));
        }
        let date = resp
            .headers()
            .get(reqwest::header::DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp
            .bytes()
            .map_err(|e| OverlayError::network_failure(format!("read body of {url}: {e}")))?
            .to_vec();
        Ok(FetchResponse {
            body,
            date,
            received_ms,
        })
    }
}

impl ManifestFetcher for HttpFetcher {
    fn fetch(&self, request: FetchRequest, completions: Sender<FetchCompletion>) {
        let fetcher = self.clone();
        std::thread::spawn(move || {
            let result = fetcher.get(&request.url);
            let _ = completions.send(FetchCompletion { request, result });
        });
    }
}
