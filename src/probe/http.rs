//! HTTP probe implementation.

use std::time::Duration;
use super::ProbeError;

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Build the shared client used for every probe.
pub fn build_client() -> Result<reqwest::Client, ProbeError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    reqwest::Client::builder()
        .user_agent(concat!("latencytrail/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()
        .map_err(|e| ProbeError::Other(e.to_string()))
}

/// Issue a single GET and read the full body.
pub async fn run_http_probe(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<HttpResponse, ProbeError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify)?;

    let status = response.status().as_u16();

    // The body belongs to the same attempt, so its errors are transport errors too
    let body = response.text().await.map_err(classify)?;

    Ok(HttpResponse { status, body })
}

fn classify(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else if e.is_connect() {
        ProbeError::Connection(e.to_string())
    } else {
        ProbeError::Other(e.to_string())
    }
}
