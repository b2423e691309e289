use std::time::Duration;

use attohttpc::{body::Body, RequestBuilder};

use crate::error::OcrError;

pub mod ocr;

/// Non-2xx bodies are kept for the error message, up to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Sends a prepared request and returns the body of a successful response.
///
/// Non-2xx responses become `OcrError::Http` without their body being interpreted.
pub(crate) fn send<B: Body>(
    request: RequestBuilder<B>,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, OcrError> {
    let response = request
        .read_timeout(timeout)
        .timeout(timeout)
        .send()
        .map_err(|e| OcrError::from_transport(url, timeout, e))?;

    let status = response.status();

    if !status.is_success() {
        // the status line decides the outcome; the body is only there for the message
        let body = response.bytes().unwrap_or_else(|e| {
            log::debug!("Could not read error body from `{url}`: {e}");
            Vec::new()
        });
        let text = String::from_utf8_lossy(&body);
        return Err(OcrError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            body: text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let body = response
        .bytes()
        .map_err(|e| OcrError::from_transport(url, timeout, e))?;

    log::debug!("`{url}` answered {status} with {} bytes", body.len());
    Ok(body)
}

/// Joins a configured endpoint and a path without doubling or dropping the slash.
pub(crate) fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
