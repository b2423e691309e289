use std::{path::Path, time::Duration};

use serde::Serialize;

use crate::{error::OcrError, word::RecognizedWords};

pub mod azure;
pub mod vision;

/// A cloud OCR service.
pub trait OcrService {
    /// Short name of the service, used in log messages.
    fn name(&self) -> &'static str;

    /// Submit an image and reduce the response to the words it contains, in document order.
    fn recognize(&self, request: &ImageRequest) -> Result<RecognizedWords, OcrError>;
}

/// What the service should look for in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    TextDetection,
}

/// A single image submission. Built once per call and never modified.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    content: Vec<u8>,
    feature: Feature,
    max_results: u32,
}

impl ImageRequest {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            feature: Feature::TextDetection,
            max_results: 1,
        }
    }

    /// Read an image file into a request.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OcrError> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|source| OcrError::Io {
            path: path.to_owned(),
            source,
        })?;

        log::debug!("Read {} bytes from `{}`", content.len(), path.display());
        Ok(Self::new(content))
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }
}

/// Checks that a credential can be sent as an HTTP header value.
pub(crate) fn validate_key(service: &str, key: &str) -> Result<(), OcrError> {
    if key.trim().is_empty() {
        return Err(OcrError::Config(format!("{service}: no API key configured")));
    }
    if !key.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(OcrError::Config(format!(
            "{service}: API key contains characters that are not allowed in an HTTP header"
        )));
    }
    Ok(())
}

/// A zero deadline cannot be handed to the socket, and would fail every request anyway.
pub(crate) fn validate_timeout(service: &str, timeout: Duration) -> Result<(), OcrError> {
    if timeout.is_zero() {
        return Err(OcrError::Config(format!(
            "{service}: request timeout must be greater than zero"
        )));
    }
    Ok(())
}

pub(crate) fn validate_endpoint(service: &str, endpoint: &str) -> Result<(), OcrError> {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        Ok(())
    } else {
        Err(OcrError::Config(format!(
            "{service}: endpoint `{endpoint}` must start with `https://` or `http://`"
        )))
    }
}
