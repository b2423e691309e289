use std::{fmt, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    config::{Config, ServiceOverrides},
    error::OcrError,
    service::{join_url, send},
    word::RecognizedWords,
};

use super::{validate_endpoint, validate_key, validate_timeout, ImageRequest, OcrService};

const API_KEY_HEADER: &str = "x-goog-api-key";
const ANNOTATE_PATH: &str = "/v1/images:annotate";

/// Google Cloud Vision: the image travels base64-encoded inside a JSON `requests` envelope.
pub struct VisionOcr {
    config: VisionOcrConfig,
    url: String,
    timeout: Duration,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionOcrConfig {
    pub endpoint: String,
    pub api_key: String,
    pub max_results: u32,
}

impl Default for VisionOcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com".to_owned(),
            api_key: String::new(),
            max_results: 1,
        }
    }
}

impl fmt::Debug for VisionOcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionOcrConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl Config for VisionOcrConfig {
    fn path() -> &'static str {
        "ocr_services/vision.json"
    }
}

impl VisionOcrConfig {
    pub fn apply(&mut self, overrides: &ServiceOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(key) = &overrides.key {
            self.api_key = key.clone();
        }
        if overrides.language.is_some() {
            log::warn!("VisionOcr: ignoring language override, the service always auto-detects");
        }
    }
}

impl VisionOcr {
    pub fn new(config: VisionOcrConfig, timeout: Duration) -> Result<Self, OcrError> {
        validate_endpoint("VisionOcr", &config.endpoint)?;
        validate_timeout("VisionOcr", timeout)?;
        validate_key("VisionOcr", &config.api_key)?;

        let url = join_url(&config.endpoint, ANNOTATE_PATH);
        Ok(Self {
            config,
            url,
            timeout,
        })
    }
}

fn envelope(request: &ImageRequest, max_results: u32) -> Value {
    json!({
        "requests": [{
            "image": { "content": STANDARD.encode(request.content()) },
            "features": [{
                "type": request.feature(),
                "maxResults": max_results,
            }],
        }],
    })
}

impl OcrService for VisionOcr {
    fn name(&self) -> &'static str {
        "VisionOcr"
    }

    fn recognize(&self, request: &ImageRequest) -> Result<RecognizedWords, OcrError> {
        log::debug!(
            "VisionOcr: POST {} ({} bytes before encoding)",
            self.url,
            request.content().len()
        );

        let max_results = self.config.max_results.max(request.max_results());
        let payload = envelope(request, max_results).to_string();
        let http_request = attohttpc::post(&self.url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .bytes(payload);

        let body = send(http_request, &self.url, self.timeout)?;
        let words = parse_response(&self.url, &body)?;

        log::info!("VisionOcr: recognized {} words", words.len());
        Ok(words)
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// The first annotation holds the whole text block; the rest are the individual words.
fn parse_response(url: &str, body: &[u8]) -> Result<RecognizedWords, OcrError> {
    let response: AnnotateResponse = serde_json::from_slice(body).map_err(|e| OcrError::Parse {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    let Some(image) = response.responses.into_iter().next() else {
        return Err(OcrError::Parse {
            url: url.to_owned(),
            reason: "`responses` is empty".to_owned(),
        });
    };

    if let Some(status) = image.error {
        return Err(OcrError::Provider {
            url: url.to_owned(),
            message: format!("{} (code {})", status.message, status.code),
        });
    }

    Ok(image
        .text_annotations
        .into_iter()
        .skip(1)
        .map(|annotation| annotation.description)
        .collect())
}
