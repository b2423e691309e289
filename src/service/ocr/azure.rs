use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, ServiceOverrides},
    error::OcrError,
    service::{join_url, send},
    word::RecognizedWords,
};

use super::{validate_endpoint, validate_key, validate_timeout, ImageRequest, OcrService};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Azure Cognitive Services OCR: the raw image bytes are POSTed as the request body.
pub struct AzureOcr {
    config: AzureOcrConfig,
    url: String,
    timeout: Duration,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureOcrConfig {
    pub endpoint: String,
    pub path: String,
    pub subscription_key: String,
    /// BCP-47 language code, or `unk` to let the service detect it.
    pub language: String,
    pub detect_orientation: bool,
}

impl Default for AzureOcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://westus.api.cognitive.microsoft.com".to_owned(),
            path: "/vision/v1.0/ocr".to_owned(),
            subscription_key: String::new(),
            language: "unk".to_owned(),
            detect_orientation: true,
        }
    }
}

impl fmt::Debug for AzureOcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOcrConfig")
            .field("endpoint", &self.endpoint)
            .field("path", &self.path)
            .field("subscription_key", &"<redacted>")
            .field("language", &self.language)
            .field("detect_orientation", &self.detect_orientation)
            .finish()
    }
}

impl Config for AzureOcrConfig {
    fn path() -> &'static str {
        "ocr_services/azure.json"
    }
}

impl AzureOcrConfig {
    pub fn apply(&mut self, overrides: &ServiceOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(key) = &overrides.key {
            self.subscription_key = key.clone();
        }
        if let Some(language) = &overrides.language {
            self.language = language.clone();
        }
    }
}

impl AzureOcr {
    pub fn new(config: AzureOcrConfig, timeout: Duration) -> Result<Self, OcrError> {
        validate_endpoint("AzureOcr", &config.endpoint)?;
        validate_timeout("AzureOcr", timeout)?;
        validate_key("AzureOcr", &config.subscription_key)?;

        let url = join_url(&config.endpoint, &config.path);
        Ok(Self {
            config,
            url,
            timeout,
        })
    }
}

impl OcrService for AzureOcr {
    fn name(&self) -> &'static str {
        "AzureOcr"
    }

    fn recognize(&self, request: &ImageRequest) -> Result<RecognizedWords, OcrError> {
        log::debug!(
            "AzureOcr: POST {} ({} bytes)",
            self.url,
            request.content().len()
        );

        let http_request = attohttpc::post(&self.url)
            .param("language", &self.config.language)
            .param("detectOrientation", self.config.detect_orientation)
            .header("Content-Type", "application/octet-stream")
            .header(SUBSCRIPTION_KEY_HEADER, self.config.subscription_key.as_str())
            .bytes(request.content());

        let body = send(http_request, &self.url, self.timeout)?;
        let words = parse_response(&self.url, &body)?;

        log::info!("AzureOcr: recognized {} words", words.len());
        Ok(words)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrResponse {
    language: Option<String>,
    orientation: Option<String>,
    regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct Region {
    lines: Vec<Line>,
}

#[derive(Debug, Deserialize)]
struct Line {
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct Word {
    text: String,
}

/// Flattens `regions[].lines[].words[].text` in document order.
fn parse_response(url: &str, body: &[u8]) -> Result<RecognizedWords, OcrError> {
    let response: OcrResponse = serde_json::from_slice(body).map_err(|e| OcrError::Parse {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    if let Some(language) = &response.language {
        log::debug!("AzureOcr: detected language `{language}`");
    }
    if let Some(orientation) = &response.orientation {
        if orientation != "Up" {
            log::warn!("AzureOcr: image orientation reported as `{orientation}`");
        }
    }

    Ok(response
        .regions
        .into_iter()
        .flat_map(|region| region.lines)
        .flat_map(|line| line.words)
        .map(|word| word.text)
        .collect())
}
