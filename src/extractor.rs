use std::path::Path;

use crate::{
    error::OcrError,
    service::ocr::{ImageRequest, OcrService},
    word::RecognizedWords,
};

/// Reads an image from disk and turns it into text through an OCR service.
pub struct ImageTextExtractor {
    service: Box<dyn OcrService>,
}

impl ImageTextExtractor {
    pub fn new(service: Box<dyn OcrService>) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    /// Recognized words of the image at `image_path`, in region, line, word order.
    ///
    /// The file is read before anything is sent, so an unreadable file never causes a request.
    pub fn extract_words(&self, image_path: impl AsRef<Path>) -> Result<RecognizedWords, OcrError> {
        let request = ImageRequest::from_path(image_path)?;
        self.service.recognize(&request)
    }

    /// Same as [`extract_words`](Self::extract_words), joined with single spaces.
    pub fn extract_text(&self, image_path: impl AsRef<Path>) -> Result<String, OcrError> {
        Ok(self.extract_words(image_path)?.join())
    }
}
