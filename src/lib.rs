pub mod config;
pub mod error;
pub mod extractor;
pub mod service;
pub mod word;

pub use error::OcrError;
pub use extractor::ImageTextExtractor;
pub use service::ocr::{Feature, ImageRequest, OcrService};
pub use word::RecognizedWords;
