pub mod engine;
pub mod http_ocr;
pub mod preprocessing;
pub mod tesseract;

// Re-export main types
pub use engine::Recognizer;
pub use http_ocr::HttpOcrClient;
pub use tesseract::TesseractEngine;

use crate::error::ConfigError;
use crate::models::config::{OcrBackend, RecognizerSettings};

/// Build the configured recognizer backend.
///
/// Construction problems are configuration problems; failures while
/// recognizing are reported per cycle instead.
pub fn build_recognizer(
    settings: &RecognizerSettings,
) -> Result<Box<dyn Recognizer>, ConfigError> {
    let recognizer: Box<dyn Recognizer> = match settings.backend {
        OcrBackend::Tesseract => Box::new(TesseractEngine::new(
            settings.tesseract_cmd.as_deref(),
            &settings.lang,
            settings.timeout,
        )),
        OcrBackend::Http => Box::new(
            HttpOcrClient::new(&settings.server_url, settings.timeout)
                .map_err(|e| ConfigError::OcrClient(e.to_string()))?,
        ),
    };
    Ok(recognizer)
}
