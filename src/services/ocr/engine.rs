use crate::error::RecognitionError;
use async_trait::async_trait;
use image::DynamicImage;

/// Recognizer trait - abstraction over external OCR engines
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize text from image. `options` is passed to the engine untouched.
    async fn recognize(&self, image: &DynamicImage, options: &str)
        -> Result<String, RecognitionError>;

    /// Check that the engine is reachable, returning a short description
    async fn probe(&self) -> Result<String, RecognitionError>;

    /// Engine name for logs
    fn name(&self) -> &'static str;

    /// Release engine resources. Called once when the monitor stops.
    fn release(&self) {}
}
