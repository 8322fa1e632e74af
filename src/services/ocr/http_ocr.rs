use super::engine::Recognizer;
use super::preprocessing::image_to_png_bytes;
use crate::error::RecognitionError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP OCR client for a local recognition server
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image_base64: String,
    config: &'a str,
}

#[derive(Deserialize)]
struct OcrResponse {
    raw_text: String,
}

impl HttpOcrClient {
    /// Create a new HTTP OCR client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RecognitionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Encode image to base64
    fn encode_image(image: &DynamicImage) -> Result<String, RecognitionError> {
        let buffer = image_to_png_bytes(image)?;
        Ok(general_purpose::STANDARD.encode(&buffer))
    }
}

#[async_trait]
impl Recognizer for HttpOcrClient {
    async fn recognize(
        &self,
        image: &DynamicImage,
        options: &str,
    ) -> Result<String, RecognitionError> {
        let image_base64 = Self::encode_image(image)?;
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest {
                image_base64,
                config: options,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecognitionError::Engine(format!(
                "OCR server error {}: {}",
                status, error_text
            )));
        }

        let data: OcrResponse = response.json().await?;
        Ok(data.raw_text)
    }

    async fn probe(&self) -> Result<String, RecognitionError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RecognitionError::Engine(format!(
                "Health check returned {}",
                response.status()
            )));
        }
        Ok(format!("OCR server at {}", self.base_url))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
