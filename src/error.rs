use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. The only fatal error kind.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid monitor_region: {0}")]
    InvalidRegion(String),

    #[error("Neither monitor_region nor window_title_substring is set")]
    MissingRegion,

    #[error("desired_outcomes must contain at least one entry")]
    EmptyOutcomes,

    #[error("desired_outcomes entry {0} is empty")]
    BlankOutcome(usize),

    #[error("Invalid regex in desired_outcomes ({pattern}): {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("Failed to determine default config directory")]
    NoConfigDir,

    #[error("Invalid tesseract_config ({0}): unbalanced quotes")]
    InvalidOptions(String),

    #[error("Invalid ocr_server_url ({url}): {message}")]
    InvalidServerUrl { url: String, message: String },

    #[error("Failed to build OCR client: {0}")]
    OcrClient(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    Monitors(String),

    #[error("Region ({left}, {top}) is not on any monitor")]
    OffScreen { left: i32, top: i32 },

    #[error("Failed to capture screen: {0}")]
    Capture(String),

    #[error("Captured region is empty after clamping to the monitor")]
    EmptyRegion,
}

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("OCR engine not found: {0}")]
    EngineMissing(String),

    #[error("OCR engine timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("Invalid recognition options: {0}")]
    Options(String),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ScreenshotWriteError {
    #[error("Failed to create screenshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save screenshot {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Error, Debug)]
pub enum AlertDeliveryError {
    #[error("Failed to spawn alert command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Alert command '{command}' exited with {status}")]
    Exit { command: String, status: String },

    #[error("Failed to ring bell: {0}")]
    Bell(#[source] std::io::Error),
}

/// Errors surfaced to the process by the CLI.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to list windows: {0}")]
    Windows(#[source] CaptureError),
}
