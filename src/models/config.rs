use crate::error::ConfigError;
use crate::models::region::Region;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_WINDOW_TITLE: &str = "Path of Exile";
pub const DEFAULT_POLL_INTERVAL: f64 = 0.8;
pub const DEFAULT_SCREENSHOT_DIR: &str = "logs/screenshots";
pub const DEFAULT_TESSERACT_CONFIG: &str = "--psm 6";
pub const DEFAULT_OCR_SERVER_URL: &str = "http://127.0.0.1:39835";
pub const DEFAULT_ALERT_TITLE: &str = "Desired outcome detected";
/// Upper bound for `scale`
pub const MAX_SCALE: f64 = 8.0;

/// OCR backend choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    #[default]
    Tesseract,
    Http,
}

/// How desired outcomes are compared against recognized text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Substring,
    Regex,
}

/// Configuration document as written on disk.
///
/// Every key is optional so that a partial document picks up defaults;
/// [`AppConfig::validate`] turns it into settings the monitor can trust.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub monitor_region: Option<Region>,
    pub window_title_substring: Option<String>,
    pub window_title_poll: f64,
    pub scale: f64,
    pub poll_interval: f64,
    pub ocr_backend: OcrBackend,
    pub ocr_lang: String,
    pub tesseract_cmd: Option<String>,
    pub tesseract_config: String,
    pub ocr_server_url: String,
    pub ocr_timeout: f64,
    pub desired_outcomes: Vec<String>,
    pub case_sensitive: bool,
    pub match_mode: MatchMode,
    pub screenshot_interval: f64,
    pub screenshot_dir: PathBuf,
    pub alert_title: String,
    pub alert_bell: bool,
    pub alert_command: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor_region: None,
            window_title_substring: None,
            window_title_poll: 3.0,
            scale: 1.0,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ocr_backend: OcrBackend::Tesseract,
            ocr_lang: "eng".to_string(),
            tesseract_cmd: None,
            tesseract_config: DEFAULT_TESSERACT_CONFIG.to_string(),
            ocr_server_url: DEFAULT_OCR_SERVER_URL.to_string(),
            ocr_timeout: 10.0,
            desired_outcomes: Vec::new(),
            case_sensitive: false,
            match_mode: MatchMode::Substring,
            screenshot_interval: 0.0,
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            alert_title: DEFAULT_ALERT_TITLE.to_string(),
            alert_bell: true,
            alert_command: None,
        }
    }
}

/// Where the capture region comes from
#[derive(Debug, Clone, PartialEq)]
pub enum RegionSource {
    Fixed(Region),
    WindowTitle(String),
}

/// Recognizer construction settings
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerSettings {
    pub backend: OcrBackend,
    pub lang: String,
    pub tesseract_cmd: Option<String>,
    pub server_url: String,
    pub timeout: Duration,
}

/// Alert delivery settings
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub title: String,
    pub bell: bool,
    pub command: Option<Vec<String>>,
}

/// Validated configuration, before the region is resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub region_source: RegionSource,
    pub window_title_poll: Duration,
    pub recognizer: RecognizerSettings,
    pub match_mode: MatchMode,
    pub alert: AlertSettings,
    monitor: MonitorTemplate,
}

#[derive(Debug, Clone, PartialEq)]
struct MonitorTemplate {
    scale: f64,
    poll_interval: Duration,
    recognition_options: String,
    desired_outcomes: Vec<String>,
    screenshot_interval: Duration,
    screenshot_dir: PathBuf,
    case_sensitive: bool,
}

impl Settings {
    /// Fix the region and produce the immutable per-run monitor config
    pub fn monitor_config(&self, region: Region) -> MonitorConfig {
        let t = &self.monitor;
        MonitorConfig {
            region,
            scale: t.scale,
            poll_interval: t.poll_interval,
            recognition_options: t.recognition_options.clone(),
            desired_outcomes: t.desired_outcomes.clone(),
            screenshot_interval: t.screenshot_interval,
            screenshot_dir: t.screenshot_dir.clone(),
            case_sensitive: t.case_sensitive,
        }
    }

    pub fn desired_outcomes(&self) -> &[String] {
        &self.monitor.desired_outcomes
    }

    pub fn case_sensitive(&self) -> bool {
        self.monitor.case_sensitive
    }

    pub fn scale(&self) -> f64 {
        self.monitor.scale
    }

    pub fn poll_interval(&self) -> Duration {
        self.monitor.poll_interval
    }

    pub fn recognition_options(&self) -> &str {
        &self.monitor.recognition_options
    }

    pub fn screenshot_interval(&self) -> Duration {
        self.monitor.screenshot_interval
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.monitor.screenshot_dir
    }
}

/// Immutable configuration for one monitor run
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub region: Region,
    pub scale: f64,
    pub poll_interval: Duration,
    /// Passed through to the recognizer untouched
    pub recognition_options: String,
    /// Order is reporting priority
    pub desired_outcomes: Vec<String>,
    /// Zero disables debug screenshots
    pub screenshot_interval: Duration,
    pub screenshot_dir: PathBuf,
    pub case_sensitive: bool,
}

impl MonitorConfig {
    pub fn new(region: Region, desired_outcomes: Vec<String>) -> Self {
        Self {
            region,
            scale: 1.0,
            poll_interval: Duration::from_secs_f64(DEFAULT_POLL_INTERVAL),
            recognition_options: DEFAULT_TESSERACT_CONFIG.to_string(),
            desired_outcomes,
            screenshot_interval: Duration::ZERO,
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            case_sensitive: false,
        }
    }
}

fn seconds(field: &'static str, value: f64, allow_zero: bool) -> Result<Duration, ConfigError> {
    let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if !ok {
        return Err(ConfigError::OutOfRange {
            field,
            requirement: if allow_zero { ">= 0 seconds" } else { "> 0 seconds" },
            value,
        });
    }
    Ok(Duration::from_secs_f64(value))
}

fn check_server_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidServerUrl {
        url: url.to_string(),
        message,
    };
    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

impl AppConfig {
    /// Validate the document into [`Settings`]
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let region_source = match (self.monitor_region, self.window_title_substring) {
            (Some(region), _) => {
                if !region.is_valid() {
                    return Err(ConfigError::InvalidRegion(format!(
                        "width and height must be positive ({})",
                        region
                    )));
                }
                RegionSource::Fixed(region)
            }
            (None, Some(title)) if !title.trim().is_empty() => RegionSource::WindowTitle(title),
            (None, Some(_)) => return Err(ConfigError::MissingRegion),
            (None, None) => RegionSource::WindowTitle(DEFAULT_WINDOW_TITLE.to_string()),
        };

        if self.desired_outcomes.is_empty() {
            return Err(ConfigError::EmptyOutcomes);
        }
        if let Some(index) = self.desired_outcomes.iter().position(|o| o.is_empty()) {
            return Err(ConfigError::BlankOutcome(index));
        }

        if !(self.scale.is_finite() && (1.0..=MAX_SCALE).contains(&self.scale)) {
            return Err(ConfigError::OutOfRange {
                field: "scale",
                requirement: "between 1 and 8",
                value: self.scale,
            });
        }

        if shlex::split(&self.tesseract_config).is_none() {
            return Err(ConfigError::InvalidOptions(self.tesseract_config));
        }
        if self.ocr_backend == OcrBackend::Http {
            check_server_url(&self.ocr_server_url)?;
        }

        let poll_interval = seconds("poll_interval", self.poll_interval, false)?;
        let screenshot_interval = seconds("screenshot_interval", self.screenshot_interval, true)?;
        let window_title_poll = seconds("window_title_poll", self.window_title_poll, false)?;
        let timeout = seconds("ocr_timeout", self.ocr_timeout, false)?;

        Ok(Settings {
            region_source,
            window_title_poll,
            recognizer: RecognizerSettings {
                backend: self.ocr_backend,
                lang: self.ocr_lang,
                tesseract_cmd: self.tesseract_cmd.filter(|c| !c.trim().is_empty()),
                server_url: self.ocr_server_url,
                timeout,
            },
            match_mode: self.match_mode,
            alert: AlertSettings {
                title: self.alert_title,
                bell: self.alert_bell,
                command: self.alert_command.filter(|argv| !argv.is_empty()),
            },
            monitor: MonitorTemplate {
                scale: self.scale,
                poll_interval,
                recognition_options: self.tesseract_config,
                desired_outcomes: self.desired_outcomes,
                screenshot_interval,
                screenshot_dir: self.screenshot_dir,
                case_sensitive: self.case_sensitive,
            },
        })
    }
}
