use crate::error::ConfigError;
use crate::models::config::{AppConfig, RegionSource, Settings};
use crate::models::region::Region;
use crate::services::config::ConfigManager;
use crate::services::matcher::build_matcher;
use crate::services::ocr::build_recognizer;
use std::path::PathBuf;

/// Validate the configuration and probe the OCR engine
pub async fn check_config(config_path: Option<PathBuf>) -> Result<(), ConfigError> {
    let manager = ConfigManager::new(config_path)?;
    let settings = manager.load_settings()?;
    build_matcher(
        settings.match_mode,
        settings.desired_outcomes(),
        settings.case_sensitive(),
    )?;

    println!("Config: {}", manager.config_file_path().display());
    for line in describe(&settings) {
        println!("  {}", line);
    }

    let recognizer = build_recognizer(&settings.recognizer)?;
    match recognizer.probe().await {
        Ok(version) => println!("OCR engine ({}): {}", recognizer.name(), version),
        Err(e) => println!("OCR engine ({}): unavailable - {}", recognizer.name(), e),
    }

    Ok(())
}

/// Write a starter configuration. Refuses to overwrite unless `force`.
pub fn init_config(config_path: Option<PathBuf>, force: bool) -> Result<PathBuf, ConfigError> {
    let path = match config_path {
        Some(path) => path,
        None => ConfigManager::platform_config_path()?,
    };
    let manager = ConfigManager::new(Some(path.clone()))?;

    if manager.config_exists() && !force {
        return Err(ConfigError::Write {
            path,
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "config already exists (use --force to overwrite)",
            ),
        });
    }

    manager.save(&starter_config())?;
    tracing::info!(path = %path.display(), "Wrote starter config");
    Ok(path)
}

fn starter_config() -> AppConfig {
    AppConfig {
        monitor_region: Some(Region::new(100, 100, 600, 200)),
        desired_outcomes: vec!["Exalted Orb".to_string(), "Divine Orb".to_string()],
        ..AppConfig::default()
    }
}

fn describe(settings: &Settings) -> Vec<String> {
    let region = match &settings.region_source {
        RegionSource::Fixed(region) => format!("region: {}", region),
        RegionSource::WindowTitle(title) => format!("region: window titled like {:?}", title),
    };
    vec![
        region,
        format!("desired_outcomes: {:?}", settings.desired_outcomes()),
        format!(
            "match: {:?}, case_sensitive: {}",
            settings.match_mode,
            settings.case_sensitive()
        ),
        format!(
            "poll_interval: {:?}, scale: {}",
            settings.poll_interval(),
            settings.scale()
        ),
        format!(
            "ocr: {:?} lang={} options={:?}",
            settings.recognizer.backend,
            settings.recognizer.lang,
            settings.recognition_options()
        ),
        if settings.screenshot_interval().is_zero() {
            "screenshots: disabled".to_string()
        } else {
            format!(
                "screenshots: every {:?} into {}",
                settings.screenshot_interval(),
                settings.screenshot_dir().display()
            )
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "craft-monitor-init-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("config.json")
    }

    #[test]
    fn test_starter_config_is_valid() {
        assert!(starter_config().validate().is_ok());
    }

    #[test]
    fn test_init_writes_and_refuses_overwrite() {
        let path = temp_path();

        let written = init_config(Some(path.clone()), false).unwrap();
        assert_eq!(written, path);
        assert!(ConfigManager::new(Some(path.clone()))
            .unwrap()
            .load_settings()
            .is_ok());

        assert!(init_config(Some(path.clone()), false).is_err());
        assert!(init_config(Some(path.clone()), true).is_ok());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_describe_settings() {
        let settings = starter_config().validate().unwrap();
        let lines = describe(&settings);
        assert!(lines[0].contains("left=100 top=100 width=600 height=200"));
        assert!(lines.iter().any(|l| l == "screenshots: disabled"));
    }
}
