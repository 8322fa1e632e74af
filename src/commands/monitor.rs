use crate::error::ConfigError;
use crate::models::config::{RegionSource, Settings};
use crate::models::region::Region;
use crate::services::alert::DesktopNotifier;
use crate::services::config::ConfigManager;
use crate::services::matcher::build_matcher;
use crate::services::monitor::{MonitorStats, OutcomeMonitor, StopSignal};
use crate::services::ocr::build_recognizer;
use crate::services::screen_capture::{find_window_region, list_windows, ScreenCapture};
use std::path::PathBuf;
use tokio::time::sleep;

/// Load the configuration and run the monitor until Ctrl-C.
///
/// Only configuration problems end the run early; everything that fails
/// inside a cycle is logged and retried.
pub async fn run_monitor(config_path: Option<PathBuf>) -> Result<MonitorStats, ConfigError> {
    let manager = ConfigManager::new(config_path)?;
    tracing::info!(path = %manager.config_file_path().display(), "Loading config");
    let settings = manager.load_settings()?;

    // Matcher and recognizer problems surface before any waiting
    let matcher = build_matcher(
        settings.match_mode,
        settings.desired_outcomes(),
        settings.case_sensitive(),
    )?;
    let recognizer = build_recognizer(&settings.recognizer)?;
    match recognizer.probe().await {
        Ok(version) => tracing::info!(engine = recognizer.name(), "{}", version),
        Err(e) => tracing::warn!(engine = recognizer.name(), error = %e, "OCR engine probe failed"),
    }

    let stop = StopSignal::new();
    spawn_ctrl_c_handler(stop.clone());

    let Some(region) = resolve_region(&settings, &stop).await? else {
        tracing::info!("Stopped before a capture region was found");
        return Ok(MonitorStats::default());
    };

    let monitor = OutcomeMonitor::new(
        settings.monitor_config(region),
        Box::new(ScreenCapture::new()),
        recognizer,
        matcher,
        Box::new(DesktopNotifier::new(&settings.alert)),
    )
    .with_alert_title(settings.alert.title.clone());

    Ok(monitor.run(stop).await)
}

fn spawn_ctrl_c_handler(stop: StopSignal) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping monitor");
                stop.stop();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

/// Resolve the capture region once. A window lookup is retried until the
/// window appears; `None` means the stop signal fired first.
pub async fn resolve_region(
    settings: &Settings,
    stop: &StopSignal,
) -> Result<Option<Region>, ConfigError> {
    let title = match &settings.region_source {
        RegionSource::Fixed(region) => return Ok(Some(*region)),
        RegionSource::WindowTitle(title) => title,
    };

    tracing::info!(title = %title, "Looking for window");
    loop {
        if stop.is_stopped() {
            return Ok(None);
        }

        match list_windows() {
            Ok(windows) => {
                if let Some(region) = find_window_region(&windows, title) {
                    tracing::info!(title = %title, region = %region, "Found window");
                    return Ok(Some(region));
                }
                tracing::warn!(
                    title = %title,
                    "Could not find window. Start the game or set monitor_region in the config"
                );
            }
            Err(e) => tracing::warn!(error = %e, "Failed to enumerate windows"),
        }

        tokio::select! {
            _ = sleep(settings.window_title_poll) => {}
            _ = stop.wait() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::AppConfig;

    #[tokio::test]
    async fn test_fixed_region_resolves_immediately() {
        let settings = AppConfig {
            monitor_region: Some(Region::new(5, 6, 7, 8)),
            desired_outcomes: vec!["Orb".to_string()],
            ..AppConfig::default()
        }
        .validate()
        .unwrap();

        let region = resolve_region(&settings, &StopSignal::new()).await.unwrap();
        assert_eq!(region, Some(Region::new(5, 6, 7, 8)));
    }

    #[tokio::test]
    async fn test_window_lookup_stops_on_signal() {
        let settings = AppConfig {
            window_title_substring: Some("no window has this title 8c1f0e".to_string()),
            desired_outcomes: vec!["Orb".to_string()],
            ..AppConfig::default()
        }
        .validate()
        .unwrap();

        let stop = StopSignal::new();
        stop.stop();
        let region = resolve_region(&settings, &stop).await.unwrap();
        assert_eq!(region, None);
    }

    fn temp_config(contents: &str) -> PathBuf {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "craft-monitor-run-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_monitor_missing_config_is_fatal() {
        let path = std::env::temp_dir().join("craft-monitor-missing-config-3f9a.json");
        let result = run_monitor(Some(path)).await;
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_run_monitor_startup_failures_are_config_errors() {
        let region = r#""monitor_region": {"left": 0, "top": 0, "width": 10, "height": 10}"#;
        let cases = [
            (r#""desired_outcomes": ["Orb"], "scale": 50"#, "scale"),
            (
                r#""desired_outcomes": ["Orb"], "ocr_backend": "http", "ocr_server_url": "::nope""#,
                "url",
            ),
            (r#""desired_outcomes": ["(unclosed"], "match_mode": "regex""#, "regex"),
        ];

        for (extra, label) in cases {
            let path = temp_config(&format!("{{{}, {}}}", region, extra));
            let result = run_monitor(Some(path.clone())).await;
            match (label, result) {
                ("scale", Err(ConfigError::OutOfRange { field: "scale", .. })) => {}
                ("url", Err(ConfigError::InvalidServerUrl { .. })) => {}
                ("regex", Err(ConfigError::InvalidPattern { .. })) => {}
                (label, other) => panic!("{}: unexpected result {:?}", label, other),
            }
            let _ = std::fs::remove_dir_all(path.parent().unwrap());
        }
    }
}
