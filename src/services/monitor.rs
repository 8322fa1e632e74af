use crate::models::config::{MonitorConfig, DEFAULT_ALERT_TITLE};
use crate::models::cycle::{AlertState, CycleResult, DebugTimerState};
use crate::services::alert::{Alert, Notifier};
use crate::services::debug_recorder::DebugRecorder;
use crate::services::matcher::OutcomeMatcher;
use crate::services::ocr::preprocessing::upscale;
use crate::services::ocr::Recognizer;
use crate::services::screen_capture::CaptureSource;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep, Instant};

/// Cooperative stop flag shared between the monitor and whoever stops it
#[derive(Clone, Default)]
pub struct StopSignal {
    stopped: Arc<Mutex<bool>>,
    notify: Arc<Notify>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        *self.stopped.lock() = true;
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// Resolves once [`StopSignal::stop`] has been called
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

/// Counters reported when the monitor stops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub capture_failures: u64,
    pub recognition_failures: u64,
    pub screenshots: u64,
    pub alerts: u64,
    pub alert_failures: u64,
}

/// Capture -> recognize -> match -> alert loop
pub struct OutcomeMonitor {
    config: MonitorConfig,
    capture: Box<dyn CaptureSource>,
    recognizer: Box<dyn Recognizer>,
    matcher: Box<dyn OutcomeMatcher>,
    notifier: Box<dyn Notifier>,
    recorder: DebugRecorder,
    alert_title: String,
    alert_state: AlertState,
    timer_state: DebugTimerState,
    stats: MonitorStats,
}

impl OutcomeMonitor {
    pub fn new(
        config: MonitorConfig,
        capture: Box<dyn CaptureSource>,
        recognizer: Box<dyn Recognizer>,
        matcher: Box<dyn OutcomeMatcher>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let recorder = DebugRecorder::new(
            config.screenshot_interval,
            config.screenshot_dir.clone(),
            config.region,
        );

        Self {
            config,
            capture,
            recognizer,
            matcher,
            notifier,
            recorder,
            alert_title: DEFAULT_ALERT_TITLE.to_string(),
            alert_state: AlertState::new(),
            timer_state: DebugTimerState::default(),
            stats: MonitorStats::default(),
        }
    }

    pub fn with_alert_title(mut self, title: impl Into<String>) -> Self {
        self.alert_title = title.into();
        self
    }

    pub fn alert_state(&self) -> &AlertState {
        &self.alert_state
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Run one capture -> recognize -> match -> alert iteration.
    ///
    /// Per-cycle failures are logged and recorded in the result; they never
    /// touch the alert state.
    pub async fn run_cycle(&mut self) -> CycleResult {
        self.stats.cycles += 1;
        let cycle = self.stats.cycles;
        let mut result = CycleResult::default();

        let image = match self.capture.capture(&self.config.region) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(
                    cycle,
                    phase = "capture",
                    region = %self.config.region,
                    error = %e,
                    "Capture failed"
                );
                self.stats.capture_failures += 1;
                result.capture_error = Some(e);
                return result;
            }
        };

        // Snapshot the unscaled capture regardless of what recognition does next
        let (timer_state, screenshot) =
            self.recorder.maybe_capture(&image, Instant::now(), self.timer_state);
        self.timer_state = timer_state;
        if screenshot.is_some() {
            self.stats.screenshots += 1;
        }
        result.screenshot = screenshot;

        let image = upscale(image, self.config.scale);

        let text = match self
            .recognizer
            .recognize(&image, &self.config.recognition_options)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    cycle,
                    phase = "recognition",
                    engine = self.recognizer.name(),
                    error = %e,
                    "OCR failed"
                );
                self.stats.recognition_failures += 1;
                result.recognition_error = Some(e);
                return result;
            }
        };
        tracing::debug!(cycle, "OCR output:\n{}", text);

        let matched: Vec<String> = self
            .matcher
            .find_matches(&text, &self.config.desired_outcomes)
            .into_iter()
            .filter(|outcome| self.config.desired_outcomes.contains(outcome))
            .collect();

        if matched.is_empty() {
            tracing::debug!(cycle, "No desired text found");
        }

        for outcome in &matched {
            if !self.alert_state.mark_alerted(outcome) {
                tracing::debug!(cycle, outcome = %outcome, "Match already alerted");
                continue;
            }

            tracing::info!(cycle, outcome = %outcome, "Desired outcome detected");
            self.stats.alerts += 1;
            result.newly_alerted.push(outcome.clone());

            let alert = Alert::for_outcome(&self.alert_title, outcome);
            if let Err(e) = self.notifier.notify(&alert).await {
                tracing::warn!(
                    cycle,
                    phase = "alert",
                    outcome = %outcome,
                    error = %e,
                    "Alert delivery failed"
                );
                self.stats.alert_failures += 1;
            }
        }

        result.raw_text = text;
        result.matched_outcomes = matched;
        result
    }

    /// Poll until `stop` fires, then release capture and recognition resources.
    ///
    /// Each cycle starts `poll_interval` after the previous one started; a
    /// cycle that overruns is followed immediately by the next.
    pub async fn run(mut self, stop: StopSignal) -> MonitorStats {
        tracing::info!(
            region = %self.config.region,
            outcomes = ?self.config.desired_outcomes,
            poll_interval = ?self.config.poll_interval,
            scale = self.config.scale,
            engine = self.recognizer.name(),
            "Starting monitor"
        );
        if self.recorder.is_enabled() {
            tracing::info!(
                dir = %self.recorder.dir().display(),
                interval = ?self.config.screenshot_interval,
                "Debug screenshots enabled"
            );
        }

        loop {
            if stop.is_stopped() {
                break;
            }

            let cycle_start = Instant::now();
            self.run_cycle().await;

            let elapsed = cycle_start.elapsed();
            if let Some(remaining) = self.config.poll_interval.checked_sub(elapsed) {
                tokio::select! {
                    _ = sleep(remaining) => {}
                    _ = stop.wait() => {}
                }
            }
        }

        self.capture.release();
        self.recognizer.release();

        let alerted: Vec<&str> = self.alert_state.iter().collect();
        tracing::info!(
            cycles = self.stats.cycles,
            capture_failures = self.stats.capture_failures,
            recognition_failures = self.stats.recognition_failures,
            screenshots = self.stats.screenshots,
            alerts = self.stats.alerts,
            alerted = ?alerted,
            "Stopping monitor"
        );

        self.stats
    }
}
