use crate::error::ScreenshotWriteError;
use crate::models::cycle::DebugTimerState;
use crate::models::region::Region;
use image::DynamicImage;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

pub const INDEX_FILE_NAME: &str = "saved_files.txt";

/// Periodically persists the captured image for tuning the region.
///
/// Runs independently of matching: whatever was captured this cycle is
/// written once the interval has elapsed.
pub struct DebugRecorder {
    interval: Duration,
    dir: PathBuf,
    region: Region,
}

impl DebugRecorder {
    pub fn new(interval: Duration, dir: impl Into<PathBuf>, region: Region) -> Self {
        Self {
            interval,
            dir: dir.into(),
            region,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a screenshot should be taken at `now`
    pub fn is_due(&self, now: Instant, state: &DebugTimerState) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match state.last_screenshot_time {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Write `image` if due. Returns the new timer state and the written path.
    ///
    /// The timer only advances on a successful write; failures are logged.
    pub fn maybe_capture(
        &self,
        image: &DynamicImage,
        now: Instant,
        state: DebugTimerState,
    ) -> (DebugTimerState, Option<PathBuf>) {
        if !self.is_due(now, &state) {
            return (state, None);
        }

        match self.write(image, state.written) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Saved screenshot");
                self.append_index(&path);
                let next = DebugTimerState {
                    last_screenshot_time: Some(now),
                    written: state.written + 1,
                };
                (next, Some(path))
            }
            Err(e) => {
                tracing::warn!(phase = "screenshot", error = %e, "Failed to save screenshot");
                (state, None)
            }
        }
    }

    /// `screenshot_<timestamp>_<seq>_L<left>_T<top>_W<width>_H<height>.png`
    fn file_name(&self, sequence: u64) -> String {
        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        let r = &self.region;
        format!(
            "screenshot_{}_{:05}_L{}_T{}_W{}_H{}.png",
            ts, sequence, r.left, r.top, r.width, r.height
        )
    }

    fn write(&self, image: &DynamicImage, sequence: u64) -> Result<PathBuf, ScreenshotWriteError> {
        fs::create_dir_all(&self.dir).map_err(|source| ScreenshotWriteError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(self.file_name(sequence));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| ScreenshotWriteError::Save {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    fn append_index(&self, path: &Path) {
        let index = self.dir.join(INDEX_FILE_NAME);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&index)
            .and_then(|mut file| writeln!(file, "{}", path.display()));

        if let Err(e) = result {
            tracing::warn!(
                path = %index.display(),
                error = %e,
                "Failed to write screenshot index"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn test_dir() -> PathBuf {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "craft-monitor-recorder-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([200, 30, 30])))
    }

    fn png_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
                    .count()
            })
            .unwrap_or(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_recorder_never_writes() {
        let dir = test_dir();
        let recorder = DebugRecorder::new(Duration::ZERO, &dir, Region::new(0, 0, 16, 8));

        let (state, path) =
            recorder.maybe_capture(&test_image(), Instant::now(), DebugTimerState::default());
        assert!(path.is_none());
        assert_eq!(state, DebugTimerState::default());
        assert!(!dir.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_capture_creates_directory() {
        let dir = test_dir().join("nested");
        let recorder =
            DebugRecorder::new(Duration::from_secs(5), &dir, Region::new(10, 20, 16, 8));

        let now = Instant::now();
        let (state, path) = recorder.maybe_capture(&test_image(), now, DebugTimerState::default());
        let path = path.expect("first capture should write");

        assert!(path.exists());
        assert_eq!(state.last_screenshot_time, Some(now));
        assert_eq!(state.written, 1);

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("screenshot_"));
        assert!(name.ends_with("_L10_T20_W16_H8.png"));

        let index = fs::read_to_string(dir.join(INDEX_FILE_NAME)).unwrap();
        assert_eq!(index.lines().count(), 1);

        let _ = fs::remove_dir_all(dir.parent().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_gates_writes() {
        let dir = test_dir();
        let recorder =
            DebugRecorder::new(Duration::from_secs(5), &dir, Region::new(0, 0, 16, 8));
        let image = test_image();
        let start = Instant::now();

        let (state, first) = recorder.maybe_capture(&image, start, DebugTimerState::default());
        assert!(first.is_some());

        let (state, early) = recorder.maybe_capture(&image, start + Duration::from_secs(4), state);
        assert!(early.is_none());

        let (state, due) = recorder.maybe_capture(&image, start + Duration::from_secs(5), state);
        assert!(due.is_some());
        assert_eq!(state.written, 2);

        // Names stay unique even when taken within the same millisecond
        let (_, third) = recorder.maybe_capture(&image, start + Duration::from_secs(10), state);
        assert_ne!(due, third);
        assert_eq!(png_count(&dir), 3);

        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_keeps_state() {
        let base = test_dir();
        fs::create_dir_all(&base).unwrap();
        // A regular file where the directory should be
        let blocked = base.join("not-a-dir");
        fs::write(&blocked, b"x").unwrap();

        let recorder =
            DebugRecorder::new(Duration::from_secs(1), &blocked, Region::new(0, 0, 16, 8));
        let state = DebugTimerState::default();
        let (after, path) = recorder.maybe_capture(&test_image(), Instant::now(), state);

        assert!(path.is_none());
        assert_eq!(after, state);

        let _ = fs::remove_dir_all(base);
    }
}
