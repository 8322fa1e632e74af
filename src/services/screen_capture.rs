use crate::error::CaptureError;
use crate::models::region::Region;
use image::DynamicImage;
use xcap::{Monitor, Window};

/// Produces a raster image of a screen region
pub trait CaptureSource: Send {
    fn capture(&mut self, region: &Region) -> Result<DynamicImage, CaptureError>;

    /// Release any OS handles. Called once when the monitor stops.
    fn release(&mut self) {}
}

/// Geometry of one attached display, in the same coordinate space as [`Region`]
#[derive(Debug, Clone, Copy, PartialEq)]
struct DisplayBounds {
    bounds: Region,
    scale_factor: f64,
}

impl DisplayBounds {
    fn of(monitor: &Monitor) -> Result<Self, CaptureError> {
        let err = |e: xcap::XCapError| CaptureError::Monitors(e.to_string());
        Ok(Self {
            bounds: Region::new(
                monitor.x().map_err(err)?,
                monitor.y().map_err(err)?,
                monitor.width().map_err(err)?,
                monitor.height().map_err(err)?,
            ),
            scale_factor: monitor.scale_factor().unwrap_or(1.0) as f64,
        })
    }

    /// Crop rectangle in captured-image pixels. Logical offsets from the
    /// display origin are scaled to physical pixels.
    fn crop_rect(&self, region: &Region) -> (u32, u32, u32, u32) {
        let dx = (region.left as i64 - self.bounds.left as i64).max(0) as f64;
        let dy = (region.top as i64 - self.bounds.top as i64).max(0) as f64;
        (
            (dx * self.scale_factor) as u32,
            (dy * self.scale_factor) as u32,
            (region.width as f64 * self.scale_factor) as u32,
            (region.height as f64 * self.scale_factor) as u32,
        )
    }
}

/// xcap monitor handle that can move into the monitor task
///
/// SAFETY: the handle refers to an OS display resource and is only used for
/// read-only capture calls from one task at a time.
#[derive(Clone)]
struct SendMonitor(Monitor);

unsafe impl Send for SendMonitor {}

/// Screen capture service using xcap
#[derive(Default)]
pub struct ScreenCapture {
    monitors: Option<Vec<SendMonitor>>,
}

impl ScreenCapture {
    pub fn new() -> Self {
        Self { monitors: None }
    }

    fn monitors(&mut self) -> Result<&[SendMonitor], CaptureError> {
        if self.monitors.is_none() {
            let monitors = Monitor::all().map_err(|e| CaptureError::Monitors(e.to_string()))?;
            tracing::debug!(count = monitors.len(), "Enumerated monitors");
            self.monitors = Some(monitors.into_iter().map(SendMonitor).collect());
        }
        Ok(self.monitors.as_deref().unwrap_or_default())
    }

    fn capture_from(&mut self, region: &Region) -> Result<DynamicImage, CaptureError> {
        let monitor = self
            .monitors()?
            .iter()
            .find(|m| {
                DisplayBounds::of(&m.0)
                    .map(|d| d.bounds.contains(region.left, region.top))
                    .unwrap_or(false)
            })
            .cloned()
            .ok_or(CaptureError::OffScreen {
                left: region.left,
                top: region.top,
            })?;

        let display = DisplayBounds::of(&monitor.0)?;
        let rgba_image = monitor
            .0
            .capture_image()
            .map_err(|e| CaptureError::Capture(e.to_string()))?;
        let image = DynamicImage::ImageRgba8(rgba_image);

        let (x, y, w, h) = display.crop_rect(region);
        let w = w.min(image.width().saturating_sub(x));
        let h = h.min(image.height().saturating_sub(y));
        if w == 0 || h == 0 {
            return Err(CaptureError::EmptyRegion);
        }

        let scale = display.scale_factor;
        tracing::trace!(x, y, w, h, scale, "Cropping capture");
        Ok(image.crop_imm(x, y, w, h))
    }
}

impl CaptureSource for ScreenCapture {
    fn capture(&mut self, region: &Region) -> Result<DynamicImage, CaptureError> {
        let result = self.capture_from(region);
        if result.is_err() {
            // Displays may have been attached or removed; enumerate again next time
            self.monitors = None;
        }
        result
    }

    fn release(&mut self) {
        self.monitors = None;
    }
}

/// A top-level window and its rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: u32,
    pub title: String,
    pub app_name: String,
    pub region: Region,
    pub minimized: bool,
}

/// Enumerate top-level windows
pub fn list_windows() -> Result<Vec<WindowInfo>, CaptureError> {
    let windows = Window::all().map_err(|e| CaptureError::Monitors(e.to_string()))?;

    let infos = windows
        .iter()
        .filter_map(|w| {
            let info = WindowInfo {
                id: w.id().ok()?,
                title: w.title().unwrap_or_default(),
                app_name: w.app_name().unwrap_or_default(),
                region: Region::new(w.x().ok()?, w.y().ok()?, w.width().ok()?, w.height().ok()?),
                minimized: w.is_minimized().unwrap_or(false),
            };
            Some(info)
        })
        .collect();

    Ok(infos)
}

/// First visible window whose title contains `needle` (case-insensitive)
pub fn find_window_region(windows: &[WindowInfo], needle: &str) -> Option<Region> {
    let needle = needle.to_lowercase();
    windows
        .iter()
        .find(|w| {
            !w.minimized && w.region.is_valid() && w.title.to_lowercase().contains(&needle)
        })
        .map(|w| w.region)
}
