use crate::error::AppError;
use crate::services::screen_capture::{list_windows, WindowInfo};

/// Print every top-level window with its rectangle
pub fn print_windows() -> Result<(), AppError> {
    let windows = list_windows().map_err(AppError::Windows)?;
    for window in &windows {
        println!("{}", format_window(window));
    }
    tracing::debug!(count = windows.len(), "Listed windows");
    Ok(())
}

fn format_window(window: &WindowInfo) -> String {
    let r = &window.region;
    format!(
        "id={} | {:?} | app={:?} | left={} top={} width={} height={}{}",
        window.id,
        window.title,
        window.app_name,
        r.left,
        r.top,
        r.width,
        r.height,
        if window.minimized { " (minimized)" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::Region;

    #[test]
    fn test_format_window() {
        let window = WindowInfo {
            id: 42,
            title: "Path of Exile".to_string(),
            app_name: "PathOfExile".to_string(),
            region: Region::new(-8, 0, 1936, 1056),
            minimized: false,
        };
        assert_eq!(
            format_window(&window),
            "id=42 | \"Path of Exile\" | app=\"PathOfExile\" | left=-8 top=0 width=1936 height=1056"
        );
    }

    #[test]
    fn test_format_minimized_window() {
        let window = WindowInfo {
            id: 1,
            title: String::new(),
            app_name: String::new(),
            region: Region::new(0, 0, 10, 10),
            minimized: true,
        };
        assert!(format_window(&window).ends_with("(minimized)"));
    }
}
