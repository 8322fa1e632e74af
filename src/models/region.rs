use serde::{Deserialize, Serialize};
use std::fmt;

/// Screen rectangle to capture, in absolute screen coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a new region from coordinates
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Validate region dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Check if the region contains a point
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && (x as i64) < self.right() && y >= self.top && (y as i64) < self.bottom()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left={} top={} width={} height={}",
            self.left, self.top, self.width, self.height
        )
    }
}
