use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; zero-height sizes report an aspect of 1.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel-space rectangle with a bottom-left origin.
///
/// A negative `height` draws the source vertically flipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn is_flipped(&self) -> bool {
        self.height < 0.0
    }

    /// Lowest y covered by the rectangle, regardless of flip.
    pub fn bottom(&self) -> f32 {
        self.y.min(self.y + self.height)
    }
}
