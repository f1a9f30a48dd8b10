//! Canvas sizing.

use serde::{Deserialize, Serialize};

/// Narrowest canvas computed from the viewport.
pub const MIN_WIDTH: f64 = 220.0;
/// Widest canvas computed from the viewport.
pub const MAX_WIDTH: f64 = 600.0;
/// Shortest canvas computed from the viewport.
pub const MIN_HEIGHT: f64 = 180.0;

const WIDTH_FRACTION: f64 = 0.95;
const HEIGHT_FRACTION: f64 = 0.35;

/// Dimensions of the area the canvas is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Available width.
    pub width: f64,
    /// Available height.
    pub height: f64,
}

/// Explicit size overrides supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeOverrides {
    /// Fixed canvas width, bypassing the viewport rule.
    pub width: Option<f64>,
    /// Fixed canvas height, bypassing the viewport rule.
    pub height: Option<f64>,
}

/// Resolved canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
}

impl CanvasSize {
    /// Resolve the canvas size for a viewport.
    ///
    /// Each dimension is computed on its own: an override wins outright,
    /// otherwise width is 95% of the viewport clamped to
    /// [`MIN_WIDTH`]..=[`MAX_WIDTH`] and height is 35% of the viewport but
    /// never below [`MIN_HEIGHT`]. No aspect ratio is kept.
    #[must_use]
    pub fn resolve(viewport: Viewport, overrides: SizeOverrides) -> Self {
        let width = overrides
            .width
            .unwrap_or_else(|| (viewport.width * WIDTH_FRACTION).clamp(MIN_WIDTH, MAX_WIDTH));
        let height = overrides
            .height
            .unwrap_or_else(|| (viewport.height * HEIGHT_FRACTION).max(MIN_HEIGHT));
        Self { width, height }
    }
}
