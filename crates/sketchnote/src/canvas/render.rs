//! Rendering strokes onto a vector surface.
//!
//! The canvas never draws pixels itself. It hands parsed path commands to a
//! [`RenderSurface`]; [`SvgSurface`] is the surface used by the CLI.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::geometry::CanvasSize;
use super::palette::Color;
use super::path::PathCommand;

/// Text shown in place of the canvas when no drawing surface exists.
pub const UNSUPPORTED_NOTICE: &str =
    "Drawing is only supported on devices with a drawing surface.";

/// Whether a native drawing surface is available on this platform.
///
/// Resolved once by the host and handed to the canvas at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceCapability {
    /// Strokes can be rendered.
    #[default]
    Available,
    /// No surface; a notice is shown instead.
    Unsupported,
}

impl SurfaceCapability {
    /// Map a boolean platform flag to a capability.
    #[must_use]
    pub fn from_flag(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unsupported
        }
    }

    /// Whether strokes can be rendered.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// The outcome of presenting a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Strokes were handed to the surface.
    Surface {
        /// How many strokes were drawn.
        drawn: usize,
        /// How many strokes were skipped because their path did not parse.
        skipped: usize,
    },
    /// The surface was never touched.
    Unsupported {
        /// Text to show the user.
        notice: &'static str,
    },
}

/// A 2D vector renderer that can stroke paths.
pub trait RenderSurface {
    /// Called once before any path of a frame is drawn.
    fn begin(&mut self, _size: CanvasSize) {}

    /// Stroke a path with the given color and line width.
    fn draw_path(&mut self, commands: &[PathCommand], color: Color, line_width: f64);
}

/// Parse and draw a sequence of paths, skipping those that do not parse.
///
/// Returns `(drawn, skipped)`.
pub fn render_paths<'a, S, I>(surface: &mut S, paths: I, line_width: f64) -> (usize, usize)
where
    S: RenderSurface + ?Sized,
    I: IntoIterator<Item = (&'a str, Color)>,
{
    let mut drawn = 0;
    let mut skipped = 0;
    for (path, color) in paths {
        if path.trim().is_empty() {
            skipped += 1;
            continue;
        }
        match super::path::parse_path(path) {
            Ok(commands) => {
                surface.draw_path(&commands, color, line_width);
                drawn += 1;
            }
            Err(err) => {
                trace!("Skipping unparsable stroke: {err}");
                skipped += 1;
            }
        }
    }
    (drawn, skipped)
}

/// A surface that builds a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    size: CanvasSize,
    body: String,
}

impl SvgSurface {
    /// Create an empty SVG surface of the given size.
    #[must_use]
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            body: String::new(),
        }
    }

    /// Number of `<path>` elements written so far.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.body.matches("<path ").count()
    }

    /// Produce the finished SVG document.
    #[must_use]
    pub fn finish(&self) -> String {
        let CanvasSize { width, height } = self.size;
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\">\n\
             <rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n\
             {body}</svg>\n",
            body = self.body
        )
    }
}

impl RenderSurface for SvgSurface {
    fn begin(&mut self, size: CanvasSize) {
        self.size = size;
        self.body.clear();
    }

    fn draw_path(&mut self, commands: &[PathCommand], color: Color, line_width: f64) {
        let d = commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        // Writing to a String cannot fail.
        let _ = writeln!(
            self.body,
            "<path d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{line_width}\" \
             stroke-linecap=\"round\" stroke-linejoin=\"round\"/>"
        );
    }
}
