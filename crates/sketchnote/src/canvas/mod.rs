//! The stroke capture canvas.
//!
//! [`StrokeCanvas`] turns pointer events into strokes. It owns the committed
//! [`Drawing`], at most one in-progress stroke, and the palette selection.
//! Every mutating action (a stroke completed, an undo, a clear) reports the
//! new serialized drawing through the change callback; the canvas itself
//! never touches storage.
//!
//! ```
//! use sketchnote::canvas::{CanvasOptions, Point, StrokeCanvas};
//!
//! let mut canvas = StrokeCanvas::new("", CanvasOptions::default());
//! canvas.pointer_down(Point::new(10.0, 10.0));
//! canvas.pointer_move(Point::new(20.0, 10.0));
//! canvas.pointer_up();
//! assert_eq!(canvas.serialized(), "M10,10 L20,10");
//! ```

pub mod drawing;
pub mod geometry;
pub mod palette;
pub mod path;
pub mod render;

use std::fmt;

use tracing::debug;

pub use drawing::{Drawing, Stroke};
pub use geometry::{CanvasSize, SizeOverrides, Viewport};
pub use palette::{Color, PaletteSelection, DEFAULT_COLOR, PALETTE};
pub use path::{PathCommand, PathError, Point};
pub use render::{render_paths, Presentation, RenderSurface, SurfaceCapability, SvgSurface};

use crate::error::Result;

/// Line width used when none is configured.
pub const DEFAULT_LINE_WIDTH: f64 = 3.0;

/// Called with the serialized drawing after every mutating action.
pub type ChangeCallback = Box<dyn FnMut(&str) + Send>;

/// Whether a stroke is currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    /// No stroke in progress.
    Idle,
    /// One stroke in progress.
    Drawing,
}

/// A raw pointer or touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Contact started.
    Down(Point),
    /// Contact moved.
    Move(Point),
    /// Contact ended.
    Up,
}

/// Construction-time settings for a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOptions {
    /// Resolved canvas dimensions.
    pub size: CanvasSize,
    /// Width every stroke is rendered with.
    pub line_width: f64,
    /// Moves closer than this to the previous point are dropped.
    /// Zero keeps every move.
    pub min_segment_length: f64,
    /// Whether a drawing surface exists.
    pub capability: SurfaceCapability,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            size: CanvasSize::resolve(
                Viewport {
                    width: 390.0,
                    height: 844.0,
                },
                SizeOverrides::default(),
            ),
            line_width: DEFAULT_LINE_WIDTH,
            min_segment_length: 0.0,
            capability: SurfaceCapability::Available,
        }
    }
}

/// The stroke being drawn between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct InProgressStroke {
    points: Vec<Point>,
    color: Color,
}

impl InProgressStroke {
    /// Points captured so far.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The color the stroke was started with.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// The stroke's path text as it would be committed.
    #[must_use]
    pub fn path(&self) -> String {
        path::format_points(&self.points)
    }
}

/// Freehand drawing state for one editing session.
pub struct StrokeCanvas {
    drawing: Drawing,
    in_progress: Option<InProgressStroke>,
    palette: PaletteSelection,
    options: CanvasOptions,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for StrokeCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrokeCanvas")
            .field("drawing", &self.drawing)
            .field("in_progress", &self.in_progress)
            .field("palette", &self.palette)
            .field("options", &self.options)
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

impl StrokeCanvas {
    /// Create a canvas from a serialized drawing (possibly empty).
    #[must_use]
    pub fn new(initial: &str, options: CanvasOptions) -> Self {
        let drawing = Drawing::deserialize(initial);
        debug!("Canvas created with {} strokes", drawing.len());
        Self {
            drawing,
            in_progress: None,
            palette: PaletteSelection::default(),
            options,
            on_change: None,
        }
    }

    /// Install the change callback.
    #[must_use]
    pub fn with_change_callback(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Replace the change callback.
    pub fn set_change_callback(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Current state of the pointer state machine.
    #[must_use]
    pub fn state(&self) -> CanvasState {
        if self.in_progress.is_some() {
            CanvasState::Drawing
        } else {
            CanvasState::Idle
        }
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(point) => self.pointer_down(point),
            PointerEvent::Move(point) => self.pointer_move(point),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    /// Begin a new stroke at `point` with the selected color.
    ///
    /// An unfinished stroke is discarded.
    pub fn pointer_down(&mut self, point: Point) {
        if self.in_progress.is_some() {
            debug!("Pointer down while drawing; discarding unfinished stroke");
        }
        self.in_progress = Some(InProgressStroke {
            points: vec![point],
            color: self.palette.color(),
        });
    }

    /// Extend the stroke in progress. Ignored when idle.
    pub fn pointer_move(&mut self, point: Point) {
        let min = self.options.min_segment_length;
        let Some(stroke) = self.in_progress.as_mut() else {
            return;
        };
        if min > 0.0 {
            if let Some(last) = stroke.points.last() {
                if last.distance(&point) < min {
                    return;
                }
            }
        }
        stroke.points.push(point);
    }

    /// Commit the stroke in progress, if any, and emit the new drawing.
    pub fn pointer_up(&mut self) {
        let Some(stroke) = self.in_progress.take() else {
            return;
        };
        if stroke.points.is_empty() {
            return;
        }
        self.drawing
            .push(Stroke::from_points(&stroke.points, stroke.color));
        debug!(
            "Committed stroke with {} points ({} total)",
            stroke.points.len(),
            self.drawing.len()
        );
        self.emit();
    }

    /// Remove the most recently committed stroke.
    ///
    /// Returns `false` (and emits nothing) when there is nothing to undo.
    /// The stroke in progress is never affected.
    pub fn undo(&mut self) -> bool {
        if self.drawing.pop().is_none() {
            return false;
        }
        debug!("Undo; {} strokes remain", self.drawing.len());
        self.emit();
        true
    }

    /// Remove every stroke, including the one in progress, and emit `""`.
    pub fn clear(&mut self) {
        self.drawing.clear();
        self.in_progress = None;
        debug!("Canvas cleared");
        self.emit();
    }

    /// Select the palette entry for the next stroke.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not a palette position.
    pub fn select_color(&mut self, index: usize) -> Result<Color> {
        self.palette.select(index)
    }

    /// The color the next stroke will use.
    #[must_use]
    pub fn selected_color(&self) -> Color {
        self.palette.color()
    }

    /// The committed drawing.
    #[must_use]
    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// The stroke in progress, if any.
    #[must_use]
    pub fn in_progress(&self) -> Option<&InProgressStroke> {
        self.in_progress.as_ref()
    }

    /// Serialized form of the committed drawing.
    #[must_use]
    pub fn serialized(&self) -> String {
        self.drawing.serialize()
    }

    /// The canvas options.
    #[must_use]
    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    /// Render the canvas, or report that no surface is available.
    ///
    /// Committed strokes are drawn in order, then the stroke in progress.
    /// Strokes whose path does not parse are skipped.
    pub fn present<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> Presentation {
        if !self.options.capability.is_available() {
            return Presentation::Unsupported {
                notice: render::UNSUPPORTED_NOTICE,
            };
        }

        surface.begin(self.options.size);
        let in_progress = self.in_progress.as_ref().map(|s| (s.path(), s.color));
        let committed = self.drawing.strokes().iter().map(|s| (s.path(), s.color()));
        let current = in_progress.as_ref().map(|(p, c)| (p.as_str(), *c));
        let (drawn, skipped) =
            render::render_paths(surface, committed.chain(current), self.options.line_width);
        Presentation::Surface { drawn, skipped }
    }

    fn emit(&mut self) {
        let serialized = self.drawing.serialize();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&serialized);
        }
    }
}
