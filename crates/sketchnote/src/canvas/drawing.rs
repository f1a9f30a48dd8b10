//! Committed strokes and their serialized form.
//!
//! A drawing is stored as one string: the path of every stroke, in the order
//! the strokes were completed, joined by single spaces. Color is not part of
//! that string, so strokes read back from storage carry [`DEFAULT_COLOR`].

use super::palette::{Color, DEFAULT_COLOR};
use super::path::{format_points, parse_path, parse_points, PathCommand, PathError, Point};

/// A completed stroke.
///
/// The path text is kept verbatim so that strings read from storage are
/// written back exactly as they came in, even when they are malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    path: String,
    color: Color,
}

impl Stroke {
    /// Build a stroke from captured points.
    #[must_use]
    pub fn from_points(points: &[Point], color: Color) -> Self {
        Self {
            path: format_points(points),
            color,
        }
    }

    /// Wrap existing path text.
    #[must_use]
    pub fn from_path(path: impl Into<String>, color: Color) -> Self {
        Self {
            path: path.into(),
            color,
        }
    }

    /// The stroke's path text.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The color the stroke is drawn with.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Parse the path into drawing commands.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] if the stored path text is malformed.
    pub fn commands(&self) -> Result<Vec<PathCommand>, PathError> {
        parse_path(&self.path)
    }

    /// Parse the path into its points.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] if the stored path text is malformed.
    pub fn points(&self) -> Result<Vec<Point>, PathError> {
        parse_points(&self.path)
    }
}

/// The ordered list of committed strokes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    strokes: Vec<Stroke>,
}

impl Drawing {
    /// Create an empty drawing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a drawing from its serialized form.
    ///
    /// A new stroke begins at every token starting with `M`. Anything that
    /// precedes the first `M` is kept as a stroke of its own; it will fail
    /// to parse and is skipped when rendering. This never fails.
    #[must_use]
    pub fn deserialize(serialized: &str) -> Self {
        let mut strokes = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for token in serialized.split_whitespace() {
            if token.starts_with('M') && !current.is_empty() {
                strokes.push(Stroke::from_path(current.join(" "), DEFAULT_COLOR));
                current.clear();
            }
            current.push(token);
        }
        if !current.is_empty() {
            strokes.push(Stroke::from_path(current.join(" "), DEFAULT_COLOR));
        }

        Self { strokes }
    }

    /// Serialize to the stored string form.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.strokes
            .iter()
            .map(Stroke::path)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Append a completed stroke.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove and return the most recently completed stroke.
    pub fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// The strokes in completion order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of committed strokes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Whether there are no committed strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::palette::PALETTE;

    #[test]
    fn test_empty_serializes_to_empty_string() {
        assert_eq!(Drawing::new().serialize(), "");
        assert!(Drawing::deserialize("").is_empty());
        assert!(Drawing::deserialize("   ").is_empty());
    }

    #[test]
    fn test_deserialize_splits_on_move() {
        let drawing = Drawing::deserialize("M0,0 L5,5 M1,1 L2,2");
        assert_eq!(drawing.len(), 2);
        assert_eq!(drawing.strokes()[0].path(), "M0,0 L5,5");
        assert_eq!(drawing.strokes()[1].path(), "M1,1 L2,2");
    }

    #[test]
    fn test_round_trip_self_produced() {
        let mut drawing = Drawing::new();
        drawing.push(Stroke::from_points(
            &[Point::new(10.0, 10.0), Point::new(20.5, 10.0)],
            PALETTE[1],
        ));
        drawing.push(Stroke::from_points(&[Point::new(3.0, 4.0)], PALETTE[2]));

        let serialized = drawing.serialize();
        assert_eq!(serialized, "M10,10 L20.5,10 M3,4");
        assert_eq!(Drawing::deserialize(&serialized).serialize(), serialized);
    }

    #[test]
    fn test_deserialize_loses_color() {
        let mut drawing = Drawing::new();
        drawing.push(Stroke::from_points(&[Point::new(1.0, 1.0)], PALETTE[3]));
        let restored = Drawing::deserialize(&drawing.serialize());
        assert_eq!(restored.strokes()[0].color(), DEFAULT_COLOR);
    }

    #[test]
    fn test_deserialize_malformed_does_not_panic() {
        let drawing = Drawing::deserialize("garbage L1,1 M2,2 L3,3 Mx,y");
        assert_eq!(drawing.len(), 3);
        assert!(drawing.strokes()[0].commands().is_err());
        assert_eq!(drawing.strokes()[1].points().unwrap().len(), 2);
        assert!(drawing.strokes()[2].commands().is_err());
    }

    #[test]
    fn test_deserialize_normalizes_whitespace() {
        let drawing = Drawing::deserialize("  M0,0\tL1,1\n\nM2,2 ");
        assert_eq!(drawing.serialize(), "M0,0 L1,1 M2,2");
    }

    #[test]
    fn test_push_pop_order() {
        let mut drawing = Drawing::deserialize("M0,0 M1,1");
        let last = drawing.pop().unwrap();
        assert_eq!(last.path(), "M1,1");
        assert_eq!(drawing.serialize(), "M0,0");
        drawing.clear();
        assert!(drawing.pop().is_none());
    }

    #[test]
    fn test_stroke_points() {
        let stroke = Stroke::from_path("M1,2 L3,4 L5,6", DEFAULT_COLOR);
        assert_eq!(stroke.points().unwrap().len(), 3);
    }
}
