//! Path strings for strokes.
//!
//! A stroke drawn on the canvas is stored as absolute `M<x>,<y>` followed by
//! zero or more absolute `L<x>,<y>` segments, and formatting always produces
//! that canonical form (`M10,10 L20,10`). Stored strokes may come from other
//! clients, so parsing accepts any SVG path data: relative commands, `H`/`V`,
//! arcs and curves are simplified to absolute moves, lines and Béziers by
//! `svgtypes`.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use svgtypes::{SimplePathSegment, SimplifyingPathParser};
use thiserror::Error;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A single drawing command of a stroke path, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Start a stroke at a point.
    MoveTo(Point),
    /// Draw a straight segment to a point.
    LineTo(Point),
    /// Draw a quadratic Bézier segment.
    QuadTo {
        /// Control point.
        ctrl: Point,
        /// End point.
        to: Point,
    },
    /// Draw a cubic Bézier segment.
    CubicTo {
        /// First control point.
        ctrl1: Point,
        /// Second control point.
        ctrl2: Point,
        /// End point.
        to: Point,
    },
}

impl PathCommand {
    /// The point this command ends at.
    #[must_use]
    pub fn point(&self) -> Point {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => *p,
            Self::QuadTo { to, .. } | Self::CubicTo { to, .. } => *to,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => p.is_finite(),
            Self::QuadTo { ctrl, to } => ctrl.is_finite() && to.is_finite(),
            Self::CubicTo { ctrl1, ctrl2, to } => {
                ctrl1.is_finite() && ctrl2.is_finite() && to.is_finite()
            }
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveTo(p) => write!(f, "M{p}"),
            Self::LineTo(p) => write!(f, "L{p}"),
            Self::QuadTo { ctrl, to } => write!(f, "Q{ctrl} {to}"),
            Self::CubicTo { ctrl1, ctrl2, to } => write!(f, "C{ctrl1} {ctrl2} {to}"),
        }
    }
}

/// Why a path string could not be turned into commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path string contained no commands at all.
    #[error("path is empty")]
    Empty,

    /// The path data is not valid SVG path syntax.
    #[error("invalid path data: {0}")]
    Syntax(String),

    /// A coordinate overflowed to infinity.
    #[error("path has a non-finite coordinate")]
    NonFinite,
}

/// Format a point sequence as a canonical stroke path.
///
/// Returns an empty string for an empty sequence. A single point becomes a
/// lone `M` command with no trailing segment.
#[must_use]
pub fn format_points(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, point) in points.iter().enumerate() {
        let command = if i == 0 {
            PathCommand::MoveTo(*point)
        } else {
            out.push(' ');
            PathCommand::LineTo(*point)
        };
        // Writing to a String cannot fail.
        let _ = write!(out, "{command}");
    }
    out
}

/// Parse stroke path data into absolute commands.
///
/// Any SVG path data is accepted. Relative commands and `H`/`V` become
/// absolute lines, arcs and smooth curves become Béziers, and a close path
/// becomes a line back to the start of its subpath.
///
/// # Errors
///
/// Returns a [`PathError`] if the string has no commands, is not valid SVG
/// path data, or carries a coordinate that is not finite.
pub fn parse_path(input: &str) -> Result<Vec<PathCommand>, PathError> {
    let mut commands = Vec::new();
    let mut subpath_start = None;

    for segment in SimplifyingPathParser::from(input) {
        let segment = segment.map_err(|e| PathError::Syntax(e.to_string()))?;
        let command = match segment {
            SimplePathSegment::MoveTo { x, y } => {
                let start = Point::new(x, y);
                subpath_start = Some(start);
                PathCommand::MoveTo(start)
            }
            SimplePathSegment::LineTo { x, y } => PathCommand::LineTo(Point::new(x, y)),
            SimplePathSegment::Quadratic { x1, y1, x, y } => PathCommand::QuadTo {
                ctrl: Point::new(x1, y1),
                to: Point::new(x, y),
            },
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => PathCommand::CubicTo {
                ctrl1: Point::new(x1, y1),
                ctrl2: Point::new(x2, y2),
                to: Point::new(x, y),
            },
            SimplePathSegment::ClosePath => match subpath_start {
                Some(start) => PathCommand::LineTo(start),
                None => continue,
            },
        };
        if !command.is_finite() {
            return Err(PathError::NonFinite);
        }
        commands.push(command);
    }

    if commands.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(commands)
}

/// Extract the end points of a stroke's commands.
///
/// # Errors
///
/// See [`parse_path`].
pub fn parse_points(input: &str) -> Result<Vec<Point>, PathError> {
    Ok(parse_path(input)?.iter().map(PathCommand::point).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points_single() {
        assert_eq!(format_points(&[Point::new(10.0, 10.0)]), "M10,10");
    }

    #[test]
    fn test_format_points_multiple() {
        let points = [
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 20.0),
        ];
        assert_eq!(format_points(&points), "M10,10 L20,10 L20,20");
    }

    #[test]
    fn test_format_points_empty() {
        assert_eq!(format_points(&[]), "");
    }

    #[test]
    fn test_format_fractional_and_negative() {
        let points = [Point::new(10.5, -3.25), Point::new(0.1, 2.0)];
        assert_eq!(format_points(&points), "M10.5,-3.25 L0.1,2");
    }

    #[test]
    fn test_parse_canonical() {
        let commands = parse_path("M10,10 L20,10 L20,20").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo(Point::new(10.0, 10.0)),
                PathCommand::LineTo(Point::new(20.0, 10.0)),
                PathCommand::LineTo(Point::new(20.0, 20.0)),
            ]
        );
    }

    #[test]
    fn test_parse_whitespace_separated() {
        let points = parse_points("M 1 2 L 3.5 -4").unwrap();
        assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(3.5, -4.0)]);
    }

    #[test]
    fn test_parse_exponent() {
        let points = parse_points("M1e2,-2.5E-1").unwrap();
        assert_eq!(points, vec![Point::new(100.0, -0.25)]);
    }

    #[test]
    fn test_parse_round_trips_formatted() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(123.456, 78.9),
            Point::new(-1.5, 1e-3),
        ];
        let text = format_points(&points);
        assert_eq!(parse_points(&text).unwrap(), points);
        assert_eq!(format_points(&parse_points(&text).unwrap()), text);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_path(""), Err(PathError::Empty));
        assert_eq!(parse_path("   "), Err(PathError::Empty));
    }

    #[test]
    fn test_parse_must_start_with_move() {
        assert!(matches!(parse_path("L1,1"), Err(PathError::Syntax(_))));
    }

    #[test]
    fn test_parse_relative_and_axis_lines() {
        assert_eq!(
            parse_points("M0,0 l5,5").unwrap(),
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]
        );
        assert_eq!(
            parse_points("M0 0 H10 V10").unwrap(),
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0)
            ]
        );
        assert_eq!(
            parse_points("m1,1 h2 v3").unwrap(),
            vec![
                Point::new(1.0, 1.0),
                Point::new(3.0, 1.0),
                Point::new(3.0, 4.0)
            ]
        );
    }

    #[test]
    fn test_parse_compact_form() {
        assert_eq!(parse_path("M0,0L5,5").unwrap().len(), 2);
    }

    #[test]
    fn test_parse_curves() {
        let commands = parse_path("M0,0 C1,1 2,2 3,3 Q4,4 5,5").unwrap();
        assert_eq!(
            commands[1],
            PathCommand::CubicTo {
                ctrl1: Point::new(1.0, 1.0),
                ctrl2: Point::new(2.0, 2.0),
                to: Point::new(3.0, 3.0),
            }
        );
        assert_eq!(commands[2].point(), Point::new(5.0, 5.0));
        assert_eq!(commands[1].to_string(), "C1,1 2,2 3,3");
    }

    #[test]
    fn test_parse_close_returns_to_subpath_start() {
        let commands = parse_path("M1,1 L5,1 L5,5 Z").unwrap();
        assert_eq!(commands.last(), Some(&PathCommand::LineTo(Point::new(1.0, 1.0))));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_path("hello").is_err());
        assert!(parse_path("M").is_err());
        assert!(parse_path("M1").is_err());
        assert!(parse_path("M1,x").is_err());
        assert!(parse_path("12,12").is_err());
        assert!(parse_path("M1,2 L").is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert!(parse_path("MNaN,1").is_err());
        assert!(parse_path("M1e999,1").is_err());
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_path_error_display() {
        assert_eq!(PathError::Empty.to_string(), "path is empty");
        assert!(PathError::Syntax("bad".to_string())
            .to_string()
            .contains("bad"));
    }
}
