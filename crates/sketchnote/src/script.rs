//! Pointer scripts.
//!
//! A pointer script is a line-oriented text file replayed into a
//! [`StrokeCanvas`], used by `sknote draw` to edit drawings without a
//! touch surface:
//!
//! ```text
//! # a right angle
//! color 3
//! down 10 10
//! move 20 10
//! move 20 20
//! up
//! undo
//! clear
//! ```
//!
//! Coordinates may be separated by whitespace or a comma. `color` takes a
//! palette index or one of the palette's hex colors. A line starting with
//! `#`, or a `#` followed by a space, begins a comment.

use crate::canvas::{Color, Point, PointerEvent, StrokeCanvas, PALETTE};
use crate::error::{Error, Result};

/// One action of a pointer script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptCommand {
    /// A pointer event.
    Pointer(PointerEvent),
    /// Remove the last committed stroke.
    Undo,
    /// Remove every stroke.
    Clear,
    /// Select a palette entry by index.
    Color(usize),
}

/// A command together with the line it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    /// 1-based source line.
    pub line: usize,
    /// The parsed command.
    pub command: ScriptCommand,
}

/// What a replay did to the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Strokes committed.
    pub strokes: usize,
    /// Undo commands that removed a stroke.
    pub undone: usize,
    /// Clear commands executed.
    pub clears: usize,
}

/// Parse a pointer script.
///
/// # Errors
///
/// Returns a script error naming the first offending line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }

        let mut words = content.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words
            .flat_map(|w| w.split(','))
            .filter(|w| !w.is_empty())
            .collect();

        let command = match keyword.to_ascii_lowercase().as_str() {
            "down" => ScriptCommand::Pointer(PointerEvent::Down(point_arg(line, &args)?)),
            "move" => ScriptCommand::Pointer(PointerEvent::Move(point_arg(line, &args)?)),
            "up" => no_args(line, keyword, &args, ScriptCommand::Pointer(PointerEvent::Up))?,
            "undo" => no_args(line, keyword, &args, ScriptCommand::Undo)?,
            "clear" => no_args(line, keyword, &args, ScriptCommand::Clear)?,
            "color" => ScriptCommand::Color(color_arg(line, &args)?),
            other => return Err(Error::script(line, format!("unknown command '{other}'"))),
        };
        steps.push(ScriptStep { line, command });
    }
    Ok(steps)
}

/// Drop a comment: a whole line starting with `#`, or a `#` standing alone
/// as a word. `#` glued to a word is a hex color.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (i, _) in line.match_indices('#') {
        let preceded = i > 0 && bytes[i - 1].is_ascii_whitespace();
        let followed = bytes.get(i + 1).map_or(true, u8::is_ascii_whitespace);
        if preceded && followed {
            return &line[..i];
        }
    }
    line
}

fn no_args(
    line: usize,
    keyword: &str,
    args: &[&str],
    command: ScriptCommand,
) -> Result<ScriptCommand> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(Error::script(line, format!("'{keyword}' takes no arguments")))
    }
}

fn point_arg(line: usize, args: &[&str]) -> Result<Point> {
    let [x, y] = args else {
        return Err(Error::script(
            line,
            format!("expected two coordinates, found {}", args.len()),
        ));
    };
    Ok(Point::new(coordinate(line, x)?, coordinate(line, y)?))
}

fn coordinate(line: usize, text: &str) -> Result<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::script(line, format!("invalid coordinate '{text}'")))
}

fn color_arg(line: usize, args: &[&str]) -> Result<usize> {
    let [value] = args else {
        return Err(Error::script(line, "expected a palette index or color"));
    };

    if value.starts_with('#') {
        let color: Color = value
            .parse()
            .map_err(|e: Error| Error::script(line, e.to_string()))?;
        return PALETTE
            .iter()
            .position(|c| *c == color)
            .ok_or_else(|| Error::script(line, format!("{color} is not in the palette")));
    }

    match value.parse::<usize>() {
        Ok(index) if index < PALETTE.len() => Ok(index),
        _ => Err(Error::script(
            line,
            format!(
                "palette index must be 0-{}, found '{value}'",
                PALETTE.len() - 1
            ),
        )),
    }
}

/// Replay parsed steps into a canvas.
///
/// A stroke left open at the end of the script stays in progress.
///
/// # Errors
///
/// Returns a script error if a color step cannot be applied.
pub fn replay(canvas: &mut StrokeCanvas, steps: &[ScriptStep]) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for step in steps {
        match step.command {
            ScriptCommand::Pointer(PointerEvent::Up) => {
                let before = canvas.drawing().len();
                canvas.pointer_up();
                if canvas.drawing().len() > before {
                    stats.strokes += 1;
                }
            }
            ScriptCommand::Pointer(event) => canvas.handle(event),
            ScriptCommand::Undo => {
                if canvas.undo() {
                    stats.undone += 1;
                }
            }
            ScriptCommand::Clear => {
                canvas.clear();
                stats.clears += 1;
            }
            ScriptCommand::Color(index) => {
                canvas
                    .select_color(index)
                    .map_err(|e| Error::script(step.line, e.to_string()))?;
            }
        }
    }
    Ok(stats)
}
