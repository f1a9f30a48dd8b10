//! Stroke colors and the fixed drawing palette.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render as `#RRGGBB`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| Error::invalid_input(format!("color must start with '#': {s}")))?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_input(format!("invalid hex color: {s}")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| Error::invalid_input(format!("invalid hex color: {s}")))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The colors offered to the user, in display order.
pub const PALETTE: [Color; 6] = [
    Color::rgb(0x25, 0x63, 0xEB), // blue
    Color::rgb(0x05, 0x96, 0x69), // green
    Color::rgb(0xF5, 0x9E, 0x42), // orange
    Color::rgb(0xEF, 0x44, 0x44), // red
    Color::rgb(0xA2, 0x1C, 0xAF), // purple
    Color::rgb(0x00, 0x00, 0x00), // black
];

/// Color given to new strokes before the user picks one, and to strokes
/// loaded from storage (which does not record color).
pub const DEFAULT_COLOR: Color = PALETTE[0];

/// The palette together with the currently selected entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteSelection {
    index: usize,
}

impl PaletteSelection {
    /// Select the palette entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is outside the palette.
    pub fn select(&mut self, index: usize) -> Result<Color> {
        if index >= PALETTE.len() {
            return Err(Error::invalid_input(format!(
                "palette index {index} out of range (0..{})",
                PALETTE.len()
            )));
        }
        self.index = index;
        Ok(PALETTE[index])
    }

    /// Select the palette entry matching `color`.
    ///
    /// # Errors
    ///
    /// Returns an error if `color` is not one of the palette colors.
    pub fn select_color(&mut self, color: Color) -> Result<()> {
        let index = PALETTE
            .iter()
            .position(|c| *c == color)
            .ok_or_else(|| Error::invalid_input(format!("{color} is not in the palette")))?;
        self.index = index;
        Ok(())
    }

    /// Index of the selected entry.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The selected color.
    #[must_use]
    pub fn color(&self) -> Color {
        PALETTE[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_has_six_distinct_colors() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(PALETTE.len(), 6);
    }

    #[test]
    fn test_palette_hex_values() {
        let hex: Vec<String> = PALETTE.iter().map(Color::to_hex).collect();
        assert_eq!(
            hex,
            ["#2563EB", "#059669", "#F59E42", "#EF4444", "#A21CAF", "#000000"]
        );
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("#2563eb".parse::<Color>().unwrap(), PALETTE[0]);
        assert!("2563EB".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GGGGGG".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_serde() {
        let json = serde_json::to_string(&PALETTE[3]).unwrap();
        assert_eq!(json, "\"#EF4444\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PALETTE[3]);
    }

    #[test]
    fn test_selection_default_is_first() {
        let selection = PaletteSelection::default();
        assert_eq!(selection.index(), 0);
        assert_eq!(selection.color(), DEFAULT_COLOR);
    }

    #[test]
    fn test_select_by_index() {
        let mut selection = PaletteSelection::default();
        assert_eq!(selection.select(4).unwrap(), PALETTE[4]);
        assert_eq!(selection.color(), PALETTE[4]);
    }

    #[test]
    fn test_select_out_of_range_keeps_selection() {
        let mut selection = PaletteSelection::default();
        selection.select(2).unwrap();
        assert!(selection.select(6).is_err());
        assert_eq!(selection.index(), 2);
    }

    #[test]
    fn test_select_color() {
        let mut selection = PaletteSelection::default();
        selection.select_color(PALETTE[5]).unwrap();
        assert_eq!(selection.index(), 5);
        assert!(selection.select_color(Color::rgb(1, 2, 3)).is_err());
    }
}
