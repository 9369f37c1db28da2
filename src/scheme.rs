// src/scheme.rs - Color scheme catalog and style descriptors

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }
}

/// The five editor-wide colors a scheme controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: Color,
    pub background: Color,
    pub caret: Color,
    pub caret_line: Color,
    pub selection: Color,
}

/// Catalog of the color schemes shipped with the editor, looked up by name.
/// Created once at startup, owned by the application, dropped on shutdown.
#[derive(Debug, Clone)]
pub struct SchemeCatalog {
    schemes: Vec<(String, ColorScheme)>,
}

impl SchemeCatalog {
    pub fn builtin() -> Self {
        let schemes = vec![
            (
                "Default".to_string(),
                ColorScheme {
                    foreground: Color::rgb(0x00, 0x00, 0x00),
                    background: Color::rgb(0xff, 0xff, 0xff),
                    caret: Color::rgb(0x00, 0x00, 0x00),
                    caret_line: Color::rgb(0xff, 0xff, 0xcd),
                    selection: Color::rgb(0xc0, 0xc0, 0xc0),
                },
            ),
            (
                "Solarized Light".to_string(),
                ColorScheme {
                    foreground: Color::rgb(0x65, 0x7b, 0x83),
                    background: Color::rgb(0xfd, 0xf6, 0xe3),
                    caret: Color::rgb(0x58, 0x6e, 0x75),
                    caret_line: Color::rgb(0xee, 0xe8, 0xd5),
                    selection: Color::rgb(0x93, 0xa1, 0xa1),
                },
            ),
            (
                "Solarized Dark".to_string(),
                ColorScheme {
                    foreground: Color::rgb(0x83, 0x94, 0x96),
                    background: Color::rgb(0x00, 0x2b, 0x36),
                    caret: Color::rgb(0x93, 0xa1, 0xa1),
                    caret_line: Color::rgb(0x07, 0x36, 0x42),
                    selection: Color::rgb(0x58, 0x6e, 0x75),
                },
            ),
            (
                "Zenburn".to_string(),
                ColorScheme {
                    foreground: Color::rgb(0xdc, 0xdc, 0xcc),
                    background: Color::rgb(0x3f, 0x3f, 0x3f),
                    caret: Color::rgb(0xff, 0xff, 0xff),
                    caret_line: Color::rgb(0x4a, 0x4a, 0x4a),
                    selection: Color::rgb(0x2f, 0x2f, 0x2f),
                },
            ),
        ];
        Self { schemes }
    }

    /// Scheme names, in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.schemes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ColorScheme> {
        self.schemes
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, scheme)| scheme)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleParseError {
    #[error("invalid color value: {0}")]
    InvalidColor(String),
    #[error("unknown style attribute: {0}")]
    UnknownAttribute(String),
}

/// Per-style overrides for one lexer style, parsed from comma-separated
/// attribute strings like `fore:#d4d4d4,back:#1e1e1e,bold,eolfilled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Fill the rest of the line with the background of its last character.
    pub eol_filled: bool,
}

impl FromStr for Style {
    type Err = StyleParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut style = Style::default();
        for part in text.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            if let Some(hex) = part.strip_prefix("fore:") {
                style.foreground = Some(
                    Color::from_hex(hex)
                        .ok_or_else(|| StyleParseError::InvalidColor(hex.to_string()))?,
                );
            } else if let Some(hex) = part.strip_prefix("back:") {
                style.background = Some(
                    Color::from_hex(hex)
                        .ok_or_else(|| StyleParseError::InvalidColor(hex.to_string()))?,
                );
            } else {
                match part {
                    "bold" => style.bold = true,
                    "italic" => style.italic = true,
                    "underline" => style.underline = true,
                    "eolfilled" => style.eol_filled = true,
                    _ => return Err(StyleParseError::UnknownAttribute(part.to_string())),
                }
            }
        }
        Ok(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(0xff, 0x80, 0x00)));
        assert_eq!(Color::from_hex("ff8000"), None);
        assert_eq!(Color::from_hex("#ff80"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = SchemeCatalog::builtin();
        assert_eq!(catalog.names()[0], "Default");
        let scheme = catalog.get("Solarized Dark").unwrap();
        assert_eq!(scheme.background, Color::rgb(0x00, 0x2b, 0x36));
        assert!(catalog.get("No Such Scheme").is_none());
    }

    #[test]
    fn test_style_parse() {
        let style: Style = "fore:#d4d4d4,back:#1e1e1e,bold,eolfilled".parse().unwrap();
        assert_eq!(style.foreground, Some(Color::rgb(0xd4, 0xd4, 0xd4)));
        assert_eq!(style.background, Some(Color::rgb(0x1e, 0x1e, 0x1e)));
        assert!(style.bold);
        assert!(!style.italic);
        assert!(style.eol_filled);
    }

    #[test]
    fn test_style_parse_empty_is_default() {
        let style: Style = "".parse().unwrap();
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_style_parse_rejects_unknown_attribute() {
        let err = "blinking".parse::<Style>().unwrap_err();
        assert_eq!(err, StyleParseError::UnknownAttribute("blinking".to_string()));
    }

    #[test]
    fn test_style_parse_rejects_bad_color() {
        assert!(matches!(
            "fore:red".parse::<Style>(),
            Err(StyleParseError::InvalidColor(_))
        ));
    }
}
