//! Code-to-color lookup
//!
//! Paint cans carry a manufacturer code. In the default mode the display
//! color is derived from that code through a static table, falling back to a
//! neutral gray for unknown codes. Lookup never fails.
//!
//! The alternative "picker" mode stores a user-chosen color verbatim. The two
//! modes are exclusive and selected through configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Built-in code table. Keys are already normalized (trimmed, uppercase).
const BUILTIN_COLORS: &[(&str, ColorHex)] = &[
    ("BLANCO", ColorHex::new(0xFF, 0xFF, 0xFF)),
    ("NEGRO", ColorHex::new(0x00, 0x00, 0x00)),
    ("VERDE ANDALUCIA", ColorHex::new(0x00, 0x7A, 0x33)),
    ("VERDE OSCURO", ColorHex::new(0x00, 0x4D, 0x1A)),
];

/// An RGB color written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorHex([u8; 3]);

impl ColorHex {
    /// Neutral gray used for unknown codes and missing colors
    pub const NEUTRAL: ColorHex = ColorHex::new(0xCC, 0xCC, 0xCC);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.0[0], self.0[1], self.0[2])
    }

    /// Nearest entry in the xterm 256-color palette
    pub fn ansi256(&self) -> u8 {
        let [r, g, b] = self.0;
        if r == g && g == b {
            return match r {
                0..=7 => 16,
                249..=255 => 231,
                v => 232 + ((u16::from(v) - 8) * 24 / 247) as u8,
            };
        }
        let level = |v: u8| ((u16::from(v) * 5 + 127) / 255) as u8;
        16 + 36 * level(r) + 6 * level(g) + level(b)
    }
}

impl Default for ColorHex {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for ColorHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for ColorHex {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidHex(s.to_string()))
        };

        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl Serialize for ColorHex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ColorHex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How a can's display color is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Derived from the code through the color table
    #[default]
    Code,
    /// Picked by the user and stored as given
    Picker,
}

impl ColorMode {
    /// Whether a user-picked color may be given at all in this mode
    pub fn check_picked(self, picked: Option<ColorHex>) -> Result<(), ColorError> {
        match (self, picked) {
            (ColorMode::Code, Some(_)) => Err(ColorError::PickerDisabled),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Code => write!(f, "code"),
            ColorMode::Picker => write!(f, "picker"),
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code" => Ok(ColorMode::Code),
            "picker" => Ok(ColorMode::Picker),
            _ => Err(format!("Unknown color mode: {} (use code or picker)", s)),
        }
    }
}

/// Errors from color parsing and color assignment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color '{0}': expected #RRGGBB")]
    InvalidHex(String),

    #[error("colors are derived from the code in this project (color_mode: code); drop --color or switch to color_mode: picker")]
    PickerDisabled,
}

/// Normalize a code for lookup: trim whitespace, uppercase
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Immutable code -> color table with a neutral fallback
#[derive(Debug, Clone)]
pub struct ColorResolver {
    table: BTreeMap<String, ColorHex>,
}

impl ColorResolver {
    /// Resolver over the built-in table only
    pub fn builtin() -> Self {
        let table = BUILTIN_COLORS
            .iter()
            .map(|(code, color)| (code.to_string(), *color))
            .collect();
        Self { table }
    }

    /// Add or replace entries; keys are normalized like lookups
    pub fn with_entries<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ColorHex)>,
        K: AsRef<str>,
    {
        for (code, color) in entries {
            let key = normalize_code(code.as_ref());
            if !key.is_empty() {
                self.table.insert(key, color);
            }
        }
        self
    }

    /// Resolve a code to its display color
    ///
    /// Matching is exact after normalization. Unknown codes resolve to
    /// [`ColorHex::NEUTRAL`].
    pub fn resolve(&self, code: &str) -> ColorHex {
        self.lookup(code).unwrap_or(ColorHex::NEUTRAL)
    }

    /// Like [`resolve`](Self::resolve) but reports misses
    pub fn lookup(&self, code: &str) -> Option<ColorHex> {
        self.table.get(&normalize_code(code)).copied()
    }

    /// Table entries ordered by code
    pub fn entries(&self) -> impl Iterator<Item = (&str, ColorHex)> {
        self.table.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Decide the color stored for a can
    ///
    /// In code mode the color always comes from the table and a picked color
    /// is refused. In picker mode the picked color is kept as is, or the
    /// neutral gray when none was given.
    pub fn assign(
        &self,
        mode: ColorMode,
        code: &str,
        picked: Option<ColorHex>,
    ) -> Result<ColorHex, ColorError> {
        mode.check_picked(picked)?;
        Ok(match (mode, picked) {
            (ColorMode::Code, _) => self.resolve(code),
            (ColorMode::Picker, Some(color)) => color,
            (ColorMode::Picker, None) => ColorHex::NEUTRAL,
        })
    }
}

impl Default for ColorResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> ColorHex {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_known_codes() {
        let resolver = ColorResolver::builtin();
        assert_eq!(resolver.resolve("BLANCO"), hex("#FFFFFF"));
        assert_eq!(resolver.resolve("NEGRO"), hex("#000000"));
        assert_eq!(resolver.resolve("VERDE ANDALUCIA"), hex("#007A33"));
        assert_eq!(resolver.resolve("verde andalucia"), hex("#007A33"));
        assert_eq!(resolver.resolve("VERDE OSCURO"), hex("#004D1A"));
    }

    #[test]
    fn test_resolve_normalizes_case_and_whitespace() {
        let resolver = ColorResolver::builtin();
        let padded = resolver.resolve(" blanco ");
        assert_eq!(padded, resolver.resolve("BLANCO"));
        assert_eq!(padded.to_string(), "#FFFFFF");
        assert_eq!(resolver.resolve("\tNegro\n"), hex("#000000"));
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_neutral() {
        let resolver = ColorResolver::builtin();
        for code in ["", "   ", "A1", "ROJO", "BLANC", "BLANCO ROTO", "VERDE"] {
            assert_eq!(resolver.resolve(code).to_string(), "#CCCCCC", "code {:?}", code);
        }
        assert!(resolver.lookup("ROJO").is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = ColorResolver::builtin();
        for code in ["blanco", "x-99", " Verde Oscuro "] {
            assert_eq!(resolver.resolve(code), resolver.resolve(code));
            assert_eq!(resolver.resolve(code), resolver.resolve(&normalize_code(code)));
        }
    }

    #[test]
    fn test_with_entries_extends_and_overrides() {
        let resolver = ColorResolver::builtin().with_entries([
            (" rojo fuego ", hex("#D62828")),
            ("blanco", hex("#FAFAFA")),
            ("   ", hex("#123456")),
        ]);
        assert_eq!(resolver.resolve("ROJO FUEGO"), hex("#D62828"));
        assert_eq!(resolver.resolve("Blanco"), hex("#FAFAFA"));
        assert_eq!(resolver.len(), 5);
    }

    #[test]
    fn test_entries_are_sorted() {
        let resolver = ColorResolver::builtin();
        let codes: Vec<&str> = resolver.entries().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["BLANCO", "NEGRO", "VERDE ANDALUCIA", "VERDE OSCURO"]);
    }

    #[test]
    fn test_color_hex_parse() {
        assert_eq!(hex("#007a33").to_string(), "#007A33");
        assert_eq!(hex("007A33").to_string(), "#007A33");
        assert_eq!(hex(" #ffffff ").rgb(), (255, 255, 255));
        assert!("#FFF".parse::<ColorHex>().is_err());
        assert!("#GGGGGG".parse::<ColorHex>().is_err());
        assert!("".parse::<ColorHex>().is_err());
        assert!("#1234567".parse::<ColorHex>().is_err());
    }

    #[test]
    fn test_color_hex_serde() {
        let yaml = serde_yml::to_string(&hex("#004d1a")).unwrap();
        assert!(yaml.contains("#004D1A"));
        let parsed: ColorHex = serde_yml::from_str("'#abcdef'").unwrap();
        assert_eq!(parsed, hex("#ABCDEF"));
        assert!(serde_yml::from_str::<ColorHex>("'red'").is_err());
    }

    #[test]
    fn test_ansi256() {
        assert_eq!(hex("#000000").ansi256(), 16);
        assert_eq!(hex("#FFFFFF").ansi256(), 231);
        assert_eq!(hex("#FF0000").ansi256(), 196);
        assert_eq!(hex("#CCCCCC").ansi256(), 251);
    }

    #[test]
    fn test_assign_code_mode() {
        let resolver = ColorResolver::builtin();
        assert_eq!(
            resolver.assign(ColorMode::Code, "negro", None),
            Ok(hex("#000000"))
        );
        assert_eq!(
            resolver.assign(ColorMode::Code, "negro", Some(hex("#123456"))),
            Err(ColorError::PickerDisabled)
        );
    }

    #[test]
    fn test_check_picked() {
        assert_eq!(
            ColorMode::Code.check_picked(Some(hex("#123456"))),
            Err(ColorError::PickerDisabled)
        );
        assert_eq!(ColorMode::Code.check_picked(None), Ok(()));
        assert_eq!(ColorMode::Picker.check_picked(Some(hex("#123456"))), Ok(()));
    }

    #[test]
    fn test_assign_picker_mode() {
        let resolver = ColorResolver::builtin();
        assert_eq!(
            resolver.assign(ColorMode::Picker, "negro", Some(hex("#123456"))),
            Ok(hex("#123456"))
        );
        assert_eq!(
            resolver.assign(ColorMode::Picker, "negro", None),
            Ok(ColorHex::NEUTRAL)
        );
    }

    #[test]
    fn test_color_mode_parse() {
        assert_eq!("code".parse::<ColorMode>(), Ok(ColorMode::Code));
        assert_eq!("Picker".parse::<ColorMode>(), Ok(ColorMode::Picker));
        assert!("manual".parse::<ColorMode>().is_err());
    }
}
