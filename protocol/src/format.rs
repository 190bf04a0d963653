//! Battle formats accepted by the simulator

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// A simulator format, serialized as its machine code (e.g. `gen9ou`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    #[serde(rename = "gen9ou")]
    Gen9Ou,
    #[serde(rename = "gen9ubers")]
    Gen9Ubers,
    #[serde(rename = "gen9uu")]
    Gen9Uu,
    #[serde(rename = "gen9ru")]
    Gen9Ru,
    #[serde(rename = "gen9nu")]
    Gen9Nu,
    #[serde(rename = "gen9pu")]
    Gen9Pu,
    #[serde(rename = "gen9lc")]
    Gen9Lc,
    #[serde(rename = "gen9monotype")]
    Gen9Monotype,
    #[serde(rename = "gen9nationaldex")]
    Gen9NationalDex,
    #[serde(rename = "gen9doublesou")]
    Gen9DoublesOu,
    #[serde(rename = "gen8ou")]
    Gen8Ou,
    #[serde(rename = "gen7ou")]
    Gen7Ou,
}

/// Human label to format, in selector order
pub const FORMAT_CATALOG: &[(&str, Format)] = &[
    ("[Gen 9] OU", Format::Gen9Ou),
    ("[Gen 9] Ubers", Format::Gen9Ubers),
    ("[Gen 9] UU", Format::Gen9Uu),
    ("[Gen 9] RU", Format::Gen9Ru),
    ("[Gen 9] NU", Format::Gen9Nu),
    ("[Gen 9] PU", Format::Gen9Pu),
    ("[Gen 9] LC", Format::Gen9Lc),
    ("[Gen 9] Monotype", Format::Gen9Monotype),
    ("[Gen 9] National Dex", Format::Gen9NationalDex),
    ("[Gen 9] Doubles OU", Format::Gen9DoublesOu),
    ("[Gen 8] OU", Format::Gen8Ou),
    ("[Gen 7] OU", Format::Gen7Ou),
];

impl Format {
    /// Machine code sent to the simulator
    pub fn code(&self) -> &'static str {
        match self {
            Format::Gen9Ou => "gen9ou",
            Format::Gen9Ubers => "gen9ubers",
            Format::Gen9Uu => "gen9uu",
            Format::Gen9Ru => "gen9ru",
            Format::Gen9Nu => "gen9nu",
            Format::Gen9Pu => "gen9pu",
            Format::Gen9Lc => "gen9lc",
            Format::Gen9Monotype => "gen9monotype",
            Format::Gen9NationalDex => "gen9nationaldex",
            Format::Gen9DoublesOu => "gen9doublesou",
            Format::Gen8Ou => "gen8ou",
            Format::Gen7Ou => "gen7ou",
        }
    }

    /// Label shown in the format selector
    pub fn label(&self) -> &'static str {
        FORMAT_CATALOG
            .iter()
            .find(|(_, format)| format == self)
            .map(|(label, _)| *label)
            .unwrap_or("")
    }

    pub fn from_code(code: &str) -> Option<Self> {
        FORMAT_CATALOG
            .iter()
            .map(|(_, format)| *format)
            .find(|format| format.code() == code)
    }
}

impl FromStr for Format {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_code(s.trim()).ok_or_else(|| ParseError::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_code() {
        for (label, format) in FORMAT_CATALOG {
            assert_eq!(format.label(), *label);
            assert_eq!(Format::from_code(format.code()), Some(*format));
        }
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&Format::Gen9Ou).unwrap();
        assert_eq!(json, "\"gen9ou\"");

        let parsed: Format = serde_json::from_str("\"gen9doublesou\"").unwrap();
        assert_eq!(parsed, Format::Gen9DoublesOu);
    }

    #[test]
    fn test_parse_unknown_code() {
        assert!("gen1ou".parse::<Format>().is_err());
        assert_eq!("gen9uu".parse::<Format>().unwrap(), Format::Gen9Uu);
    }
}
