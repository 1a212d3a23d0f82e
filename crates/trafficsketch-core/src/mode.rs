//! Editor interaction modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Active interaction mode. Exactly one is active at a time and it only
/// changes when the user switches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Select and drag items.
    #[default]
    Select,
    /// Drag the background to move the viewport.
    Pan,
    /// Sketch transient ink strokes over the scene.
    Draw,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Select => "select",
            Mode::Pan => "pan",
            Mode::Draw => "draw",
        }
    }

    /// Keyboard shortcut that switches to this mode, if any.
    pub fn shortcut(self) -> Option<char> {
        match self {
            Mode::Select => Some('v'),
            Mode::Pan => Some('h'),
            Mode::Draw => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(Mode::Select),
            "pan" => Ok(Mode::Pan),
            "draw" | "freehand" => Ok(Mode::Draw),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("select".parse::<Mode>(), Ok(Mode::Select));
        assert_eq!("PAN".parse::<Mode>(), Ok(Mode::Pan));
        assert_eq!("freehand".parse::<Mode>(), Ok(Mode::Draw));
        assert!("erase".parse::<Mode>().is_err());
    }

    #[test]
    fn test_default_is_select() {
        assert_eq!(Mode::default(), Mode::Select);
        assert_eq!(Mode::Pan.shortcut(), Some('h'));
    }
}
