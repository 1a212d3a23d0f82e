//! Script commands, one per line.
//!
//! Pointer coordinates are screen pixels, exactly what a windowing layer
//! would hand the editor.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use trafficsketch_core::{Mode, PaletteEntry, Template};

/// On/off switch argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ZoomAction {
    In,
    Out,
    Reset,
}

/// One shell command.
#[derive(Parser, Debug, Clone)]
#[command(no_binary_name = true, disable_help_subcommand = true)]
pub enum Command {
    /// Press the pointer
    Down {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Move the pointer
    Move {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Release the pointer
    Up {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Press and release at one point
    Click {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Press, move and release
    Drag {
        #[arg(allow_negative_numbers = true)]
        x1: f64,
        #[arg(allow_negative_numbers = true)]
        y1: f64,
        #[arg(allow_negative_numbers = true)]
        x2: f64,
        #[arg(allow_negative_numbers = true)]
        y2: f64,
    },
    /// Pointer gesture interrupted
    Cancel,
    /// Pointer left the canvas
    Leave,
    /// Key press, e.g. `key z --ctrl --shift`
    Key {
        key: String,
        #[arg(long)]
        ctrl: bool,
        #[arg(long)]
        shift: bool,
        #[arg(long)]
        alt: bool,
        #[arg(long)]
        meta: bool,
    },
    /// Add an item from the palette, e.g. `add tile:cross`
    Add { entry: PaletteEntry },
    /// Replace the scene with a template (4way, tjunction, merge)
    Template { template: Template },
    /// Select an item by id
    Select { id: String },
    Deselect,
    Rotate,
    Duplicate,
    Delete,
    Undo,
    Redo,
    /// Remove every item
    Clear,
    /// Switch interaction mode (select, pan, draw)
    Mode { mode: Mode },
    /// Set the vehicle colour, recolouring a selected vehicle
    Color { hex: String },
    Snap { state: Toggle },
    Grid { state: Toggle },
    Zoom { action: ZoomAction },
    /// Save to the device slot
    Save,
    /// Load from the device slot
    Load,
    /// Print or copy a share link
    Share,
    /// Load a scene from a share link or fragment
    Import { link: String },
    /// Write a PNG of the visible scene
    Export { path: Option<PathBuf> },
    /// Set label text for the label being edited, or the selected label.
    /// Without words, cancels a pending edit
    Text {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        words: Vec<String>,
    },
    /// Print the items in paint order
    List,
    /// Print keyboard shortcuts
    Help,
    Quit,
}

impl Command {
    /// Whether running this command touches the scene store: the items,
    /// the selection or the snapping flag.
    pub fn mutates_scene(&self) -> bool {
        !matches!(
            self,
            Command::Mode { .. }
                | Command::Grid { .. }
                | Command::Zoom { .. }
                | Command::Save
                | Command::Share
                | Command::Export { .. }
                | Command::Text { .. }
                | Command::List
                | Command::Help
                | Command::Quit
        )
    }

    /// Parse one script line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Option<Result<Self, clap::Error>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(Self::try_parse_from(line.split_whitespace()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficsketch_core::items::TileKind;

    fn parse(line: &str) -> Command {
        Command::parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_pointer() {
        assert!(matches!(parse("down 10 -20.5"), Command::Down { x, y } if x == 10.0 && y == -20.5));
        assert!(matches!(parse("drag 0 0 40 40"), Command::Drag { x2, .. } if x2 == 40.0));
        assert!(matches!(parse("leave"), Command::Leave));
    }

    #[test]
    fn test_parse_key_modifiers() {
        match parse("key z --ctrl --shift") {
            Command::Key { key, ctrl, shift, alt, meta } => {
                assert_eq!(key, "z");
                assert!(ctrl && shift && !alt && !meta);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_typed_arguments() {
        assert!(matches!(parse("add tile:cross"), Command::Add { entry: PaletteEntry::Tile(TileKind::Cross) }));
        assert!(matches!(parse("template 4way"), Command::Template { template: Template::FourWay }));
        assert!(matches!(parse("mode freehand"), Command::Mode { mode: Mode::Draw }));
        assert!(matches!(parse("grid off"), Command::Grid { state: Toggle::Off }));
        assert!(matches!(parse("zoom in"), Command::Zoom { action: ZoomAction::In }));
    }

    #[test]
    fn test_parse_text_keeps_words() {
        match parse("text Main St - northbound") {
            Command::Text { words } => assert_eq!(words.join(" "), "Main St - northbound"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse("text"), Command::Text { words } if words.is_empty()));
    }

    #[test]
    fn test_mutating_commands() {
        assert!(parse("click 1 1").mutates_scene());
        assert!(parse("undo").mutates_scene());
        assert!(parse("select abc").mutates_scene());
        assert!(parse("snap off").mutates_scene());
        assert!(!parse("text Main St").mutates_scene());
        assert!(!parse("zoom in").mutates_scene());
        assert!(!parse("list").mutates_scene());
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        assert!(Command::parse_line("   ").is_none());
        assert!(Command::parse_line("# setup").is_none());
    }

    #[test]
    fn test_bad_lines_are_errors() {
        assert!(Command::parse_line("fly away").unwrap().is_err());
        assert!(Command::parse_line("down ten 20").unwrap().is_err());
        assert!(Command::parse_line("add spaceship").unwrap().is_err());
    }
}
