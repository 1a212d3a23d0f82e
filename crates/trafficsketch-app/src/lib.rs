//! Traffic Sketcher Application
//!
//! Native command shell driving the editor: pointer and key input from a
//! script, device save slot, share links and PNG export.

mod app;
pub mod command;
mod platform;
mod shortcuts;

pub use app::{App, AppConfig, AppError, Cli, DEFAULT_BASE_URL, Flow};
pub use command::Command;
pub use shortcuts::{Shortcut, ShortcutRegistry};
