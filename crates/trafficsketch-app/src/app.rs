//! Application shell.
//!
//! Reads commands line by line, feeds them to the editor as pointer, key
//! and palette input, and prints the toasts a GUI would show.

use crate::command::{Command, ZoomAction};
use crate::platform;
use crate::shortcuts::ShortcutRegistry;
use clap::Parser;
use kurbo::Point;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use thiserror::Error;
use trafficsketch_core::items::Item;
use trafficsketch_core::share;
use trafficsketch_core::storage::{FileStorage, create_default_storage};
use trafficsketch_core::{
    Editor, EditorConfig, ImportOutcome, ItemId, ItemTrait, KeyPress, KeyResponse, LoadOutcome, Modifiers,
    PointerEvent, Storage, StorageError, TextPrompt,
};
use trafficsketch_render::{RendererError, export_png, parse_color};

/// Link base used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://trafficsketch.app/";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("Share link error: {0}")]
    Share(String),
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "trafficsketch", about = "Sketch traffic scenes from a command script", version)]
pub struct Cli {
    /// Command script to run; reads stdin when omitted
    pub script: Option<PathBuf>,

    /// Directory holding the device save slot
    #[arg(long, env = "TRAFFICSKETCH_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Default file written by `export`
    #[arg(long, default_value = "traffic-sketch.png")]
    pub export_path: PathBuf,

    /// Pixel density of exported images
    #[arg(long, default_value_t = 2.0)]
    pub export_scale: f64,

    /// Page address share links point at
    #[arg(long, env = "TRAFFICSKETCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Share link or `#s=...` fragment to open at start-up
    #[arg(long)]
    pub open: Option<String>,

    /// Print share links instead of copying them
    #[arg(long)]
    pub no_clipboard: bool,

    /// Start with grid snapping disabled
    #[arg(long)]
    pub no_snap: bool,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_dir: Option<PathBuf>,
    pub export_path: PathBuf,
    pub export_scale: f64,
    pub base_url: String,
    pub open: Option<String>,
    pub use_clipboard: bool,
    pub snap_to_grid: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            export_path: PathBuf::from("traffic-sketch.png"),
            export_scale: 2.0,
            base_url: DEFAULT_BASE_URL.to_string(),
            open: None,
            use_clipboard: true,
            snap_to_grid: true,
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            storage_dir: cli.storage_dir,
            export_path: cli.export_path,
            export_scale: cli.export_scale,
            base_url: cli.base_url,
            open: cli.open,
            use_clipboard: !cli.no_clipboard,
            snap_to_grid: !cli.no_snap,
        }
    }
}

/// Whether the shell keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Answers a label prompt with text taken from the script.
struct ScriptAnswer(Option<String>);

impl TextPrompt for ScriptAnswer {
    fn prompt(&mut self, title: &str, current: &str) -> Option<String> {
        log::debug!("{title}: {current:?}");
        self.0.take()
    }
}

/// The running application.
pub struct App {
    editor: Editor,
    storage: Box<dyn Storage>,
    config: AppConfig,
    show_grid: bool,
    /// Label opened for editing by a double click.
    editing: Option<ItemId>,
    /// Lines waiting to be printed.
    messages: Vec<String>,
}

/// The part of a link after `#`, or the whole string if it has none.
fn link_fragment(link: &str) -> &str {
    share::fragment_of(link).unwrap_or(link)
}

/// One-line summary of an item for `list`.
fn describe(item: &Item) -> String {
    let id = item.id();
    match item {
        Item::Tile(t) => format!("{id} tile:{} at ({}, {}) rot {}", t.subtype.as_str(), t.x, t.y, t.rotation),
        Item::Vehicle(v) => format!(
            "{id} vehicle:{} {} at ({}, {}) rot {}",
            v.subtype.as_str(),
            v.color,
            v.x,
            v.y,
            v.rotation
        ),
        Item::Sign(s) => format!("{id} sign:{} at ({}, {}) rot {}", s.subtype.as_str(), s.x, s.y, s.rotation),
        Item::Text(t) => format!("{id} text {:?} at ({}, {}) rot {}", t.display_text(), t.x, t.y, t.rotation),
        Item::Arrow(a) => {
            let (start, end) = (a.start(), a.end());
            format!("{id} arrow ({}, {}) -> ({}, {})", start.x, start.y, end.x, end.y)
        }
    }
}

impl App {
    /// Create the app with storage from the configuration.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let storage: Box<dyn Storage> = match &config.storage_dir {
            Some(dir) => Box::new(FileStorage::new(dir.clone())?),
            None => create_default_storage(),
        };
        Ok(Self::with_storage(config, storage))
    }

    /// Create the app with explicit storage.
    pub fn with_storage(config: AppConfig, storage: Box<dyn Storage>) -> Self {
        let editor_config = EditorConfig {
            snap_to_grid: config.snap_to_grid,
            ..EditorConfig::default()
        };
        let fragment = config.open.as_deref().map(link_fragment);
        let (editor, outcome) = Editor::from_fragment(editor_config, fragment);

        let mut app = Self {
            editor,
            storage,
            config,
            show_grid: true,
            editing: None,
            messages: Vec::new(),
        };
        match outcome {
            ImportOutcome::Imported(_) => app.toast("Scene loaded from URL"),
            ImportOutcome::FellBackToDefault => app.toast("Could not read shared scene; loaded default"),
            ImportOutcome::NotShared => {}
        }
        app
    }

    /// Run from the parsed command line: a script file or stdin, printing
    /// to stdout.
    pub async fn run(cli: Cli) -> Result<(), AppError> {
        let script = cli.script.clone();
        let mut app = Self::new(cli.into())?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match script {
            Some(path) => {
                let file = File::open(&path)?;
                app.run_script(BufReader::new(file), &mut out).await
            }
            None => app.run_script(std::io::stdin().lock(), &mut out).await,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Execute every line of `input`, writing messages to `output`.
    ///
    /// Bad lines and failed commands are reported and skipped. Closing the
    /// input mid-drag ends the gesture.
    pub async fn run_script<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<(), AppError> {
        self.flush(output)?;
        for line in input.lines() {
            let line = line?;
            let flow = match Command::parse_line(&line) {
                None => Flow::Continue,
                Some(Err(err)) => {
                    self.say(err.render().to_string().trim_end());
                    Flow::Continue
                }
                Some(Ok(command)) => match self.execute(command).await {
                    Ok(flow) => flow,
                    Err(err) => {
                        log::error!("{line}: {err}");
                        self.say(format!("error: {err}"));
                        Flow::Continue
                    }
                },
            };
            self.flush(output)?;
            if flow == Flow::Quit {
                break;
            }
        }
        if self.editor.is_dragging() {
            self.pointer(PointerEvent::Leave);
        }
        Ok(())
    }

    /// Execute one command.
    ///
    /// While a label prompt is open, commands that would touch the scene
    /// are refused until `text` answers it.
    pub async fn execute(&mut self, command: Command) -> Result<Flow, AppError> {
        if let Some(id) = &self.editing {
            if command.mutates_scene() {
                let id = id.clone();
                self.say(format!("Still editing label {id} (answer with `text ...`)"));
                return Ok(Flow::Continue);
            }
        }
        match command {
            Command::Down { x, y } => self.pointer(PointerEvent::Down { position: Point::new(x, y) }),
            Command::Move { x, y } => self.pointer(PointerEvent::Move { position: Point::new(x, y) }),
            Command::Up { x, y } => self.pointer(PointerEvent::Up { position: Point::new(x, y) }),
            Command::Click { x, y } => {
                let position = Point::new(x, y);
                self.pointer(PointerEvent::Down { position });
                self.pointer(PointerEvent::Up { position });
            }
            Command::Drag { x1, y1, x2, y2 } => {
                self.pointer(PointerEvent::Down { position: Point::new(x1, y1) });
                self.pointer(PointerEvent::Move { position: Point::new(x2, y2) });
                self.pointer(PointerEvent::Up { position: Point::new(x2, y2) });
            }
            Command::Cancel => self.pointer(PointerEvent::Cancel),
            Command::Leave => self.pointer(PointerEvent::Leave),
            Command::Key { key, ctrl, shift, alt, meta } => {
                let press = KeyPress::new(key, Modifiers { shift, ctrl, alt, meta });
                match self.editor.handle_key(&press) {
                    KeyResponse::SaveRequested => self.save().await?,
                    KeyResponse::HelpRequested => self.help(),
                    KeyResponse::Handled => {}
                    KeyResponse::Ignored => log::debug!("Unbound key {:?}", press.key),
                }
            }
            Command::Add { entry } => {
                let id = self.editor.add_from_palette(&entry);
                self.say(format!("Added {entry} {id}"));
            }
            Command::Template { template } => {
                self.editor.apply_template(template);
                self.toast(&format!("Template {template} applied"));
            }
            Command::Select { id } => {
                let id = ItemId::from(id);
                if self.editor.scene().contains(&id) {
                    self.editor.select(Some(id));
                } else {
                    self.say(format!("No item {id}"));
                }
            }
            Command::Deselect => self.editor.select(None),
            Command::Rotate => {
                self.editor.rotate_selected();
            }
            Command::Duplicate => {
                if let Some(id) = self.editor.duplicate_selected() {
                    self.say(format!("Duplicated as {id}"));
                }
            }
            Command::Delete => {
                self.editor.delete_selected();
            }
            Command::Undo => {
                self.editor.undo();
            }
            Command::Redo => {
                self.editor.redo();
            }
            Command::Clear => self.editor.clear_scene(),
            Command::Mode { mode } => self.editor.set_mode(mode),
            Command::Color { hex } => {
                if parse_color(&hex).is_some() {
                    self.editor.set_vehicle_color(&hex);
                } else {
                    self.say(format!("Not a colour: {hex}"));
                }
            }
            Command::Snap { state } => self.editor.set_snap_to_grid(state.is_on()),
            Command::Grid { state } => self.show_grid = state.is_on(),
            Command::Zoom { action } => match action {
                ZoomAction::In => self.editor.zoom_in(),
                ZoomAction::Out => self.editor.zoom_out(),
                ZoomAction::Reset => self.editor.reset_view(),
            },
            Command::Save => self.save().await?,
            Command::Load => self.load().await,
            Command::Share => self.share()?,
            Command::Import { link } => self.import(&link),
            Command::Export { path } => self.export(path)?,
            Command::Text { words } => self.set_label_text(words),
            Command::List => {
                let lines: Vec<String> = self.editor.render_order().into_iter().map(describe).collect();
                self.messages.extend(lines);
            }
            Command::Help => self.help(),
            Command::Quit => return Ok(Flow::Quit),
        }
        if self.editor.take_redraw() {
            log::trace!("Scene changed ({} items)", self.editor.scene().len());
        }
        Ok(Flow::Continue)
    }

    fn pointer(&mut self, event: PointerEvent) {
        let response = self.editor.handle_pointer(event);
        if let Some(id) = response.edit_text {
            let current = self
                .editor
                .scene()
                .get(&id)
                .and_then(Item::as_text)
                .map(|text| text.text.clone())
                .unwrap_or_default();
            self.say(format!("Edit label {id}: {current:?} (answer with `text ...`)"));
            self.editing = Some(id);
        }
    }

    /// Answer the pending label prompt, or relabel the selected text.
    /// No words cancels a pending prompt.
    fn set_label_text(&mut self, words: Vec<String>) {
        let answer = (!words.is_empty()).then(|| words.join(" "));
        if let Some(id) = self.editing.take() {
            if !self.editor.edit_text(&id, &mut ScriptAnswer(answer)) {
                self.say("Label unchanged");
            }
            return;
        }
        let selected = self
            .editor
            .selected_item()
            .and_then(Item::as_text)
            .map(|label| label.id().clone());
        match selected {
            Some(id) => {
                self.editor.edit_text(&id, &mut ScriptAnswer(Some(answer.unwrap_or_default())));
            }
            None => self.say("No label selected"),
        }
    }

    async fn save(&mut self) -> Result<(), AppError> {
        self.editor.save_local(self.storage.as_ref()).await?;
        self.toast("Saved to device");
        Ok(())
    }

    async fn load(&mut self) {
        match self.editor.load_local(self.storage.as_ref()).await {
            LoadOutcome::Loaded(_) => self.toast("Loaded"),
            LoadOutcome::NothingSaved => self.toast("No save found"),
            LoadOutcome::Unreadable(err) => self.toast(&format!("Saved scene is unreadable: {err}")),
        }
    }

    fn share(&mut self) -> Result<(), AppError> {
        let url = self
            .editor
            .share_url(&self.config.base_url)
            .map_err(|e| AppError::Share(e.to_string()))?;
        if self.config.use_clipboard && platform::copy_text_to_clipboard(&url) {
            self.toast("URL copied to clipboard");
        } else {
            self.say(format!("Copy URL: {url}"));
        }
        Ok(())
    }

    fn import(&mut self, link: &str) {
        match self.editor.import_fragment(link_fragment(link)) {
            ImportOutcome::Imported(_) => self.toast("Scene loaded from URL"),
            ImportOutcome::NotShared => self.say("Link does not carry a scene"),
            ImportOutcome::FellBackToDefault => self.toast("Could not read shared scene; loaded default"),
        }
    }

    fn export(&mut self, path: Option<PathBuf>) -> Result<(), AppError> {
        let path = path.unwrap_or_else(|| self.config.export_path.clone());
        let png = export_png(
            self.editor.scene(),
            self.editor.viewport(),
            self.show_grid,
            self.config.export_scale,
        )?;
        platform::write_png(&path, &png)?;
        self.toast(&format!("Exported {}", path.display()));
        Ok(())
    }

    fn help(&mut self) {
        let text = ShortcutRegistry::help_text();
        self.messages.extend(text.lines().map(str::to_string));
    }

    fn toast(&mut self, message: &str) {
        log::info!("{message}");
        self.messages.push(message.to_string());
    }

    fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    fn flush<W: Write>(&mut self, output: &mut W) -> std::io::Result<()> {
        for message in self.messages.drain(..) {
            writeln!(output, "{message}")?;
        }
        output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use trafficsketch_core::bootstrap_scene;
    use trafficsketch_core::storage::MemoryStorage;

    fn test_config() -> AppConfig {
        AppConfig {
            use_clipboard: false,
            ..AppConfig::default()
        }
    }

    fn memory_app() -> App {
        App::with_storage(test_config(), Box::new(MemoryStorage::new()))
    }

    fn run(app: &mut App, script: &str) -> String {
        let mut out = Vec::new();
        pollster::block_on(app.run_script(script.as_bytes(), &mut out)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_starts_with_bootstrap_scene() {
        let app = memory_app();
        assert_eq!(app.editor().scene().len(), 3);
        assert!(app.show_grid());
    }

    #[test]
    fn test_save_then_load() {
        let mut app = memory_app();
        let out = run(&mut app, "load\nsave\nclear\nload\n");
        assert_eq!(out.lines().collect::<Vec<_>>(), ["No save found", "Saved to device", "Loaded"]);
        assert_eq!(app.editor().scene().len(), 3);
    }

    #[test]
    fn test_ctrl_s_saves() {
        let mut app = memory_app();
        let out = run(&mut app, "key s --ctrl\n");
        assert_eq!(out.trim(), "Saved to device");
    }

    #[test]
    fn test_drag_moves_item() {
        let mut app = memory_app();
        // the car sits at (560, 360) above the cross tile
        run(&mut app, "drag 560 360 690 490\n");
        let car = &app.editor().scene().items()[1];
        assert_eq!(car.anchor(), Point::new(680.0, 480.0));
        assert_eq!(app.editor().history().undo_len(), 1);
    }

    #[test]
    fn test_share_without_clipboard_prints_link() {
        let mut app = memory_app();
        let out = run(&mut app, "share\n");
        let url = out.trim().strip_prefix("Copy URL: ").unwrap();
        assert!(url.starts_with(DEFAULT_BASE_URL));

        let mut other = memory_app();
        run(&mut other, "clear\n");
        let out = run(&mut other, &format!("import {url}\n"));
        assert_eq!(out.trim(), "Scene loaded from URL");
        assert_eq!(other.editor().scene(), app.editor().scene());
    }

    #[test]
    fn test_open_corrupt_link_falls_back() {
        let config = AppConfig {
            open: Some("https://trafficsketch.app/#s=%%%".to_string()),
            ..test_config()
        };
        let mut app = App::with_storage(config, Box::new(MemoryStorage::new()));
        assert_eq!(app.editor().scene().len(), bootstrap_scene().len());
        let out = run(&mut app, "");
        assert!(out.contains("Could not read shared scene"));
    }

    #[test]
    fn test_double_click_label_then_text() {
        let mut app = memory_app();
        run(&mut app, "template tjunction\n");
        let label = app.editor().scene().items()[2].clone();
        let p = app.editor().scene_to_screen(label.anchor());
        let script = format!("click {x} {y}\nclick {x} {y}\ntext Main St\n", x = p.x, y = p.y);
        let out = run(&mut app, &script);
        assert!(out.contains("Edit label"));
        match app.editor().scene().get(label.id()).unwrap() {
            Item::Text(text) => assert_eq!(text.text, "Main St"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_label_edit_blocks_scene_changes() {
        let mut app = memory_app();
        run(&mut app, "template tjunction
");
        let before_undo = app.editor().history().undo_len();
        let label = app.editor().scene().items()[2].clone();
        let p = app.editor().scene_to_screen(label.anchor());
        let script = format!("click {x} {y}
click {x} {y}
delete
clear
undo
zoom in
", x = p.x, y = p.y);
        let out = run(&mut app, &script);

        assert_eq!(out.matches("Still editing label").count(), 3);
        assert_eq!(app.editor().scene().len(), 4);
        // the first click is a completed gesture
        assert_eq!(app.editor().history().undo_len(), before_undo + 1);

        let out = run(&mut app, "text
clear
");
        assert!(out.contains("Label unchanged"));
        assert!(app.editor().scene().is_empty());
        assert_eq!(app.editor().history().undo_len(), before_undo + 2);
    }

    #[test]
    fn test_bad_lines_are_reported_and_skipped() {
        let mut app = memory_app();
        let out = run(&mut app, "launch rocket\ncolor purple\nrotate\n");
        assert!(out.contains("error"));
        assert!(out.contains("Not a colour: purple"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let mut app = memory_app();
        run(&mut app, "quit\nclear\n");
        assert_eq!(app.editor().scene().len(), 3);
    }

    #[test]
    fn test_export_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.png");
        let mut app = memory_app();
        let out = run(&mut app, &format!("grid off\nexport {}\n", path.display()));
        assert!(out.starts_with("Exported"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_file_storage_from_config() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..test_config()
        };
        let mut app = App::new(config).unwrap();
        run(&mut app, "save\n");
        assert!(dir.path().join("trafficSketcher.v1.json").exists());
    }

    #[test]
    fn test_input_closed_mid_drag_commits() {
        let mut app = memory_app();
        run(&mut app, "down 560 360\nmove 800 600\n");
        assert!(!app.editor().is_dragging());
        assert_eq!(app.editor().history().undo_len(), 1);
    }

    #[test]
    fn test_list_prints_paint_order() {
        let mut app = memory_app();
        let out = run(&mut app, "list\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("tile:cross"));
    }
}
