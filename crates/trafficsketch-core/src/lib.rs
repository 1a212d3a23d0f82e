//! Traffic Sketcher core library
//!
//! Scene model, history and interaction state machine for the traffic
//! sketcher. Platform-agnostic: rendering and the application shell live in
//! sibling crates.

pub mod editor;
pub mod history;
pub mod ink;
pub mod input;
pub mod items;
pub mod mode;
pub mod scene;
pub mod share;
pub mod snap;
pub mod storage;
pub mod store;
pub mod templates;
pub mod viewport;

pub use editor::{Editor, EditorConfig, ImportOutcome, KeyResponse, LoadOutcome, Response, TextPrompt};
pub use history::{History, MAX_UNDO_HISTORY};
pub use ink::{InkOverlay, InkStroke};
pub use input::{KeyPress, Modifiers, PointerEvent};
pub use items::{Item, ItemId, ItemKind, ItemTrait};
pub use mode::Mode;
pub use scene::Scene;
pub use share::ShareError;
pub use snap::{GRID_SIZE, snap_coord, snap_point, snap_to_grid};
pub use storage::{LOCAL_SLOT_KEY, Storage, StorageError, StorageResult};
pub use store::SceneStore;
pub use templates::{PaletteEntry, Template, bootstrap_scene};
pub use viewport::Viewport;
