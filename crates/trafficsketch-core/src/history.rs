//! Bounded undo/redo of whole-scene snapshots.

use crate::scene::Scene;
use std::collections::VecDeque;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 60;

/// Undo and redo stacks of scene snapshots.
///
/// Snapshots are deep copies; nothing is shared with the live scene.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Oldest entry at the front.
    undo_stack: VecDeque<Scene>,
    redo_stack: Vec<Scene>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current scene before a change is made.
    pub fn snapshot(&mut self, scene: &Scene) {
        self.push(scene.clone());
    }

    /// Push an already captured pre-change scene.
    ///
    /// Clears the redo stack and evicts the oldest entry past capacity.
    pub fn push(&mut self, scene: Scene) {
        self.push_undo(scene);
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, scene: Scene) {
        self.undo_stack.push_back(scene);
        while self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.pop_front();
        }
    }

    /// Undo the last change, swapping `scene` with the previous state.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(scene, previous);
        self.redo_stack.push(current);
        log::debug!("Undo ({} left)", self.undo_stack.len());
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(scene, next);
        self.push_undo(current);
        log::debug!("Redo ({} left)", self.redo_stack.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
