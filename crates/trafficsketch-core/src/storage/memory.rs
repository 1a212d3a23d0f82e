//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::scene::Scene;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, Scene>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let scene = scene.clone();
        Box::pin(async move {
            let mut slots = self.slots.write().map_err(lock_error)?;
            slots.insert(key, scene);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Scene>> {
        let key = key.to_string();
        Box::pin(async move {
            let slots = self.slots.read().map_err(lock_error)?;
            slots.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LOCAL_SLOT_KEY, block_on};
    use crate::templates::bootstrap_scene;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let scene = bootstrap_scene();

        block_on(storage.save(LOCAL_SLOT_KEY, &scene)).unwrap();
        let loaded = block_on(storage.load(LOCAL_SLOT_KEY)).unwrap();

        assert_eq!(loaded, scene);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_saved_copy_is_independent() {
        let storage = MemoryStorage::new();
        let mut scene = bootstrap_scene();
        block_on(storage.save("slot", &scene)).unwrap();
        scene.clear();

        assert_eq!(block_on(storage.load("slot")).unwrap().len(), 3);
    }

    #[test]
    fn test_save_replaces_slot() {
        let storage = MemoryStorage::new();
        block_on(storage.save(LOCAL_SLOT_KEY, &bootstrap_scene())).unwrap();
        block_on(storage.save(LOCAL_SLOT_KEY, &Scene::new())).unwrap();

        assert!(block_on(storage.load(LOCAL_SLOT_KEY)).unwrap().is_empty());
    }
}
