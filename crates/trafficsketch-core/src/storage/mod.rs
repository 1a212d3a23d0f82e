//! Storage abstraction for local persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::scene::Scene;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Name of the single local save slot.
pub const LOCAL_SLOT_KEY: &str = "trafficSketcher.v1";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Nothing saved under: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for scene storage backends.
///
/// A backend maps slot keys to serialized item lists. Loading a key that
/// was never written yields [`StorageError::NotFound`], which callers
/// report as "nothing saved" rather than as a failure.
pub trait Storage: Send + Sync {
    /// Save a scene under `key`, replacing any previous value.
    fn save(&self, key: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the scene stored under `key`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Scene>>;
}

/// Storage for the current platform: files under the user's data directory,
/// or memory when no such directory can be used.
pub fn create_default_storage() -> Box<dyn Storage> {
    match FileStorage::default_location() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            log::warn!("Falling back to in-memory storage: {err}");
            Box::new(MemoryStorage::new())
        }
    }
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
