//! Converter shared between a feeding thread and a draining thread.

use std::sync::Arc;

use parking_lot::Mutex;
use widthflow::{Beat, WidthConfig, WidthError};

use super::{Accept, Stats, WidthConverter};

/// Handle to a converter behind one lock.
///
/// Every operation takes the lock for its whole transfer, including the refill of the master register, so the
/// buffer and its offsets are never observed half updated.
#[derive(Debug, Clone)]
pub struct SharedConverter {
    inner: Arc<Mutex<WidthConverter>>,
}

impl SharedConverter {
    /// Creates a shared converter.
    pub fn new(config: WidthConfig) -> Result<Self, WidthError> {
        Ok(Self { inner: Arc::new(Mutex::new(WidthConverter::new(config)?)) })
    }

    /// See [`WidthConverter::try_accept`].
    pub fn try_accept(&self, beat: Beat) -> Result<Accept, WidthError> { self.inner.lock().try_accept(beat) }

    /// See [`WidthConverter::try_emit`].
    pub fn try_emit(&self) -> Option<Beat> { self.inner.lock().try_emit() }

    /// See [`WidthConverter::stats`].
    pub fn stats(&self) -> Stats { self.inner.lock().stats() }

    /// Runs `f` with the lock held.
    pub fn with<T>(&self, f: impl FnOnce(&mut WidthConverter) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}

impl From<WidthConverter> for SharedConverter {
    fn from(converter: WidthConverter) -> Self { Self { inner: Arc::new(Mutex::new(converter)) } }
}
