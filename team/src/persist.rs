//! Values mirrored to durable storage under a fixed key

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::storage::{Storage, StorageError};

#[derive(Error, Debug)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored value for {key} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Lifecycle of a [`PersistedState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Holding the default in memory; storage not read yet
    Uninitialized,
    /// Reading storage
    Hydrating,
    /// Storage has been read; every change is written through
    Ready,
}

/// An in-memory value mirrored to [`Storage`] under `key`.
///
/// Construction holds the default only in memory. [`hydrate`](Self::hydrate)
/// reads storage once and, if a value was stored, replaces the in-memory
/// value. Changes made before hydration completes are kept in memory but not
/// written, so the default can never clobber a stored value. From then on
/// every change is serialized and written immediately.
pub struct PersistedState<T> {
    key: String,
    value: T,
    phase: Hydration,
    storage: Arc<dyn Storage>,
    fault: Option<PersistError>,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create without touching storage
    pub fn new(key: impl Into<String>, default: T, storage: Arc<dyn Storage>) -> Self {
        Self {
            key: key.into(),
            value: default,
            phase: Hydration::Uninitialized,
            storage,
            fault: None,
        }
    }

    /// Create and hydrate immediately
    pub fn open(key: impl Into<String>, default: T, storage: Arc<dyn Storage>) -> Self {
        let mut state = Self::new(key, default, storage);
        state.hydrate();
        state
    }

    /// Read storage once and move to [`Hydration::Ready`].
    ///
    /// Returns whether a stored value replaced the in-memory one. Unreadable
    /// or malformed data is reported through [`hydration_fault`](Self::hydration_fault)
    /// and the in-memory value is kept. Calling again once ready is a no-op.
    pub fn hydrate(&mut self) -> bool {
        if self.phase == Hydration::Ready {
            return false;
        }

        self.phase = Hydration::Hydrating;
        let loaded = match self.load() {
            Ok(Some(value)) => {
                self.value = value;
                true
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "No stored value, keeping default");
                false
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Ignoring unreadable stored value");
                self.fault = Some(e);
                false
            }
        };
        self.phase = Hydration::Ready;

        loaded
    }

    fn load(&self) -> Result<Option<T>, PersistError> {
        let Some(raw) = self.storage.read(&self.key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistError::Malformed {
                key: self.key.clone(),
                source,
            })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> Hydration {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Hydration::Ready
    }

    /// The fault hit while hydrating, if the stored value could not be used
    pub fn hydration_fault(&self) -> Option<&PersistError> {
        self.fault.as_ref()
    }

    /// Replace the value and write it through
    pub fn set(&mut self, value: T) -> Result<(), PersistError> {
        self.value = value;
        self.store()
    }

    /// Mutate the value in place and write it through.
    ///
    /// Nothing is written when `f` fails; `f` must leave the value untouched
    /// in that case.
    pub fn try_modify<R, E>(&mut self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<PersistError>,
    {
        let result = f(&mut self.value)?;
        self.store()?;
        Ok(result)
    }

    fn store(&mut self) -> Result<(), PersistError> {
        if self.phase != Hydration::Ready {
            tracing::debug!(key = %self.key, phase = ?self.phase, "Write suppressed before hydration");
            return Ok(());
        }

        let raw = serde_json::to_string(&self.value).map_err(|source| PersistError::Serialize {
            key: self.key.clone(),
            source,
        })?;

        self.storage.write(&self.key, &raw)?;
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedState")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("phase", &self.phase)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}
