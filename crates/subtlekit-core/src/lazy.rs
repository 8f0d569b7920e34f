//! Single-flight lazy key resolution
//!
//! A [`LazyKey`] caches the handle (or handles) a wrapper derives on first
//! use. Concurrent first callers wait on one in-flight derivation and all
//! observe the same value; later calls are a read-lock lookup.

use std::sync::{Mutex, PoisonError, RwLock};

use subtlekit_provider::{CryptoProvider, KeyHandle};

use crate::error::{Error, Result};

/// Hand a derived handle back to the provider, logging failures
pub(crate) fn release_handle(provider: &dyn CryptoProvider, handle: KeyHandle) {
    if let Err(err) = provider.release(handle) {
        tracing::warn!(?handle, %err, "failed to release key");
    }
}

struct Slot<H> {
    value: H,
    /// Derived here rather than supplied by the caller
    owned: bool,
}

pub struct LazyKey<H> {
    slot: RwLock<Option<Slot<H>>>,
    flight: Mutex<()>,
}

impl<H: Clone> LazyKey<H> {
    /// Unresolved; the first resolution derives a value
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            flight: Mutex::new(()),
        }
    }

    /// Already resolved to a caller-supplied value, which is never released
    pub fn resolved(value: H) -> Self {
        Self {
            slot: RwLock::new(Some(Slot {
                value,
                owned: false,
            })),
            flight: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Result<Option<H>> {
        let slot = self.slot.read().map_err(|_| Error::LockPoisoned)?;
        Ok(slot.as_ref().map(|slot| slot.value.clone()))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }

    /// Return the cached value, deriving one if there is none or `force` is set
    ///
    /// A value replaced by a forced derivation is handed to `release` when it
    /// was derived here. `derive` failing leaves the cached value untouched.
    pub fn resolve_with<D, R>(&self, force: bool, derive: D, release: R) -> Result<H>
    where
        D: FnOnce() -> Result<H>,
        R: FnOnce(H),
    {
        if !force {
            if let Some(value) = self.get()? {
                tracing::trace!("key cache hit");
                return Ok(value);
            }
        }

        let _flight = self.flight.lock().map_err(|_| Error::LockPoisoned)?;
        if !force {
            // another caller may have finished while we waited
            if let Some(value) = self.get()? {
                return Ok(value);
            }
        }

        tracing::debug!(force, "deriving key");
        let value = derive()?;
        let previous = {
            let mut slot = self.slot.write().map_err(|_| Error::LockPoisoned)?;
            slot.replace(Slot {
                value: value.clone(),
                owned: true,
            })
        };
        if let Some(previous) = previous.filter(|slot| slot.owned) {
            release(previous.value);
        }
        Ok(value)
    }

    /// Run `f` on the resolved value, deriving it first if needed
    ///
    /// The slot stays read-locked while `f` runs, so a forced derivation
    /// cannot replace and release the value out from under it.
    pub fn with_value<T, D, R, F>(&self, derive: D, release: R, f: F) -> Result<T>
    where
        D: FnOnce() -> Result<H>,
        R: FnOnce(H),
        F: FnOnce(&H) -> Result<T>,
    {
        {
            let slot = self.slot.read().map_err(|_| Error::LockPoisoned)?;
            if let Some(slot) = slot.as_ref() {
                return f(&slot.value);
            }
        }
        self.resolve_with(false, derive, release)?;
        let slot = self.slot.read().map_err(|_| Error::LockPoisoned)?;
        match slot.as_ref() {
            Some(slot) => f(&slot.value),
            None => Err(Error::MissingKeyMaterial),
        }
    }

    /// Take the cached value if it was derived here, leaving the key unresolved
    pub fn take_owned(&mut self) -> Option<H> {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            Some(Slot { value, owned: true }) => Some(value),
            other => {
                *slot = other;
                None
            }
        }
    }
}

impl<H: Clone> Default for LazyKey<H> {
    fn default() -> Self {
        Self::new()
    }
}
