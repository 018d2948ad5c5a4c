//! Hook slots for ambient primitives
//!
//! An [`Ambient`] slot owns the "current" primitive the host dispatches
//! through. Installing a monitor swaps in a wrapper around the previous
//! head; the returned [`HookHandle`] remembers exactly what it replaced so
//! uninstall can restore it. Composition is linear chaining with strict
//! stack discipline: only the most recently installed hook may uninstall,
//! and an out-of-order attempt is rejected without touching the chain.

use std::sync::{Arc, Mutex};

use crate::common::{lock, Error, Result};

/// Slot holding the current head of a wrapper chain over primitive `P`.
pub struct Ambient<P: ?Sized> {
    current: Arc<Mutex<Arc<P>>>,
}

impl<P: ?Sized> Clone for Ambient<P> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<P: ?Sized> Ambient<P> {
    /// Create a slot dispatching to `base`
    pub fn new(base: Arc<P>) -> Self {
        Self {
            current: Arc::new(Mutex::new(base)),
        }
    }

    /// The current chain head; callers dispatch through this
    pub fn current(&self) -> Arc<P> {
        Arc::clone(&lock(&self.current))
    }

    /// Install a wrapper built from the current head and return a handle
    /// that restores the previous head on uninstall.
    ///
    /// `wrap` receives the primitive that was current immediately before
    /// this install and must return the wrapper that forwards to it.
    pub fn install<F>(&self, name: &str, wrap: F) -> HookHandle<P>
    where
        F: FnOnce(Arc<P>) -> Arc<P>,
    {
        let mut head = lock(&self.current);
        let saved = Arc::clone(&head);
        let installed = wrap(Arc::clone(&saved));
        *head = Arc::clone(&installed);

        HookHandle {
            name: name.to_string(),
            slot: self.clone(),
            saved,
            installed: Some(installed),
        }
    }
}

/// Disposable handle for one installed hook.
///
/// Dropping a handle without calling [`HookHandle::uninstall`] leaks the
/// hook for the lifetime of the slot; callers must track their handles.
pub struct HookHandle<P: ?Sized> {
    name: String,
    slot: Ambient<P>,
    saved: Arc<P>,
    installed: Option<Arc<P>>,
}

impl<P: ?Sized> HookHandle<P> {
    /// Hook name, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this hook is still installed somewhere in the chain
    pub fn is_active(&self) -> bool {
        self.installed.is_some()
    }

    /// Restore the primitive that was current immediately before this hook
    /// was installed.
    ///
    /// Fails with [`Error::HookOrder`] if this hook is not the current chain
    /// head (a later install has not been unwound yet); the chain is left
    /// untouched in that case.
    pub fn uninstall(&mut self) -> Result<()> {
        let installed = self
            .installed
            .as_ref()
            .ok_or_else(|| Error::HookGone {
                hook: self.name.clone(),
            })?;

        let mut head = lock(&self.slot.current);
        if !Arc::ptr_eq(&head, installed) {
            return Err(Error::hook_order(&self.name));
        }

        *head = Arc::clone(&self.saved);
        self.installed = None;
        Ok(())
    }
}
