//! # Shared Registry
//!
//! Single-writer, many-reader wrapper around [`CommandRegistry`] for hosts
//! that discover commands on one thread and search on another.
//!
//! Readers take a [`snapshot`](SharedRegistry::snapshot) and search it
//! without holding the lock. Writers mutate copy-on-write, so a snapshot
//! never changes under a reader. A reload is staged into a fresh registry
//! and swapped in with a single write.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::registry::CommandRegistry;

/// Registry handle shared between host threads
#[derive(Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Arc<CommandRegistry>>>,
}

impl SharedRegistry {
    /// Share `registry`
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Current registry contents
    pub fn snapshot(&self) -> Arc<CommandRegistry> {
        Arc::clone(&*self.inner.read())
    }

    /// Mutate the registry in place.
    ///
    /// Outstanding snapshots keep the contents they were taken with.
    pub fn update<R>(&self, f: impl FnOnce(&mut CommandRegistry) -> R) -> R {
        let mut guard = self.inner.write();
        f(Arc::make_mut(&mut *guard))
    }

    /// Start a reload into an empty registry with the same resolver.
    ///
    /// Nothing is visible to readers until [`StagedReload::commit`].
    pub fn begin_reload(&self) -> StagedReload {
        let staged = self.inner.read().empty_like();
        StagedReload {
            target: self.clone(),
            staged,
            committed: false,
        }
    }
}

impl std::fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegistry")
            .field("registry", &*self.inner.read())
            .finish()
    }
}

/// A registry being rebuilt off to the side
///
/// Dereferences to the staged [`CommandRegistry`]. Dropping it without
/// committing discards the staged commands.
pub struct StagedReload {
    target: SharedRegistry,
    staged: CommandRegistry,
    committed: bool,
}

impl StagedReload {
    /// Swap the staged registry in. Returns the number of commands now live.
    pub fn commit(mut self) -> usize {
        let staged = std::mem::take(&mut self.staged);
        let count = staged.len();
        self.committed = true;
        *self.target.inner.write() = Arc::new(staged);
        tracing::info!(commands = count, "Command registry reloaded");
        count
    }
}

impl Deref for StagedReload {
    type Target = CommandRegistry;

    fn deref(&self) -> &CommandRegistry {
        &self.staged
    }
}

impl DerefMut for StagedReload {
    fn deref_mut(&mut self) -> &mut CommandRegistry {
        &mut self.staged
    }
}

impl Drop for StagedReload {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(
                commands = self.staged.len(),
                "Staged registry reload discarded"
            );
        }
    }
}
