//! Scoped elevation of a scope's unsafe-update flag.

use tracing::debug;

use crate::platform::ScopeStore;

/// Forces a scope's unsafe-update flag on for the guard's lifetime.
///
/// The previous value is captured on creation and written back on drop, so
/// early returns, `?` propagation and unwinding all restore it.
///
/// ```ignore
/// let _guard = UnsafeUpdateGuard::acquire(platform.as_ref(), scope);
/// platform.add_group(scope, new_group).await?;
/// // flag restored here
/// ```
pub struct UnsafeUpdateGuard<'a, S: ScopeStore + ?Sized> {
    store: &'a S,
    scope: &'a str,
    previous: bool,
}

impl<'a, S: ScopeStore + ?Sized> UnsafeUpdateGuard<'a, S> {
    /// Saves the current flag and forces it on.
    pub fn acquire(store: &'a S, scope: &'a str) -> Self {
        let previous = store.allow_unsafe_updates(scope);
        store.set_allow_unsafe_updates(scope, true);
        debug!(scope = %scope, previous, "Unsafe updates enabled");
        Self {
            store,
            scope,
            previous,
        }
    }

    /// The flag value that will be restored.
    #[must_use]
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl<S: ScopeStore + ?Sized> Drop for UnsafeUpdateGuard<'_, S> {
    fn drop(&mut self) {
        self.store.set_allow_unsafe_updates(self.scope, self.previous);
        debug!(scope = %self.scope, restored = self.previous, "Unsafe updates restored");
    }
}
