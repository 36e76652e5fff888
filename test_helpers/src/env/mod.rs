//! Serialised mutation of the process environment for tests.
//!
//! Every mutation takes a global re-entrant mutex and returns an RAII guard
//! that restores the previous state when dropped. Guards for the same key
//! restore in LIFO order. Hold an [`EnvScope`] when a test needs several
//! variables to stay in place while it captures the environment.
//!
//! ```
//! use envflag_test_helpers::env;
//!
//! let _guard = env::set_var("DATABASE_MASTER_HOST", "localhost");
//! assert_eq!(std::env::var("DATABASE_MASTER_HOST").ok().as_deref(), Some("localhost"));
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Records `key`'s current value, applies `mutate`, and returns the guard
/// that undoes it. The caller must hold `ENV_MUTEX`.
fn guarded<F>(key: String, mutate: F) -> EnvVarGuard
where
    F: FnOnce(&str),
{
    let original = env::var_os(&key);
    mutate(&key);
    EnvVarGuard { key, original }
}

fn set_locked(key: String, value: &OsStr) -> EnvVarGuard {
    // SAFETY: every caller holds `ENV_MUTEX`.
    guarded(key, |k| unsafe { env::set_var(k, value) })
}

fn remove_locked(key: String) -> EnvVarGuard {
    // SAFETY: every caller holds `ENV_MUTEX`.
    guarded(key, |k| unsafe { env::remove_var(k) })
}

/// RAII guard restoring an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _lock = ENV_MUTEX.lock();
        match self.original.take() {
            // SAFETY: `ENV_MUTEX` is held for the restoration.
            Some(value) => unsafe { env::set_var(&self.key, value) },
            // SAFETY: as above.
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

/// Exclusive access to the environment for the lifetime of the value.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    _guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Sets a variable while the lock is held.
    pub fn set_var<K, V>(&self, key: K, value: V) -> EnvVarGuard
    where
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        set_locked(key.into(), value.as_ref())
    }

    /// Removes a variable while the lock is held.
    pub fn remove_var<K>(&self, key: K) -> EnvVarGuard
    where
        K: Into<String>,
    {
        remove_locked(key.into())
    }
}

/// Holds the environment lock together with the guards built under it.
///
/// Guards are restored before the lock is released.
#[must_use = "dropping releases the environment lock and restores guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        drop(std::mem::take(&mut self.guards));
    }
}

/// Sets an environment variable and returns a guard restoring its prior value.
pub fn set_var<K, V>(key: K, value: V) -> EnvVarGuard
where
    K: Into<String>,
    V: AsRef<OsStr>,
{
    let _lock = ENV_MUTEX.lock();
    set_locked(key.into(), value.as_ref())
}

/// Removes an environment variable and returns a guard restoring its prior value.
pub fn remove_var<K>(key: K) -> EnvVarGuard
where
    K: Into<String>,
{
    let _lock = ENV_MUTEX.lock();
    remove_locked(key.into())
}

/// Acquire the global environment lock.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        _guard: ENV_MUTEX.lock(),
    }
}

/// Run `builder` under the lock and keep the lock until the scope drops.
///
/// Builders should use the lock's own `set_var`/`remove_var`.
///
/// ```
/// use envflag_test_helpers::env;
///
/// let _scope = env::scope_with(|lock| vec![lock.remove_var("DATABASE_MASTER_PORT")]);
/// assert!(std::env::var("DATABASE_MASTER_PORT").is_err());
/// ```
pub fn scope_with<F>(builder: F) -> EnvScope
where
    F: FnOnce(&EnvVarLock) -> Vec<EnvVarGuard>,
{
    let lock = lock();
    let guards = builder(&lock);
    EnvScope {
        guards,
        _lock: lock,
    }
}

/// Set every `(key, value)` pair inside one locked scope.
///
/// Useful for laying out the variables a binder should pick up:
///
/// ```
/// use envflag_test_helpers::env;
///
/// let _scope = env::scope_from_pairs([
///     ("DATABASE_MASTER_HOST", "localhost"),
///     ("DATABASE_MASTER_PORT", "3306"),
/// ]);
/// assert_eq!(std::env::var("DATABASE_MASTER_PORT").ok().as_deref(), Some("3306"));
/// ```
pub fn scope_from_pairs<I, K, V>(pairs: I) -> EnvScope
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<OsStr>,
{
    scope_with(|lock| {
        pairs
            .into_iter()
            .map(|(key, value)| lock.set_var(key, value))
            .collect()
    })
}

#[cfg(test)]
mod tests;
