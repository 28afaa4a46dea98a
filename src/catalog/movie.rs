use std::collections::BTreeMap;
use std::sync::Mutex;

use super::theatre::Theatre;

/// A movie's theatres, guarded by a single mutex that serializes every operation
/// across all of them.
///
/// The reference implementation asserts (in debug builds) that a nested internal
/// helper is only ever invoked while the movie lock is held. The idiomatic Rust
/// equivalent is structural rather than a runtime assertion: every helper that
/// touches theatre state takes `&mut BTreeMap<String, Theatre>` or `&mut Theatre`
/// obtained from the held `MutexGuard`, so the borrow checker makes it impossible
/// to call them without the lock.
pub struct Movie {
    name: String,
    theatres: Mutex<BTreeMap<String, Theatre>>,
}

impl Movie {
    pub(crate) fn new(name: String, theatre_names: Vec<String>) -> Self {
        let theatres = theatre_names.into_iter().map(|t| (t, Theatre::new())).collect();
        Movie { name, theatres: Mutex::new(theatres) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquires the movie lock for the duration of `f`, never held across an `.await`.
    pub(crate) fn with_theatres<R>(&self, f: impl FnOnce(&mut BTreeMap<String, Theatre>) -> R) -> R {
        let mut guard = self.theatres.lock().expect("movie mutex poisoned");
        f(&mut guard)
    }
}
