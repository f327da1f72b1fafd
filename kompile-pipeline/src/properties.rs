//! Process-wide system properties forwarded to the JVM tools we launch.
//!
//! Front ends pass the current snapshot to child JVMs as `-D` options.
//! A property exists only while at least one scoped override of it is live;
//! the most recent live override wins. Overrides can be released in any order, so
//! compile calls on different threads don't restore each other's values.

use std::{
    collections::BTreeMap,
    sync::{
        LazyLock, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// Disables IntelliJ's native file-system helper on Windows, which the
/// embedded compiler cannot load.
pub const NATIVE_FS_FOR_WIN: &str = "idea.use.native.fs.for.win";

/// Live overrides of one key, oldest first.
type Overrides = Vec<(u64, String)>;

static PROPERTIES: LazyLock<Mutex<BTreeMap<String, Overrides>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(0);

fn properties() -> MutexGuard<'static, BTreeMap<String, Overrides>> {
    PROPERTIES.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn property(key: &str) -> Option<String> {
    properties()
        .get(key)
        .and_then(|overrides| overrides.last())
        .map(|(_, value)| value.clone())
}

/// All effective values, ordered by key.
pub fn snapshot() -> Vec<(String, String)> {
    properties()
        .iter()
        .filter_map(|(k, o)| o.last().map(|(_, v)| (k.clone(), v.clone())))
        .collect()
}

/// Render properties as JVM options (`-Dkey=value ...`).
pub fn java_opts(properties: &[(String, String)]) -> String {
    properties
        .iter()
        .map(|(k, v)| format!("-D{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Overrides a property for as long as the guard lives.
#[must_use = "the property is restored as soon as the guard is dropped"]
pub struct ScopedProperty {
    key: String,
    id: u64,
}

impl ScopedProperty {
    pub fn set(key: &str, value: &str) -> Self {
        let id = NEXT_SCOPE.fetch_add(1, Ordering::Relaxed);
        properties()
            .entry(key.to_string())
            .or_default()
            .push((id, value.to_string()));
        Self {
            key: key.to_string(),
            id,
        }
    }
}

impl Drop for ScopedProperty {
    fn drop(&mut self) {
        let mut properties = properties();
        if let Some(overrides) = properties.get_mut(&self.key) {
            overrides.retain(|(id, _)| *id != self.id);
            if overrides.is_empty() {
                properties.remove(&self.key);
            }
        }
    }
}
