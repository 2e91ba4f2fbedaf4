use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of an open dialog. Derived from the wall clock in
/// milliseconds and kept strictly increasing by [`IdGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogId(String);

impl DialogId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DialogId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DialogId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id; never repeats even when called twice in one millisecond.
    pub fn next(&mut self) -> DialogId {
        self.next_at(now_millis())
    }

    pub(crate) fn next_at(&mut self, now_ms: u64) -> DialogId {
        let value = now_ms.max(self.last + 1);
        self.last = value;
        DialogId(value.to_string())
    }

    /// Raise the floor past an id that was created elsewhere (e.g. restored
    /// from a draft) so later ids sort after it.
    pub fn observe(&mut self, id: &DialogId) {
        if let Some(ms) = id.millis() {
            self.last = self.last.max(ms);
        }
    }
}
