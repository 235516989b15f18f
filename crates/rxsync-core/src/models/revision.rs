//! Revision markers for optimistic concurrency

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque revision marker in `<generation>-<suffix>` form.
///
/// A new marker is minted on every write, so comparing the stored marker
/// against the one a writer read is enough to detect a lost update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Marker for a record's first write.
    #[must_use]
    pub fn initial() -> Self {
        Self(format!("1-{}", suffix()))
    }

    /// Marker for the write that supersedes this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(format!("{}-{}", self.generation() + 1, suffix()))
    }

    /// The write count encoded in the marker (0 when unparseable).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0
            .split_once('-')
            .and_then(|(n, _)| n.parse().ok())
            .unwrap_or(0)
    }

    /// String form of the marker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Revision {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Revision {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn suffix() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}
