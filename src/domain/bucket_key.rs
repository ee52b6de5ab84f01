use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the time-sliced storage unit an instant belongs to.
///
/// Ordering is plain string ordering, which is chronological for keys of the
/// same granularity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(String);

impl BucketKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BucketKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BucketKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BucketKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
