use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Feed post identifier.
///
/// Ids are assigned by the backend and grow monotonically, which is what the
/// feed cursor relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
