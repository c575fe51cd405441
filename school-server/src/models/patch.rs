//! Tri-state field for partial updates
//!
//! Distinguishes an omitted field from an explicit `null`, so an update can
//! leave a value alone, clear it, or replace it.

use serde::{Deserialize, Deserializer};

/// One field of a partial update.
///
/// Use with `#[serde(default)]` so that an absent field becomes [`Patch::Keep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field omitted: keep the stored value
    Keep,
    /// Field sent as `null`
    Clear,
    /// Field sent with a value
    Set(T),
}

impl<T> Patch<T> {
    /// Resolve against the stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}
