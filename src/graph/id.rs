//! `ObjectId`: a strong, zero-cost handle for objects owned by a
//! [`DataStructure`](crate::graph::structure::DataStructure).
//!
//! Every object in the hierarchy (group, attribute matrix, array, geometry,
//! scalar) is addressed by a unique, opaque identifier. `ObjectId` wraps a
//! nonzero `u64` to enforce at compile- and runtime that 0 is reserved as an
//! invalid or sentinel value.
//!
//! Ids are issued by a per-structure monotonic counter and are never reused
//! within one structure instance. A deep copy of a structure builds a fresh
//! id space; see `DataStructure::deep_copy`.

use std::{fmt, num::NonZeroU64};

use crate::error::DataGroveError;

/// Opaque identifier for a [`DataObject`](crate::graph::object::DataObject).
///
/// # Memory layout
/// `repr(transparent)` over `NonZeroU64`: same ABI and alignment as its single
/// field, so `Option<ObjectId>` is still 8 bytes.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct ObjectId(NonZeroU64);

impl ObjectId {
    /// Creates a new `ObjectId` from a raw `u64` value.
    ///
    /// # Errors
    /// Returns [`DataGroveError::InvalidObjectId`] if `raw == 0`; 0 is
    /// reserved as the invalid/sentinel value.
    #[inline]
    pub fn try_new(raw: u64) -> Result<Self, DataGroveError> {
        NonZeroU64::new(raw)
            .map(ObjectId)
            .ok_or(DataGroveError::InvalidObjectId)
    }

    /// Returns the inner `u64` value of this `ObjectId`.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// Custom `Debug` implementation to display as `ObjectId(raw_value)`.
impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.get()).finish()
    }
}

/// Prints the numeric id without any wrapper text.
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod layout_tests {
    //! Compile-time assertion that `ObjectId` has the same layout as `u64`.
    use super::*;
    use static_assertions::{assert_eq_align, assert_eq_size};

    assert_eq_size!(ObjectId, u64);
    assert_eq_align!(ObjectId, u64);
    assert_eq_size!(Option<ObjectId>, u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(ObjectId::try_new(0), Err(DataGroveError::InvalidObjectId));
    }

    #[test]
    fn new_and_get() {
        let id = ObjectId::try_new(42).unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn debug_and_display() {
        let id = ObjectId::try_new(7).unwrap();
        assert_eq!(format!("{:?}", id), "ObjectId(7)");
        assert_eq!(format!("{}", id), "7");
    }

    #[test]
    fn ordering_and_hash() {
        use std::collections::HashSet;
        let a = ObjectId::try_new(1).unwrap();
        let b = ObjectId::try_new(2).unwrap();
        assert!(a < b);
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn json_roundtrip() {
        let id = ObjectId::try_new(123).unwrap();
        let s = serde_json::to_string(&id).unwrap();
        let back: ObjectId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }
}
