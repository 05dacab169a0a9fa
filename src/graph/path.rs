//! Addressing: name-based [`DataPath`] and id-based [`LinkedPath`].
//!
//! A `DataPath` is a value type holding ordered segment names from the root
//! table down to a target; it is re-resolved by name lookup at every use, so
//! it may stop resolving after a rename. A `LinkedPath` captures the resolved
//! id chain instead: renames do not invalidate it, but removal of any segment
//! along the chain does.

use std::fmt;
use std::str::FromStr;

use crate::error::DataGroveError;
use crate::graph::id::ObjectId;
use crate::graph::structure::DataStructure;

/// Path separator used by `Display` and `FromStr`.
pub const PATH_SEPARATOR: char = '/';

pub(crate) fn validate_name(name: &str) -> Result<(), DataGroveError> {
    if name.is_empty() || name.contains(PATH_SEPARATOR) {
        return Err(DataGroveError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Ordered sequence of names addressing an object from the root table.
///
/// The empty path addresses the root table itself and cannot name an object.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct DataPath {
    segments: Vec<String>,
}

impl DataPath {
    /// Build a path from owned segments.
    ///
    /// # Errors
    /// [`DataGroveError::InvalidName`] when a segment is empty or contains
    /// the separator.
    pub fn new(segments: Vec<String>) -> Result<Self, DataGroveError> {
        for s in &segments {
            validate_name(s)?;
        }
        Ok(Self { segments })
    }

    /// Build a path from string slices.
    pub fn from_segments<'a>(
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, DataGroveError> {
        Self::new(segments.into_iter().map(str::to_owned).collect())
    }

    /// The empty path (addresses the root table).
    pub fn root() -> Self {
        Self::default()
    }

    /// Segment names in order.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the empty path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name of the addressed object (the last segment).
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path one level deeper.
    pub fn child(&self, name: &str) -> Result<Self, DataGroveError> {
        validate_name(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_owned());
        Ok(Self { segments })
    }

    /// Path of the addressed object's parent; `None` for the empty path.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Same path with the last segment replaced.
    ///
    /// # Errors
    /// [`DataGroveError::EmptyPath`] on the empty path,
    /// [`DataGroveError::InvalidName`] for a bad name.
    pub fn with_name(&self, name: &str) -> Result<Self, DataGroveError> {
        validate_name(name)?;
        let mut segments = self.segments.clone();
        *segments.last_mut().ok_or(DataGroveError::EmptyPath)? = name.to_owned();
        Ok(Self { segments })
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for DataPath {
    type Err = DataGroveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches(PATH_SEPARATOR);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::from_segments(trimmed.split(PATH_SEPARATOR))
    }
}

/// Ordered id chain captured from a resolved [`DataPath`].
///
/// Resolution is by id: renaming a segment leaves the chain valid, removing
/// any segment (or cutting a link edge) invalidates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedPath {
    ids: Vec<ObjectId>,
}

impl LinkedPath {
    pub(crate) fn from_ids(ids: Vec<ObjectId>) -> Self {
        Self { ids }
    }

    /// Ids in root-to-target order.
    #[inline]
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Id of the addressed object.
    #[inline]
    pub fn target(&self) -> Option<ObjectId> {
        self.ids.last().copied()
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the chain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether every segment is still live and every link is still an edge
    /// of the ownership graph.
    pub fn is_valid(&self, structure: &DataStructure) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        for window in self.ids.windows(2) {
            let (parent, child) = (window[0], window[1]);
            match structure.get(child) {
                Some(obj) if obj.parents().contains(&parent) => {}
                _ => return false,
            }
        }
        structure.get(self.ids[0]).is_some()
    }

    /// The addressed object, when the chain is still valid.
    pub fn resolve<'a>(
        &self,
        structure: &'a DataStructure,
    ) -> Option<&'a crate::graph::object::DataObject> {
        if !self.is_valid(structure) {
            return None;
        }
        structure.get(*self.ids.last()?)
    }
}
