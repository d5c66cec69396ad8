//! Interned file handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A project-wide handle for one source file.
///
/// Ids are assigned by the [`FileSet`](crate::base::FileSet) in path
/// insertion order and stay stable for the life of the project, across file
/// updates and removals. Everything downstream — locations, symbol ids,
/// registries, snapshots — keys on the handle, never the path, so a file
/// rename is an id reassignment rather than a project-wide rewrite.
///
/// Serializes as the bare number, keeping the JSON index mirror compact.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw index, for collaborators that number files themselves.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<FileId> for u32 {
    #[inline]
    fn from(id: FileId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_key_hash_maps() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(FileId::new(1));
        set.insert(FileId::new(2));
        set.insert(FileId::new(1));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&FileId::new(1)));
    }

    #[test]
    fn test_ordering_follows_assignment() {
        assert!(FileId::new(0) < FileId::new(1));
        assert_eq!(FileId::new(3), FileId::from(3));
        assert_eq!(u32::from(FileId::new(3)), 3);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&FileId::new(7)).unwrap();
        assert_eq!(json, "7");

        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FileId::new(7));
    }
}
