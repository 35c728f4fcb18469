pub mod identities;
pub mod scan;

pub use identities::*;
pub use scan::*;

/// Numeric author identifier, either source-supplied or synthetic
pub type AuthorId = u64;

/// Where a mention sits: the paper's row in the corpus and the author's slot
/// within that paper's author list.
///
/// A slot alone only means something relative to one author list, so it is
/// always paired with the row it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorPosition {
    pub row: usize,
    pub slot: usize,
}

impl AuthorPosition {
    pub fn new(row: usize, slot: usize) -> Self {
        Self { row, slot }
    }
}

/// Composite lookup key for mentions that needed a synthetic id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub name: String,
    pub position: AuthorPosition,
}
