//! Duplicate detection: fuzzy name grouping and exact-key checks

mod detector;
mod key;
mod union_find;

pub use detector::*;
pub use key::*;
pub use union_find::*;
