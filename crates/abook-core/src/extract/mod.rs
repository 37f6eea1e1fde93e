//! Metadata extractors: embedded tags, file/folder names and folder hierarchy

mod contributors;
mod filename;
mod hierarchy;
mod patterns;
mod tag_cache;
mod tags;

pub use contributors::*;
pub use filename::*;
pub use hierarchy::*;
pub use tag_cache::{CachedFile, TagCache, TAG_CACHE_FILE};
pub use tags::*;
