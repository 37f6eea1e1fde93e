//! Metadata candidates, consolidation and the per-unit extraction pipeline

mod candidate;
mod consolidated;
mod consolidator;
mod extractor;

pub use candidate::*;
pub use consolidated::*;
pub use consolidator::*;
pub use extractor::*;
