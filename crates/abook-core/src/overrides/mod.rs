//! Sidecar override files: parsing, cascading and writing

mod chain;
mod format;
mod schema;
mod writer;

pub use chain::*;
pub use format::*;
pub use schema::{
    MetadataOverride, BOOKINFO_FILE, GENERATED_SOURCE, LIST_SEPARATOR, MANUAL_SOURCE,
    METADATA_FILE,
};
pub use writer::*;
