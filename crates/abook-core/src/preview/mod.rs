//! Dry-run previews of an organize run

pub mod export;
mod generator;
mod types;

pub use generator::*;
pub use types::*;
