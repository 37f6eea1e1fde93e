//! Target path computation

mod generator;

pub use generator::*;
