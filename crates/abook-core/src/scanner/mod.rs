//! Discovery of audiobook units under a root directory

mod directory;
mod unit;

pub use directory::*;
pub use unit::*;
