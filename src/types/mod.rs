//! Core data types: coordinates, cells, formats, selections.

mod cell;
mod coords;
mod format;
mod selection;

pub use cell::*;
pub use coords::*;
pub use format::*;
pub use selection::*;
