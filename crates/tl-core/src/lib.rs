//! tl-core: Shared types for the timeline editing engine
//!
//! Exact rational time, ranges, track/block identifiers and edit modes used by
//! the state and tool crates.

mod edit_mode;
mod error;
mod time;
mod track;

pub use edit_mode::*;
pub use error::*;
pub use time::*;
pub use track::*;
