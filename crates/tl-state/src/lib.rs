//! tl-state: timeline model, undo/redo and the edit-command family
//!
//! Blocks live in a [`BlockPool`] owned by the [`Sequence`]; tracks hold
//! ordered, contiguous block ids. All edits are reversible
//! [`EditCommand`]s that can be pushed to the [`UndoManager`] through
//! [`SequenceCommand`].

mod block;
mod commands;
mod preferences;
mod selection;
mod sequence;
mod track;
mod tracklist;
mod undo;

pub use block::*;
pub use commands::*;
pub use preferences::*;
pub use selection::*;
pub use sequence::*;
pub use track::*;
pub use tracklist::*;
pub use undo::*;
