//! Interactive timeline editing
//!
//! Tools turn mouse gestures into ghosts while dragging and into a single
//! undoable edit on release:
//! - Ghosts and the movement validator chain
//! - Snapping to block edges, playhead, markers and workarea
//! - Pointer, ripple, rolling, slide, slip and razor tools
//! - `TimelineEditor`, which owns the undo stack and the active tool

mod editor;
mod event;
mod ghost;
mod snapping;
mod tool;
mod validate;

pub use editor::*;
pub use event::*;
pub use ghost::*;
pub use snapping::*;
pub use tool::*;
pub use validate::*;
