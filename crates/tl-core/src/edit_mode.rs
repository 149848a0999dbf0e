//! Edit tools and drag movement modes
//!
//! The active tool decides how a mouse gesture on the timeline is turned into
//! edits:
//! - Pointer: move clips, trim edges (creating gaps)
//! - Ripple: trim edges, shifting everything downstream on all tracks
//! - Rolling: move an edit point between two adjacent blocks
//! - Slide: move a clip between its neighbours, resizing only them
//! - Slip: change a clip's media offset in place
//! - Razor: split clips at a point

use serde::{Deserialize, Serialize};

/// Interactive editing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditTool {
    #[default]
    Pointer,
    Ripple,
    Rolling,
    Slide,
    Slip,
    Razor,
}

impl EditTool {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pointer => "Pointer",
            Self::Ripple => "Ripple",
            Self::Rolling => "Rolling",
            Self::Slide => "Slide",
            Self::Slip => "Slip",
            Self::Razor => "Razor",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Pointer => "Move and trim clips",
            Self::Ripple => "Trim and shift downstream content on every track",
            Self::Rolling => "Move an edit point between two adjacent blocks",
            Self::Slide => "Move a clip between its neighbours",
            Self::Slip => "Change a clip's media offset without moving it",
            Self::Razor => "Split clips at a point",
        }
    }

    /// Get keyboard shortcut
    pub fn shortcut(&self) -> &'static str {
        match self {
            Self::Pointer => "V",
            Self::Ripple => "B",
            Self::Rolling => "N",
            Self::Slide => "U",
            Self::Slip => "Y",
            Self::Razor => "C",
        }
    }

    pub fn all() -> &'static [EditTool] {
        &[
            Self::Pointer,
            Self::Ripple,
            Self::Rolling,
            Self::Slide,
            Self::Slip,
            Self::Razor,
        ]
    }
}

/// What a drag does to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    None,
    /// Move the whole block
    Move,
    /// Drag the in (left) edge
    TrimIn,
    /// Drag the out (right) edge
    TrimOut,
}

impl MovementMode {
    #[inline]
    pub fn is_trim(self) -> bool {
        matches!(self, Self::TrimIn | Self::TrimOut)
    }

    /// TrimIn <-> TrimOut; other modes unchanged
    pub fn flip_trim(self) -> Self {
        match self {
            Self::TrimIn => Self::TrimOut,
            Self::TrimOut => Self::TrimIn,
            other => other,
        }
    }
}

/// Snapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Snapping is enabled
    pub enabled: bool,
    /// Maximum distance to a snap target (pixels)
    pub threshold_px: f64,
    /// Snap to block edges
    pub to_blocks: bool,
    /// Snap to the playhead
    pub to_playhead: bool,
    /// Snap to markers
    pub to_markers: bool,
    /// Snap to workarea edges
    pub to_workarea: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: 10.0,
            to_blocks: true,
            to_playhead: true,
            to_markers: true,
            to_workarea: true,
        }
    }
}
