//! Mouse input and the time ↔ pixel mapping of the timeline view

use serde::{Deserialize, Serialize};
use tl_core::{MovementMode, Rational, TrackRef, time_from_seconds_f64, to_seconds_f64};

/// Keyboard modifiers held during a mouse event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Extend/toggle selection; disables snapping while dragging
    pub shift: bool,
    /// Ignore links; duplicate when moving
    pub alt: bool,
    /// Insert instead of overwrite when moving
    pub ctrl: bool,
}

/// A mouse event already mapped to timeline coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub time: Rational,
    pub track: TrackRef,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(time: Rational, track: TrackRef) -> Self {
        Self {
            time,
            track,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }
}

/// Horizontal zoom and scroll of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineView {
    /// Zoom level
    pub pixels_per_second: f64,
    /// Scene x at the left edge of the viewport
    pub scroll_x: f64,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            pixels_per_second: 100.0,
            scroll_x: 0.0,
        }
    }
}

impl TimelineView {
    pub fn new(pixels_per_second: f64) -> Self {
        Self {
            pixels_per_second,
            ..Self::default()
        }
    }

    /// Scene x of a time (independent of scrolling)
    #[inline]
    pub fn time_to_scene(&self, time: Rational) -> f64 {
        to_seconds_f64(time) * self.pixels_per_second
    }

    /// Time at a scene x, rounded to `timebase`
    pub fn scene_to_time(&self, x: f64, timebase: Rational) -> Rational {
        time_from_seconds_f64(x / self.pixels_per_second, timebase)
    }

    /// Viewport x of a time
    #[inline]
    pub fn time_to_screen(&self, time: Rational) -> f64 {
        self.time_to_scene(time) - self.scroll_x
    }

    pub fn screen_to_time(&self, x: f64, timebase: Rational) -> Rational {
        self.scene_to_time(x + self.scroll_x, timebase)
    }

    /// Width in pixels of a time span
    #[inline]
    pub fn span_to_pixels(&self, span: Rational) -> f64 {
        to_seconds_f64(span).abs() * self.pixels_per_second
    }
}

/// Which edge (if any) of a block the cursor is grabbing
///
/// Blocks no wider than two handles cannot be trimmed from the pointer.
pub fn is_cursor_in_trim_handle(
    block_in: Rational,
    block_out: Rational,
    cursor_time: Rational,
    view: &TimelineView,
    handle_px: f64,
) -> MovementMode {
    let left = view.time_to_scene(block_in);
    let right = view.time_to_scene(block_out);
    let cursor = view.time_to_scene(cursor_time);

    if right - left <= handle_px * 2.0 {
        MovementMode::None
    } else if cursor <= left + handle_px {
        MovementMode::TrimIn
    } else if cursor >= right - handle_px {
        MovementMode::TrimOut
    } else {
        MovementMode::None
    }
}
