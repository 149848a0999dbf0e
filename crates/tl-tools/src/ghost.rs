//! Ghosts: uncommitted previews of a block's new position during a drag
//!
//! A ghost remembers where its block started and accumulates adjustments as
//! the mouse moves. Nothing in the sequence changes until the tool turns the
//! adjusted ghosts into edit commands on release.

use tl_core::{BlockId, MovementMode, Rational, TIME_ZERO, TrackRef, TrackType};
use tl_state::Block;

#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    in_point: Rational,
    out_point: Rational,
    media_in: Option<Rational>,
    track: TrackRef,

    in_adj: Rational,
    out_adj: Rational,
    media_in_adj: Rational,
    track_adj: i64,

    pub mode: MovementMode,
    can_have_zero_length: bool,
    /// Vertical moves are refused when any ghost has this unset
    pub can_move_tracks: bool,
    /// Part of a slide rather than a plain move or trim
    pub is_sliding: bool,

    /// Block this ghost previews; `None` for a synthetic (gap-to-be) ghost
    pub attached_block: Option<BlockId>,
    /// For a synthetic ripple ghost: the block a new gap goes in front of
    pub reference_block: Option<BlockId>,
    /// The trim resizes the adjacent block instead of creating a gap
    pub trim_is_a_roll_edit: bool,
    /// Another ghost's command covers this trim
    pub trim_should_be_ignored: bool,
}

impl Ghost {
    /// Ghost of a block on a track; `None` for a block on no track
    pub fn from_block(block: &Block, mode: MovementMode) -> Option<Self> {
        let track = block.track()?;
        let mut ghost = Self::from_null(block.in_point(), block.out_point(), track, mode);
        ghost.media_in = block.media_in();
        ghost.can_have_zero_length = block.can_have_zero_length();
        ghost.attached_block = Some(block.id);
        Some(ghost)
    }

    /// Ghost with no block behind it
    pub fn from_null(in_point: Rational, out_point: Rational, track: TrackRef, mode: MovementMode) -> Self {
        Self {
            in_point,
            out_point,
            media_in: None,
            track,
            in_adj: TIME_ZERO,
            out_adj: TIME_ZERO,
            media_in_adj: TIME_ZERO,
            track_adj: 0,
            mode,
            can_have_zero_length: true,
            can_move_tracks: true,
            is_sliding: false,
            attached_block: None,
            reference_block: None,
            trim_is_a_roll_edit: false,
            trim_should_be_ignored: false,
        }
    }

    /// Lock to the ghost's own track and mark it part of a slide
    pub fn set_slide_mode(&mut self) {
        self.can_move_tracks = false;
        self.is_sliding = true;
    }

    #[inline]
    pub fn in_point(&self) -> Rational {
        self.in_point
    }

    #[inline]
    pub fn out_point(&self) -> Rational {
        self.out_point
    }

    #[inline]
    pub fn length(&self) -> Rational {
        self.out_point - self.in_point
    }

    /// Media offset, for ghosts of clips
    #[inline]
    pub fn media_in(&self) -> Option<Rational> {
        self.media_in
    }

    #[inline]
    pub fn track(&self) -> TrackRef {
        self.track
    }

    #[inline]
    pub fn can_have_zero_length(&self) -> bool {
        self.can_have_zero_length
    }

    pub fn in_adjustment(&self) -> Rational {
        self.in_adj
    }

    pub fn out_adjustment(&self) -> Rational {
        self.out_adj
    }

    pub fn media_in_adjustment(&self) -> Rational {
        self.media_in_adj
    }

    pub fn track_adjustment(&self) -> i64 {
        self.track_adj
    }

    pub fn set_in_adjustment(&mut self, adj: Rational) {
        self.in_adj = adj;
    }

    pub fn set_out_adjustment(&mut self, adj: Rational) {
        self.out_adj = adj;
    }

    pub fn set_media_in_adjustment(&mut self, adj: Rational) {
        self.media_in_adj = adj;
    }

    pub fn set_track_adjustment(&mut self, adj: i64) {
        self.track_adj = adj;
    }

    pub fn adjusted_in(&self) -> Rational {
        self.in_point + self.in_adj
    }

    pub fn adjusted_out(&self) -> Rational {
        self.out_point + self.out_adj
    }

    pub fn adjusted_length(&self) -> Rational {
        self.adjusted_out() - self.adjusted_in()
    }

    pub fn adjusted_media_in(&self) -> Option<Rational> {
        self.media_in.map(|m| m + self.media_in_adj)
    }

    /// Destination track; a move that would leave the valid range stays put
    pub fn adjusted_track(&self) -> TrackRef {
        self.track.offset(self.track_adj).unwrap_or(self.track)
    }

    pub fn has_been_adjusted(&self) -> bool {
        self.in_adj != TIME_ZERO || self.out_adj != TIME_ZERO || self.media_in_adj != TIME_ZERO || self.track_adj != 0
    }

    /// Apply one validated drag step according to the ghost's mode
    ///
    /// Track movement only applies to moving ghosts on the track type the
    /// drag started from.
    pub fn apply_drag(&mut self, movement: Rational, track_movement: i64, drag_kind: TrackType) {
        match self.mode {
            MovementMode::None => {}
            MovementMode::TrimIn => {
                self.in_adj = movement;
                self.media_in_adj = movement;
            }
            MovementMode::TrimOut => {
                self.out_adj = movement;
            }
            MovementMode::Move => {
                self.in_adj = movement;
                self.out_adj = movement;
                if self.track.kind == drag_kind {
                    self.track_adj = track_movement;
                }
            }
        }
    }

    /// Time points this ghost contributes to snapping
    pub fn snap_points(&self) -> Vec<Rational> {
        match self.mode {
            MovementMode::Move => vec![self.in_point, self.out_point],
            MovementMode::TrimIn => vec![self.in_point],
            MovementMode::TrimOut => vec![self.out_point],
            MovementMode::None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_core::seconds;

    #[test]
    fn test_adjustments() {
        let mut g = Ghost::from_null(seconds(2), seconds(5), TrackRef::video(1), MovementMode::Move);
        assert!(!g.has_been_adjusted());

        g.apply_drag(seconds(3), -1, TrackType::Video);
        assert_eq!(g.adjusted_in(), seconds(5));
        assert_eq!(g.adjusted_out(), seconds(8));
        assert_eq!(g.adjusted_length(), g.length());
        assert_eq!(g.adjusted_track(), TrackRef::video(0));
        assert!(g.has_been_adjusted());

        // Other track types do not follow vertical movement
        g.apply_drag(seconds(3), -1, TrackType::Audio);
        assert_eq!(g.track_adjustment(), -1);
    }

    #[test]
    fn test_trim_in_moves_media() {
        let mut g = Ghost::from_null(seconds(2), seconds(5), TrackRef::audio(0), MovementMode::TrimIn);
        g.media_in = Some(seconds(10));
        g.apply_drag(seconds(1), 0, TrackType::Audio);
        assert_eq!(g.adjusted_length(), seconds(2));
        assert_eq!(g.adjusted_media_in(), Some(seconds(11)));
        assert_eq!(g.snap_points(), vec![seconds(2)]);
    }

    #[test]
    fn test_from_block_needs_track() {
        let block = Block::clip("c", seconds(1));
        assert!(Ghost::from_block(&block, MovementMode::Move).is_none());
    }
}
