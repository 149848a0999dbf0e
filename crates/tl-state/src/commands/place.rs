//! Destructive placement of a block at an absolute time

use tl_core::{BlockId, Rational, TIME_ZERO, TimeRange, TrackRef, TrackType};

use super::track::padding_between;
use super::{
    BlockAddCommand, EditCommand, MultiEditCommand, TimelineAddTrackCommand, TrackAppendBlockCommand,
    TrackRippleRemoveAreaCommand,
};
use crate::{Block, Sequence};

/// Put `block` at `in_point` on track `track_index`, overwriting what was there
///
/// Missing tracks up to `track_index` are created. Past the end of the track
/// the block is appended behind a padding gap; otherwise the colliding range is
/// ripple-removed (splitting gaps if needed) and the block inserted in its
/// place. `block` must be in the graph and on no track.
pub struct TrackPlaceBlockCommand {
    kind: TrackType,
    track_index: usize,
    block: BlockId,
    in_point: Rational,
    steps: MultiEditCommand,
}

impl TrackPlaceBlockCommand {
    pub fn new(kind: TrackType, track_index: usize, block: BlockId, in_point: Rational) -> Self {
        Self {
            kind,
            track_index,
            block,
            in_point,
            steps: MultiEditCommand::new("Place Block"),
        }
    }

    pub fn track_ref(&self) -> TrackRef {
        TrackRef::new(self.kind, self.track_index)
    }
}

impl EditCommand for TrackPlaceBlockCommand {
    fn prepare(&mut self, seq: &Sequence) {
        let Some(block) = seq.block(self.block) else {
            log::warn!("placing unknown block {}", self.block);
            return;
        };
        let length = block.length();
        let track_ref = self.track_ref();

        for _ in seq.track_list(self.kind).len()..=self.track_index {
            self.steps.add(TimelineAddTrackCommand::new(self.kind));
        }

        let track_length = seq.track(track_ref).map(|t| t.length()).unwrap_or(TIME_ZERO);
        if self.in_point >= track_length {
            let padding = padding_between(track_length, self.in_point);
            if padding > TIME_ZERO {
                let add_gap = BlockAddCommand::new(Block::gap(padding));
                let gap = add_gap.id();
                self.steps.add(add_gap);
                self.steps.add(TrackAppendBlockCommand::new(track_ref, gap));
            }
            self.steps.add(TrackAppendBlockCommand::new(track_ref, self.block));
        } else {
            let range = TimeRange::new(self.in_point, self.in_point + length);
            self.steps.add(
                TrackRippleRemoveAreaCommand::new(track_ref, range)
                    .with_insert(self.block)
                    .with_allow_splitting_gaps(true),
            );
        }
    }

    fn redo(&mut self, seq: &mut Sequence) {
        self.steps.redo(seq);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        self.steps.undo(seq);
    }

    fn name(&self) -> &str {
        "Place Block"
    }

    fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}
