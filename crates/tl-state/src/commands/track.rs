//! Structural edits: adding and removing tracks, moving blocks on and off
//! tracks

use tl_core::{BlockId, Rational, TIME_ZERO, TrackRef, TrackType};

use super::EditCommand;
use crate::{Block, HeldBlock, Sequence, Track};

// ═══════════════════════════════════════════════════════════════════════════════
// TRACKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Append a new empty track to a track list
pub struct TimelineAddTrackCommand {
    kind: TrackType,
    index: usize,
    removed: Option<Track>,
}

impl TimelineAddTrackCommand {
    pub fn new(kind: TrackType) -> Self {
        Self {
            kind,
            index: 0,
            removed: None,
        }
    }

    /// Valid once prepared
    pub fn track_ref(&self) -> TrackRef {
        TrackRef::new(self.kind, self.index)
    }
}

impl EditCommand for TimelineAddTrackCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.index = seq.track_list(self.kind).len();
    }

    fn redo(&mut self, seq: &mut Sequence) {
        match self.removed.take() {
            Some(track) => {
                seq.insert_track(self.index, track);
            }
            None => {
                seq.add_track(self.kind);
            }
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        self.removed = seq.remove_track(self.track_ref());
    }

    fn name(&self) -> &str {
        "Add Track"
    }
}

/// Take a track (and its blocks) out of the timeline
pub struct TimelineRemoveTrackCommand {
    track: TrackRef,
    removed: Option<Track>,
    exists: bool,
}

impl TimelineRemoveTrackCommand {
    pub fn new(track: TrackRef) -> Self {
        Self {
            track,
            removed: None,
            exists: false,
        }
    }
}

impl EditCommand for TimelineRemoveTrackCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.exists = seq.track(self.track).is_some();
    }

    fn redo(&mut self, seq: &mut Sequence) {
        if self.exists {
            self.removed = seq.remove_track(self.track);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        if let Some(track) = self.removed.take() {
            seq.insert_track(self.track.index, track);
        }
    }

    fn name(&self) -> &str {
        "Remove Track"
    }

    fn is_noop(&self) -> bool {
        !self.exists
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK PLACEMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Remove a block from whatever track holds it, closing the hole
///
/// The block stays in the graph so a later command can place it elsewhere.
pub struct TrackRippleRemoveBlockCommand {
    block: BlockId,
    track: Option<TrackRef>,
    previous: Option<BlockId>,
}

impl TrackRippleRemoveBlockCommand {
    pub fn new(block: BlockId) -> Self {
        Self {
            block,
            track: None,
            previous: None,
        }
    }
}

impl EditCommand for TrackRippleRemoveBlockCommand {
    fn prepare(&mut self, seq: &Sequence) {
        if let Some(block) = seq.block(self.block) {
            self.track = block.track();
            self.previous = block.previous();
        }
    }

    fn redo(&mut self, seq: &mut Sequence) {
        if self.track.is_some() {
            seq.ripple_remove_block(self.block);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        if let Some(track) = self.track {
            seq.insert_block_after_or_prepend(track, self.block, self.previous);
        }
    }

    fn name(&self) -> &str {
        "Remove Block"
    }

    fn is_noop(&self) -> bool {
        self.track.is_none()
    }
}

pub struct TrackPrependBlockCommand {
    track: TrackRef,
    block: BlockId,
}

impl TrackPrependBlockCommand {
    pub fn new(track: TrackRef, block: BlockId) -> Self {
        Self { track, block }
    }
}

impl EditCommand for TrackPrependBlockCommand {
    fn redo(&mut self, seq: &mut Sequence) {
        seq.prepend_block(self.track, self.block);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.ripple_remove_block(self.block);
    }

    fn name(&self) -> &str {
        "Prepend Block"
    }
}

pub struct TrackAppendBlockCommand {
    track: TrackRef,
    block: BlockId,
}

impl TrackAppendBlockCommand {
    pub fn new(track: TrackRef, block: BlockId) -> Self {
        Self { track, block }
    }
}

impl EditCommand for TrackAppendBlockCommand {
    fn redo(&mut self, seq: &mut Sequence) {
        seq.append_block(self.track, self.block);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.ripple_remove_block(self.block);
    }

    fn name(&self) -> &str {
        "Append Block"
    }
}

/// Insert `block` right after `after`, or at the track start when `after` is
/// `None`
pub struct TrackInsertBlockAfterCommand {
    track: TrackRef,
    block: BlockId,
    after: Option<BlockId>,
}

impl TrackInsertBlockAfterCommand {
    pub fn new(track: TrackRef, block: BlockId, after: Option<BlockId>) -> Self {
        Self { track, block, after }
    }
}

impl EditCommand for TrackInsertBlockAfterCommand {
    fn redo(&mut self, seq: &mut Sequence) {
        seq.insert_block_after_or_prepend(self.track, self.block, self.after);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.ripple_remove_block(self.block);
    }

    fn name(&self) -> &str {
        "Insert Block"
    }
}

/// Swap a block for another of identical length
pub struct TrackReplaceBlockCommand {
    track: TrackRef,
    old: BlockId,
    new: BlockId,
}

impl TrackReplaceBlockCommand {
    pub fn new(track: TrackRef, old: BlockId, new: BlockId) -> Self {
        Self { track, old, new }
    }
}

impl EditCommand for TrackReplaceBlockCommand {
    fn prepare(&mut self, seq: &Sequence) {
        debug_assert!(
            seq.block(self.old).and_then(|b| b.track()) == Some(self.track),
            "replaced block is not on {}",
            self.track
        );
    }

    fn redo(&mut self, seq: &mut Sequence) {
        seq.replace_block(self.old, self.new);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.replace_block(self.new, self.old);
    }

    fn name(&self) -> &str {
        "Replace Block"
    }

    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPLACE WITH GAP
// ═══════════════════════════════════════════════════════════════════════════════

enum GapOp {
    Resize {
        block: BlockId,
        old_length: Rational,
        new_length: Rational,
    },
    Remove {
        block: BlockId,
        previous: Option<BlockId>,
        drop_from_graph: bool,
        held: Option<HeldBlock>,
    },
    Replace {
        gap: HeldBlock,
    },
}

/// Take a block off its track leaving empty time behind
///
/// A trailing block is simply removed, along with a gap that would become
/// trailing. Otherwise adjacent gaps absorb the block's time (merging when
/// both sides are gaps), or a fresh gap of the same length takes its place.
/// The block itself stays in the graph.
pub struct TrackReplaceBlockWithGapCommand {
    track: TrackRef,
    block: BlockId,
    ops: Vec<GapOp>,
}

impl TrackReplaceBlockWithGapCommand {
    pub fn new(track: TrackRef, block: BlockId) -> Self {
        Self {
            track,
            block,
            ops: Vec::new(),
        }
    }

    fn remove(&mut self, block: BlockId, previous: Option<BlockId>, drop_from_graph: bool) {
        self.ops.push(GapOp::Remove {
            block,
            previous,
            drop_from_graph,
            held: None,
        });
    }
}

impl EditCommand for TrackReplaceBlockWithGapCommand {
    fn prepare(&mut self, seq: &Sequence) {
        let Some(block) = seq.block(self.block) else {
            return;
        };
        if block.track() != Some(self.track) {
            log::debug!("block {} is not on {}", self.block, self.track);
            return;
        }
        let length = block.length();
        let previous = block.previous().and_then(|id| seq.block(id));
        let next = block.next().and_then(|id| seq.block(id));
        let prev_gap = previous.filter(|b| b.is_gap());
        let next_gap = next.filter(|b| b.is_gap());

        match (next, prev_gap, next_gap) {
            (None, _, _) => {
                self.remove(self.block, block.previous(), false);
                if let Some(gap) = prev_gap {
                    self.remove(gap.id, gap.previous(), true);
                }
            }
            (Some(_), Some(prev), Some(next)) => {
                self.ops.push(GapOp::Resize {
                    block: prev.id,
                    old_length: prev.length(),
                    new_length: prev.length() + length + next.length(),
                });
                self.remove(self.block, Some(prev.id), false);
                self.remove(next.id, Some(prev.id), true);
            }
            (Some(_), Some(prev), None) => {
                self.ops.push(GapOp::Resize {
                    block: prev.id,
                    old_length: prev.length(),
                    new_length: prev.length() + length,
                });
                self.remove(self.block, Some(prev.id), false);
            }
            (Some(_), None, Some(next)) => {
                self.ops.push(GapOp::Resize {
                    block: next.id,
                    old_length: next.length(),
                    new_length: next.length() + length,
                });
                self.remove(self.block, block.previous(), false);
            }
            (Some(_), None, None) => {
                self.ops.push(GapOp::Replace {
                    gap: HeldBlock::owned(Block::gap(length)),
                });
            }
        }
    }

    fn redo(&mut self, seq: &mut Sequence) {
        for op in &mut self.ops {
            match op {
                GapOp::Resize { block, new_length, .. } => {
                    seq.set_block_length_and_media_out(*block, *new_length);
                }
                GapOp::Remove {
                    block,
                    drop_from_graph,
                    held,
                    ..
                } => {
                    seq.ripple_remove_block(*block);
                    if *drop_from_graph {
                        let mut h = HeldBlock::in_graph(*block);
                        seq.detach(&mut h);
                        *held = Some(h);
                    }
                }
                GapOp::Replace { gap } => {
                    seq.attach(gap);
                    seq.replace_block(self.block, gap.id());
                }
            }
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        for op in self.ops.iter_mut().rev() {
            match op {
                GapOp::Resize { block, old_length, .. } => {
                    seq.set_block_length_and_media_out(*block, *old_length);
                }
                GapOp::Remove {
                    block, previous, held, ..
                } => {
                    if let Some(mut h) = held.take() {
                        seq.attach(&mut h);
                    }
                    seq.insert_block_after_or_prepend(self.track, *block, *previous);
                }
                GapOp::Replace { gap } => {
                    seq.replace_block(gap.id(), self.block);
                    seq.detach(gap);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "Replace With Gap"
    }

    fn is_noop(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Length of a gap that fills `[from, to)`, or zero when there is no room
pub(crate) fn padding_between(from: Rational, to: Rational) -> Rational {
    if to > from { to - from } else { TIME_ZERO }
}
