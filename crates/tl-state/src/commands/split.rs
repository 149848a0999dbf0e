//! Splitting blocks in two

use tl_core::{BlockId, Rational, TIME_ZERO, TrackRef};

use super::{BlockLinkCommand, EditCommand, EditStep, MultiEditCommand};
use crate::{HeldBlock, Sequence, new_block_id};

// ═══════════════════════════════════════════════════════════════════════════════
// SINGLE SPLIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Cut `block` at `point`
///
/// The block is shortened to end at `point` and a new block of the same kind
/// takes `[point, old_out)`. The tail inherits the out transition. The new
/// block's handle is allocated up front so compound edits can refer to it.
pub struct BlockSplitCommand {
    block: BlockId,
    point: Rational,
    new_id: BlockId,
    new_block: Option<HeldBlock>,
    track: Option<TrackRef>,
    old_length: Rational,
    first_length: Rational,
    /// `(old, new)` media in of the first half, for reversed clips
    reversed_media_in: Option<(Rational, Rational)>,
    out_transition: Option<BlockId>,
}

impl BlockSplitCommand {
    pub fn new(block: BlockId, point: Rational) -> Self {
        Self {
            block,
            point,
            new_id: new_block_id(),
            new_block: None,
            track: None,
            old_length: TIME_ZERO,
            first_length: TIME_ZERO,
            reversed_media_in: None,
            out_transition: None,
        }
    }

    /// Handle of the tail half
    pub fn new_block_id(&self) -> BlockId {
        self.new_id
    }
}

impl EditCommand for BlockSplitCommand {
    fn prepare(&mut self, seq: &Sequence) {
        let Some(block) = seq.block(self.block) else {
            return;
        };
        if self.point <= block.in_point() || self.point >= block.out_point() {
            log::debug!("split point {} outside block {}", self.point, self.block);
            return;
        }

        self.track = block.track();
        self.old_length = block.length();
        self.first_length = self.point - block.in_point();
        let tail_length = block.out_point() - self.point;

        let mut tail = block.duplicate();
        tail.id = self.new_id;
        tail.set_length_and_media_out(tail_length);

        if let (Some(orig), Some(clip)) = (block.clip_data(), tail.clip_data_mut()) {
            if orig.reverse {
                clip.media_in = orig.media_in;
                self.reversed_media_in = Some((orig.media_in, orig.media_in + tail_length * orig.speed));
            } else {
                clip.media_in = orig.media_in + self.first_length * orig.speed;
            }
            self.out_transition = orig.out_transition;
        }

        self.new_block = Some(HeldBlock::owned(tail));
    }

    fn redo(&mut self, seq: &mut Sequence) {
        let (Some(tail), Some(track)) = (self.new_block.as_mut(), self.track) else {
            return;
        };
        seq.set_block_length_and_media_out(self.block, self.first_length);
        if let Some((_, media_in)) = self.reversed_media_in {
            seq.set_block_media_in(self.block, media_in);
        }
        seq.attach(tail);
        seq.insert_block_after(track, self.new_id, self.block);

        if let Some(transition) = self.out_transition {
            let in_block = seq
                .block(transition)
                .and_then(|t| t.transition_data())
                .and_then(|t| t.in_block);
            seq.disconnect_transition(transition);
            seq.connect_transition(transition, Some(self.new_id), in_block);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        let Some(tail) = self.new_block.as_mut() else {
            return;
        };

        if let Some(transition) = self.out_transition {
            let in_block = seq
                .block(transition)
                .and_then(|t| t.transition_data())
                .and_then(|t| t.in_block);
            seq.disconnect_transition(transition);
            seq.connect_transition(transition, Some(self.block), in_block);
        }

        seq.ripple_remove_block(self.new_id);
        seq.detach(tail);
        if let Some((media_in, _)) = self.reversed_media_in {
            seq.set_block_media_in(self.block, media_in);
        }
        seq.set_block_length_and_media_out(self.block, self.old_length);
    }

    fn name(&self) -> &str {
        "Split Block"
    }

    fn is_noop(&self) -> bool {
        self.new_block.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINK-PRESERVING SPLIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Split several blocks at several times, keeping link groups intact
///
/// Tail halves produced at the same time are linked to each other when their
/// originals were linked; they are never linked across times or to the
/// originals.
pub struct BlockSplitPreservingLinksCommand {
    blocks: Vec<BlockId>,
    times: Vec<Rational>,
    /// `splits[block][time]` is the tail created at that time
    splits: Vec<Vec<Option<BlockId>>>,
    steps: MultiEditCommand,
}

impl BlockSplitPreservingLinksCommand {
    pub fn new(blocks: Vec<BlockId>, times: Vec<Rational>) -> Self {
        let splits = vec![vec![None; times.len()]; blocks.len()];
        Self {
            blocks,
            times,
            splits,
            steps: MultiEditCommand::new("Split Blocks"),
        }
    }

    /// Tail of `block` created at `times[time_index]`
    pub fn split_of(&self, block: BlockId, time_index: usize) -> Option<BlockId> {
        let i = self.blocks.iter().position(|b| *b == block)?;
        self.splits.get(i)?.get(time_index).copied().flatten()
    }
}

impl EditCommand for BlockSplitPreservingLinksCommand {
    fn prepare(&mut self, seq: &Sequence) {
        // Latest time first: every cut then targets the original block
        let mut order: Vec<usize> = (0..self.times.len()).collect();
        order.sort_by(|a, b| self.times[*b].cmp(&self.times[*a]));

        for (i, block_id) in self.blocks.iter().enumerate() {
            let Some(block) = seq.block(*block_id) else {
                continue;
            };
            let range = block.range();
            let mut last_cut: Option<Rational> = None;
            for &j in &order {
                let time = self.times[j];
                if time <= range.in_point() || time >= range.out_point() || last_cut == Some(time) {
                    continue;
                }
                let cmd = BlockSplitCommand::new(*block_id, time);
                self.splits[i][j] = Some(cmd.new_block_id());
                self.steps.add(cmd);
                last_cut = Some(time);
            }
        }

        for j in 0..self.times.len() {
            for a in 0..self.blocks.len() {
                for b in (a + 1)..self.blocks.len() {
                    if !seq.are_linked(self.blocks[a], self.blocks[b]) {
                        continue;
                    }
                    if let (Some(tail_a), Some(tail_b)) = (self.splits[a][j], self.splits[b][j]) {
                        self.steps.add(BlockLinkCommand::link(tail_a, tail_b));
                    }
                }
            }
        }
    }

    fn redo(&mut self, seq: &mut Sequence) {
        self.steps.redo(seq);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        self.steps.undo(seq);
    }

    fn name(&self) -> &str {
        "Split Blocks"
    }

    fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPLIT AT TIME
// ═══════════════════════════════════════════════════════════════════════════════

/// Split whatever block on `track` has `time` strictly inside it
pub struct TrackSplitAtTimeCommand {
    track: TrackRef,
    time: Rational,
    split: Option<EditStep>,
}

impl TrackSplitAtTimeCommand {
    pub fn new(track: TrackRef, time: Rational) -> Self {
        Self {
            track,
            time,
            split: None,
        }
    }
}

impl EditCommand for TrackSplitAtTimeCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.split = seq
            .track(self.track)
            .and_then(|t| t.block_containing_time(seq.pool(), self.time))
            .map(|block| EditStep::new(BlockSplitCommand::new(block, self.time)));
    }

    fn redo(&mut self, seq: &mut Sequence) {
        if let Some(step) = &mut self.split {
            step.redo_now(seq);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        if let Some(step) = &mut self.split {
            step.undo_now(seq);
        }
    }

    fn name(&self) -> &str {
        "Split at Time"
    }

    fn is_noop(&self) -> bool {
        self.split.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::{Block, ClipData};
    use tl_core::{TrackType, seconds};

    #[test]
    fn test_split_creates_tail() {
        let (mut seq, track, ids) = clips_track(&[10]);
        let cmd = BlockSplitCommand::new(ids[0], seconds(4));
        let tail = cmd.new_block_id();
        let mut step = EditStep::new(cmd);
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 4), ('C', 4, 10)]);
        assert_eq!(seq.block(tail).and_then(|b| b.media_in()), Some(seconds(4)));
        step.undo_now(&mut seq);
        assert!(seq.block(tail).is_none());
    }

    #[test]
    fn test_split_reversed_clip() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        let id = seq.add_block(Block::clip_with(
            "R",
            seconds(10),
            ClipData {
                reverse: true,
                ..Default::default()
            },
        ));
        seq.append_block(track, id);
        let cmd = BlockSplitCommand::new(id, seconds(4));
        let tail = cmd.new_block_id();
        let mut step = EditStep::new(cmd);
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(seq.block(id).and_then(|b| b.media_in()), Some(seconds(6)));
        assert_eq!(seq.block(tail).and_then(|b| b.media_in()), Some(seconds(0)));
    }

    #[test]
    fn test_split_moves_out_transition() {
        let (mut seq, track, ids) = clips_track(&[10]);
        let t = seq.add_block(Block::transition("dip", seconds(1)));
        seq.append_block(track, t);
        seq.connect_transition(t, Some(ids[0]), None);

        let cmd = BlockSplitCommand::new(ids[0], seconds(5));
        let tail = cmd.new_block_id();
        let mut step = EditStep::new(cmd);
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(seq.block(tail).and_then(|b| b.clip_data()).and_then(|c| c.out_transition), Some(t));
        assert_eq!(seq.block(ids[0]).and_then(|b| b.clip_data()).and_then(|c| c.out_transition), None);
    }

    #[test]
    fn test_split_outside_block_is_noop() {
        let (mut seq, _, ids) = clips_track(&[10]);
        let mut step = EditStep::new(BlockSplitCommand::new(ids[0], seconds(10)));
        step.redo_now(&mut seq);
        assert!(step.is_noop());
    }

    #[test]
    fn test_split_preserving_links_multiple_times() {
        let mut seq = Sequence::default();
        let v = seq.add_track(TrackType::Video);
        let a = seq.add_track(TrackType::Audio);
        let video = fill_track(&mut seq, v, &[('C', 10)])[0];
        let audio = fill_track(&mut seq, a, &[('C', 10)])[0];
        seq.link_blocks(video, audio);

        let cmd = BlockSplitPreservingLinksCommand::new(vec![video, audio], vec![seconds(3), seconds(7)]);
        let mut step = EditStep::new(cmd);
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, v), vec![('C', 0, 3), ('C', 3, 7), ('C', 7, 10)]);
        assert_eq!(layout(&seq, a), vec![('C', 0, 3), ('C', 3, 7), ('C', 7, 10)]);

        let vs: Vec<BlockId> = seq.track(v).map(|t| t.blocks().to_vec()).unwrap_or_default();
        let au: Vec<BlockId> = seq.track(a).map(|t| t.blocks().to_vec()).unwrap_or_default();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(seq.are_linked(vs[i], au[j]), i == j, "pair {i},{j}");
            }
        }
    }

    #[test]
    fn test_split_at_time() {
        let (mut seq, track, _) = clips_track(&[5, 5]);
        let mut step = EditStep::new(TrackSplitAtTimeCommand::new(track, seconds(6)));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 5), ('C', 5, 6), ('C', 6, 10)]);

        let mut edge = EditStep::new(TrackSplitAtTimeCommand::new(track, seconds(5)));
        edge.redo_now(&mut seq);
        assert!(edge.is_noop());
    }
}
