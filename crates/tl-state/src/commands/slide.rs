//! Slide: move a contiguous run of blocks between its neighbours

use tl_core::{BlockId, Rational, TIME_ZERO, TrackRef};

use super::EditCommand;
use crate::{Block, HeldBlock, Sequence};

/// What happens to one neighbour of the sliding run
enum SideOp {
    None,
    /// No neighbour existed; a gap is synthesized
    Create(HeldBlock),
    /// The neighbour shrinks to nothing
    Remove {
        block: BlockId,
        held: Option<HeldBlock>,
    },
    Resize { block: BlockId, old_length: Rational },
}

/// Move `blocks` by `movement`, resizing only the blocks on either side
///
/// The in-side neighbour grows by `movement` and the out-side neighbour shrinks
/// by it, so nothing else on the track moves.
pub struct TrackSlideCommand {
    track: TrackRef,
    blocks: Vec<BlockId>,
    in_adjacent: Option<BlockId>,
    out_adjacent: Option<BlockId>,
    movement: Rational,
    in_op: SideOp,
    out_op: SideOp,
}

impl TrackSlideCommand {
    pub fn new(
        track: TrackRef,
        blocks: Vec<BlockId>,
        in_adjacent: Option<BlockId>,
        out_adjacent: Option<BlockId>,
        movement: Rational,
    ) -> Self {
        Self {
            track,
            blocks,
            in_adjacent,
            out_adjacent,
            movement,
            in_op: SideOp::None,
            out_op: SideOp::None,
        }
    }

    fn side_op(seq: &Sequence, block: BlockId, new_length: Rational) -> SideOp {
        let old_length = seq.block(block).map(|b| b.length()).unwrap_or(TIME_ZERO);
        debug_assert!(new_length >= TIME_ZERO, "slide overruns neighbour");
        if new_length == TIME_ZERO {
            SideOp::Remove { block, held: None }
        } else {
            SideOp::Resize { block, old_length }
        }
    }

    fn remove(seq: &mut Sequence, block: BlockId, held: &mut Option<HeldBlock>) {
        seq.ripple_remove_block(block);
        if seq.can_remove_from_graph(block) {
            let mut h = HeldBlock::in_graph(block);
            seq.detach(&mut h);
            *held = Some(h);
        }
    }

    fn restore(seq: &mut Sequence, held: &mut Option<HeldBlock>) {
        if let Some(mut h) = held.take() {
            seq.attach(&mut h);
        }
    }
}

impl EditCommand for TrackSlideCommand {
    fn prepare(&mut self, seq: &Sequence) {
        if self.movement == TIME_ZERO || self.blocks.is_empty() {
            return;
        }

        self.in_op = match self.in_adjacent {
            Some(adj) => {
                let length = seq.block(adj).map(|b| b.length()).unwrap_or(TIME_ZERO);
                Self::side_op(seq, adj, length + self.movement)
            }
            None => {
                debug_assert!(self.movement > TIME_ZERO, "cannot slide before the start of the track");
                SideOp::Create(HeldBlock::owned(Block::gap(self.movement)))
            }
        };

        let last_has_next = self
            .blocks
            .last()
            .and_then(|id| seq.block(*id))
            .is_some_and(|b| b.next().is_some());
        self.out_op = match self.out_adjacent {
            Some(adj) => {
                let length = seq.block(adj).map(|b| b.length()).unwrap_or(TIME_ZERO);
                Self::side_op(seq, adj, length - self.movement)
            }
            None if last_has_next && self.movement < TIME_ZERO => {
                SideOp::Create(HeldBlock::owned(Block::gap(-self.movement)))
            }
            None => SideOp::None,
        };
    }

    fn redo(&mut self, seq: &mut Sequence) {
        let (Some(first), Some(last)) = (self.blocks.first().copied(), self.blocks.last().copied()) else {
            return;
        };

        match &mut self.in_op {
            SideOp::None => {}
            SideOp::Create(gap) => {
                seq.attach(gap);
                seq.insert_block_before(self.track, gap.id(), first);
            }
            SideOp::Remove { block, held } => Self::remove(seq, *block, held),
            SideOp::Resize { block, old_length } => {
                seq.set_block_length_and_media_out(*block, *old_length + self.movement);
            }
        }

        match &mut self.out_op {
            SideOp::None => {}
            SideOp::Create(gap) => {
                seq.attach(gap);
                seq.insert_block_after(self.track, gap.id(), last);
            }
            SideOp::Remove { block, held } => Self::remove(seq, *block, held),
            SideOp::Resize { block, old_length } => {
                seq.set_block_length_and_media_in(*block, *old_length - self.movement);
            }
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        let (Some(first), Some(last)) = (self.blocks.first().copied(), self.blocks.last().copied()) else {
            return;
        };

        match &mut self.out_op {
            SideOp::None => {}
            SideOp::Create(gap) => {
                seq.ripple_remove_block(gap.id());
                seq.detach(gap);
            }
            SideOp::Remove { block, held } => {
                Self::restore(seq, held);
                seq.insert_block_after(self.track, *block, last);
            }
            SideOp::Resize { block, old_length } => {
                seq.set_block_length_and_media_in(*block, *old_length);
            }
        }

        match &mut self.in_op {
            SideOp::None => {}
            SideOp::Create(gap) => {
                seq.ripple_remove_block(gap.id());
                seq.detach(gap);
            }
            SideOp::Remove { block, held } => {
                Self::restore(seq, held);
                seq.insert_block_before(self.track, *block, first);
            }
            SideOp::Resize { block, old_length } => {
                seq.set_block_length_and_media_out(*block, *old_length);
            }
        }
    }

    fn name(&self) -> &str {
        "Slide Blocks"
    }

    fn is_noop(&self) -> bool {
        self.movement == TIME_ZERO || self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::EditStep;
    use tl_core::seconds;

    #[test]
    fn test_slide_between_gaps() {
        let (mut seq, track, ids) = build_track(&[('G', 5), ('C', 5), ('G', 10)]);
        let mut step = EditStep::new(TrackSlideCommand::new(
            track,
            vec![ids[1]],
            Some(ids[0]),
            Some(ids[2]),
            seconds(2),
        ));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('G', 0, 7), ('C', 7, 12), ('G', 12, 20)]);
        assert_eq!(seq.block(ids[1]).and_then(|b| b.media_in()), Some(seconds(0)));
    }

    #[test]
    fn test_slide_consumes_neighbour() {
        let (mut seq, track, ids) = build_track(&[('G', 5), ('C', 5), ('G', 3), ('C', 2)]);
        let mut step = EditStep::new(TrackSlideCommand::new(
            track,
            vec![ids[1]],
            Some(ids[0]),
            Some(ids[2]),
            seconds(3),
        ));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('G', 0, 8), ('C', 8, 13), ('C', 13, 15)]);
    }

    #[test]
    fn test_slide_from_track_start_creates_gap() {
        let (mut seq, track, ids) = build_track(&[('C', 5), ('G', 4), ('C', 1)]);
        let mut step = EditStep::new(TrackSlideCommand::new(
            track,
            vec![ids[0]],
            None,
            Some(ids[1]),
            seconds(1),
        ));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('G', 0, 1), ('C', 1, 6), ('G', 6, 9), ('C', 9, 10)]);
    }

    #[test]
    fn test_slide_left_creates_out_gap() {
        let (mut seq, track, ids) = build_track(&[('G', 4), ('C', 5), ('C', 1)]);
        let mut step = EditStep::new(TrackSlideCommand::new(
            track,
            vec![ids[1]],
            Some(ids[0]),
            None,
            seconds(-2),
        ));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('G', 0, 2), ('C', 2, 7), ('G', 7, 9), ('C', 9, 10)]);
    }
}
