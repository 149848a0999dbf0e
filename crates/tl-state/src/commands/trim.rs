//! Edge trimming with gap bookkeeping

use tl_core::{BlockId, MovementMode, Rational, TIME_ZERO, TrackRef};

use super::EditCommand;
use crate::{Block, HeldBlock, Sequence};

/// What happens to the block on the trimmed side
enum AdjacentOp {
    /// Nothing to do (e.g. trimming the out edge of the last block)
    None,
    /// A new gap fills the freed time
    Create(HeldBlock),
    /// The adjacent block shrinks to zero and is removed; gaps leave the graph
    Remove {
        block: BlockId,
        held: Option<HeldBlock>,
    },
    /// The adjacent block absorbs the difference (roll)
    Resize { block: BlockId, old_length: Rational },
}

/// Trim one edge of a block
///
/// Shortening frees time that is given to a gap on the trimmed side (an
/// existing gap grows, otherwise a new one is created unless the trim is a
/// roll). Lengthening eats into the adjacent block, removing it when it
/// reaches zero.
pub struct BlockTrimCommand {
    track: TrackRef,
    block: BlockId,
    new_length: Rational,
    mode: MovementMode,
    trim_is_a_roll_edit: bool,
    remove_zero_length_from_graph: bool,
    old_length: Rational,
    trim_diff: Rational,
    doing_nothing: bool,
    is_transition: bool,
    adjacent: AdjacentOp,
}

impl BlockTrimCommand {
    pub fn new(track: TrackRef, block: BlockId, new_length: Rational, mode: MovementMode) -> Self {
        debug_assert!(mode.is_trim(), "trim command needs a trim mode");
        Self {
            track,
            block,
            new_length,
            mode,
            trim_is_a_roll_edit: false,
            remove_zero_length_from_graph: true,
            old_length: TIME_ZERO,
            trim_diff: TIME_ZERO,
            doing_nothing: false,
            is_transition: false,
            adjacent: AdjacentOp::None,
        }
    }

    /// Never create a gap; the adjacent block always absorbs the change
    pub fn set_trim_is_a_roll_edit(&mut self, roll: bool) {
        self.trim_is_a_roll_edit = roll;
    }

    /// Keep an adjacent gap trimmed to zero in the graph instead of holding it
    pub fn set_remove_zero_length_from_graph(&mut self, remove: bool) {
        self.remove_zero_length_from_graph = remove;
    }

    fn set_block_length(&self, seq: &mut Sequence, id: BlockId, length: Rational, trimming_in: bool) {
        if trimming_in {
            seq.set_block_length_and_media_in(id, length);
        } else {
            seq.set_block_length_and_media_out(id, length);
        }
    }
}

impl EditCommand for BlockTrimCommand {
    fn prepare(&mut self, seq: &Sequence) {
        let Some(block) = seq.block(self.block) else {
            self.doing_nothing = true;
            return;
        };
        self.old_length = block.length();
        self.doing_nothing = self.old_length == self.new_length || !self.mode.is_trim();
        if self.doing_nothing {
            return;
        }
        self.trim_diff = self.old_length - self.new_length;
        self.is_transition = block.is_transition();

        let adjacent_id = if self.mode == MovementMode::TrimIn {
            block.previous()
        } else {
            block.next()
        };
        let adjacent = adjacent_id.and_then(|id| seq.block(id));

        let needs_adjacent = self.mode == MovementMode::TrimIn || adjacent.is_some();
        if !needs_adjacent {
            return;
        }

        let we_create = self.trim_diff > TIME_ZERO
            && match adjacent {
                None => true,
                Some(adj) => !adj.is_gap() && !self.trim_is_a_roll_edit,
            };

        self.adjacent = if we_create {
            AdjacentOp::Create(HeldBlock::owned(Block::gap(self.trim_diff)))
        } else if let Some(adj) = adjacent {
            let new_adjacent_length = adj.length() + self.trim_diff;
            debug_assert!(new_adjacent_length >= TIME_ZERO, "trim overruns adjacent block");
            if new_adjacent_length == TIME_ZERO {
                AdjacentOp::Remove { block: adj.id, held: None }
            } else {
                AdjacentOp::Resize {
                    block: adj.id,
                    old_length: adj.length(),
                }
            }
        } else {
            // Lengthening the first block's in edge: nothing before it to eat
            AdjacentOp::None
        };
    }

    fn redo(&mut self, seq: &mut Sequence) {
        if self.doing_nothing {
            return;
        }
        let trimming_in = self.mode == MovementMode::TrimIn;
        self.set_block_length(seq, self.block, self.new_length, trimming_in);

        match &mut self.adjacent {
            AdjacentOp::None => {}
            AdjacentOp::Create(gap) => {
                seq.attach(gap);
                if trimming_in {
                    seq.insert_block_before(self.track, gap.id(), self.block);
                } else {
                    seq.insert_block_after(self.track, gap.id(), self.block);
                }
            }
            AdjacentOp::Remove { block, held } => {
                seq.ripple_remove_block(*block);
                if self.remove_zero_length_from_graph && seq.can_remove_from_graph(*block) {
                    let mut h = HeldBlock::in_graph(*block);
                    seq.detach(&mut h);
                    *held = Some(h);
                }
            }
            AdjacentOp::Resize { block, old_length } => {
                let length = *old_length + self.trim_diff;
                // The adjacent block's far edge stays put
                if trimming_in {
                    seq.set_block_length_and_media_out(*block, length);
                } else {
                    seq.set_block_length_and_media_in(*block, length);
                }
            }
        }

        if self.is_transition {
            seq.invalidate_block(self.block);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        if self.doing_nothing {
            return;
        }
        let trimming_in = self.mode == MovementMode::TrimIn;

        match &mut self.adjacent {
            AdjacentOp::None => {}
            AdjacentOp::Create(gap) => {
                seq.ripple_remove_block(gap.id());
                seq.detach(gap);
            }
            AdjacentOp::Remove { block, held } => {
                if let Some(mut h) = held.take() {
                    seq.attach(&mut h);
                }
                if trimming_in {
                    seq.insert_block_before(self.track, *block, self.block);
                } else {
                    seq.insert_block_after(self.track, *block, self.block);
                }
            }
            AdjacentOp::Resize { block, old_length } => {
                if trimming_in {
                    seq.set_block_length_and_media_out(*block, *old_length);
                } else {
                    seq.set_block_length_and_media_in(*block, *old_length);
                }
            }
        }

        self.set_block_length(seq, self.block, self.old_length, trimming_in);

        if self.is_transition {
            seq.invalidate_block(self.block);
        }
    }

    fn name(&self) -> &str {
        "Trim Block"
    }

    fn is_noop(&self) -> bool {
        self.doing_nothing
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::EditStep;
    use tl_core::seconds;

    #[test]
    fn test_trim_in_creates_gap() {
        let (mut seq, track, ids) = clips_track(&[10]);
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[0], seconds(8), MovementMode::TrimIn));
        let before = seq.snapshot();

        step.redo_now(&mut seq);
        assert_eq!(layout(&seq, track), vec![('G', 0, 2), ('C', 2, 10)]);
        assert_eq!(seq.block(ids[0]).and_then(|b| b.media_in()), Some(seconds(2)));
        let gap = seq.track(track).and_then(|t| t.first());

        step.undo_now(&mut seq);
        assert_eq!(layout(&seq, track), vec![('C', 0, 10)]);
        assert_eq!(seq.snapshot(), before);
        assert!(gap.is_some_and(|g| seq.block(g).is_none()));
    }

    #[test]
    fn test_trim_out_grows_existing_gap() {
        let (mut seq, track, ids) = build_track(&[('C', 5), ('G', 5), ('C', 5)]);
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[0], seconds(3), MovementMode::TrimOut));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 3), ('G', 3, 10), ('C', 10, 15)]);
    }

    #[test]
    fn test_trim_out_into_gap_removes_it() {
        let (mut seq, track, ids) = build_track(&[('C', 5), ('G', 2), ('C', 5)]);
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[0], seconds(7), MovementMode::TrimOut));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 7), ('C', 7, 12)]);
        assert!(seq.block(ids[1]).is_none());
    }

    #[test]
    fn test_trim_out_next_to_clip_creates_gap() {
        let (mut seq, track, ids) = clips_track(&[5, 5]);
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[0], seconds(4), MovementMode::TrimOut));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 4), ('G', 4, 5), ('C', 5, 10)]);
    }

    #[test]
    fn test_roll_edit_resizes_neighbour() {
        let (mut seq, track, ids) = clips_track(&[5, 5]);
        let mut cmd = BlockTrimCommand::new(track, ids[0], seconds(4), MovementMode::TrimOut);
        cmd.set_trim_is_a_roll_edit(true);
        let mut step = EditStep::new(cmd);
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 4), ('C', 4, 10)]);
    }

    #[test]
    fn test_lengthening_eats_into_neighbour_clip() {
        let (mut seq, track, ids) = clips_track(&[5, 5]);
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[0], seconds(6), MovementMode::TrimOut));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 6), ('C', 6, 10)]);
        // The neighbour kept its out-edge media
        assert_eq!(seq.block(ids[1]).and_then(|b| b.media_in()), Some(seconds(1)));
    }

    #[test]
    fn test_trim_out_of_last_block_has_no_adjacent() {
        let (mut seq, track, ids) = clips_track(&[5]);
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[0], seconds(3), MovementMode::TrimOut));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 3)]);
    }

    #[test]
    fn test_same_length_is_noop() {
        let (mut seq, track, ids) = build_track(&[('G', 2), ('C', 5)]);
        let before = seq.snapshot();
        let mut step = EditStep::new(BlockTrimCommand::new(track, ids[1], seconds(5), MovementMode::TrimIn));
        step.redo_now(&mut seq);
        assert!(step.is_noop());
        assert_eq!(seq.snapshot(), before);
        step.undo_now(&mut seq);
        assert_eq!(seq.snapshot(), before);
    }
}
