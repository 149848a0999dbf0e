//! Single-block edits: graph membership, resize, slip, enable, links

use tl_core::{BlockId, Rational, TIME_ZERO};

use super::EditCommand;
use crate::{Block, HeldBlock, Sequence};

// ═══════════════════════════════════════════════════════════════════════════════
// GRAPH MEMBERSHIP
// ═══════════════════════════════════════════════════════════════════════════════

/// Add a new block to the sequence graph (not to a track)
pub struct BlockAddCommand {
    block: HeldBlock,
}

impl BlockAddCommand {
    pub fn new(block: Block) -> Self {
        Self {
            block: HeldBlock::owned(block),
        }
    }

    pub fn id(&self) -> BlockId {
        self.block.id()
    }
}

impl EditCommand for BlockAddCommand {
    fn redo(&mut self, seq: &mut Sequence) {
        seq.attach(&mut self.block);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.detach(&mut self.block);
    }

    fn name(&self) -> &str {
        "Add Block"
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESIZE
// ═══════════════════════════════════════════════════════════════════════════════

/// Resize a block keeping its in-edge media (out edge moves)
pub struct BlockResizeCommand {
    block: BlockId,
    new_length: Rational,
    old_length: Rational,
}

impl BlockResizeCommand {
    pub fn new(block: BlockId, new_length: Rational) -> Self {
        Self {
            block,
            new_length,
            old_length: TIME_ZERO,
        }
    }
}

impl EditCommand for BlockResizeCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.old_length = seq.block(self.block).map(|b| b.length()).unwrap_or(self.new_length);
    }

    fn redo(&mut self, seq: &mut Sequence) {
        seq.set_block_length_and_media_out(self.block, self.new_length);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.set_block_length_and_media_out(self.block, self.old_length);
    }

    fn name(&self) -> &str {
        "Resize Block"
    }

    fn is_noop(&self) -> bool {
        self.old_length == self.new_length
    }
}

/// Resize a block keeping its out-edge media (media in shifts)
pub struct BlockResizeWithMediaInCommand {
    block: BlockId,
    new_length: Rational,
    old_length: Rational,
}

impl BlockResizeWithMediaInCommand {
    pub fn new(block: BlockId, new_length: Rational) -> Self {
        Self {
            block,
            new_length,
            old_length: TIME_ZERO,
        }
    }
}

impl EditCommand for BlockResizeWithMediaInCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.old_length = seq.block(self.block).map(|b| b.length()).unwrap_or(self.new_length);
    }

    fn redo(&mut self, seq: &mut Sequence) {
        seq.set_block_length_and_media_in(self.block, self.new_length);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.set_block_length_and_media_in(self.block, self.old_length);
    }

    fn name(&self) -> &str {
        "Resize Block"
    }

    fn is_noop(&self) -> bool {
        self.old_length == self.new_length
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Slip: change a clip's media offset without moving it
pub struct BlockSetMediaInCommand {
    block: BlockId,
    new_media_in: Rational,
    old_media_in: Option<Rational>,
}

impl BlockSetMediaInCommand {
    pub fn new(block: BlockId, new_media_in: Rational) -> Self {
        Self {
            block,
            new_media_in,
            old_media_in: None,
        }
    }
}

impl EditCommand for BlockSetMediaInCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.old_media_in = seq.block(self.block).and_then(|b| b.media_in());
    }

    fn redo(&mut self, seq: &mut Sequence) {
        if self.old_media_in.is_some() {
            seq.set_block_media_in(self.block, self.new_media_in);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        if let Some(old) = self.old_media_in {
            seq.set_block_media_in(self.block, old);
        }
    }

    fn name(&self) -> &str {
        "Slip Clip"
    }

    fn is_noop(&self) -> bool {
        self.old_media_in.is_none_or(|old| old == self.new_media_in)
    }
}

/// Enable or disable a block
pub struct BlockEnableDisableCommand {
    block: BlockId,
    enabled: bool,
    old_enabled: bool,
}

impl BlockEnableDisableCommand {
    pub fn new(block: BlockId, enabled: bool) -> Self {
        Self {
            block,
            enabled,
            old_enabled: enabled,
        }
    }
}

impl EditCommand for BlockEnableDisableCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.old_enabled = seq.block(self.block).map(|b| b.enabled).unwrap_or(self.enabled);
    }

    fn redo(&mut self, seq: &mut Sequence) {
        seq.set_block_enabled(self.block, self.enabled);
    }

    fn undo(&mut self, seq: &mut Sequence) {
        seq.set_block_enabled(self.block, self.old_enabled);
    }

    fn name(&self) -> &str {
        if self.enabled { "Enable Block" } else { "Disable Block" }
    }

    fn is_noop(&self) -> bool {
        self.old_enabled == self.enabled
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Link or unlink a pair of blocks
pub struct BlockLinkCommand {
    a: BlockId,
    b: BlockId,
    link: bool,
    changed: bool,
}

impl BlockLinkCommand {
    pub fn link(a: BlockId, b: BlockId) -> Self {
        Self {
            a,
            b,
            link: true,
            changed: false,
        }
    }

    pub fn unlink(a: BlockId, b: BlockId) -> Self {
        Self {
            a,
            b,
            link: false,
            changed: false,
        }
    }
}

impl EditCommand for BlockLinkCommand {
    fn prepare(&mut self, seq: &Sequence) {
        self.changed = self.a != self.b && seq.are_linked(self.a, self.b) != self.link;
    }

    fn redo(&mut self, seq: &mut Sequence) {
        if !self.changed {
            return;
        }
        if self.link {
            seq.link_blocks(self.a, self.b);
        } else {
            seq.unlink_blocks(self.a, self.b);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        if !self.changed {
            return;
        }
        if self.link {
            seq.unlink_blocks(self.a, self.b);
        } else {
            seq.link_blocks(self.a, self.b);
        }
    }

    fn name(&self) -> &str {
        if self.link { "Link Blocks" } else { "Unlink Blocks" }
    }

    fn is_noop(&self) -> bool {
        !self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::EditStep;
    use tl_core::seconds;

    #[test]
    fn test_resize_round_trip() {
        let (mut seq, track, ids) = clips_track(&[5, 5]);
        let mut step = EditStep::new(BlockResizeCommand::new(ids[0], seconds(3)));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(layout(&seq, track), vec![('C', 0, 3), ('C', 3, 8)]);
    }

    #[test]
    fn test_resize_with_media_in() {
        let (mut seq, _, ids) = clips_track(&[5]);
        let mut step = EditStep::new(BlockResizeWithMediaInCommand::new(ids[0], seconds(4)));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(seq.block(ids[0]).and_then(|b| b.media_in()), Some(seconds(1)));
    }

    #[test]
    fn test_slip_changes_media_only() {
        let (mut seq, track, ids) = clips_track(&[5]);
        let mut step = EditStep::new(BlockSetMediaInCommand::new(ids[0], seconds(3)));
        assert_round_trip(&mut seq, &mut step);
        assert_eq!(seq.block(ids[0]).and_then(|b| b.media_in()), Some(seconds(3)));
        assert_eq!(layout(&seq, track), vec![('C', 0, 5)]);
    }

    #[test]
    fn test_slip_on_gap_is_noop() {
        let (mut seq, _, ids) = build_track(&[('G', 5)]);
        let mut step = EditStep::new(BlockSetMediaInCommand::new(ids[0], seconds(3)));
        step.redo_now(&mut seq);
        assert!(step.is_noop());
    }

    #[test]
    fn test_enable_disable() {
        let (mut seq, _, ids) = clips_track(&[5]);
        let mut step = EditStep::new(BlockEnableDisableCommand::new(ids[0], false));
        assert_round_trip(&mut seq, &mut step);
        assert!(!seq.block(ids[0]).is_some_and(|b| b.enabled));
    }

    #[test]
    fn test_link_and_unlink() {
        let (mut seq, _, ids) = clips_track(&[5, 5]);
        let mut link = EditStep::new(BlockLinkCommand::link(ids[0], ids[1]));
        assert_round_trip(&mut seq, &mut link);
        assert!(seq.are_linked(ids[0], ids[1]));

        let mut again = EditStep::new(BlockLinkCommand::link(ids[1], ids[0]));
        again.redo_now(&mut seq);
        assert!(again.is_noop());

        let mut unlink = EditStep::new(BlockLinkCommand::unlink(ids[0], ids[1]));
        assert_round_trip(&mut seq, &mut unlink);
        assert!(!seq.are_linked(ids[0], ids[1]));
    }

    #[test]
    fn test_add_block_round_trip() {
        let (mut seq, _, _) = clips_track(&[5]);
        let cmd = BlockAddCommand::new(Block::clip("New", seconds(2)));
        let id = cmd.id();
        let mut step = EditStep::new(cmd);
        assert_round_trip(&mut seq, &mut step);
        assert!(seq.block(id).is_some());
        step.undo_now(&mut seq);
        assert!(seq.block(id).is_none());
    }
}
