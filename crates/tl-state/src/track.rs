//! Tracks: ordered, gapless sequences of blocks
//!
//! Every mutation relinks `previous`/`next` and walks forward from the mutation
//! point recomputing `in`/`out`, so consecutive blocks are contiguous by
//! construction. Tracks never delete blocks, they only detach them.

use serde::{Deserialize, Serialize};
use tl_core::{BlockId, Rational, TIME_ZERO, TimeRange, TrackRef, TrackType};

use crate::block::BlockPool;

/// Default track height (pixels)
pub const DEFAULT_TRACK_HEIGHT: f64 = 48.0;

/// A single track of one media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    kind: TrackType,
    index: usize,
    blocks: Vec<BlockId>,
    length: Rational,
    /// UI height (pixels)
    pub height: f64,
    /// Locked tracks ignore edits from tools
    pub locked: bool,
    /// Muted tracks do not render
    pub muted: bool,
}

impl Track {
    pub fn new(track_ref: TrackRef) -> Self {
        Self {
            kind: track_ref.kind,
            index: track_ref.index,
            blocks: Vec::new(),
            length: TIME_ZERO,
            height: DEFAULT_TRACK_HEIGHT,
            locked: false,
            muted: false,
        }
    }

    #[inline]
    pub fn track_ref(&self) -> TrackRef {
        TrackRef::new(self.kind, self.index)
    }

    #[inline]
    pub fn kind(&self) -> TrackType {
        self.kind
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// End of the last block
    #[inline]
    pub fn length(&self) -> Rational {
        self.length
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn first(&self) -> Option<BlockId> {
        self.blocks.first().copied()
    }

    pub fn last(&self) -> Option<BlockId> {
        self.blocks.last().copied()
    }

    pub fn index_of(&self, block: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| *b == block)
    }

    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOOKUP
    // ═══════════════════════════════════════════════════════════════════════

    fn find(&self, pool: &BlockPool, pred: impl Fn(Rational, Rational) -> bool) -> Option<BlockId> {
        self.blocks.iter().copied().find(|id| {
            pool.get(*id)
                .is_some_and(|b| pred(b.in_point(), b.out_point()))
        })
    }

    /// Block that starts before `time` and reaches it (`in < time <= out`)
    pub fn nearest_block_before(&self, pool: &BlockPool, time: Rational) -> Option<BlockId> {
        self.find(pool, |i, o| i < time && o >= time)
    }

    /// Block covering `time` (`in <= time < out`)
    pub fn nearest_block_before_or_at(&self, pool: &BlockPool, time: Rational) -> Option<BlockId> {
        self.find(pool, |i, o| i <= time && o > time)
    }

    /// First block starting at or after `time`
    pub fn nearest_block_after_or_at(&self, pool: &BlockPool, time: Rational) -> Option<BlockId> {
        self.find(pool, |i, _| i >= time)
    }

    /// First block starting strictly after `time`
    pub fn nearest_block_after(&self, pool: &BlockPool, time: Rational) -> Option<BlockId> {
        self.find(pool, |i, _| i > time)
    }

    /// Block with `time` strictly inside it (a valid split point)
    pub fn block_containing_time(&self, pool: &BlockPool, time: Rational) -> Option<BlockId> {
        self.find(pool, |i, o| i < time && o > time)
    }

    /// Blocks overlapping `range`
    pub fn blocks_in_range(&self, pool: &BlockPool, range: TimeRange) -> Vec<BlockId> {
        self.blocks
            .iter()
            .copied()
            .filter(|id| pool.get(*id).is_some_and(|b| b.range().overlaps(&range)))
            .collect()
    }

    /// Whether only gaps (or nothing) occupy `range`
    pub fn is_range_free(&self, pool: &BlockPool, range: TimeRange) -> bool {
        self.blocks_in_range(pool, range)
            .iter()
            .all(|id| pool.get(*id).is_some_and(|b| b.is_gap()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // MUTATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert `block` at `index`; returns the invalidated range
    pub(crate) fn insert_block_at_index(&mut self, pool: &mut BlockPool, block: BlockId, index: usize) -> TimeRange {
        let old_length = self.length;
        let index = index.min(self.blocks.len());
        if let Some(b) = pool.get_mut(block) {
            assert!(b.track.is_none(), "block {block} is already on a track");
            b.track = Some(self.track_ref());
        }
        self.blocks.insert(index, block);
        self.update_in_out_from(pool, index, old_length)
    }

    pub(crate) fn prepend_block(&mut self, pool: &mut BlockPool, block: BlockId) -> TimeRange {
        self.insert_block_at_index(pool, block, 0)
    }

    pub(crate) fn append_block(&mut self, pool: &mut BlockPool, block: BlockId) -> TimeRange {
        let index = self.blocks.len();
        self.insert_block_at_index(pool, block, index)
    }

    pub(crate) fn insert_block_before(&mut self, pool: &mut BlockPool, block: BlockId, before: BlockId) -> TimeRange {
        let index = self.index_of(before).unwrap_or(self.blocks.len());
        self.insert_block_at_index(pool, block, index)
    }

    pub(crate) fn insert_block_after(&mut self, pool: &mut BlockPool, block: BlockId, after: BlockId) -> TimeRange {
        let index = self.index_of(after).map(|i| i + 1).unwrap_or(self.blocks.len());
        self.insert_block_at_index(pool, block, index)
    }

    /// Remove `block` and close the hole
    pub(crate) fn ripple_remove_block(&mut self, pool: &mut BlockPool, block: BlockId) -> Option<TimeRange> {
        let index = self.index_of(block)?;
        let old_length = self.length;
        self.blocks.remove(index);
        if let Some(b) = pool.get_mut(block) {
            b.detach_from_track();
        }
        Some(self.update_in_out_from(pool, index, old_length))
    }

    /// Swap `old` for `new` in place; lengths must match
    pub(crate) fn replace_block(&mut self, pool: &mut BlockPool, old: BlockId, new: BlockId) -> Option<TimeRange> {
        let index = self.index_of(old)?;
        let old_len = pool.get(old).map(|b| b.length());
        let new_len = pool.get(new).map(|b| b.length());
        assert_eq!(old_len, new_len, "replace_block requires equal lengths");

        if let Some(b) = pool.get_mut(old) {
            b.detach_from_track();
        }
        if let Some(b) = pool.get_mut(new) {
            assert!(b.track.is_none(), "block {new} is already on a track");
            b.track = Some(self.track_ref());
        }
        self.blocks[index] = new;
        let old_length = self.length;
        Some(self.update_in_out_from(pool, index, old_length))
    }

    /// Re-walk after a block's length changed
    pub(crate) fn block_length_changed(&mut self, pool: &mut BlockPool, block: BlockId) -> Option<TimeRange> {
        let index = self.index_of(block)?;
        let old_length = self.length;
        Some(self.update_in_out_from(pool, index, old_length))
    }

    pub(crate) fn set_index(&mut self, pool: &mut BlockPool, index: usize) {
        self.index = index;
        let track_ref = self.track_ref();
        for id in &self.blocks {
            if let Some(b) = pool.get_mut(*id) {
                b.track = Some(track_ref);
            }
        }
    }

    /// Detach every block's back-reference (track leaving the sequence)
    pub(crate) fn release_blocks(&self, pool: &mut BlockPool) {
        for id in &self.blocks {
            if let Some(b) = pool.get_mut(*id) {
                b.track = None;
            }
        }
    }

    /// Relink neighbours and recompute in/out from `index` to the end
    ///
    /// Returns `[in of index, max(old length, new length))`.
    fn update_in_out_from(&mut self, pool: &mut BlockPool, index: usize, old_length: Rational) -> TimeRange {
        let mut time = if index == 0 {
            TIME_ZERO
        } else {
            self.blocks
                .get(index - 1)
                .and_then(|id| pool.get(*id))
                .map(|b| b.out_point())
                .unwrap_or(TIME_ZERO)
        };
        let start = time;

        if index > 0
            && let Some(prev) = pool.get_mut(self.blocks[index - 1])
        {
            prev.next = self.blocks.get(index).copied();
        }

        for i in index..self.blocks.len() {
            let previous = if i == 0 { None } else { Some(self.blocks[i - 1]) };
            let next = self.blocks.get(i + 1).copied();
            if let Some(b) = pool.get_mut(self.blocks[i]) {
                b.previous = previous;
                b.next = next;
                b.set_in_point(time);
                time = b.out_point();
            }
        }

        self.length = time;
        TimeRange::new(start, old_length.max(self.length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use tl_core::seconds;

    fn track_with(pool: &mut BlockPool, lengths: &[i64]) -> (Track, Vec<BlockId>) {
        let mut track = Track::new(TrackRef::video(0));
        let mut ids = Vec::new();
        for (i, len) in lengths.iter().enumerate() {
            let id = pool.insert(Block::clip(&format!("C{i}"), seconds(*len)));
            track.append_block(pool, id);
            ids.push(id);
        }
        (track, ids)
    }

    #[test]
    fn test_append_keeps_contiguity() {
        let mut pool = BlockPool::new();
        let (track, ids) = track_with(&mut pool, &[5, 5, 5]);
        assert_eq!(track.length(), seconds(15));
        let b = pool.get(ids[1]).unwrap();
        assert_eq!(b.in_point(), seconds(5));
        assert_eq!(b.out_point(), seconds(10));
        assert_eq!(b.previous(), Some(ids[0]));
        assert_eq!(b.next(), Some(ids[2]));
    }

    #[test]
    fn test_ripple_remove_shifts_left() {
        let mut pool = BlockPool::new();
        let (mut track, ids) = track_with(&mut pool, &[5, 5, 5]);
        let inval = track.ripple_remove_block(&mut pool, ids[1]).unwrap();
        assert_eq!(inval, TimeRange::new(seconds(5), seconds(15)));
        assert_eq!(pool.get(ids[2]).unwrap().in_point(), seconds(5));
        assert_eq!(pool.get(ids[0]).unwrap().next(), Some(ids[2]));
        assert_eq!(pool.get(ids[1]).unwrap().track(), None);
        assert_eq!(track.length(), seconds(10));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut pool = BlockPool::new();
        let (mut track, ids) = track_with(&mut pool, &[5]);
        let gap = pool.insert(Block::gap(seconds(2)));
        track.insert_block_before(&mut pool, gap, ids[0]);
        assert_eq!(pool.get(ids[0]).unwrap().in_point(), seconds(2));

        let tail = pool.insert(Block::clip("T", seconds(1)));
        track.insert_block_after(&mut pool, tail, ids[0]);
        assert_eq!(track.blocks(), &[gap, ids[0], tail]);
        assert_eq!(track.length(), seconds(8));
    }

    #[test]
    #[should_panic(expected = "equal lengths")]
    fn test_replace_requires_equal_length() {
        let mut pool = BlockPool::new();
        let (mut track, ids) = track_with(&mut pool, &[5]);
        let other = pool.insert(Block::gap(seconds(3)));
        track.replace_block(&mut pool, ids[0], other);
    }

    #[test]
    fn test_lookups() {
        let mut pool = BlockPool::new();
        let (track, ids) = track_with(&mut pool, &[5, 5]);
        assert_eq!(track.nearest_block_before(&pool, seconds(5)), Some(ids[0]));
        assert_eq!(track.nearest_block_before_or_at(&pool, seconds(5)), Some(ids[1]));
        assert_eq!(track.nearest_block_after_or_at(&pool, seconds(5)), Some(ids[1]));
        assert_eq!(track.nearest_block_after(&pool, seconds(5)), None);
        assert_eq!(track.block_containing_time(&pool, seconds(5)), None);
        assert_eq!(track.block_containing_time(&pool, seconds(7)), Some(ids[1]));
        assert_eq!(track.nearest_block_before_or_at(&pool, seconds(10)), None);
    }
}
