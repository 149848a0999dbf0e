//! Sequence: the block graph plus one track list per media type
//!
//! Structural mutation goes through `Sequence` so every change keeps track
//! contiguity, refreshes the owning track list's total length and queues an
//! invalidation for the render/cache consumer.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tl_core::{
    BlockId, Rational, TIME_ZERO, TimeRange, TlError, TlResult, TrackRef, TrackType, rational,
};

use crate::block::{Block, BlockKind, BlockPool, HeldBlock};
use crate::track::Track;
use crate::tracklist::TrackList;

/// Shared handle used by undoable commands
pub type SequenceHandle = Arc<RwLock<Sequence>>;

// ═══════════════════════════════════════════════════════════════════════════════
// INVALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// What caused an invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationSource {
    Block(BlockId),
    Track(TrackRef),
}

/// "This range of this track must be re-rendered"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    pub track: TrackRef,
    pub range: TimeRange,
    pub source: InvalidationSource,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEQUENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Timeline sequence
#[derive(Debug)]
pub struct Sequence {
    /// Display name
    pub name: String,
    pool: BlockPool,
    lists: [TrackList; 3],
    /// Frame duration for video and subtitle tracks
    pub video_timebase: Rational,
    /// Sample duration for audio tracks
    pub audio_timebase: Rational,
    /// Playhead position
    pub playhead: Rational,
    /// Marker positions
    pub markers: Vec<Rational>,
    /// Work area, if enabled
    pub workarea: Option<TimeRange>,
    invalidations: Vec<Invalidation>,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Sequence")
    }
}

/// Comparable copy of a sequence's committed state
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSnapshot {
    pub blocks: BTreeMap<BlockId, Block>,
    pub lists: Vec<TrackList>,
}

impl Sequence {
    pub fn new(name: &str) -> Self {
        Self::with_timebases(name, rational(1, 30), rational(1, 48000))
    }

    /// Empty sequence on the given edit grids
    pub fn with_timebases(name: &str, video_timebase: Rational, audio_timebase: Rational) -> Self {
        Self {
            name: name.to_string(),
            pool: BlockPool::new(),
            lists: [
                TrackList::new(TrackType::Video),
                TrackList::new(TrackType::Audio),
                TrackList::new(TrackType::Subtitle),
            ],
            video_timebase,
            audio_timebase,
            playhead: TIME_ZERO,
            markers: Vec::new(),
            workarea: None,
            invalidations: Vec::new(),
        }
    }

    /// Wrap in a shared handle
    pub fn into_handle(self) -> SequenceHandle {
        Arc::new(RwLock::new(self))
    }

    /// Edit grid for a track type
    pub fn timebase_for(&self, kind: TrackType) -> Rational {
        match kind {
            TrackType::Audio => self.audio_timebase,
            TrackType::Video | TrackType::Subtitle => self.video_timebase,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn pool(&self) -> &BlockPool {
        &self.pool
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.pool.get(id)
    }

    pub fn try_block(&self, id: BlockId) -> TlResult<&Block> {
        self.pool.get(id).ok_or(TlError::BlockNotFound(id))
    }

    pub fn track_list(&self, kind: TrackType) -> &TrackList {
        &self.lists[kind.index()]
    }

    pub fn track(&self, track: TrackRef) -> Option<&Track> {
        self.lists[track.kind.index()].track(track.index)
    }

    pub fn try_track(&self, track: TrackRef) -> TlResult<&Track> {
        self.track(track).ok_or(TlError::TrackNotFound(track))
    }

    /// Every track of every type
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.lists.iter().flat_map(|l| l.tracks().iter())
    }

    /// Blocks of a track in order
    pub fn track_blocks(&self, track: TrackRef) -> Vec<&Block> {
        self.track(track)
            .map(|t| t.blocks().iter().filter_map(|id| self.pool.get(*id)).collect())
            .unwrap_or_default()
    }

    /// Longest track across all types
    pub fn total_length(&self) -> Rational {
        self.lists
            .iter()
            .map(|l| l.total_length())
            .max()
            .unwrap_or(TIME_ZERO)
    }

    pub fn linked_blocks(&self, id: BlockId) -> &[BlockId] {
        self.pool.get(id).map(|b| b.links()).unwrap_or(&[])
    }

    pub fn are_linked(&self, a: BlockId, b: BlockId) -> bool {
        self.pool.get(a).is_some_and(|block| block.is_linked(b))
    }

    /// Detached from every track, unlinked and unbound, so nothing else can
    /// reach it
    pub fn can_remove_from_graph(&self, id: BlockId) -> bool {
        let Some(block) = self.pool.get(id) else {
            return false;
        };
        if block.track().is_some() || !block.links().is_empty() {
            return false;
        }
        match &block.kind {
            BlockKind::Clip(c) => c.in_transition.is_none() && c.out_transition.is_none(),
            BlockKind::Transition(t) => t.out_block.is_none() && t.in_block.is_none(),
            BlockKind::Gap => true,
        }
    }

    pub fn snapshot(&self) -> SequenceSnapshot {
        SequenceSnapshot {
            blocks: self.pool.iter().map(|b| (b.id, b.clone())).collect(),
            lists: self.lists.to_vec(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INVALIDATION QUEUE
    // ═══════════════════════════════════════════════════════════════════════

    pub fn invalidate(&mut self, track: TrackRef, range: TimeRange, source: InvalidationSource) {
        self.invalidations.push(Invalidation { track, range, source });
    }

    /// Invalidate a block's full range on its track
    pub fn invalidate_block(&mut self, id: BlockId) {
        if let Some(block) = self.pool.get(id)
            && let Some(track) = block.track()
        {
            let range = block.range();
            self.invalidate(track, range, InvalidationSource::Block(id));
        }
    }

    pub fn pending_invalidations(&self) -> &[Invalidation] {
        &self.invalidations
    }

    /// Drain queued invalidations
    pub fn take_invalidations(&mut self) -> Vec<Invalidation> {
        std::mem::take(&mut self.invalidations)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // GRAPH MEMBERSHIP
    // ═══════════════════════════════════════════════════════════════════════

    /// Add a new block to the graph (not to any track)
    pub fn add_block(&mut self, block: Block) -> BlockId {
        self.pool.insert(block)
    }

    /// Take a detached block out of the graph
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        if self.pool.get(id).is_some_and(|b| b.track().is_some()) {
            log::warn!("refusing to remove block {id} from graph while it is on a track");
            return None;
        }
        self.pool.remove(id)
    }

    pub fn attach(&mut self, held: &mut HeldBlock) {
        held.attach(&mut self.pool);
    }

    pub fn detach(&mut self, held: &mut HeldBlock) {
        held.detach(&mut self.pool);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRACKS
    // ═══════════════════════════════════════════════════════════════════════

    /// Append a new empty track
    pub fn add_track(&mut self, kind: TrackType) -> TrackRef {
        let index = self.lists[kind.index()].add_track();
        TrackRef::new(kind, index)
    }

    pub fn insert_track(&mut self, index: usize, track: Track) -> TrackRef {
        let kind = track.kind();
        self.lists[kind.index()].insert_track(&mut self.pool, index, track);
        let track_ref = TrackRef::new(kind, index.min(self.lists[kind.index()].len() - 1));
        let length = self.track(track_ref).map(|t| t.length()).unwrap_or(TIME_ZERO);
        if length > TIME_ZERO {
            self.invalidate(
                track_ref,
                TimeRange::new(TIME_ZERO, length),
                InvalidationSource::Track(track_ref),
            );
        }
        track_ref
    }

    pub fn remove_track(&mut self, track: TrackRef) -> Option<Track> {
        let removed = self.lists[track.kind.index()].remove_track(&mut self.pool, track.index)?;
        if removed.length() > TIME_ZERO {
            self.invalidate(
                track,
                TimeRange::new(TIME_ZERO, removed.length()),
                InvalidationSource::Track(track),
            );
        }
        Some(removed)
    }

    pub fn set_track_locked(&mut self, track: TrackRef, locked: bool) {
        if let Some(t) = self.lists[track.kind.index()].track_mut(track.index) {
            t.locked = locked;
        }
    }

    pub fn set_track_muted(&mut self, track: TrackRef, muted: bool) {
        if let Some(t) = self.lists[track.kind.index()].track_mut(track.index) {
            t.muted = muted;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRACK EDITS
    // ═══════════════════════════════════════════════════════════════════════

    fn edit_track(
        &mut self,
        track: TrackRef,
        source: InvalidationSource,
        f: impl FnOnce(&mut Track, &mut BlockPool) -> Option<TimeRange>,
    ) -> bool {
        let list = &mut self.lists[track.kind.index()];
        let Some(t) = list.track_mut(track.index) else {
            log::warn!("edit on missing track {track}");
            return false;
        };
        let range = f(t, &mut self.pool);
        list.update_total_length();
        match range {
            Some(range) => {
                self.invalidations.push(Invalidation { track, range, source });
                true
            }
            None => false,
        }
    }

    pub fn append_block(&mut self, track: TrackRef, block: BlockId) -> bool {
        self.edit_track(track, InvalidationSource::Block(block), |t, pool| {
            Some(t.append_block(pool, block))
        })
    }

    pub fn prepend_block(&mut self, track: TrackRef, block: BlockId) -> bool {
        self.edit_track(track, InvalidationSource::Block(block), |t, pool| {
            Some(t.prepend_block(pool, block))
        })
    }

    pub fn insert_block_before(&mut self, track: TrackRef, block: BlockId, before: BlockId) -> bool {
        self.edit_track(track, InvalidationSource::Block(block), |t, pool| {
            Some(t.insert_block_before(pool, block, before))
        })
    }

    pub fn insert_block_after(&mut self, track: TrackRef, block: BlockId, after: BlockId) -> bool {
        self.edit_track(track, InvalidationSource::Block(block), |t, pool| {
            Some(t.insert_block_after(pool, block, after))
        })
    }

    /// Insert after `after`, or at the start of the track when `None`
    pub fn insert_block_after_or_prepend(&mut self, track: TrackRef, block: BlockId, after: Option<BlockId>) -> bool {
        match after {
            Some(after) => self.insert_block_after(track, block, after),
            None => self.prepend_block(track, block),
        }
    }

    /// Remove a block from its track, closing the hole
    pub fn ripple_remove_block(&mut self, block: BlockId) -> bool {
        let Some(track) = self.pool.get(block).and_then(|b| b.track()) else {
            return false;
        };
        self.edit_track(track, InvalidationSource::Block(block), |t, pool| {
            t.ripple_remove_block(pool, block)
        })
    }

    /// Swap two equal-length blocks in place
    pub fn replace_block(&mut self, old: BlockId, new: BlockId) -> bool {
        let Some(track) = self.pool.get(old).and_then(|b| b.track()) else {
            return false;
        };
        self.edit_track(track, InvalidationSource::Block(new), |t, pool| {
            t.replace_block(pool, old, new)
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BLOCK EDITS
    // ═══════════════════════════════════════════════════════════════════════

    fn after_block_resize(&mut self, id: BlockId) {
        if let Some(track) = self.pool.get(id).and_then(|b| b.track()) {
            self.edit_track(track, InvalidationSource::Block(id), |t, pool| {
                t.block_length_changed(pool, id)
            });
        }
    }

    /// Resize keeping media at the in edge
    pub fn set_block_length_and_media_out(&mut self, id: BlockId, length: Rational) {
        if let Some(block) = self.pool.get_mut(id) {
            block.set_length_and_media_out(length);
            self.after_block_resize(id);
        }
    }

    /// Resize keeping media at the out edge
    pub fn set_block_length_and_media_in(&mut self, id: BlockId, length: Rational) {
        if let Some(block) = self.pool.get_mut(id) {
            block.set_length_and_media_in(length);
            self.after_block_resize(id);
        }
    }

    pub fn set_block_media_in(&mut self, id: BlockId, media_in: Rational) {
        if let Some(clip) = self.pool.get_mut(id).and_then(|b| b.clip_data_mut()) {
            clip.media_in = media_in;
            self.invalidate_block(id);
        }
    }

    pub fn set_block_enabled(&mut self, id: BlockId, enabled: bool) {
        if let Some(block) = self.pool.get_mut(id) {
            block.enabled = enabled;
            self.invalidate_block(id);
        }
    }

    /// Direct mutable access for data that does not affect layout
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.pool.get_mut(id)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LINKS & TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Link two blocks symmetrically; returns false if already linked
    pub fn link_blocks(&mut self, a: BlockId, b: BlockId) -> bool {
        if a == b || !self.pool.contains(a) || !self.pool.contains(b) || self.are_linked(a, b) {
            return false;
        }
        if let Some(block) = self.pool.get_mut(a) {
            block.links.push(b);
        }
        if let Some(block) = self.pool.get_mut(b) {
            block.links.push(a);
        }
        true
    }

    /// Unlink two blocks; returns false if they were not linked
    pub fn unlink_blocks(&mut self, a: BlockId, b: BlockId) -> bool {
        if !self.are_linked(a, b) {
            return false;
        }
        if let Some(block) = self.pool.get_mut(a) {
            block.links.retain(|l| *l != b);
        }
        if let Some(block) = self.pool.get_mut(b) {
            block.links.retain(|l| *l != a);
        }
        true
    }

    /// Bind a transition between the clip ending into it and the clip
    /// starting from it
    pub fn connect_transition(&mut self, transition: BlockId, out_block: Option<BlockId>, in_block: Option<BlockId>) {
        if let Some(t) = self.pool.get_mut(transition).and_then(|b| b.transition_data_mut()) {
            t.out_block = out_block;
            t.in_block = in_block;
        } else {
            return;
        }
        if let Some(clip) = out_block.and_then(|id| self.pool.get_mut(id)).and_then(|b| b.clip_data_mut()) {
            clip.out_transition = Some(transition);
        }
        if let Some(clip) = in_block.and_then(|id| self.pool.get_mut(id)).and_then(|b| b.clip_data_mut()) {
            clip.in_transition = Some(transition);
        }
    }

    /// Unbind a transition; returns the previous `(out_block, in_block)`
    pub fn disconnect_transition(&mut self, transition: BlockId) -> (Option<BlockId>, Option<BlockId>) {
        let Some(t) = self.pool.get_mut(transition).and_then(|b| b.transition_data_mut()) else {
            return (None, None);
        };
        let bound = (t.out_block.take(), t.in_block.take());
        if let Some(clip) = bound.0.and_then(|id| self.pool.get_mut(id)).and_then(|b| b.clip_data_mut()) {
            clip.out_transition = None;
        }
        if let Some(clip) = bound.1.and_then(|id| self.pool.get_mut(id)).and_then(|b| b.clip_data_mut()) {
            clip.in_transition = None;
        }
        bound
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INVARIANTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Verify contiguity, adjacency, lengths, totals and link symmetry
    pub fn check_invariants(&self) -> TlResult<()> {
        let fail = |msg: String| Err(TlError::Invariant(msg));

        for list in &self.lists {
            let mut max_length = TIME_ZERO;
            for track in list.tracks() {
                let track_ref = track.track_ref();
                let mut expected_in = TIME_ZERO;
                let blocks = track.blocks();
                for (i, id) in blocks.iter().enumerate() {
                    let block = self.try_block(*id)?;
                    if block.in_point() != expected_in {
                        return fail(format!("{track_ref}: block {id} starts at {} not {expected_in}", block.in_point()));
                    }
                    if block.length() < TIME_ZERO {
                        return fail(format!("{track_ref}: block {id} has negative length"));
                    }
                    if block.length() == TIME_ZERO && !block.can_have_zero_length() {
                        return fail(format!("{track_ref}: non-gap block {id} has zero length"));
                    }
                    if block.track() != Some(track_ref) {
                        return fail(format!("{track_ref}: block {id} has back-reference {:?}", block.track()));
                    }
                    let previous = if i == 0 { None } else { Some(blocks[i - 1]) };
                    if block.previous() != previous || block.next() != blocks.get(i + 1).copied() {
                        return fail(format!("{track_ref}: block {id} has stale adjacency"));
                    }
                    expected_in = block.out_point();
                }
                if track.length() != expected_in {
                    return fail(format!("{track_ref}: length {} but last out {expected_in}", track.length()));
                }
                max_length = max_length.max(track.length());
            }
            if list.total_length() != max_length {
                return fail(format!("{:?}: total length {} but longest track {max_length}", list.kind(), list.total_length()));
            }
        }

        for block in self.pool.iter() {
            for other in block.links() {
                if !self.are_linked(*other, block.id) {
                    return fail(format!("link {} -> {other} is not symmetric", block.id));
                }
            }
        }
        Ok(())
    }
}
