//! Timeline blocks
//!
//! A block occupies `[in, out)` on at most one track. Three variants share the
//! same record:
//! - Gap: empty, fillable time; may be zero length while an edit is in flight
//! - Clip: a window onto a media source (`media_in`, speed, reverse, loop mode)
//! - Transition: binds the end of one clip to the start of the next
//!
//! `in`/`out`/`previous`/`next`/`track` are maintained by the owning track and
//! are read-only from outside the crate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tl_core::{BlockId, Rational, TIME_ZERO, TimeRange, TrackRef};

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK IDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Unique block ID generator
static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh block handle
pub fn new_block_id() -> BlockId {
    BlockId(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK VARIANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// What a clip does when playback runs past its media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Render nothing past the end of the media
    #[default]
    None,
    /// Wrap around to the start of the media
    Loop,
    /// Hold the last frame
    Clamp,
}

/// Transition progress curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionCurve {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
}

/// Clip-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    /// Media source reference (resolved by the node graph)
    pub media: Option<String>,
    /// Media time shown at the clip's in point
    pub media_in: Rational,
    /// Playback speed (1 = realtime)
    pub speed: Rational,
    /// Play media backwards
    pub reverse: bool,
    /// Behaviour past the end of media
    pub loop_mode: LoopMode,
    /// Transition bound to this clip's in edge
    pub in_transition: Option<BlockId>,
    /// Transition bound to this clip's out edge
    pub out_transition: Option<BlockId>,
}

impl Default for ClipData {
    fn default() -> Self {
        Self {
            media: None,
            media_in: TIME_ZERO,
            speed: Rational::from_integer(1),
            reverse: false,
            loop_mode: LoopMode::None,
            in_transition: None,
            out_transition: None,
        }
    }
}

/// Transition-specific data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionData {
    /// Effect identifier (e.g. "cross_dissolve")
    pub effect: String,
    pub curve: TransitionCurve,
    /// Clip whose out edge runs into this transition
    pub out_block: Option<BlockId>,
    /// Clip whose in edge starts from this transition
    pub in_block: Option<BlockId>,
}

impl TransitionData {
    /// Dual transitions sit between two clips
    pub fn is_dual(&self) -> bool {
        self.out_block.is_some() && self.in_block.is_some()
    }
}

/// Block variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    Gap,
    Clip(ClipData),
    Transition(TransitionData),
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// A time-interval entity on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable handle
    pub id: BlockId,
    /// Display name
    pub name: String,
    /// Variant data
    pub kind: BlockKind,
    /// Disabled blocks render nothing
    pub enabled: bool,
    in_point: Rational,
    out_point: Rational,
    length: Rational,
    pub(crate) previous: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
    pub(crate) track: Option<TrackRef>,
    pub(crate) links: Vec<BlockId>,
}

impl Block {
    fn with_kind(name: &str, kind: BlockKind, length: Rational) -> Self {
        Self {
            id: new_block_id(),
            name: name.to_string(),
            kind,
            enabled: true,
            in_point: TIME_ZERO,
            out_point: length,
            length,
            previous: None,
            next: None,
            track: None,
            links: Vec::new(),
        }
    }

    /// Create a gap
    pub fn gap(length: Rational) -> Self {
        Self::with_kind("Gap", BlockKind::Gap, length)
    }

    /// Create a clip
    pub fn clip(name: &str, length: Rational) -> Self {
        Self::with_kind(name, BlockKind::Clip(ClipData::default()), length)
    }

    /// Create a clip with explicit clip data
    pub fn clip_with(name: &str, length: Rational, data: ClipData) -> Self {
        Self::with_kind(name, BlockKind::Clip(data), length)
    }

    /// Create an unbound transition
    pub fn transition(effect: &str, length: Rational) -> Self {
        Self::with_kind(
            effect,
            BlockKind::Transition(TransitionData {
                effect: effect.to_string(),
                ..Default::default()
            }),
            length,
        )
    }

    /// Copy of this block under a fresh handle: detached, unlinked, with no
    /// transition bindings
    pub fn duplicate(&self) -> Self {
        let mut kind = self.kind.clone();
        match &mut kind {
            BlockKind::Clip(clip) => {
                clip.in_transition = None;
                clip.out_transition = None;
            }
            BlockKind::Transition(t) => {
                t.out_block = None;
                t.in_block = None;
            }
            BlockKind::Gap => {}
        }
        let mut copy = Self::with_kind(&self.name, kind, self.length);
        copy.enabled = self.enabled;
        copy
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
        self.length
    }

    #[inline]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.in_point, self.out_point)
    }

    #[inline]
    pub fn previous(&self) -> Option<BlockId> {
        self.previous
    }

    #[inline]
    pub fn next(&self) -> Option<BlockId> {
        self.next
    }

    #[inline]
    pub fn track(&self) -> Option<TrackRef> {
        self.track
    }

    #[inline]
    pub fn links(&self) -> &[BlockId] {
        &self.links
    }

    pub fn is_linked(&self, other: BlockId) -> bool {
        self.links.contains(&other)
    }

    pub fn is_gap(&self) -> bool {
        matches!(self.kind, BlockKind::Gap)
    }

    pub fn is_clip(&self) -> bool {
        matches!(self.kind, BlockKind::Clip(_))
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.kind, BlockKind::Transition(_))
    }

    /// Only gaps may transiently reach zero length
    pub fn can_have_zero_length(&self) -> bool {
        self.is_gap()
    }

    pub fn clip_data(&self) -> Option<&ClipData> {
        match &self.kind {
            BlockKind::Clip(c) => Some(c),
            _ => None,
        }
    }

    pub fn clip_data_mut(&mut self) -> Option<&mut ClipData> {
        match &mut self.kind {
            BlockKind::Clip(c) => Some(c),
            _ => None,
        }
    }

    pub fn transition_data(&self) -> Option<&TransitionData> {
        match &self.kind {
            BlockKind::Transition(t) => Some(t),
            _ => None,
        }
    }

    pub fn transition_data_mut(&mut self) -> Option<&mut TransitionData> {
        match &mut self.kind {
            BlockKind::Transition(t) => Some(t),
            _ => None,
        }
    }

    /// Clip media offset, if this is a clip
    pub fn media_in(&self) -> Option<Rational> {
        self.clip_data().map(|c| c.media_in)
    }

    /// Change length keeping the in edge's media fixed
    pub fn set_length_and_media_out(&mut self, length: Rational) {
        debug_assert!(length >= TIME_ZERO, "negative block length");
        self.length = length;
        self.out_point = self.in_point + length;
    }

    /// Change length keeping the out edge's media fixed
    ///
    /// For a forward clip the media offset moves by the change in length
    /// (scaled by speed) so the same media frame stays under the out point.
    pub fn set_length_and_media_in(&mut self, length: Rational) {
        debug_assert!(length >= TIME_ZERO, "negative block length");
        let diff = self.length - length;
        if let BlockKind::Clip(clip) = &mut self.kind
            && !clip.reverse
        {
            clip.media_in += diff * clip.speed;
        }
        self.length = length;
        self.out_point = self.in_point + length;
    }

    pub(crate) fn set_in_point(&mut self, in_point: Rational) {
        self.in_point = in_point;
        self.out_point = in_point + self.length;
    }

    pub(crate) fn detach_from_track(&mut self) {
        self.previous = None;
        self.next = None;
        self.track = None;
        self.in_point = TIME_ZERO;
        self.out_point = self.length;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK POOL
// ═══════════════════════════════════════════════════════════════════════════════

/// Arena of every block currently in the sequence graph
///
/// Blocks detached from all tracks may stay here (e.g. a moved clip between
/// its removal and placement). Blocks removed from the graph altogether are
/// held by the command that removed them, see [`HeldBlock`].
#[derive(Debug, Clone, Default)]
pub struct BlockPool {
    blocks: HashMap<BlockId, Block>,
}

impl BlockPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block: Block) -> BlockId {
        let id = block.id;
        self.blocks.insert(id, block);
        id
    }

    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        self.blocks.remove(&id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OWNERSHIP
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a command-managed block currently lives
#[derive(Debug)]
pub enum Ownership {
    /// Held by the command, outside the graph
    Owned(Box<Block>),
    /// In the sequence's block pool
    InGraph,
}

/// A block a command created or removed, tracked across undo/redo so the
/// same identity is restored every time
#[derive(Debug)]
pub struct HeldBlock {
    id: BlockId,
    ownership: Ownership,
}

impl HeldBlock {
    /// Take ownership of a block that is not in any graph yet
    pub fn owned(block: Block) -> Self {
        Self {
            id: block.id,
            ownership: Ownership::Owned(Box::new(block)),
        }
    }

    /// Refer to a block already in the pool
    pub fn in_graph(id: BlockId) -> Self {
        Self {
            id,
            ownership: Ownership::InGraph,
        }
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.ownership, Ownership::Owned(_))
    }

    /// Read the block wherever it lives
    pub fn get<'a>(&'a self, pool: &'a BlockPool) -> Option<&'a Block> {
        match &self.ownership {
            Ownership::Owned(block) => Some(block),
            Ownership::InGraph => pool.get(self.id),
        }
    }

    /// Move the block into the pool
    pub fn attach(&mut self, pool: &mut BlockPool) {
        if let Ownership::Owned(block) = std::mem::replace(&mut self.ownership, Ownership::InGraph) {
            pool.insert(*block);
        }
    }

    /// Take the block back out of the pool
    pub fn detach(&mut self, pool: &mut BlockPool) {
        if matches!(self.ownership, Ownership::InGraph)
            && let Some(block) = pool.remove(self.id)
        {
            self.ownership = Ownership::Owned(Box::new(block));
        }
    }
}
