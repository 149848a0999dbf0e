//! Pointer tool and the tools that share its drag machinery
//!
//! Ripple, rolling and slide are the pointer with some abilities switched off
//! and a different way of creating ghosts when the drag starts.

use std::collections::{BTreeMap, BTreeSet};
use tl_core::{BlockId, EditTool, MovementMode, Rational, TIME_ZERO, TrackRef, TrackType};
use tl_state::{
    Block, BlockAddCommand, BlockLinkCommand, BlockTrimCommand, EditorPreferences, MultiEditCommand, RippleInfo,
    Sequence, TrackListInsertGaps, TrackListRippleToolCommand, TrackPlaceBlockCommand, TrackReplaceBlockWithGapCommand,
    TrackSlideCommand,
};

use super::{TimelineTool, ToolCommit, ToolContext, hit_block, select_on_press};
use crate::{
    Ghost, Modifiers, MouseEvent, Snapper, TimelineView, is_cursor_in_trim_handle, validate_time_chain,
    validate_track_movement,
};

/// Which of the pointer-derived tools this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerFlavour {
    /// Move, trim (gaps fill freed time) and change tracks
    Pointer,
    /// Trim and shift everything downstream on every track
    Ripple,
    /// Move the edit point between two neighbours
    Rolling,
    /// Move blocks between their neighbours
    Slide,
}

/// How the ghosts are created when a drag starts
#[derive(Debug, Clone, Copy)]
struct InitiateOptions {
    /// Trims never resize the neighbour
    dont_roll_trims: bool,
    /// Non-gap neighbours may be rolled too
    allow_nongap_rolling: bool,
    slide_instead_of_moving: bool,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    clicked: Option<BlockId>,
    start_time: Rational,
    start_track: TrackRef,
    mode: MovementMode,
    dragging: bool,
}

pub struct PointerTool {
    flavour: PointerFlavour,
    movement_allowed: bool,
    trimming_allowed: bool,
    track_movement_allowed: bool,

    press: Option<Press>,
    ghosts: Vec<Ghost>,
    /// Original edges of the ghosts, tested against snap targets
    snap_points: Vec<Rational>,
    snapper: Option<Snapper>,
    snapped: Vec<Rational>,
}

impl PointerTool {
    pub fn new(flavour: PointerFlavour) -> Self {
        let (movement_allowed, trimming_allowed, track_movement_allowed) = match flavour {
            PointerFlavour::Pointer => (true, true, true),
            PointerFlavour::Ripple | PointerFlavour::Rolling => (false, true, true),
            PointerFlavour::Slide => (true, false, false),
        };
        Self {
            flavour,
            movement_allowed,
            trimming_allowed,
            track_movement_allowed,
            press: None,
            ghosts: Vec::new(),
            snap_points: Vec::new(),
            snapper: None,
            snapped: Vec::new(),
        }
    }

    pub fn flavour(&self) -> PointerFlavour {
        self.flavour
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    fn options(&self) -> InitiateOptions {
        let (dont_roll_trims, allow_nongap_rolling, slide_instead_of_moving) = match self.flavour {
            PointerFlavour::Pointer => (false, false, false),
            PointerFlavour::Ripple => (true, true, false),
            PointerFlavour::Rolling => (false, true, false),
            PointerFlavour::Slide => (true, false, true),
        };
        InitiateOptions {
            dont_roll_trims,
            allow_nongap_rolling,
            slide_instead_of_moving,
        }
    }

    fn reset(&mut self) {
        self.press = None;
        self.ghosts.clear();
        self.snap_points.clear();
        self.snapper = None;
        self.snapped.clear();
    }

    fn trim_mode_at(&self, block: &Block, time: Rational, view: &TimelineView, prefs: &EditorPreferences) -> MovementMode {
        if !self.trimming_allowed {
            return MovementMode::None;
        }
        is_cursor_in_trim_handle(block.in_point(), block.out_point(), time, view, prefs.trim_handle_px)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // GHOSTS
    // ═══════════════════════════════════════════════════════════════════════

    fn push_ghost(&mut self, ghost: Ghost) -> usize {
        self.snap_points.extend(ghost.snap_points());
        self.ghosts.push(ghost);
        self.ghosts.len() - 1
    }

    /// Ghost a block unless one already exists for it
    fn add_ghost_from_block(&mut self, block: &Block, mode: MovementMode) -> Option<usize> {
        if let Some(existing) = self.ghosts.iter().position(|g| g.attached_block == Some(block.id)) {
            return Some(existing);
        }
        Ghost::from_block(block, mode).map(|g| self.push_ghost(g))
    }

    fn initiate_drag(&mut self, seq: &Sequence, selected: &BTreeSet<BlockId>, press: Press, modifiers: Modifiers) {
        let Some(clicked) = press.clicked.and_then(|id| seq.block(id)) else {
            return;
        };
        let blocks: Vec<&Block> = selected
            .iter()
            .filter_map(|id| seq.block(*id))
            .filter(|b| b.track().is_some())
            .collect();
        let options = self.options();

        if press.mode == MovementMode::Move {
            self.initiate_move(seq, selected, clicked, &blocks, options.slide_instead_of_moving);
        } else {
            self.initiate_trim(seq, clicked, &blocks, press.mode, modifiers, options);
        }

        if self.flavour == PointerFlavour::Ripple {
            self.add_ripple_gap_ghosts(seq, press.mode);
        }
    }

    fn initiate_move(
        &mut self,
        seq: &Sequence,
        selected: &BTreeSet<BlockId>,
        clicked: &Block,
        blocks: &[&Block],
        mut slide: bool,
    ) {
        // Only one block type moves at a time and gaps never move
        if clicked.is_gap() {
            return;
        }

        let mut sliding_due_to_transition = false;
        if !slide {
            slide = blocks.iter().any(|b| separates_transition(seq, b, selected));
            sliding_due_to_transition = slide;
        }

        if slide {
            self.initiate_slide(seq, blocks, sliding_due_to_transition);
            return;
        }

        for block in blocks.iter().filter(|b| !b.is_gap()) {
            self.add_ghost_from_block(block, MovementMode::Move);
            if let Some(clip) = block.clip_data() {
                for transition in [clip.out_transition, clip.in_transition].into_iter().flatten() {
                    if let Some(t) = seq.block(transition) {
                        self.add_ghost_from_block(t, MovementMode::Move);
                    }
                }
            }
        }
    }

    /// Ghost one contiguous run per track plus the neighbours that absorb it
    fn initiate_slide(&mut self, seq: &Sequence, blocks: &[&Block], due_to_transition: bool) {
        let mut runs: BTreeMap<TrackRef, (&Block, &Block)> = BTreeMap::new();
        for &block in blocks {
            let Some(track) = block.track() else { continue };
            let run = runs.entry(track).or_insert((block, block));
            if block.in_point() < run.0.in_point() {
                run.0 = block;
            }
            if block.out_point() > run.1.out_point() {
                run.1 = block;
            }
        }

        for (track, (earliest, latest)) in runs {
            let previous = earliest.previous().and_then(|id| seq.block(id));
            let in_ghost = match previous {
                Some(prev) if !due_to_transition || is_bound_neighbour(earliest, prev.id, true) => {
                    Ghost::from_block(prev, MovementMode::TrimOut)
                }
                _ => Some(Ghost::from_null(
                    earliest.in_point(),
                    earliest.in_point(),
                    track,
                    MovementMode::TrimOut,
                )),
            };
            if let Some(mut ghost) = in_ghost {
                ghost.set_slide_mode();
                self.push_ghost(ghost);
            }

            if let Some(next) = latest.next().and_then(|id| seq.block(id)) {
                let out_ghost = if !due_to_transition || is_bound_neighbour(latest, next.id, false) {
                    Ghost::from_block(next, MovementMode::TrimIn)
                } else {
                    Some(Ghost::from_null(latest.out_point(), latest.out_point(), track, MovementMode::TrimIn))
                };
                if let Some(mut ghost) = out_ghost {
                    ghost.set_slide_mode();
                    self.push_ghost(ghost);
                }
            }

            let mut current = Some(earliest.id);
            while let Some(id) = current {
                let Some(block) = seq.block(id) else { break };
                if let Some(mut ghost) = Ghost::from_block(block, MovementMode::Move) {
                    ghost.set_slide_mode();
                    self.push_ghost(ghost);
                }
                if id == latest.id {
                    break;
                }
                current = block.next();
            }
        }
    }

    fn initiate_trim(
        &mut self,
        seq: &Sequence,
        clicked: &Block,
        blocks: &[&Block],
        mode: MovementMode,
        modifiers: Modifiers,
        options: InitiateOptions,
    ) {
        // Several tracks trim together only from their outermost blocks
        let multitrim = is_trimmable(clicked, blocks, mode);

        for &block in blocks {
            if block.id != clicked.id && (!multitrim || !is_trimmable(block, blocks, mode)) {
                continue;
            }
            let Some(track) = block.track() else { continue };
            let Some(mut ghost) = Ghost::from_block(block, mode) else {
                continue;
            };

            // A transition on the trimmed side slides along with the edge
            let mut treat_trim_as_slide = false;
            let mut target = block;
            if let Some(clip) = block.clip_data() {
                let connected = if mode == MovementMode::TrimIn {
                    clip.in_transition
                } else {
                    clip.out_transition
                };
                if let Some(transition) = connected.and_then(|id| seq.block(id)) {
                    ghost.set_slide_mode();
                    if let Some(mut transition_ghost) = Ghost::from_block(transition, MovementMode::Move) {
                        transition_ghost.set_slide_mode();
                        self.push_ghost(transition_ghost);
                    }
                    treat_trim_as_slide = true;
                    target = transition;
                }
            }
            let index = self.push_ghost(ghost);

            if options.dont_roll_trims {
                continue;
            }

            let adjacent_id = if mode == MovementMode::TrimIn {
                target.previous()
            } else {
                target.next()
            };
            let mut adjacent = adjacent_id.and_then(|id| seq.block(id));
            if let Some(adj) = adjacent {
                let bound = target.transition_data().is_some_and(|t| {
                    (mode == MovementMode::TrimIn && t.out_block == Some(adj.id))
                        || (mode == MovementMode::TrimOut && t.in_block == Some(adj.id))
                });
                if !target.is_gap() && !options.allow_nongap_rolling && !adj.is_gap() && !bound {
                    adjacent = None;
                }
            }

            let flipped = mode.flip_trim();
            let mut adjacent_ghosts = Vec::new();
            if let Some(adj) = adjacent {
                adjacent_ghosts.extend(Ghost::from_block(adj, flipped));
                if blocks.len() == 1 && !modifiers.alt && adj.is_clip() {
                    for link in adj.links() {
                        if let Some(linked) = seq.block(*link) {
                            adjacent_ghosts.extend(Ghost::from_block(linked, flipped));
                        }
                    }
                }
            } else if mode == MovementMode::TrimIn || target.next().is_some() {
                // Stands in for the gap the trim will create
                let at = if mode == MovementMode::TrimIn {
                    target.in_point()
                } else {
                    target.out_point()
                };
                adjacent_ghosts.push(Ghost::from_null(at, at, track, flipped));
            }

            self.ghosts[index].trim_is_a_roll_edit = adjacent.is_some();

            for mut adjacent_ghost in adjacent_ghosts {
                if treat_trim_as_slide {
                    adjacent_ghost.set_slide_mode();
                } else if target.is_gap() {
                    self.ghosts[index].trim_should_be_ignored = true;
                } else {
                    adjacent_ghost.trim_should_be_ignored = true;
                }
                self.push_ghost(adjacent_ghost);
            }
        }
    }

    /// Give every other unlocked track something to absorb the ripple
    fn add_ripple_gap_ghosts(&mut self, seq: &Sequence, mode: MovementMode) {
        let ripple_point = self
            .ghosts
            .iter()
            .map(|g| {
                if mode == MovementMode::TrimIn {
                    g.in_point()
                } else {
                    g.out_point()
                }
            })
            .min();
        let Some(ripple_point) = ripple_point else {
            return;
        };
        let ghosted: BTreeSet<TrackRef> = self.ghosts.iter().map(|g| g.track()).collect();

        for track in seq.tracks() {
            if track.locked || ghosted.contains(&track.track_ref()) {
                continue;
            }

            let mut after = track
                .nearest_block_after_or_at(seq.pool(), ripple_point)
                .and_then(|id| seq.block(id));

            // Never open a gap between a clip and its out transition
            if let Some(block) = after
                && block
                    .previous()
                    .and_then(|id| seq.block(id))
                    .and_then(|prev| prev.clip_data())
                    .is_some_and(|clip| clip.out_transition == Some(block.id))
            {
                after = block.next().and_then(|id| seq.block(id));
            }

            let Some(after) = after else {
                log::debug!("ripple: nothing after {} on {}", ripple_point, track.track_ref());
                continue;
            };

            let previous_gap = after.previous().and_then(|id| seq.block(id)).filter(|b| b.is_gap());
            let ghost = if after.is_gap() {
                Ghost::from_block(after, mode)
            } else if let Some(gap) = previous_gap {
                Ghost::from_block(gap, mode)
            } else {
                let mut ghost = Ghost::from_null(after.in_point(), after.in_point(), track.track_ref(), mode);
                ghost.reference_block = Some(after.id);
                Some(ghost)
            };
            if let Some(ghost) = ghost {
                self.push_ghost(ghost);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DRAG
    // ═══════════════════════════════════════════════════════════════════════

    fn process_drag(&mut self, ctx: &ToolContext, event: &MouseEvent) {
        let Some(press) = self.press else { return };
        let seq = ctx.sequence;
        let drag_kind = press.start_track.kind;
        let timebase = |kind: TrackType| seq.timebase_for(kind);

        let mut track_movement = if self.track_movement_allowed && event.track.kind == drag_kind {
            event.track.index as i64 - press.start_track.index as i64
        } else {
            0
        };

        let mut movement = validate_time_chain(&self.ghosts, &timebase, event.time - press.start_time);

        self.snapped.clear();
        if ctx.prefs.snapping.enabled
            && !event.modifiers.shift
            && let Some(snapper) = &self.snapper
        {
            let (snapped, hits) = snapper.snap(&self.snap_points, movement, ctx.view);
            movement = validate_time_chain(&self.ghosts, &timebase, snapped);
            if movement == snapped {
                self.snapped = hits;
            }
        }

        if track_movement != 0 {
            track_movement =
                validate_track_movement(self.ghosts.iter().filter(|g| g.track().kind == drag_kind), track_movement);
        }

        for ghost in &mut self.ghosts {
            ghost.apply_drag(movement, track_movement, drag_kind);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // COMMIT
    // ═══════════════════════════════════════════════════════════════════════

    fn finish_drag(&self, ctx: &ToolContext, modifiers: Modifiers, drag_kind: TrackType) -> Option<ToolCommit> {
        let seq = ctx.sequence;
        let mut moving = Vec::new();
        let mut sliding = Vec::new();
        let mut trimming = Vec::new();
        for ghost in self.ghosts.iter().filter(|g| g.has_been_adjusted()) {
            if ghost.is_sliding {
                sliding.push(ghost);
            } else if ghost.mode == MovementMode::Move {
                moving.push(ghost);
            } else if ghost.mode.is_trim() {
                trimming.push(ghost);
            }
        }
        if moving.is_empty() && sliding.is_empty() && trimming.is_empty() {
            return None;
        }

        let name = if !sliding.is_empty() {
            "Slide Clips"
        } else if !moving.is_empty() && modifiers.alt {
            "Duplicate Clips"
        } else if !moving.is_empty() {
            "Move Clips"
        } else {
            "Trim Clips"
        };
        let mut edit = MultiEditCommand::new(name);
        let mut selections = None;

        if let Some(reference) = trimming.first() {
            for ghost in trimming.iter().filter(|g| !g.trim_should_be_ignored) {
                let Some(block) = ghost.attached_block else { continue };
                let mut trim = BlockTrimCommand::new(ghost.adjusted_track(), block, ghost.adjusted_length(), ghost.mode);
                trim.set_trim_is_a_roll_edit(ghost.trim_is_a_roll_edit);
                edit.add(trim);
            }

            if moving.is_empty() && sliding.is_empty() {
                let mut sel = ctx.selections.clone();
                if reference.mode == MovementMode::TrimIn {
                    sel.trim_in(reference.in_adjustment());
                } else {
                    sel.trim_out(reference.out_adjustment());
                }
                selections = Some(sel);
            }
        }

        if let Some(reference) = moving.first() {
            let duplicate = modifiers.alt;

            if !duplicate {
                for ghost in &moving {
                    if let Some(block) = ghost.attached_block {
                        edit.add(TrackReplaceBlockWithGapCommand::new(ghost.track(), block));
                    }
                }
            }

            if modifiers.ctrl {
                let earliest = moving.iter().map(|g| g.adjusted_in()).min();
                let latest = moving.iter().map(|g| g.adjusted_out()).max();
                if let (Some(earliest), Some(latest)) = (earliest, latest) {
                    for kind in TrackType::ALL {
                        edit.add(TrackListInsertGaps::new(kind, earliest, latest - earliest));
                    }
                }
            }

            let mut copies: BTreeMap<BlockId, BlockId> = BTreeMap::new();
            for ghost in &moving {
                let Some(mut block) = ghost.attached_block else { continue };
                if duplicate {
                    let Some(original) = seq.block(block) else { continue };
                    let copy = BlockAddCommand::new(original.duplicate());
                    copies.insert(block, copy.id());
                    block = copy.id();
                    edit.add(copy);
                }
                let destination = ghost.adjusted_track();
                edit.add(TrackPlaceBlockCommand::new(
                    destination.kind,
                    destination.index,
                    block,
                    ghost.adjusted_in(),
                ));
            }

            // Copies keep the links their originals had among themselves
            for (original, copy) in &copies {
                for link in seq.linked_blocks(*original) {
                    if let Some(copy_link) = copies.get(link)
                        && copy < copy_link
                    {
                        edit.add(BlockLinkCommand::link(*copy, *copy_link));
                    }
                }
            }

            let mut sel = ctx.selections.clone();
            sel.shift_time(reference.in_adjustment());
            sel.shift_tracks(drag_kind, reference.track_adjustment());
            selections = Some(sel);
        }

        if !sliding.is_empty() {
            let mut runs: BTreeMap<TrackRef, Vec<(Rational, BlockId)>> = BTreeMap::new();
            let mut in_adjacent: BTreeMap<TrackRef, BlockId> = BTreeMap::new();
            let mut out_adjacent: BTreeMap<TrackRef, BlockId> = BTreeMap::new();
            let mut movement = TIME_ZERO;

            for ghost in &sliding {
                let track = ghost.track();
                match (ghost.mode, ghost.attached_block) {
                    (MovementMode::Move, Some(block)) => {
                        movement = ghost.in_adjustment();
                        runs.entry(track).or_default().push((ghost.in_point(), block));
                    }
                    (MovementMode::TrimIn, Some(block)) => {
                        out_adjacent.insert(track, block);
                    }
                    (MovementMode::TrimOut, Some(block)) => {
                        in_adjacent.insert(track, block);
                    }
                    _ => {}
                }
            }

            if movement != TIME_ZERO {
                for (track, mut run) in runs {
                    run.sort_by_key(|(in_point, _)| *in_point);
                    edit.add(TrackSlideCommand::new(
                        track,
                        run.into_iter().map(|(_, id)| id).collect(),
                        in_adjacent.get(&track).copied(),
                        out_adjacent.get(&track).copied(),
                        movement,
                    ));
                }

                let mut sel = ctx.selections.clone();
                sel.shift_time(movement);
                selections = Some(sel);
            }
        }

        if edit.is_empty() {
            return None;
        }
        Some(ToolCommit::new(name, edit).with_selections(selections))
    }

    fn finish_ripple(&self, ctx: &ToolContext, mode: MovementMode) -> Option<ToolCommit> {
        let reference = self.ghosts.first()?;

        let mut info: BTreeMap<TrackRef, RippleInfo> = BTreeMap::new();
        for ghost in self.ghosts.iter().filter(|g| g.has_been_adjusted()) {
            let entry = match (ghost.attached_block, ghost.reference_block) {
                (Some(block), _) => RippleInfo {
                    block,
                    append_gap: false,
                },
                (None, Some(block)) => RippleInfo {
                    block,
                    append_gap: true,
                },
                (None, None) => continue,
            };
            info.insert(ghost.track(), entry);
        }

        let movement = if mode == MovementMode::TrimOut {
            reference.out_adjustment()
        } else {
            reference.in_adjustment()
        };

        let mut edit = MultiEditCommand::new("Ripple Clips");
        for kind in TrackType::ALL {
            let tracks: Vec<(TrackRef, RippleInfo)> = info
                .iter()
                .filter(|(track, _)| track.kind == kind)
                .map(|(track, entry)| (*track, *entry))
                .collect();
            if !tracks.is_empty() {
                edit.add(TrackListRippleToolCommand::new(kind, tracks, movement, mode));
            }
        }
        if edit.is_empty() {
            return None;
        }

        let mut sel = ctx.selections.clone();
        if mode == MovementMode::TrimIn {
            sel.trim_out(-reference.in_adjustment());
        } else {
            sel.trim_out(reference.out_adjustment());
        }
        Some(ToolCommit::new("Ripple Clips", edit).with_selections(Some(sel)))
    }
}

impl TimelineTool for PointerTool {
    fn kind(&self) -> EditTool {
        match self.flavour {
            PointerFlavour::Pointer => EditTool::Pointer,
            PointerFlavour::Ripple => EditTool::Ripple,
            PointerFlavour::Rolling => EditTool::Rolling,
            PointerFlavour::Slide => EditTool::Slide,
        }
    }

    fn mouse_press(&mut self, ctx: &mut ToolContext, event: &MouseEvent) {
        self.reset();
        let seq = ctx.sequence;
        let hit = hit_block(seq, event);

        select_on_press(ctx.selected, hit, event.modifiers);

        let Some(block) = hit else { return };
        let mut mode = self.trim_mode_at(block, event.time, ctx.view, ctx.prefs);
        if mode == MovementMode::None && self.movement_allowed && !block.is_gap() {
            mode = MovementMode::Move;
        }
        self.press = Some(Press {
            clicked: Some(block.id),
            start_time: event.time,
            start_track: event.track,
            mode,
            dragging: false,
        });
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, event: &MouseEvent) {
        let Some(press) = self.press.as_mut() else { return };

        if !press.dragging {
            press.dragging = true;
            let press = *press;
            if press.mode != MovementMode::None {
                self.initiate_drag(ctx.sequence, ctx.selected, press, event.modifiers);
            }
            if !self.ghosts.is_empty() {
                let dragged: BTreeSet<BlockId> = self.ghosts.iter().filter_map(|g| g.attached_block).collect();
                self.snapper = Some(Snapper::from_sequence(ctx.sequence, &ctx.prefs.snapping, &dragged));
                log::debug!(
                    "{} drag started: {:?} with {} ghost(s)",
                    self.kind().name(),
                    press.mode,
                    self.ghosts.len()
                );
            }
        }

        if !self.ghosts.is_empty() {
            self.process_drag(ctx, event);
        }
    }

    fn mouse_release(&mut self, ctx: &mut ToolContext, event: &MouseEvent) -> Option<ToolCommit> {
        let press = self.press?;
        let commit = if !press.dragging || self.ghosts.is_empty() {
            None
        } else if self.flavour == PointerFlavour::Ripple {
            self.finish_ripple(ctx, press.mode)
        } else {
            self.finish_drag(ctx, event.modifiers, press.start_track.kind)
        };
        self.reset();
        commit
    }

    fn cancel(&mut self) {
        if self.is_dragging() {
            log::debug!("{} drag cancelled", self.kind().name());
        }
        self.reset();
    }

    fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    fn snapped_points(&self) -> &[Rational] {
        &self.snapped
    }

    fn hover_mode(&self, seq: &Sequence, prefs: &EditorPreferences, view: &TimelineView, event: &MouseEvent) -> MovementMode {
        hit_block(seq, event).map_or(MovementMode::None, |block| self.trim_mode_at(block, event.time, view, prefs))
    }
}

/// Moving `block` would pull a transition away from one of its clips
fn separates_transition(seq: &Sequence, block: &Block, selected: &BTreeSet<BlockId>) -> bool {
    if block.is_transition() {
        return !transition_moves_with(block, selected);
    }
    block.clip_data().is_some_and(|clip| {
        [clip.in_transition, clip.out_transition]
            .into_iter()
            .flatten()
            .filter_map(|id| seq.block(id))
            .any(|t| !transition_moves_with(t, selected))
    })
}

fn transition_moves_with(transition: &Block, selected: &BTreeSet<BlockId>) -> bool {
    transition.transition_data().is_none_or(|t| {
        [t.out_block, t.in_block]
            .into_iter()
            .flatten()
            .all(|id| selected.contains(&id))
    })
}

/// `neighbour` is the block `block` is bound to on that side by a transition
fn is_bound_neighbour(block: &Block, neighbour: BlockId, before: bool) -> bool {
    if let Some(t) = block.transition_data() {
        return if before {
            t.out_block == Some(neighbour)
        } else {
            t.in_block == Some(neighbour)
        };
    }
    if let Some(clip) = block.clip_data() {
        return if before {
            clip.in_transition == Some(neighbour)
        } else {
            clip.out_transition == Some(neighbour)
        };
    }
    true
}

/// `block` is the outermost selected block on its track for this trim side
fn is_trimmable(block: &Block, blocks: &[&Block], mode: MovementMode) -> bool {
    blocks.iter().all(|other| {
        other.id == block.id
            || other.track() != block.track()
            || !((mode == MovementMode::TrimIn && other.in_point() < block.in_point())
                || (mode == MovementMode::TrimOut && other.out_point() > block.out_point()))
    })
}
