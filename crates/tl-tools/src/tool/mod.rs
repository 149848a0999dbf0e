//! Interactive timeline tools
//!
//! A tool is a small state machine driven by mouse events:
//! `Idle → press → Dragging → move* → release → Committed | Idle`.
//! While dragging it only touches its own ghosts; the sequence is changed
//! once, by the edit the tool hands back on release.

mod pointer;
mod razor;
mod slip;

pub use pointer::*;
pub use razor::*;
pub use slip::*;

use std::collections::BTreeSet;
use tl_core::{BlockId, EditTool, MovementMode, Rational};
use tl_state::{Block, EditorPreferences, MultiEditCommand, Sequence, TimelineSelections};

use crate::{Ghost, Modifiers, MouseEvent, TimelineView};

/// Everything a tool may read (and the block selection it may change)
pub struct ToolContext<'a> {
    pub sequence: &'a Sequence,
    pub selected: &'a mut BTreeSet<BlockId>,
    pub selections: &'a TimelineSelections,
    pub prefs: &'a EditorPreferences,
    pub view: &'a TimelineView,
}

/// The edit produced by a finished gesture
pub struct ToolCommit {
    /// Undo history label
    pub name: String,
    pub edit: MultiEditCommand,
    /// Replacement time selections, swapped in the same undo step
    pub selections: Option<TimelineSelections>,
}

impl ToolCommit {
    pub fn new(name: &str, edit: MultiEditCommand) -> Self {
        Self {
            name: name.to_string(),
            edit,
            selections: None,
        }
    }

    pub fn with_selections(mut self, selections: Option<TimelineSelections>) -> Self {
        self.selections = selections;
        self
    }
}

pub trait TimelineTool: Send {
    fn kind(&self) -> EditTool;

    fn mouse_press(&mut self, ctx: &mut ToolContext, event: &MouseEvent);

    fn mouse_move(&mut self, ctx: &mut ToolContext, event: &MouseEvent);

    /// Finish the gesture; `None` when it changed nothing
    fn mouse_release(&mut self, ctx: &mut ToolContext, event: &MouseEvent) -> Option<ToolCommit>;

    /// Drop the gesture without producing an edit
    fn cancel(&mut self);

    /// Ghosts of the gesture in progress
    fn ghosts(&self) -> &[Ghost] {
        &[]
    }

    /// Snap targets the last drag step landed on
    fn snapped_points(&self) -> &[Rational] {
        &[]
    }

    /// Which edge a press at `event` would grab
    fn hover_mode(&self, _seq: &Sequence, _prefs: &EditorPreferences, _view: &TimelineView, _event: &MouseEvent) -> MovementMode {
        MovementMode::None
    }
}

/// Build the tool behind an [`EditTool`]
pub fn create_tool(tool: EditTool) -> Box<dyn TimelineTool> {
    match tool {
        EditTool::Pointer => Box::new(PointerTool::new(PointerFlavour::Pointer)),
        EditTool::Ripple => Box::new(PointerTool::new(PointerFlavour::Ripple)),
        EditTool::Rolling => Box::new(PointerTool::new(PointerFlavour::Rolling)),
        EditTool::Slide => Box::new(PointerTool::new(PointerFlavour::Slide)),
        EditTool::Slip => Box::new(SlipTool::new()),
        EditTool::Razor => Box::new(RazorTool::new()),
    }
}

/// Block under the cursor on an unlocked track
pub(crate) fn hit_block<'s>(seq: &'s Sequence, event: &MouseEvent) -> Option<&'s Block> {
    let track = seq.track(event.track)?;
    if track.locked {
        return None;
    }
    let id = track.nearest_block_before_or_at(seq.pool(), event.time)?;
    seq.block(id)
}

/// Click selection: shift toggles, links follow unless alt is held
pub(crate) fn select_on_press(selected: &mut BTreeSet<BlockId>, hit: Option<&Block>, modifiers: Modifiers) {
    if let Some(block) = hit
        && selected.contains(&block.id)
    {
        if modifiers.shift {
            selected.remove(&block.id);
            if block.is_clip() && !modifiers.alt {
                for link in block.links() {
                    selected.remove(link);
                }
            }
        }
        return;
    }

    if !modifiers.shift {
        selected.clear();
    }
    if let Some(block) = hit {
        selected.insert(block.id);
        if block.is_clip() && !modifiers.alt {
            selected.extend(block.links().iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_core::{TrackRef, TrackType, seconds};

    #[test]
    fn test_select_on_press() {
        let mut seq = Sequence::default();
        let v = seq.add_track(TrackType::Video);
        let a = seq.add_track(TrackType::Audio);
        let video = seq.add_block(Block::clip("v", seconds(4)));
        let audio = seq.add_block(Block::clip("a", seconds(4)));
        let other = seq.add_block(Block::clip("o", seconds(2)));
        seq.append_block(v, video);
        seq.append_block(a, audio);
        seq.append_block(v, other);
        seq.link_blocks(video, audio);

        let mut selected = BTreeSet::new();
        let press = MouseEvent::new(seconds(1), TrackRef::video(0));
        select_on_press(&mut selected, hit_block(&seq, &press), press.modifiers);
        assert_eq!(selected, [video, audio].into_iter().collect());

        // Alt selects the block alone
        let press = MouseEvent::new(seconds(5), TrackRef::video(0)).with_alt();
        select_on_press(&mut selected, hit_block(&seq, &press), press.modifiers);
        assert_eq!(selected, [other].into_iter().collect());

        // Shift adds, shift again on a selected block removes it with its links
        let press = MouseEvent::new(seconds(1), TrackRef::video(0)).with_shift();
        select_on_press(&mut selected, hit_block(&seq, &press), press.modifiers);
        assert_eq!(selected.len(), 3);
        select_on_press(&mut selected, hit_block(&seq, &press), press.modifiers);
        assert_eq!(selected, [other].into_iter().collect());

        // Empty space clears
        let press = MouseEvent::new(seconds(20), TrackRef::video(0));
        select_on_press(&mut selected, hit_block(&seq, &press), press.modifiers);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_locked_track_is_not_hit() {
        let mut seq = Sequence::default();
        let v = seq.add_track(TrackType::Video);
        let clip = seq.add_block(Block::clip("v", seconds(4)));
        seq.append_block(v, clip);
        seq.set_track_locked(v, true);
        assert!(hit_block(&seq, &MouseEvent::new(seconds(1), v)).is_none());
    }

    #[test]
    fn test_create_tool_kinds() {
        for tool in EditTool::all() {
            assert_eq!(create_tool(*tool).kind(), *tool);
        }
    }
}
