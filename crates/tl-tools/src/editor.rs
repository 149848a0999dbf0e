//! Timeline editor: routes mouse input to the active tool and records the
//! resulting edits on the undo stack

use std::collections::BTreeSet;
use tl_core::{BlockId, EditTool, MovementMode, Rational};
use tl_state::{
    Command, CommandGroup, EditorPreferences, SelectionsHandle, Sequence, SequenceCommand, SequenceHandle,
    SetSelectionsCommand, TimelineSelections, UndoManager,
};

use crate::{Ghost, MouseEvent, TimelineTool, TimelineView, ToolContext, create_tool};

pub struct TimelineEditor {
    sequence: SequenceHandle,
    selections: SelectionsHandle,
    selected_blocks: BTreeSet<BlockId>,
    undo: UndoManager,
    prefs: EditorPreferences,
    view: TimelineView,
    tool: Box<dyn TimelineTool>,
}

impl TimelineEditor {
    pub fn new(sequence: Sequence, prefs: EditorPreferences) -> Self {
        Self::with_handle(sequence.into_handle(), prefs)
    }

    /// Editor on a fresh, empty sequence using the preferred timebases
    pub fn with_new_sequence(name: &str, prefs: EditorPreferences) -> Self {
        let sequence = prefs.new_sequence(name);
        Self::new(sequence, prefs)
    }

    pub fn with_handle(sequence: SequenceHandle, prefs: EditorPreferences) -> Self {
        let mut undo = UndoManager::new(prefs.max_undo_history);
        undo.set_keep_noop_commands(prefs.push_noop_commands);
        Self {
            sequence,
            selections: TimelineSelections::new().into_handle(),
            selected_blocks: BTreeSet::new(),
            undo,
            prefs,
            view: TimelineView::default(),
            tool: create_tool(EditTool::default()),
        }
    }

    pub fn sequence(&self) -> &SequenceHandle {
        &self.sequence
    }

    pub fn selections(&self) -> &SelectionsHandle {
        &self.selections
    }

    pub fn prefs(&self) -> &EditorPreferences {
        &self.prefs
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    pub fn view(&self) -> &TimelineView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TimelineView {
        &mut self.view
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TOOLS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn tool(&self) -> EditTool {
        self.tool.kind()
    }

    /// Switch tools, abandoning any gesture in progress
    pub fn set_tool(&mut self, tool: EditTool) {
        if tool == self.tool.kind() {
            return;
        }
        self.tool.cancel();
        self.tool = create_tool(tool);
        log::debug!("tool: {}", tool.name());
    }

    pub fn mouse_press(&mut self, event: &MouseEvent) {
        let seq = self.sequence.read();
        let selections = self.selections.read();
        let mut ctx = ToolContext {
            sequence: &seq,
            selected: &mut self.selected_blocks,
            selections: &selections,
            prefs: &self.prefs,
            view: &self.view,
        };
        self.tool.mouse_press(&mut ctx, event);
    }

    pub fn mouse_move(&mut self, event: &MouseEvent) {
        let seq = self.sequence.read();
        let selections = self.selections.read();
        let mut ctx = ToolContext {
            sequence: &seq,
            selected: &mut self.selected_blocks,
            selections: &selections,
            prefs: &self.prefs,
            view: &self.view,
        };
        self.tool.mouse_move(&mut ctx, event);
    }

    /// Finish the gesture; true if an edit was recorded
    pub fn mouse_release(&mut self, event: &MouseEvent) -> bool {
        let commit = {
            let seq = self.sequence.read();
            let selections = self.selections.read();
            let mut ctx = ToolContext {
                sequence: &seq,
                selected: &mut self.selected_blocks,
                selections: &selections,
                prefs: &self.prefs,
                view: &self.view,
            };
            self.tool.mouse_release(&mut ctx, event)
        };
        let Some(commit) = commit else { return false };

        let mut commands: Vec<Box<dyn Command>> = vec![Box::new(SequenceCommand::new(self.sequence.clone(), commit.edit))];
        if let Some(selections) = commit.selections {
            commands.push(Box::new(SetSelectionsCommand::new(self.selections.clone(), selections)));
        }

        let recorded = self.undo.execute(Box::new(CommandGroup::new(&commit.name, commands)));
        log::debug!("{}: {}", commit.name, if recorded { "committed" } else { "no change" });
        self.prune_selection();
        recorded
    }

    /// Abandon the gesture in progress; nothing in the sequence changes
    pub fn cancel(&mut self) {
        self.tool.cancel();
    }

    /// Ghosts to paint for the gesture in progress
    pub fn ghosts(&self) -> &[Ghost] {
        self.tool.ghosts()
    }

    /// Snap targets to highlight
    pub fn snap_points(&self) -> &[Rational] {
        self.tool.snapped_points()
    }

    /// Trim edge under the cursor, for choosing a mouse cursor
    pub fn hover_mode(&self, event: &MouseEvent) -> MovementMode {
        let seq = self.sequence.read();
        self.tool.hover_mode(&seq, &self.prefs, &self.view, event)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // UNDO
    // ═══════════════════════════════════════════════════════════════════════

    pub fn undo(&mut self) -> bool {
        self.tool.cancel();
        let done = self.undo.undo();
        self.prune_selection();
        done
    }

    pub fn redo(&mut self) -> bool {
        self.tool.cancel();
        let done = self.undo.redo();
        self.prune_selection();
        done
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SELECTION
    // ═══════════════════════════════════════════════════════════════════════

    pub fn selected_blocks(&self) -> &BTreeSet<BlockId> {
        &self.selected_blocks
    }

    pub fn select_block(&mut self, block: BlockId) {
        self.selected_blocks.insert(block);
    }

    pub fn deselect_block(&mut self, block: BlockId) {
        self.selected_blocks.remove(&block);
    }

    pub fn clear_selection(&mut self) {
        self.selected_blocks.clear();
    }

    /// Forget selected blocks that are no longer on a track
    fn prune_selection(&mut self) {
        let seq = self.sequence.read();
        self.selected_blocks
            .retain(|id| seq.block(*id).is_some_and(|b| b.track().is_some()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_core::{TrackRef, TrackType, rational, seconds};
    use tl_state::Block;

    #[test]
    fn test_set_tool_cancels_gesture() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        let clip = seq.add_block(Block::clip("c", seconds(5)));
        seq.append_block(track, clip);

        let mut editor = TimelineEditor::new(seq, EditorPreferences::default());
        editor.mouse_press(&MouseEvent::new(seconds(2), TrackRef::video(0)));
        editor.mouse_move(&MouseEvent::new(seconds(3), TrackRef::video(0)));
        assert_eq!(editor.ghosts().len(), 1);

        editor.set_tool(EditTool::Razor);
        assert_eq!(editor.tool(), EditTool::Razor);
        assert!(editor.ghosts().is_empty());
        assert!(!editor.mouse_release(&MouseEvent::new(seconds(3), TrackRef::video(1))));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_new_sequence_follows_preferences() {
        let prefs = EditorPreferences {
            video_timebase: rational(1, 24),
            ..Default::default()
        };
        let editor = TimelineEditor::with_new_sequence("Edit", prefs);
        let seq = editor.sequence().read();
        assert_eq!(seq.timebase_for(TrackType::Video), rational(1, 24));
        assert_eq!(seq.timebase_for(TrackType::Audio), rational(1, 48000));
    }

    #[test]
    fn test_hover_mode() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        let clip = seq.add_block(Block::clip("c", seconds(5)));
        seq.append_block(track, clip);

        let mut editor = TimelineEditor::new(seq, EditorPreferences::default());
        let near_out = MouseEvent::new(rational(499, 100), track);
        assert_eq!(editor.hover_mode(&near_out), MovementMode::TrimOut);

        editor.set_tool(EditTool::Slide);
        assert_eq!(editor.hover_mode(&near_out), MovementMode::None);
    }
}
