//! Slip tool: change what part of the media a clip shows without moving it

use tl_core::{BlockId, EditTool, MovementMode, Rational, TIME_ZERO, TrackRef};
use tl_state::{BlockSetMediaInCommand, MultiEditCommand};

use super::{TimelineTool, ToolCommit, ToolContext, hit_block, select_on_press};
use crate::{Ghost, MouseEvent, validate_slip};

#[derive(Debug, Clone, Copy)]
struct SlipPress {
    start_time: Rational,
    start_track: TrackRef,
    dragging: bool,
}

#[derive(Default)]
pub struct SlipTool {
    press: Option<SlipPress>,
    ghosts: Vec<Ghost>,
}

impl SlipTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Media offset change of the gesture in progress
    pub fn slip(&self) -> Rational {
        self.ghosts.first().map_or(TIME_ZERO, |g| g.media_in_adjustment())
    }
}

impl TimelineTool for SlipTool {
    fn kind(&self) -> EditTool {
        EditTool::Slip
    }

    fn mouse_press(&mut self, ctx: &mut ToolContext, event: &MouseEvent) {
        self.cancel();
        let hit = hit_block(ctx.sequence, event);
        select_on_press(ctx.selected, hit, event.modifiers);

        if hit.is_some_and(|b| !b.is_gap()) {
            self.press = Some(SlipPress {
                start_time: event.time,
                start_track: event.track,
                dragging: false,
            });
        }
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, event: &MouseEvent) {
        let Some(press) = self.press.as_mut() else { return };

        if !press.dragging {
            press.dragging = true;
            let seq = ctx.sequence;
            self.ghosts = ctx
                .selected
                .iter()
                .filter_map(|id| seq.block(*id))
                .filter(|b| b.is_clip())
                .filter_map(|b| Ghost::from_block(b, MovementMode::Move))
                .collect();
            log::debug!("slip started on {} with {} clip(s)", press.start_track, self.ghosts.len());
        }

        // Dragging right reveals earlier media
        let movement = validate_slip(&self.ghosts, press.start_time - event.time);
        for ghost in &mut self.ghosts {
            ghost.set_media_in_adjustment(movement);
        }
    }

    fn mouse_release(&mut self, _ctx: &mut ToolContext, _event: &MouseEvent) -> Option<ToolCommit> {
        let ghosts = std::mem::take(&mut self.ghosts);
        self.press = None;

        let slipped: Vec<(BlockId, Rational)> = ghosts
            .iter()
            .filter(|g| g.has_been_adjusted())
            .filter_map(|g| Some((g.attached_block?, g.adjusted_media_in()?)))
            .collect();
        if slipped.is_empty() {
            return None;
        }

        let mut edit = MultiEditCommand::new("Slip Clips");
        for (block, media_in) in slipped {
            edit.add(BlockSetMediaInCommand::new(block, media_in));
        }
        Some(ToolCommit::new("Slip Clips", edit))
    }

    fn cancel(&mut self) {
        self.press = None;
        self.ghosts.clear();
    }

    fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tl_core::{TrackType, seconds};
    use tl_state::{Block, ClipData, EditorPreferences, Sequence, TimelineSelections};

    use crate::TimelineView;

    #[test]
    fn test_slip_clamps_at_media_start() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        let data = ClipData {
            media_in: seconds(3),
            ..Default::default()
        };
        let clip = seq.add_block(Block::clip_with("c", seconds(10), data));
        seq.append_block(track, clip);

        let mut selected = BTreeSet::new();
        let selections = TimelineSelections::new();
        let prefs = EditorPreferences::default();
        let view = TimelineView::default();
        let mut ctx = ToolContext {
            sequence: &seq,
            selected: &mut selected,
            selections: &selections,
            prefs: &prefs,
            view: &view,
        };

        let mut tool = SlipTool::new();
        tool.mouse_press(&mut ctx, &MouseEvent::new(seconds(5), track));
        tool.mouse_move(&mut ctx, &MouseEvent::new(seconds(3), track));
        assert_eq!(tool.slip(), seconds(2));

        // Dragging right by 8 would need media before zero
        tool.mouse_move(&mut ctx, &MouseEvent::new(seconds(13), track));
        assert_eq!(tool.slip(), seconds(-3));
        assert_eq!(tool.ghosts()[0].adjusted_media_in(), Some(seconds(0)));
        assert_eq!(tool.ghosts()[0].adjusted_in(), seconds(0));

        let commit = tool.mouse_release(&mut ctx, &MouseEvent::new(seconds(13), track));
        assert!(commit.is_some_and(|c| c.edit.len() == 1 && c.selections.is_none()));
    }
}
