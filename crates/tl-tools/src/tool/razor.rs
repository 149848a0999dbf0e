//! Razor tool: split clips at one point on every track the cursor sweeps

use tl_core::{BlockId, EditTool, Rational, TIME_ZERO, TrackRef, snap_time_to_timebase};
use tl_state::{BlockSplitPreservingLinksCommand, MultiEditCommand};

use super::{TimelineTool, ToolCommit, ToolContext};
use crate::{MouseEvent, Snapper};

#[derive(Debug, Default)]
pub struct RazorTool {
    split_time: Option<Rational>,
    tracks: Vec<TrackRef>,
    snapper: Option<Snapper>,
    snapped: Vec<Rational>,
}

impl RazorTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the cut will land, once the gesture has started
    pub fn split_time(&self) -> Option<Rational> {
        self.split_time
    }

    /// Cursor time clamped to the timeline, snapped, and rounded to the track grid
    fn validated_time(&mut self, ctx: &ToolContext, event: &MouseEvent) -> Rational {
        let seq = ctx.sequence;
        let mut time = event.time.max(TIME_ZERO);
        self.snapped.clear();
        if !event.modifiers.shift
            && let Some(snapper) = &self.snapper
        {
            let (movement, hits) = snapper.snap(&[time], TIME_ZERO, ctx.view);
            time += movement;
            self.snapped = hits;
        }
        snap_time_to_timebase(time, seq.timebase_for(event.track.kind))
    }
}

impl TimelineTool for RazorTool {
    fn kind(&self) -> EditTool {
        EditTool::Razor
    }

    fn mouse_press(&mut self, ctx: &mut ToolContext, event: &MouseEvent) {
        self.cancel();
        if ctx.prefs.snapping.enabled {
            self.snapper = Some(Snapper::from_sequence(ctx.sequence, &ctx.prefs.snapping, &Default::default()));
        }
        self.mouse_move(ctx, event);
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, event: &MouseEvent) {
        if self.split_time.is_none() {
            self.split_time = Some(self.validated_time(ctx, event));
        }
        if !self.tracks.contains(&event.track) {
            self.tracks.push(event.track);
        }
    }

    fn mouse_release(&mut self, ctx: &mut ToolContext, event: &MouseEvent) -> Option<ToolCommit> {
        let time = self.split_time.take()?;
        let tracks = std::mem::take(&mut self.tracks);
        self.snapper = None;
        self.snapped.clear();
        let seq = ctx.sequence;

        let mut blocks: Vec<BlockId> = Vec::new();
        for track in tracks {
            let Some(t) = seq.track(track).filter(|t| !t.locked) else {
                continue;
            };
            let Some(block) = t
                .nearest_block_before(seq.pool(), time)
                .and_then(|id| seq.block(id))
                .filter(|b| b.out_point() != time && b.is_clip())
            else {
                continue;
            };
            if blocks.contains(&block.id) {
                continue;
            }
            blocks.push(block.id);

            if !event.modifiers.alt {
                for link in block.links() {
                    if !blocks.contains(link) {
                        blocks.push(*link);
                    }
                }
            }
        }

        if blocks.is_empty() {
            return None;
        }
        log::debug!("razor: splitting {} block(s) at {}", blocks.len(), time);

        let mut edit = MultiEditCommand::new("Split Clips");
        edit.add(BlockSplitPreservingLinksCommand::new(blocks, vec![time]));
        Some(ToolCommit::new("Split Clips", edit))
    }

    fn cancel(&mut self) {
        self.split_time = None;
        self.tracks.clear();
        self.snapper = None;
        self.snapped.clear();
    }

    fn snapped_points(&self) -> &[Rational] {
        &self.snapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tl_core::{TrackType, rational, seconds};
    use tl_state::{Block, EditorPreferences, Sequence, TimelineSelections};

    use crate::TimelineView;

    #[test]
    fn test_split_time_is_fixed_at_press() {
        let mut seq = Sequence::default();
        let v0 = seq.add_track(TrackType::Video);
        let v1 = seq.add_track(TrackType::Video);
        for track in [v0, v1] {
            let clip = seq.add_block(Block::clip("c", seconds(10)));
            seq.append_block(track, clip);
        }

        let mut selected = BTreeSet::new();
        let selections = TimelineSelections::new();
        let mut prefs = EditorPreferences::default();
        prefs.snapping.enabled = false;
        let view = TimelineView::default();
        let mut ctx = ToolContext {
            sequence: &seq,
            selected: &mut selected,
            selections: &selections,
            prefs: &prefs,
            view: &view,
        };

        let mut tool = RazorTool::new();
        tool.mouse_press(&mut ctx, &MouseEvent::new(rational(401, 100), v0));
        // Rounded to the 1/30 grid
        assert_eq!(tool.split_time(), Some(seconds(4)));
        tool.mouse_move(&mut ctx, &MouseEvent::new(seconds(7), v1));
        assert_eq!(tool.split_time(), Some(seconds(4)));

        let commit = tool.mouse_release(&mut ctx, &MouseEvent::new(seconds(7), v1));
        assert!(commit.is_some_and(|c| c.edit.len() == 1));
        assert_eq!(tool.split_time(), None);
    }

    #[test]
    fn test_release_on_edit_point_splits_nothing() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        for _ in 0..2 {
            let clip = seq.add_block(Block::clip("c", seconds(5)));
            seq.append_block(track, clip);
        }

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

        let mut tool = RazorTool::new();
        tool.mouse_press(&mut ctx, &MouseEvent::new(seconds(5), track));
        assert!(tool.mouse_release(&mut ctx, &MouseEvent::new(seconds(5), track)).is_none());
    }

    #[test]
    fn test_snapper_lives_for_one_gesture() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        for _ in 0..2 {
            let clip = seq.add_block(Block::clip("c", seconds(5)));
            seq.append_block(track, clip);
        }

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

        let mut tool = RazorTool::new();
        tool.mouse_press(&mut ctx, &MouseEvent::new(rational(499, 100), track));
        assert!(tool.snapper.as_ref().is_some_and(|s| s.targets().any(|t| t == seconds(5))));
        assert_eq!(tool.split_time(), Some(seconds(5)));
        assert_eq!(tool.snapped_points(), &[seconds(5)]);

        tool.cancel();
        assert!(tool.snapper.is_none());
        assert!(tool.snapped_points().is_empty());
    }
}
