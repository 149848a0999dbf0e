//! Snapping of dragged edges to nearby points of interest

use std::collections::BTreeSet;
use tl_core::{BlockId, Rational, SnapSettings};
use tl_state::Sequence;

use crate::TimelineView;

/// Snap targets for one drag plus the pixel threshold
#[derive(Debug, Clone, Default)]
pub struct Snapper {
    targets: BTreeSet<Rational>,
    threshold_px: f64,
}

impl Snapper {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            targets: BTreeSet::new(),
            threshold_px,
        }
    }

    /// Collect targets from the sequence, skipping the edges of `dragged` blocks
    pub fn from_sequence(seq: &Sequence, settings: &SnapSettings, dragged: &BTreeSet<BlockId>) -> Self {
        let mut snapper = Self::new(settings.threshold_px);
        if settings.to_blocks {
            for block in seq.tracks().flat_map(|t| t.blocks().iter()).filter_map(|id| seq.block(*id)) {
                if dragged.contains(&block.id) || block.is_gap() {
                    continue;
                }
                snapper.add_target(block.in_point());
                snapper.add_target(block.out_point());
            }
        }
        if settings.to_playhead {
            snapper.add_target(seq.playhead);
        }
        if settings.to_markers {
            for marker in &seq.markers {
                snapper.add_target(*marker);
            }
        }
        if settings.to_workarea
            && let Some(workarea) = seq.workarea
        {
            snapper.add_target(workarea.in_point());
            snapper.add_target(workarea.out_point());
        }
        snapper
    }

    pub fn add_target(&mut self, time: Rational) {
        self.targets.insert(time);
    }

    pub fn targets(&self) -> impl Iterator<Item = Rational> + '_ {
        self.targets.iter().copied()
    }

    /// Pull `movement` so the closest of `points + movement` lands on a target
    ///
    /// Returns the adjusted movement and the target(s) snapped to; the
    /// movement is unchanged (and the list empty) when nothing is within the
    /// threshold.
    pub fn snap(&self, points: &[Rational], movement: Rational, view: &TimelineView) -> (Rational, Vec<Rational>) {
        let mut best: Option<(f64, Rational)> = None;
        for point in points {
            let moved = *point + movement;
            for target in &self.targets {
                let distance = view.span_to_pixels(*target - moved);
                if distance > self.threshold_px {
                    continue;
                }
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, *target - moved));
                }
            }
        }

        let Some((_, diff)) = best else {
            return (movement, Vec::new());
        };
        let snapped = movement + diff;
        let hits = points
            .iter()
            .map(|p| *p + snapped)
            .filter(|t| self.targets.contains(t))
            .collect();
        (snapped, hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_core::{TrackType, rational, seconds};

    #[test]
    fn test_snap_within_threshold() {
        let mut snapper = Snapper::new(10.0);
        snapper.add_target(seconds(5));
        let view = TimelineView::new(100.0);

        // Out edge at 2 + 2.95 = 4.95, 5 px from the target
        let (movement, hits) = snapper.snap(&[seconds(1), seconds(2)], rational(295, 100), &view);
        assert_eq!(movement, seconds(3));
        assert_eq!(hits, vec![seconds(5)]);

        // 20 px away: no snap
        let (movement, hits) = snapper.snap(&[seconds(2)], rational(28, 10), &view);
        assert_eq!(movement, rational(28, 10));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_targets_from_sequence() {
        let mut seq = Sequence::default();
        let track = seq.add_track(TrackType::Video);
        let a = seq.add_block(tl_state::Block::clip("a", seconds(2)));
        let b = seq.add_block(tl_state::Block::clip("b", seconds(3)));
        seq.append_block(track, a);
        seq.append_block(track, b);
        seq.playhead = seconds(7);
        seq.markers.push(seconds(9));

        let dragged: BTreeSet<BlockId> = [b].into_iter().collect();
        let snapper = Snapper::from_sequence(&seq, &SnapSettings::default(), &dragged);
        let targets: Vec<Rational> = snapper.targets().collect();
        assert_eq!(targets, vec![seconds(0), seconds(2), seconds(7), seconds(9)]);
    }
}
