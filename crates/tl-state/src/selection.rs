//! Timeline selections: per-track sets of selected time ranges

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tl_core::{Rational, TimeRange, TimeRangeList, TrackRef, TrackType};

use crate::Command;

/// Shared handle so edit commits can swap selections in the same undo step
pub type SelectionsHandle = Arc<RwLock<TimelineSelections>>;

/// Selected time ranges keyed by track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSelections {
    ranges: BTreeMap<TrackRef, TimeRangeList>,
}

impl TimelineSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_handle(self) -> SelectionsHandle {
        Arc::new(RwLock::new(self))
    }

    /// Select a range, merging with ranges it touches
    pub fn add(&mut self, track: TrackRef, range: TimeRange) {
        if range.is_empty() {
            return;
        }
        self.ranges.entry(track).or_default().insert(range);
    }

    pub fn remove(&mut self, track: TrackRef, range: TimeRange) {
        if let Some(list) = self.ranges.get_mut(&track) {
            list.remove(range);
            if list.is_empty() {
                self.ranges.remove(&track);
            }
        }
    }

    pub fn ranges_for(&self, track: TrackRef) -> Vec<TimeRange> {
        self.ranges
            .get(&track)
            .map(|list| list.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, track: TrackRef, time: Rational) -> bool {
        self.ranges.get(&track).is_some_and(|list| list.contains(time))
    }

    pub fn tracks(&self) -> impl Iterator<Item = TrackRef> + '_ {
        self.ranges.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Move every range in time
    pub fn shift_time(&mut self, delta: Rational) {
        for list in self.ranges.values_mut() {
            list.shift(delta);
        }
    }

    /// Move every selection on tracks of `kind` up or down by `delta` tracks
    ///
    /// Selections pushed below track 0 are dropped.
    pub fn shift_tracks(&mut self, kind: TrackType, delta: i64) {
        if delta == 0 {
            return;
        }
        let ranges = std::mem::take(&mut self.ranges);
        for (track, list) in ranges {
            let target = if track.kind == kind { track.offset(delta) } else { Some(track) };
            if let Some(target) = target {
                for range in list.iter() {
                    self.add(target, *range);
                }
            }
        }
    }

    /// Move every range's in point, dropping ranges that collapse
    pub fn trim_in(&mut self, delta: Rational) {
        for list in self.ranges.values_mut() {
            list.trim_in(delta);
        }
        self.ranges.retain(|_, list| !list.is_empty());
    }

    /// Move every range's out point, dropping ranges that collapse
    pub fn trim_out(&mut self, delta: Rational) {
        for list in self.ranges.values_mut() {
            list.trim_out(delta);
        }
        self.ranges.retain(|_, list| !list.is_empty());
    }
}

/// Replace the selection model, restoring the old one on undo
pub struct SetSelectionsCommand {
    selections: SelectionsHandle,
    new: TimelineSelections,
    old: Option<TimelineSelections>,
}

impl SetSelectionsCommand {
    pub fn new(selections: SelectionsHandle, new: TimelineSelections) -> Self {
        Self {
            selections,
            new,
            old: None,
        }
    }
}

impl Command for SetSelectionsCommand {
    fn execute(&mut self) {
        let mut current = self.selections.write();
        let old = std::mem::replace(&mut *current, self.new.clone());
        self.old = Some(old);
    }

    fn undo(&mut self) {
        if let Some(old) = self.old.take() {
            *self.selections.write() = old;
        }
    }

    fn name(&self) -> &str {
        "Set Selections"
    }

    fn is_noop(&self) -> bool {
        self.old.as_ref() == Some(&self.new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UndoManager;
    use tl_core::seconds;

    fn range(a: i64, b: i64) -> TimeRange {
        TimeRange::new(seconds(a), seconds(b))
    }

    #[test]
    fn test_add_merges_ranges() {
        let mut sel = TimelineSelections::new();
        sel.add(TrackRef::video(0), range(0, 2));
        sel.add(TrackRef::video(0), range(2, 4));
        sel.add(TrackRef::video(0), range(6, 8));
        assert_eq!(sel.ranges_for(TrackRef::video(0)), vec![range(0, 4), range(6, 8)]);

        sel.remove(TrackRef::video(0), range(1, 7));
        assert_eq!(sel.ranges_for(TrackRef::video(0)), vec![range(0, 1), range(7, 8)]);
    }

    #[test]
    fn test_shift_tracks_drops_negative() {
        let mut sel = TimelineSelections::new();
        sel.add(TrackRef::video(0), range(0, 1));
        sel.add(TrackRef::video(1), range(0, 1));
        sel.add(TrackRef::audio(0), range(0, 1));
        sel.shift_tracks(TrackType::Video, -1);

        let tracks: Vec<TrackRef> = sel.tracks().collect();
        assert_eq!(tracks, vec![TrackRef::video(0), TrackRef::audio(0)]);
    }

    #[test]
    fn test_trim_and_shift() {
        let mut sel = TimelineSelections::new();
        sel.add(TrackRef::audio(2), range(2, 5));
        sel.shift_time(seconds(1));
        sel.trim_in(seconds(1));
        sel.trim_out(seconds(2));
        assert_eq!(sel.ranges_for(TrackRef::audio(2)), vec![range(4, 8)]);

        sel.trim_out(seconds(-10));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_set_selections_command() {
        let handle = TimelineSelections::new().into_handle();
        let mut next = TimelineSelections::new();
        next.add(TrackRef::video(0), range(1, 3));

        let mut manager = UndoManager::new(10);
        assert!(manager.execute(Box::new(SetSelectionsCommand::new(handle.clone(), next.clone()))));
        assert_eq!(*handle.read(), next);
        assert!(manager.undo());
        assert!(handle.read().is_empty());

        // Same selection again changes nothing
        assert!(!manager.execute(Box::new(SetSelectionsCommand::new(handle.clone(), TimelineSelections::new()))));
    }
}
