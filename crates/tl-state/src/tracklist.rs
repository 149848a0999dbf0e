//! Per-type track collections

use serde::{Deserialize, Serialize};
use tl_core::{Rational, TIME_ZERO, TrackRef, TrackType};

use crate::block::BlockPool;
use crate::track::Track;

/// All tracks of one type within a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackList {
    kind: TrackType,
    tracks: Vec<Track>,
    total_length: Rational,
}

impl TrackList {
    pub fn new(kind: TrackType) -> Self {
        Self {
            kind,
            tracks: Vec::new(),
            total_length: TIME_ZERO,
        }
    }

    #[inline]
    pub fn kind(&self) -> TrackType {
        self.kind
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub(crate) fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Longest track length
    #[inline]
    pub fn total_length(&self) -> Rational {
        self.total_length
    }

    pub(crate) fn update_total_length(&mut self) {
        self.total_length = self
            .tracks
            .iter()
            .map(|t| t.length())
            .max()
            .unwrap_or(TIME_ZERO);
    }

    /// Append a fresh track; returns its index
    pub(crate) fn add_track(&mut self) -> usize {
        let index = self.tracks.len();
        self.tracks.push(Track::new(TrackRef::new(self.kind, index)));
        index
    }

    /// Insert an existing track at `index`, reindexing the tracks after it
    pub(crate) fn insert_track(&mut self, pool: &mut BlockPool, index: usize, track: Track) {
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        self.reindex_from(pool, index);
        self.update_total_length();
    }

    /// Take the track at `index` out of the list, reindexing the tracks after it
    pub(crate) fn remove_track(&mut self, pool: &mut BlockPool, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        track.release_blocks(pool);
        self.reindex_from(pool, index);
        self.update_total_length();
        Some(track)
    }

    fn reindex_from(&mut self, pool: &mut BlockPool, index: usize) {
        for (i, track) in self.tracks.iter_mut().enumerate().skip(index) {
            track.set_index(pool, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use tl_core::seconds;

    #[test]
    fn test_remove_track_reindexes_blocks() {
        let mut pool = BlockPool::new();
        let mut list = TrackList::new(TrackType::Audio);
        list.add_track();
        list.add_track();
        let id = pool.insert(Block::clip("A", seconds(4)));
        if let Some(t) = list.track_mut(1) {
            t.append_block(&mut pool, id);
        }
        list.update_total_length();
        assert_eq!(list.total_length(), seconds(4));

        let removed = list.remove_track(&mut pool, 0);
        assert!(removed.is_some());
        assert_eq!(pool.get(id).unwrap().track(), Some(TrackRef::audio(0)));
        assert_eq!(list.track(0).unwrap().index(), 0);

        let removed = list.remove_track(&mut pool, 0).unwrap();
        assert_eq!(pool.get(id).unwrap().track(), None);
        assert_eq!(list.total_length(), TIME_ZERO);

        list.insert_track(&mut pool, 0, removed);
        assert_eq!(pool.get(id).unwrap().track(), Some(TrackRef::audio(0)));
        assert_eq!(list.total_length(), seconds(4));
    }
}
