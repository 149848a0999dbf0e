//! Track and block identifiers
//!
//! Tracks are addressed by their media type plus their index among tracks of
//! the same type. Blocks are addressed by a stable handle that survives being
//! detached from a track (or removed from the sequence) during undo.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TlError;

/// Stable block handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u64);

impl BlockId {
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Media type of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum TrackType {
    #[default]
    Video,
    Audio,
    Subtitle,
}

impl TrackType {
    /// Every track type, in sequence order
    pub const ALL: [TrackType; 3] = [TrackType::Video, TrackType::Audio, TrackType::Subtitle];

    /// Dense index for per-type storage
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
            Self::Subtitle => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Subtitle => "Subtitle",
        }
    }

    fn prefix(&self) -> char {
        match self {
            Self::Video => 'v',
            Self::Audio => 'a',
            Self::Subtitle => 's',
        }
    }
}

/// Reference to one track: type plus index among same-typed tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackRef {
    pub kind: TrackType,
    pub index: usize,
}

impl TrackRef {
    pub const fn new(kind: TrackType, index: usize) -> Self {
        Self { kind, index }
    }

    pub const fn video(index: usize) -> Self {
        Self::new(TrackType::Video, index)
    }

    pub const fn audio(index: usize) -> Self {
        Self::new(TrackType::Audio, index)
    }

    pub const fn subtitle(index: usize) -> Self {
        Self::new(TrackType::Subtitle, index)
    }

    /// Offset the index by `delta` tracks; `None` if it would go negative
    pub fn offset(self, delta: i64) -> Option<Self> {
        let index = self.index as i64 + delta;
        if index < 0 {
            None
        } else {
            Some(Self::new(self.kind, index as usize))
        }
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.index)
    }
}

impl FromStr for TrackRef {
    type Err = TlError;

    /// Parses the `v:0` / `a:1` / `s:2` form produced by `Display`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s
            .split_once(':')
            .ok_or_else(|| TlError::InvalidTrackRef(s.to_string()))?;
        let kind = match kind {
            "v" => TrackType::Video,
            "a" => TrackType::Audio,
            "s" => TrackType::Subtitle,
            _ => return Err(TlError::InvalidTrackRef(s.to_string())),
        };
        let index = index
            .parse::<usize>()
            .map_err(|_| TlError::InvalidTrackRef(s.to_string()))?;
        Ok(Self::new(kind, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_ref_round_trip_text() {
        let r = TrackRef::audio(3);
        assert_eq!(r.to_string(), "a:3");
        assert_eq!("a:3".parse::<TrackRef>().unwrap(), r);
        assert!("x:1".parse::<TrackRef>().is_err());
        assert!("v".parse::<TrackRef>().is_err());
    }

    #[test]
    fn test_track_ref_offset() {
        assert_eq!(TrackRef::video(1).offset(1), Some(TrackRef::video(2)));
        assert_eq!(TrackRef::video(1).offset(-2), None);
    }

    #[test]
    fn test_track_type_index_is_dense() {
        for (i, t) in TrackType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }
}
