//! Movement validators
//!
//! Each validator takes the movement proposed by the cursor and clamps it to
//! the nearest value that is legal for every ghost in the drag. All ghosts then
//! receive the same clamped movement, so their relative offsets survive.

use tl_core::{MovementMode, Rational, TIME_ZERO, TrackType, snap_movement_to_timebase};

use crate::Ghost;

/// Edit grid per track type
pub type Timebase<'a> = &'a dyn Fn(TrackType) -> Rational;

/// Keep moving ghosts at or after zero and land the first one on the grid
pub fn validate_time_movement(ghosts: &[Ghost], timebase: Timebase, mut movement: Rational) -> Rational {
    let mut first = true;
    for ghost in ghosts.iter().filter(|g| g.mode == MovementMode::Move) {
        if ghost.in_point() + movement < TIME_ZERO {
            movement = -ghost.in_point();
        } else if first {
            movement = snap_movement_to_timebase(ghost.in_point(), movement, timebase(ghost.track().kind));
            first = false;
        }
    }
    movement
}

/// Keep trimmed in points between zero and the out point
///
/// Blocks that cannot be empty keep at least one timebase unit.
pub fn validate_in_trimming(ghosts: &[Ghost], timebase: Timebase, mut movement: Rational) -> Rational {
    let mut first = true;
    for ghost in ghosts.iter().filter(|g| g.mode == MovementMode::TrimIn) {
        let tb = timebase(ghost.track().kind);
        let earliest = TIME_ZERO;
        let mut latest = ghost.out_point();
        if !ghost.can_have_zero_length() {
            latest -= tb;
        }

        let adjusted = ghost.in_point() + movement;
        let clamped = adjusted.clamp(earliest, latest.max(earliest));
        if clamped != adjusted {
            movement = clamped - ghost.in_point();
        }

        if first {
            movement = snap_movement_to_timebase(ghost.in_point(), movement, tb);
            first = false;
        }
    }
    movement
}

/// Keep trimmed out points after the in point
pub fn validate_out_trimming(ghosts: &[Ghost], timebase: Timebase, mut movement: Rational) -> Rational {
    let mut first = true;
    for ghost in ghosts.iter().filter(|g| g.mode == MovementMode::TrimOut) {
        let tb = timebase(ghost.track().kind);
        let mut earliest = ghost.in_point();
        if !ghost.can_have_zero_length() {
            earliest += tb;
        }

        let adjusted = ghost.out_point() + movement;
        if adjusted < earliest {
            movement = earliest - ghost.out_point();
        }

        if first {
            movement = snap_movement_to_timebase(ghost.out_point(), movement, tb);
            first = false;
        }
    }
    movement
}

/// The time-validation chain in the order drags apply it
pub fn validate_time_chain(ghosts: &[Ghost], timebase: Timebase, movement: Rational) -> Rational {
    let movement = validate_time_movement(ghosts, timebase, movement);
    let movement = validate_in_trimming(ghosts, timebase, movement);
    validate_out_trimming(ghosts, timebase, movement)
}

/// Refuse vertical moves for slides and keep every moving ghost at track ≥ 0
pub fn validate_track_movement<'a>(ghosts: impl IntoIterator<Item = &'a Ghost>, mut movement: i64) -> i64 {
    for ghost in ghosts.into_iter().filter(|g| g.mode == MovementMode::Move) {
        if !ghost.can_move_tracks {
            return 0;
        }
        let index = ghost.track().index as i64;
        if index + movement < 0 {
            movement = -index;
        }
    }
    movement
}

/// Keep every slipped clip's media in at or after zero
pub fn validate_slip(ghosts: &[Ghost], mut movement: Rational) -> Rational {
    for media_in in ghosts.iter().filter_map(|g| g.media_in()) {
        if media_in + movement < TIME_ZERO {
            movement = -media_in;
        }
    }
    movement
}
