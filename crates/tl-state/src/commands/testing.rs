//! Fixtures shared by command tests

use tl_core::{BlockId, TrackRef, TrackType, seconds};

use crate::{Block, EditStep, Sequence};

/// One video track holding clips of the given lengths (seconds)
pub(crate) fn clips_track(lengths: &[i64]) -> (Sequence, TrackRef, Vec<BlockId>) {
    let layout: Vec<(char, i64)> = lengths.iter().map(|l| ('C', *l)).collect();
    build_track(&layout)
}

/// One video track from `(kind, length)` pairs; `G` is a gap, anything else a clip
pub(crate) fn build_track(layout: &[(char, i64)]) -> (Sequence, TrackRef, Vec<BlockId>) {
    let mut seq = Sequence::default();
    let track = seq.add_track(TrackType::Video);
    let ids = fill_track(&mut seq, track, layout);
    (seq, track, ids)
}

pub(crate) fn fill_track(seq: &mut Sequence, track: TrackRef, layout: &[(char, i64)]) -> Vec<BlockId> {
    let mut ids = Vec::new();
    for (i, (kind, len)) in layout.iter().enumerate() {
        let block = match kind {
            'G' => Block::gap(seconds(*len)),
            _ => Block::clip(&format!("{kind}{i}"), seconds(*len)),
        };
        let id = seq.add_block(block);
        seq.append_block(track, id);
        ids.push(id);
    }
    ids
}

/// `(G|C|T, in, out)` per block, in whole seconds
pub(crate) fn layout(seq: &Sequence, track: TrackRef) -> Vec<(char, i64, i64)> {
    seq.track_blocks(track)
        .iter()
        .map(|b| {
            let kind = if b.is_gap() {
                'G'
            } else if b.is_transition() {
                'T'
            } else {
                'C'
            };
            (kind, b.in_point().to_integer(), b.out_point().to_integer())
        })
        .collect()
}

/// Redo, check invariants, undo, and require the exact starting state back
pub(crate) fn assert_round_trip(seq: &mut Sequence, step: &mut EditStep) {
    let before = seq.snapshot();
    step.redo_now(seq);
    assert!(seq.check_invariants().is_ok(), "{:?}", seq.check_invariants());
    let after = seq.snapshot();
    step.undo_now(seq);
    assert_eq!(seq.snapshot(), before, "undo did not restore state");
    step.redo_now(seq);
    assert_eq!(seq.snapshot(), after, "redo after undo diverged");
}
