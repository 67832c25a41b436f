//! Inverse-law and encoding properties of the frame diff engine.

use proptest::prelude::*;
use rewind_core::{Diffable, StreamCodec, TokenReader, TokenWriter};
use rewind_frame::{Frame, FrameDiff};
use rewind_test_utils::skirmish;
use rewind_test_utils::strategies::arb_frame;

fn through_stream<T: StreamCodec>(value: &T) -> T {
    let mut out = TokenWriter::new(Vec::new());
    value.encode(&mut out).unwrap();
    let bytes = out.into_inner();
    T::decode(&mut TokenReader::new(bytes.as_slice())).unwrap()
}

fn encoded_len<T: StreamCodec>(value: &T) -> u64 {
    let mut out = TokenWriter::new(Vec::new());
    value.encode(&mut out).unwrap();
    out.bytes_written()
}

proptest! {
    #[test]
    fn undiff_inverts_diff(current in arb_frame(), previous in arb_frame()) {
        let delta = current.diff(&previous);
        let rebuilt = Frame::undiff(&delta, &previous).unwrap();
        prop_assert_eq!(&rebuilt, &current);
        // Order of players and units is part of the frame, not just
        // map membership.
        prop_assert!(rebuilt.units.keys().eq(current.units.keys()));
    }

    #[test]
    fn undiff_inverts_diff_after_encoding(current in arb_frame(), previous in arb_frame()) {
        let delta: FrameDiff = through_stream(&current.diff(&previous));
        prop_assert_eq!(Frame::undiff(&delta, &previous).unwrap(), current);
    }

    #[test]
    fn self_diff_has_no_changes(frame in arb_frame()) {
        prop_assert_eq!(frame.diff(&frame).changed_units(), 0);
    }
}

#[test]
fn skirmish_chain_reconstructs() {
    let frames = skirmish(40, 3);
    let mut current = frames[0].clone();
    for next in &frames[1..] {
        let delta: FrameDiff = through_stream(&next.diff(&current));
        current = Frame::undiff(&delta, &current).unwrap();
        assert_eq!(&current, next);
    }
}

#[test]
fn skirmish_diffs_are_smaller_than_frames() {
    let frames = skirmish(30, 11);
    let full: u64 = frames[1..].iter().map(encoded_len).sum();
    let diffed: u64 = frames
        .windows(2)
        .map(|w| encoded_len(&w[1].diff(&w[0])))
        .sum();
    assert!(diffed < full, "diffed={diffed} full={full}");
}
