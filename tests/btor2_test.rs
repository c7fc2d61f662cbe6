// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use btoraig::btor2::{self, BitLayout, BitRange, BitSpace, ModelError};

const COUNT_2: &str = r#"
1 sort bitvec 3
2 zero 1
3 state 1
4 init 1 3 2
5 one 1
6 add 1 3 5
7 next 1 3 6
8 ones 1
9 sort bitvec 1
10 eq 9 3 8
11 bad 10
"#;

/// A mix of everything: inputs of different widths, latches with and without init
/// and states without a next function, declared in an interleaved order.
const MIXED: &str = r#"
1 sort bitvec 1
2 sort bitvec 8
3 sort bitvec 4
4 input 2 data ; first input
5 state 3 counter
6 state 1 flag
7 input 1 reset
8 state 2 shadow
9 state 3 frozen
10 zero 3
11 init 3 5 10
12 one 3
13 add 3 5 12
14 next 3 5 13
15 next 1 6 7
16 init 2 8 4
17 output 9 frozen_out
"#;

fn layout(src: &str) -> BitLayout {
    BitLayout::build(&btor2::parse_str(src).unwrap()).unwrap()
}

#[test]
fn layout_count2() {
    let l = layout(COUNT_2);
    assert_eq!(l.inputs().count(), 0);
    let s = l.state(3).unwrap();
    assert_eq!(s.index, 0);
    assert_eq!(s.space, BitSpace::State);
    assert_eq!(s.range, BitRange { start: 0, end: 3 });
    assert!(s.has_init && s.has_next);
    assert!(!l.needs_dedicated_init(3));
    assert_eq!(l.width(BitSpace::State), 3);
    assert_eq!(l.width(BitSpace::Input), 0);
}

#[test]
fn layout_single_latch() {
    let l = layout("1 sort bitvec 1\n2 input 1\n3 state 1\n4 init 1 3 2\n5 next 1 3 2\n");
    let i = l.input(2).unwrap();
    assert_eq!(i.index, 0);
    assert_eq!(i.range, BitRange { start: 0, end: 1 });
    let s = l.state(3).unwrap();
    assert_eq!(s.index, 0);
    assert_eq!(s.space, BitSpace::State);
    assert_eq!(s.range, BitRange { start: 0, end: 1 });
    assert_eq!(l.dedicated_init_states().count(), 0);
}

#[test]
fn layout_mixed() {
    let l = layout(MIXED);
    // inputs: data [0,8) reset [8,9), then the states without next: shadow [9,17) frozen [17,21)
    assert_eq!(l.input(4).unwrap().range, BitRange { start: 0, end: 8 });
    assert_eq!(l.input(7).unwrap().range, BitRange { start: 8, end: 9 });
    assert_eq!(l.input(7).unwrap().index, 1);
    assert_eq!(l.state(8).unwrap().range, BitRange { start: 9, end: 17 });
    assert_eq!(l.state(9).unwrap().range, BitRange { start: 17, end: 21 });
    // latches: counter [0,4) flag [4,5)
    assert_eq!(l.state(5).unwrap().range, BitRange { start: 0, end: 4 });
    assert_eq!(l.state(6).unwrap().range, BitRange { start: 4, end: 5 });
    let indices: Vec<_> = l.states().map(|(id, s)| (id, s.index)).collect();
    assert_eq!(indices, [(5, 0), (6, 1), (8, 2), (9, 3)]);
    // only flag is a latch without init
    assert_eq!(l.dedicated_init_states().collect::<Vec<_>>(), [6]);
    assert!(l.state(8).unwrap().has_init);
    assert!(!l.state(8).unwrap().has_next);
    assert!(l.state(9).unwrap().is_pseudo_input());
}

#[test]
fn bit_spaces_are_dense_and_disjoint() {
    let l = layout(MIXED);
    for space in [BitSpace::State, BitSpace::Input] {
        let ranges = l.ranges(space);
        let total: usize = ranges.iter().map(|r| r.width()).sum();
        assert_eq!(total, l.width(space), "{space:?}");
        // contiguous in assignment order
        let mut offset = 0;
        for r in ranges.iter() {
            assert_eq!(r.start, offset);
            offset = r.end;
        }
        for (ii, a) in ranges.iter().enumerate() {
            for b in ranges.iter().skip(ii + 1) {
                assert!(!a.overlaps(b), "{a:?} {b:?}");
            }
        }
    }
    assert_eq!(l.width(BitSpace::State), 5);
    assert_eq!(l.width(BitSpace::Input), 21);
}

#[test]
fn range_width_matches_sort() {
    let l = layout(MIXED);
    let widths: Vec<_> = l.states().map(|(_, s)| s.range.width()).collect();
    assert_eq!(widths, [4, 1, 8, 4]);
}

#[test]
fn malformed_model_is_rejected() {
    let decls = btor2::parse_str("1 sort bitvec 1\n2 state 1\n3 next 1 4 2\n").unwrap();
    let err = BitLayout::build(&decls).unwrap_err();
    assert!(matches!(err, ModelError::UnknownState { id: 3, target: 4 }));
    assert_eq!(err.to_string(), "[3] `4` does not point to a valid state");

    assert!(matches!(
        btor2::parse_str("1 sort bitvec 1\n2 inptu 1\n"),
        Err(ModelError::Syntax(_))
    ));
}
