//! Digit extraction and image layout.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use hitcounter_core::{digits, render};

#[test]
fn zero_padded_digits() {
    assert_eq!(digits(42, 10), vec![0, 0, 0, 0, 0, 0, 0, 0, 4, 2]);
    assert_eq!(digits(0, 3), vec![0, 0, 0]);
    assert_eq!(digits(u64::MAX, 20), u64::MAX.to_string().bytes().map(|b| b - b'0').collect::<Vec<_>>());
}

#[test]
fn long_counts_keep_least_significant_digits() {
    assert_eq!(digits(12345, 3), vec![3, 4, 5]);
    assert_eq!(digits(1000, 3), vec![0, 0, 0]);
}

#[test]
fn pad_len_beyond_u64_width() {
    let d = digits(7, 30);
    assert_eq!(d.len(), 30);
    assert!(d[..29].iter().all(|&x| x == 0));
    assert_eq!(d[29], 7);
}

#[test]
fn output_dimensions() {
    let sprites = common::sprites();
    for (count, pad) in [(0, 1), (42, 10), (12345, 3), (u64::MAX, 25)] {
        let img = render(count, &sprites, pad);
        assert_eq!(img.width(), common::W * pad as u32);
        assert_eq!(img.height(), common::H);
    }
}

#[test]
fn glyph_sequence_for_42() {
    let img = render(42, &common::sprites(), 10);
    assert_eq!(common::decode_digits(&img), vec![0, 0, 0, 0, 0, 0, 0, 0, 4, 2]);
}

#[test]
fn glyph_sequence_truncates() {
    let img = render(12345, &common::sprites(), 3);
    assert_eq!(common::decode_digits(&img), vec![3, 4, 5]);
}

#[test]
fn glyph_pixels_are_copied_exactly() {
    let sprites = common::sprites();
    let img = render(9, &sprites, 2);
    for y in 0..common::H {
        for x in 0..common::W {
            assert_eq!(img.get_pixel(common::W + x, y), sprites.glyph(9).get_pixel(x, y));
        }
    }
}

#[test]
fn render_is_deterministic() {
    let sprites = common::sprites();
    let a = render(31337, &sprites, 8);
    let b = render(31337, &sprites, 8);
    assert_eq!(a.as_raw(), b.as_raw());
}
