use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(255, 128), 128);
    assert_eq!(mul_div255(0, 200), 0);
}

#[test]
fn unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![12u8, 200, 99, 255, 40, 50, 60, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![12u8, 200, 99, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremultiply_half_alpha() {
    let mut px = vec![64u8, 0, 128, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128u8, 0, 255, 128]);
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    // Premultiplied red @ 50% alpha => rgb is 128,0,0 when premul.
    let src = vec![128u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_straight_over_white() {
    let src = vec![0u8, 0u8, 0u8, 0u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [255, 255, 255, 255]).unwrap();
    assert_eq!(dst, vec![255u8, 255u8, 255u8, 255u8]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let src = vec![0u8; 8];
    let mut dst = vec![0u8; 4];
    assert!(flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).is_err());
}
