use super::*;

#[test]
fn fnv_split_writes_match_single_write() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"facelift");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"face");
    b.write_bytes(b"lift");
    assert_eq!(a.finish(), b.finish());
    assert_ne!(a.finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 200, 100, 50, 255]);
}

#[test]
fn mul_div255_identity_and_zero() {
    for x in [0u16, 1, 127, 255] {
        assert_eq!(mul_div255_u16(x, 255), x);
        assert_eq!(mul_div255_u16(x, 0), 0);
    }
}
