use super::*;

#[test]
fn mul_div255_identities() {
    for x in [0u16, 1, 127, 200, 255] {
        assert_eq!(mul_div255_u16(x, 255), x);
        assert_eq!(mul_div255_u16(x, 0), 0);
    }
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}
