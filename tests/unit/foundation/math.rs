use super::*;

#[test]
fn floor_mod_is_sign_correct() {
    assert_eq!(floor_mod(-5, 4), 3);
    assert_eq!(floor_mod(-4, 4), 0);
    assert_eq!(floor_mod(-1, 4), 3);
    assert_eq!(floor_mod(7, 4), 3);
    assert_eq!(floor_mod(0, 1), 0);
    let big = i128::from(i64::MIN) * 3;
    assert_eq!(floor_mod(big, 7), floor_mod(big + 7_000, 7));
}

#[test]
fn floor_mod_agrees_with_shifted_positive_operand() {
    for a in -40i128..40 {
        assert_eq!(floor_mod(a, 4), floor_mod(a + 400, 4), "a={a}");
    }
}

#[test]
fn round_half_up_matches_reference_rounding() {
    assert_eq!(round_half_up(2.5), 3.0);
    assert_eq!(round_half_up(2.4999), 2.0);
    assert_eq!(round_half_up(1.0 / 0.3), 3.0);
    assert_eq!(round_half_up(1.0 / 0.4), 3.0);
    assert_eq!(round_half_up(-2.5), -2.0);
}

#[test]
fn base36_encoding() {
    assert_eq!(to_base36(0), "0");
    assert_eq!(to_base36(35), "z");
    assert_eq!(to_base36(36), "10");
    assert_eq!(to_base36(14_000_000), "8c2gw");
}
