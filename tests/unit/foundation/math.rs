use super::*;

#[test]
fn round2_rounds_to_hundredths() {
    assert_eq!(round2(3.14159), 3.14);
    assert_eq!(round2(2.005_1), 2.01);
    assert_eq!(round2(10.0), 10.0);
}

#[test]
fn fmt_secs_never_emits_negative_zero() {
    assert_eq!(fmt_secs(-0.001), "0.00");
    assert_eq!(fmt_secs(0.0), "0.00");
    assert_eq!(fmt_secs(5.25), "5.25");
    assert_eq!(fmt_secs(1.3), "1.30");
}

#[test]
fn approx_eq_uses_absolute_tolerance() {
    assert!(approx_eq(0.1 + 0.2, 0.3, 1e-9));
    assert!(!approx_eq(1.0, 1.01, 1e-3));
}
