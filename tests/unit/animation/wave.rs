use super::*;

#[test]
fn sine_is_bounded_by_amplitude() {
    let w = Wave::sine(25.0, 4.0);
    for f in 0..2000 {
        assert!(w.sample(f as f64).abs() <= 4.0 + 1e-12);
    }
    assert_eq!(w.sample(0.0), 0.0);
}

#[test]
fn bounce_never_goes_negative() {
    let w = Wave::bounce(8.0, 8.0);
    for f in 0..500 {
        let v = w.sample(f as f64);
        assert!((0.0..=8.0 + 1e-12).contains(&v));
    }
}

#[test]
fn offset_and_phase_apply() {
    let w = Wave::sine(40.0, 0.1).with_offset(0.3);
    assert!((w.sample(0.0) - 0.3).abs() < 1e-12);
    let c = Wave::sine(1.0, 1.0).with_phase(std::f64::consts::FRAC_PI_2);
    assert!((c.sample(0.0) - 1.0).abs() < 1e-12);
}

#[test]
fn zero_divisor_rests() {
    let w = Wave::sine(0.0, 5.0).with_offset(2.0);
    assert_eq!(w.sample(123.0), 2.0);
}
