// Host-side checks of spring convergence and instability.

use fabric_core::Spring;

#[test]
fn damped_spring_settles_on_target() {
    let mut s = Spring::new(0.6, 0.6, 0.0);
    s.update_value(1.0);
    for _ in 0..200 {
        s.advance();
    }
    assert!((s.value() - 1.0).abs() < 1e-4, "value {}", s.value());
}

#[test]
fn point_spring_overshoot_shrinks_each_swing() {
    let mut s = Spring::new(0.6, 0.6, 0.0);
    s.update_value(1.0);
    let errors: Vec<f32> = (0..40).map(|_| (s.advance() - 1.0).abs()).collect();
    let peaks: Vec<f32> = errors
        .windows(3)
        .filter(|w| w[1] > w[0] && w[1] >= w[2])
        .map(|w| w[1])
        .collect();
    assert!(peaks.len() >= 3, "peaks {peaks:?}");
    assert!(peaks[0] < 0.5, "first overshoot {}", peaks[0]);
    for pair in peaks.windows(2) {
        assert!(pair[1] < pair[0], "peaks {peaks:?}");
    }
}

#[test]
fn overdamped_springs_approach_without_crossing() {
    // grid-line tuning and a soft general-purpose tuning
    for (dampening, stiffness) in [(0.02, 0.9), (0.5, 0.1)] {
        let mut s = Spring::new(dampening, stiffness, 0.0);
        s.update_value(1.0);
        let mut last = s.value();
        for _ in 0..2000 {
            let x = s.advance();
            assert!(x >= last, "{dampening}/{stiffness} moved back: {last} -> {x}");
            assert!(x <= 1.0, "{dampening}/{stiffness} crossed: {x}");
            last = x;
        }
        assert!((last - 1.0).abs() < 1e-3, "{dampening}/{stiffness} stalled at {last}");
    }
}

#[test]
fn undamped_stiff_spring_diverges() {
    let mut s = Spring::new(1.0, 5.0, 0.0);
    s.update_value(1.0);
    for _ in 0..50 {
        s.advance();
    }
    assert!(!(s.value().abs() < 1e6));
}

#[test]
fn sample_predicts_next_advance() {
    let mut s = Spring::new(0.9, 0.3, 0.25);
    s.update_value(-0.5);
    for _ in 0..20 {
        let predicted = s.sample();
        assert_eq!(s.sample(), predicted);
        assert_eq!(s.advance(), predicted);
    }
}

#[test]
fn retargeting_mid_flight_keeps_momentum() {
    let mut s = Spring::new(0.9, 0.3, 0.0);
    s.update_value(1.0);
    s.advance();
    s.advance();
    let v = s.velocity();
    s.update_value(0.0);
    assert_eq!(s.velocity(), v);
    // still moving up on the first step after the target flipped below
    let before = s.value();
    let v_next = (v + (0.0 - before) * 0.3) * 0.9;
    assert!((s.advance() - (before + v_next)).abs() < 1e-6);
}
