// Host-side checks of grid line layout and the retarget schedule.

use fabric_core::constants::{FLOATS_PER_SEGMENT, GRID_GRANULARITY};
use fabric_core::{GridLines, RetargetScheduler, RetargetStrategy};

fn grid() -> GridLines {
    GridLines::new(4, 0.02, 0.9)
}

#[test]
fn vertex_buffer_covers_every_segment() {
    let g = GridLines::new(180, 0.02, 0.9);
    assert_eq!(g.len(), 358);
    let mut out = Vec::new();
    g.write_vertices(&mut out);
    assert_eq!(out.len(), 358 * GRID_GRANULARITY * FLOATS_PER_SEGMENT);
    assert_eq!(out.len(), g.float_len());
    assert_eq!(g.vertex_count() as usize * 2, out.len());
}

#[test]
fn nothing_moves_before_first_wave() {
    let mut g = grid();
    let mut sched = RetargetScheduler::new(1_000.0, 3);
    assert_eq!(sched.next_wave_ms(), 25_500.0);
    assert_eq!(sched.poll(25_499.0, &mut g, 57.0), 0);
    assert_eq!(sched.pending(), 0);
    assert_eq!(sched.next_strategy(), RetargetStrategy::ScaledGrid);
}

#[test]
fn retargets_are_staggered_per_line() {
    let mut g = grid();
    let mut sched = RetargetScheduler::new(0.0, 3);
    assert_eq!(sched.poll(24_500.0, &mut g, 100.0), 1);
    assert_eq!(sched.pending(), 5);
    assert_eq!(sched.poll(24_750.0, &mut g, 100.0), 2);
    assert_eq!(sched.poll(24_750.0, &mut g, 100.0), 0);
    assert_eq!(sched.poll(25_000.0, &mut g, 100.0), 3);
    assert_eq!(sched.pending(), 0);
    assert_eq!(sched.next_wave_ms(), 34_000.0);
}

#[test]
fn strategies_cycle_every_period() {
    let mut g = grid();
    let mut sched = RetargetScheduler::new(0.0, 5);
    let mut seen = Vec::new();
    for now in [24_500.0, 34_000.0, 43_500.0, 53_000.0] {
        seen.push(sched.next_strategy());
        assert_eq!(sched.poll(now, &mut g, 0.0), 6);
    }
    assert_eq!(
        seen,
        vec![
            RetargetStrategy::ScaledGrid,
            RetargetStrategy::Random,
            RetargetStrategy::Grid,
            RetargetStrategy::ScaledGrid
        ]
    );
}

#[test]
fn grid_wave_restores_home_positions() {
    let mut g = grid();
    let mut sched = RetargetScheduler::new(0.0, 9);
    // ScaledGrid, Random, Grid all come due in one late poll
    assert_eq!(sched.poll(43_500.0, &mut g, 0.0), 18);
    let home = [-0.5, -0.5, 0.0, 0.0, 0.5, 0.5];
    for (line, want) in g.lines().iter().zip(home) {
        assert!((line.offset.target() - want).abs() < 1e-6);
    }
}

#[test]
fn targets_stay_inside_grid_span() {
    let mut g = GridLines::new(20, 0.02, 0.9);
    let mut sched = RetargetScheduler::new(0.0, 21);
    let mut now = 24_500.0;
    for _ in 0..6 {
        sched.poll(now, &mut g, 0.0);
        assert!(g.lines().iter().all(|l| (-1.0..=1.0).contains(&l.offset.target())));
        now += 9_500.0;
    }
}

#[test]
fn overlapping_waves_keep_every_retarget() {
    // 6 lines at 3000ms apart outlast the 9500ms period
    let mut g = grid();
    let mut sched = RetargetScheduler::new(0.0, 1);
    let mut applied = sched.poll(34_000.0, &mut g, 3_000.0);
    assert_eq!(applied, 5);
    assert_eq!(sched.pending(), 7);
    applied += sched.poll(100_000.0, &mut g, 3_000.0);
    let waves = ((sched.next_wave_ms() - 24_500.0) / 9_500.0) as usize;
    assert_eq!(applied + sched.pending(), waves * 6);
}
