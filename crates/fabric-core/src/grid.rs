//! Animated grid lines drawn over the frequency map.
//!
//! Each line runs across the whole `[-1, 1]` span on one axis; its offset on
//! the other axis is a spring that the [`RetargetScheduler`] moves around on
//! its own clock.

use crate::constants::{
    FLOATS_PER_SEGMENT, GRID_GRANULARITY, RETARGET_FIRST_WAVE_MS, RETARGET_GRANULARITY_STEPS,
    RETARGET_PERIOD_MS,
};
use crate::spring::Spring;
use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Clone, Debug)]
pub struct GridLine {
    pub axis: Axis,
    pub offset: Spring,
}

#[derive(Clone, Debug)]
pub struct GridLines {
    lines: Vec<GridLine>,
    grid_lines: u32,
}

#[inline]
fn grid_position(slot: u32, grid_lines: u32) -> f32 {
    slot as f32 / grid_lines as f32 * 2.0 - 1.0
}

impl GridLines {
    /// `grid_lines` divisions produce `2 * (grid_lines - 1)` lines.
    pub fn new(grid_lines: u32, dampening: f32, stiffness: f32) -> Self {
        let mut lines = Vec::with_capacity(2 * grid_lines.saturating_sub(1) as usize);
        for j in 1..grid_lines {
            let start = grid_position(j, grid_lines);
            lines.push(GridLine {
                axis: Axis::X,
                offset: Spring::new(dampening, stiffness, start),
            });
            lines.push(GridLine {
                axis: Axis::Y,
                offset: Spring::new(dampening, stiffness, start),
            });
        }
        Self { lines, grid_lines }
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn grid_lines(&self) -> u32 {
        self.grid_lines
    }

    pub fn float_len(&self) -> usize {
        self.lines.len() * GRID_GRANULARITY * FLOATS_PER_SEGMENT
    }

    pub fn vertex_count(&self) -> u32 {
        (self.float_len() / 2) as u32
    }

    pub fn retune(&mut self, dampening: f32, stiffness: f32) {
        for line in &mut self.lines {
            line.offset.retune(dampening, stiffness);
        }
    }

    pub fn retarget(&mut self, index: usize, value: f32) {
        if let Some(line) = self.lines.get_mut(index) {
            line.offset.update_value(value);
        }
    }

    /// Fill `out` with line-list vertices, `(x, y)` per vertex.
    pub fn write_vertices(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.float_len());
        let g = GRID_GRANULARITY as f32;
        for line in &self.lines {
            let offset = line.offset.sample();
            for q in 0..GRID_GRANULARITY {
                let t = q as f32 / g * 2.0 - 1.0;
                let next_t = (q + 1) as f32 / g * 2.0 - 1.0;
                match line.axis {
                    Axis::X => out.extend_from_slice(&[offset, t, offset, next_t]),
                    Axis::Y => out.extend_from_slice(&[t, offset, next_t, offset]),
                }
            }
        }
    }

    pub fn advance(&mut self) {
        for line in &mut self.lines {
            line.offset.advance();
        }
    }
}

/// Offset chosen for every line in one retarget wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetargetStrategy {
    /// Grid-ordered slots scaled by one random granularity per wave.
    ScaledGrid,
    /// Uniform in `[-1, 1)` per line.
    Random,
    /// Plain grid-ordered slots.
    Grid,
}

impl RetargetStrategy {
    pub const CYCLE: [RetargetStrategy; 3] = [Self::ScaledGrid, Self::Random, Self::Grid];
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingRetarget {
    due_ms: f64,
    line: usize,
    value: f32,
}

/// Periodic, staggered retargeting of grid-line springs.
///
/// Pure state machine: the owner polls it with a millisecond clock from
/// whatever timer it likes, independent of the frame loop.
pub struct RetargetScheduler {
    rng: StdRng,
    next_wave_ms: f64,
    wave: usize,
    pending: Vec<PendingRetarget>,
}

impl RetargetScheduler {
    pub fn new(start_ms: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_wave_ms: start_ms + RETARGET_FIRST_WAVE_MS,
            wave: 0,
            pending: Vec::new(),
        }
    }

    pub fn next_wave_ms(&self) -> f64 {
        self.next_wave_ms
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn next_strategy(&self) -> RetargetStrategy {
        RetargetStrategy::CYCLE[self.wave % RetargetStrategy::CYCLE.len()]
    }

    /// Plan any wave that has come due, then apply every retarget whose
    /// stagger delay has elapsed. Returns how many springs were retargeted.
    pub fn poll(&mut self, now_ms: f64, grid: &mut GridLines, stagger_ms: f64) -> usize {
        while now_ms >= self.next_wave_ms {
            let at = self.next_wave_ms;
            self.plan_wave(at, grid, stagger_ms);
            self.next_wave_ms += RETARGET_PERIOD_MS;
        }
        let due = self.pending.partition_point(|p| p.due_ms <= now_ms);
        for p in self.pending.drain(..due) {
            grid.retarget(p.line, p.value);
        }
        due
    }

    fn plan_wave(&mut self, at_ms: f64, grid: &GridLines, stagger_ms: f64) {
        let strategy = self.next_strategy();
        self.wave += 1;
        let divisions = grid.grid_lines().max(1);
        let granularity =
            self.rng.gen_range(1..=RETARGET_GRANULARITY_STEPS) as f32 / 5.0;
        let (mut x_slot, mut y_slot) = (1u32, 1u32);
        for (i, line) in grid.lines().iter().enumerate() {
            let mut next_slot = || match line.axis {
                Axis::X => {
                    x_slot += 1;
                    x_slot - 1
                }
                Axis::Y => {
                    y_slot += 1;
                    y_slot - 1
                }
            };
            let value = match strategy {
                RetargetStrategy::ScaledGrid => grid_position(next_slot(), divisions) * granularity,
                RetargetStrategy::Random => self.rng.gen::<f32>() * 2.0 - 1.0,
                RetargetStrategy::Grid => grid_position(next_slot(), divisions),
            };
            self.pending.push(PendingRetarget {
                due_ms: at_ms + i as f64 * stagger_ms,
                line: i,
                value,
            });
        }
        // waves overlap when the stagger outlasts the period; stable sort
        // keeps the older wave first on ties
        self.pending.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        log::debug!("grid retarget wave {:?}: {} lines", strategy, grid.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_alternate_axes_with_shared_start() {
        let g = GridLines::new(4, 0.02, 0.9);
        assert_eq!(g.len(), 6);
        let axes: Vec<Axis> = g.lines().iter().map(|l| l.axis).collect();
        assert_eq!(axes, vec![Axis::X, Axis::Y, Axis::X, Axis::Y, Axis::X, Axis::Y]);
        assert_eq!(g.lines()[0].offset.value(), -0.5);
        assert_eq!(g.lines()[1].offset.value(), -0.5);
        assert_eq!(g.lines()[4].offset.value(), 0.5);
    }

    #[test]
    fn x_lines_hold_x_constant() {
        let g = GridLines::new(3, 0.02, 0.9);
        let mut out = Vec::new();
        g.write_vertices(&mut out);
        let per_line = GRID_GRANULARITY * FLOATS_PER_SEGMENT;
        let x_line = &out[..per_line];
        let offset = g.lines()[0].offset.sample();
        assert!(x_line.chunks(2).all(|v| v[0] == offset));
        assert_eq!(x_line[1], -1.0);
        assert!((x_line[per_line - 1] - 1.0).abs() < 1e-6);
        let y_line = &out[per_line..2 * per_line];
        assert!(y_line.chunks(2).all(|v| v[1] == offset));
    }

    #[test]
    fn single_division_has_no_lines() {
        let g = GridLines::new(1, 0.02, 0.9);
        assert!(g.is_empty());
        assert_eq!(g.vertex_count(), 0);
    }
}
