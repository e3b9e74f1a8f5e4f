//! Discrete damped spring used to smooth every animated scalar in the scene.
//!
//! A spring chases its target value one step at a time:
//!
//! ```text
//! v' = (v + (target - x) * stiffness * s) * dampening
//! x' = x + v' * s
//! ```
//!
//! `dampening` is the fraction of velocity retained per step, so values in
//! `(0, 1)` settle and `1.0` never loses energy. Reading and advancing are
//! separate operations: [`Spring::sample`] looks one step ahead without
//! touching state, [`Spring::advance`] commits that step.

#[derive(Clone, Debug, PartialEq)]
pub struct Spring {
    value: f32,
    target: f32,
    velocity: f32,
    stiffness: f32,
    dampening: f32,
}

impl Spring {
    pub fn new(dampening: f32, stiffness: f32, initial: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            velocity: 0.0,
            stiffness,
            dampening,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    #[inline]
    pub fn dampening(&self) -> f32 {
        self.dampening
    }

    /// Set a new target. Velocity is kept so retargeting stays smooth.
    #[inline]
    pub fn update_value(&mut self, target: f32) {
        self.target = target;
    }

    pub fn retune(&mut self, dampening: f32, stiffness: f32) {
        self.dampening = dampening;
        self.stiffness = stiffness;
    }

    /// Value the next unit advance would produce. Does not mutate.
    #[inline]
    pub fn sample(&self) -> f32 {
        self.step(1.0).0
    }

    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.advance_by(1.0)
    }

    pub fn advance_by(&mut self, step: f32) -> f32 {
        let (value, velocity) = self.step(step);
        self.value = value;
        self.velocity = velocity;
        value
    }

    #[inline]
    fn step(&self, s: f32) -> (f32, f32) {
        let velocity =
            (self.velocity + (self.target - self.value) * self.stiffness * s) * self.dampening;
        (self.value + velocity * s, velocity)
    }
}
