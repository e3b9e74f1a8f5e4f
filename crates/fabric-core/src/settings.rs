//! Named tweakable parameters with change notification.
//!
//! Keys use the same camelCase names the tweak panel exposes. A change is
//! either live (read on the next frame) or forces a topology rebuild.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub seed: u64,
    pub points: usize,
    // fabric
    pub dampening: f32,
    pub stiffness: f32,
    pub freq_pow: f32,
    pub connected_neighbors: usize,
    pub neighbor_weight: f32,
    pub connected_bins_stride: usize,
    pub blur_angle: f32,
    pub blur_mag: f32,
    // bloom
    pub blur_radius: f32,
    pub blur_weight: f32,
    pub original_weight: f32,
    // grid
    pub grid_lines: u32,
    pub lines_dampening: f32,
    pub lines_stiffness: f32,
    pub lines_animation_offset: f64, // ms between staggered line retargets
    pub grid_max_height: f32,
    pub grid_color_offset: [f32; 4],
    pub grid_basic_opacity: f32,
    pub segments: i32,
    // accumulation
    pub motion_blur: bool,
    pub motion_blur_amount: f32,
    // style: 0..255 rgb, 0..1 alpha
    pub background: [f32; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            points: 2500,
            dampening: 1.0,
            stiffness: 0.6,
            freq_pow: 1.7,
            connected_neighbors: 5,
            neighbor_weight: 0.99,
            connected_bins_stride: 1,
            blur_angle: 0.25,
            blur_mag: 7.0,
            blur_radius: 18.0,
            blur_weight: 1.85,
            original_weight: 2.0,
            grid_lines: 180,
            lines_dampening: 0.02,
            lines_stiffness: 0.9,
            lines_animation_offset: 57.0,
            grid_max_height: 0.8,
            grid_color_offset: [45.0, 136.0, 233.0, 1.0],
            grid_basic_opacity: 0.02,
            segments: 12,
            motion_blur: true,
            motion_blur_amount: 0.45,
            background: [46.0, 46.0, 46.0, 1.0],
        }
    }
}

impl Settings {
    /// Background as a normalized RGBA color.
    pub fn background_rgba(&self) -> [f32; 4] {
        let [r, g, b, a] = self.background;
        [r / 255.0, g / 255.0, b / 255.0, a]
    }

    /// Directional blur offset for the frequency map pass.
    pub fn blur_direction(&self) -> [f32; 2] {
        let rads = self.blur_angle * std::f32::consts::PI;
        [rads.cos() * self.blur_mag, rads.sin() * self.blur_mag]
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        use SettingKey::*;
        use SettingValue::{Color, Flag, Number};
        match key {
            Seed => Number(self.seed as f64),
            Points => Number(self.points as f64),
            Dampening => Number(self.dampening as f64),
            Stiffness => Number(self.stiffness as f64),
            FreqPow => Number(self.freq_pow as f64),
            ConnectedNeighbors => Number(self.connected_neighbors as f64),
            NeighborWeight => Number(self.neighbor_weight as f64),
            ConnectedBinsStride => Number(self.connected_bins_stride as f64),
            BlurAngle => Number(self.blur_angle as f64),
            BlurMag => Number(self.blur_mag as f64),
            BlurRadius => Number(self.blur_radius as f64),
            BlurWeight => Number(self.blur_weight as f64),
            OriginalWeight => Number(self.original_weight as f64),
            GridLines => Number(self.grid_lines as f64),
            LinesDampening => Number(self.lines_dampening as f64),
            LinesStiffness => Number(self.lines_stiffness as f64),
            LinesAnimationOffset => Number(self.lines_animation_offset),
            GridMaxHeight => Number(self.grid_max_height as f64),
            GridColorOffset => Color(self.grid_color_offset),
            GridBasicOpacity => Number(self.grid_basic_opacity as f64),
            Segments => Number(self.segments as f64),
            MotionBlur => Flag(self.motion_blur),
            MotionBlurAmount => Number(self.motion_blur_amount as f64),
            Background => Color(self.background),
        }
    }

    /// Validate and store one value. Leaves `self` untouched on error.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<Change, SettingsError> {
        use SettingKey::*;
        match key {
            GridColorOffset => self.grid_color_offset = value.color(key)?,
            Background => self.background = value.color(key)?,
            MotionBlur => self.motion_blur = value.flag(key)?,
            _ => {
                let n = value.number(key)?;
                let (lo, hi) = key.range();
                if !(lo..=hi).contains(&n) {
                    return Err(SettingsError::OutOfRange { key, value: n });
                }
                match key {
                    Seed => self.seed = n as u64,
                    Points => self.points = n as usize,
                    Dampening => self.dampening = n as f32,
                    Stiffness => self.stiffness = n as f32,
                    FreqPow => self.freq_pow = n as f32,
                    ConnectedNeighbors => self.connected_neighbors = n as usize,
                    NeighborWeight => self.neighbor_weight = n as f32,
                    ConnectedBinsStride => self.connected_bins_stride = n as usize,
                    BlurAngle => self.blur_angle = n as f32,
                    BlurMag => self.blur_mag = n as f32,
                    BlurRadius => self.blur_radius = n as f32,
                    BlurWeight => self.blur_weight = n as f32,
                    OriginalWeight => self.original_weight = n as f32,
                    GridLines => self.grid_lines = n as u32,
                    LinesDampening => self.lines_dampening = n as f32,
                    LinesStiffness => self.lines_stiffness = n as f32,
                    LinesAnimationOffset => self.lines_animation_offset = n,
                    GridMaxHeight => self.grid_max_height = n as f32,
                    GridBasicOpacity => self.grid_basic_opacity = n as f32,
                    Segments => self.segments = n as i32,
                    MotionBlurAmount => self.motion_blur_amount = n as f32,
                    GridColorOffset | Background | MotionBlur => unreachable!(),
                }
            }
        }
        Ok(key.change())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Seed,
    Points,
    Dampening,
    Stiffness,
    FreqPow,
    ConnectedNeighbors,
    NeighborWeight,
    ConnectedBinsStride,
    BlurAngle,
    BlurMag,
    BlurRadius,
    BlurWeight,
    OriginalWeight,
    GridLines,
    LinesDampening,
    LinesStiffness,
    LinesAnimationOffset,
    GridMaxHeight,
    GridColorOffset,
    GridBasicOpacity,
    Segments,
    MotionBlur,
    MotionBlurAmount,
    Background,
}

impl SettingKey {
    pub const ALL: [SettingKey; 24] = [
        Self::Seed,
        Self::Points,
        Self::Dampening,
        Self::Stiffness,
        Self::FreqPow,
        Self::ConnectedNeighbors,
        Self::NeighborWeight,
        Self::ConnectedBinsStride,
        Self::BlurAngle,
        Self::BlurMag,
        Self::BlurRadius,
        Self::BlurWeight,
        Self::OriginalWeight,
        Self::GridLines,
        Self::LinesDampening,
        Self::LinesStiffness,
        Self::LinesAnimationOffset,
        Self::GridMaxHeight,
        Self::GridColorOffset,
        Self::GridBasicOpacity,
        Self::Segments,
        Self::MotionBlur,
        Self::MotionBlurAmount,
        Self::Background,
    ];

    pub fn name(self) -> &'static str {
        use SettingKey::*;
        match self {
            Seed => "seed",
            Points => "points",
            Dampening => "dampening",
            Stiffness => "stiffness",
            FreqPow => "freqPow",
            ConnectedNeighbors => "connectedNeighbors",
            NeighborWeight => "neighborWeight",
            ConnectedBinsStride => "connectedBinsStride",
            BlurAngle => "blurAngle",
            BlurMag => "blurMag",
            BlurRadius => "blurRadius",
            BlurWeight => "blurWeight",
            OriginalWeight => "originalWeight",
            GridLines => "gridLines",
            LinesDampening => "linesDampening",
            LinesStiffness => "linesStiffness",
            LinesAnimationOffset => "linesAnimationOffset",
            GridMaxHeight => "gridMaxHeight",
            GridColorOffset => "gridColorOffset",
            GridBasicOpacity => "gridBasicOpacity",
            Segments => "segments",
            MotionBlur => "motionBlur",
            MotionBlurAmount => "motionBlurAmount",
            Background => "background",
        }
    }

    /// Accepted numeric range, inclusive. Non-numeric keys report the full line.
    pub fn range(self) -> (f64, f64) {
        use SettingKey::*;
        match self {
            Seed => (0.0, u32::MAX as f64),
            Points => (3.0, 20_000.0),
            Dampening | Stiffness => (0.01, 1.0),
            FreqPow => (0.01, 10.0),
            ConnectedNeighbors => (0.0, 7.0),
            NeighborWeight => (0.8, 1.0),
            ConnectedBinsStride => (1.0, 10.0),
            BlurAngle => (0.01, 10.0),
            BlurMag => (0.01, 100.0),
            BlurRadius => (0.0, 20.0),
            BlurWeight | OriginalWeight => (0.0, 2.0),
            GridLines => (10.0, 300.0),
            LinesDampening | LinesStiffness => (0.0, 1.0),
            LinesAnimationOffset => (0.0, 100.0),
            GridMaxHeight => (0.01, 0.8),
            GridBasicOpacity => (-1.0, 1.0),
            Segments => (1.0, 100.0),
            MotionBlurAmount => (0.01, 1.0),
            GridColorOffset | Background | MotionBlur => (f64::MIN, f64::MAX),
        }
    }

    /// Keys whose change invalidates the point graph or the grid lines.
    pub fn change(self) -> Change {
        use SettingKey::*;
        match self {
            Seed | Points | ConnectedNeighbors | ConnectedBinsStride | GridLines => Change::Rebuild,
            _ => Change::Live,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingValue {
    Number(f64),
    Flag(bool),
    Color([f32; 4]),
}

impl SettingValue {
    fn number(self, key: SettingKey) -> Result<f64, SettingsError> {
        match self {
            Self::Number(n) if n.is_finite() => Ok(n),
            _ => Err(SettingsError::WrongKind { key, expected: "number" }),
        }
    }

    fn flag(self, key: SettingKey) -> Result<bool, SettingsError> {
        match self {
            Self::Flag(b) => Ok(b),
            _ => Err(SettingsError::WrongKind { key, expected: "boolean" }),
        }
    }

    fn color(self, key: SettingKey) -> Result<[f32; 4], SettingsError> {
        match self {
            Self::Color(c) if c.iter().all(|v| v.is_finite()) => Ok(c),
            _ => Err(SettingsError::WrongKind { key, expected: "rgba array" }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    Live,
    Rebuild,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("setting `{key}` expects a {expected}")]
    WrongKind { key: SettingKey, expected: &'static str },
    #[error("setting `{key}` out of range: {value}")]
    OutOfRange { key: SettingKey, value: f64 },
}

type Listener = Box<dyn FnMut(SettingKey, Change, &Settings)>;

/// Settings plus subscribers notified after every accepted change.
pub struct SettingsStore {
    settings: Settings,
    listeners: Vec<Listener>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            listeners: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn subscribe(&mut self, listener: impl FnMut(SettingKey, Change, &Settings) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<Change, SettingsError> {
        let change = self.settings.apply(key, value)?;
        for listener in &mut self.listeners {
            listener(key, change, &self.settings);
        }
        Ok(change)
    }

    pub fn set_named(&mut self, name: &str, value: SettingValue) -> Result<Change, SettingsError> {
        self.set(name.parse()?, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for key in SettingKey::ALL {
            assert_eq!(key.name().parse::<SettingKey>(), Ok(key));
        }
    }

    #[test]
    fn defaults_are_within_their_ranges() {
        let s = Settings::default();
        for key in SettingKey::ALL {
            if let SettingValue::Number(n) = s.get(key) {
                let (lo, hi) = key.range();
                assert!((lo..=hi).contains(&n), "{key} default {n} outside {lo}..={hi}");
            }
        }
    }

    #[test]
    fn background_normalizes_rgb_only() {
        let s = Settings::default();
        let [r, g, b, a] = s.background_rgba();
        assert!((r - 46.0 / 255.0).abs() < 1e-6);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn blur_direction_follows_angle_in_half_turns() {
        let mut s = Settings::default();
        s.blur_angle = 0.5;
        s.blur_mag = 2.0;
        let [x, y] = s.blur_direction();
        assert!(x.abs() < 1e-5);
        assert!((y - 2.0).abs() < 1e-5);
    }
}
