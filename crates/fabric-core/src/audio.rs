//! Boundary with whatever produces the per-frame spectrum.

/// Supplies one byte magnitude per frequency bin, refreshed once per frame.
pub trait FrequencySource {
    fn bin_count(&self) -> usize;

    /// Fill `out` with the latest magnitudes (0..=255). Sources that have no
    /// data yet leave zeros.
    fn frequencies(&mut self, out: &mut Vec<u8>);
}

/// Source that never produces sound; stands in until real audio is ready.
#[derive(Clone, Debug)]
pub struct Silence {
    bins: usize,
}

impl Silence {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }
}

impl FrequencySource for Silence {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn frequencies(&mut self, out: &mut Vec<u8>) {
        out.clear();
        out.resize(self.bins, 0);
    }
}
