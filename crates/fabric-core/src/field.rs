//! Per-frame frequency diffusion over the point graph.

use crate::constants::BYTE_MAX;
use crate::graph::Graph;

/// Knobs read every frame; none of them change topology.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    pub freq_pow: f32,
    pub neighbor_weight: f32,
}

/// Owns one graph generation plus the flat `(x, y, height)` vertex stream
/// rendered by the raster pass.
pub struct FrequencyField {
    graph: Graph,
    positions: Vec<f32>,
    dirty: bool,
}

impl FrequencyField {
    pub fn new(graph: Graph) -> Self {
        let mut field = Self {
            positions: vec![0.0; graph.triangulation.triangles.len() * 3],
            graph,
            dirty: true,
        };
        field.write_positions();
        field
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Vertex stream, three floats per triangle-vertex occurrence.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn vertex_count(&self) -> u32 {
        self.graph.triangulation.triangles.len() as u32
    }

    /// Returns whether the vertex stream changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn retune(&mut self, dampening: f32, stiffness: f32) {
        let point_dampening = dampening * stiffness;
        for p in &mut self.graph.points {
            p.spring.retune(point_dampening, stiffness);
        }
    }

    /// Height a point is pulled towards this frame.
    ///
    /// Bin-less points start from zero, so their height comes only from the
    /// neighbor average.
    pub fn target_for(&self, index: usize, frequencies: &[u8], params: &FieldParams) -> f32 {
        let point = &self.graph.points[index];
        let bin_value = point
            .frequency_bin
            .map(|bin| {
                let raw = frequencies.get(bin).copied().unwrap_or(0) as f32;
                (raw / BYTE_MAX).powf(params.freq_pow)
            })
            .unwrap_or(0.0);
        let neighbor_avg = if point.neighbors.is_empty() {
            0.0
        } else {
            let sum: f32 = point
                .neighbors
                .iter()
                .map(|&n| self.graph.points[n as usize].spring.sample())
                .sum();
            sum / point.neighbors.len() as f32
        };
        bin_value.max(neighbor_avg * params.neighbor_weight)
    }

    /// Advance every point spring once and rewrite the vertex stream.
    ///
    /// Points are visited in id order; a point sees neighbors earlier in the
    /// order already advanced for this frame.
    pub fn update(&mut self, frequencies: &[u8], params: &FieldParams) {
        for i in 0..self.graph.points.len() {
            let target = self.target_for(i, frequencies, params);
            let spring = &mut self.graph.points[i].spring;
            spring.update_value(target);
            spring.advance();
        }
        self.write_positions();
    }

    fn write_positions(&mut self) {
        let points = &self.graph.points;
        for (slot, &idx) in self
            .positions
            .chunks_exact_mut(3)
            .zip(&self.graph.triangulation.triangles)
        {
            let p = &points[idx as usize];
            slot[0] = p.position[0];
            slot[1] = p.position[1];
            slot[2] = p.spring.value();
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphParams;

    fn field(neighbors: usize) -> FrequencyField {
        let graph = Graph::build(&GraphParams {
            seed: 7,
            total_points: 120,
            bin_stride: 2,
            bin_count: 64,
            connected_neighbors: neighbors,
            dampening: 1.0,
            stiffness: 0.6,
        })
        .unwrap();
        FrequencyField::new(graph)
    }

    const PARAMS: FieldParams = FieldParams {
        freq_pow: 1.7,
        neighbor_weight: 0.99,
    };

    #[test]
    fn silence_keeps_fabric_flat() {
        let mut f = field(5);
        for _ in 0..20 {
            f.update(&[], &PARAMS);
        }
        assert!(f.positions().chunks(3).all(|v| v[2] == 0.0));
    }

    #[test]
    fn dirty_flag_is_consumed() {
        let mut f = field(3);
        assert!(f.take_dirty());
        assert!(!f.take_dirty());
        f.update(&[0; 64], &PARAMS);
        assert!(f.take_dirty());
    }

    #[test]
    fn retune_reaches_every_spring() {
        let mut f = field(3);
        f.retune(0.5, 0.4);
        for p in &f.graph().points {
            assert!((p.spring.dampening() - 0.2).abs() < 1e-6);
            assert!((p.spring.stiffness() - 0.4).abs() < 1e-6);
        }
    }
}
