//! Seeded point cloud and neighbor graph for the frequency fabric.
//!
//! Frequency-tracking points are scattered over a disc, one per sampled bin,
//! with a radius bias controlled by the bin index. The remainder of the
//! requested point count is filled uniformly over `[-1, 1]^2`. A Delaunay
//! triangulation over all of them supplies both the render index order and
//! the adjacency that each point's neighbor list is sampled from.

use crate::constants::FREQUENCY_RING_RADIUS;
use crate::delaunay;
use crate::error::BuildError;
use crate::spring::Spring;
use rand::prelude::*;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::f32::consts::TAU;

pub type NeighborList = SmallVec<[u32; 8]>;

#[derive(Clone, Debug)]
pub struct Point {
    pub id: u32,
    pub position: [f32; 2],
    pub neighbors: NeighborList,
    pub spring: Spring,
    pub frequency_bin: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Triangulation {
    /// Flat index triples into the point list.
    pub triangles: Vec<u32>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Undirected, deduplicated adjacency derived from every triangle edge.
    pub fn adjacency(&self, point_count: usize) -> Vec<BTreeSet<u32>> {
        let mut adj = vec![BTreeSet::new(); point_count];
        for t in self.triangles.chunks_exact(3) {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                adj[a as usize].insert(b);
                adj[b as usize].insert(a);
            }
        }
        adj
    }
}

/// Inputs that fully determine a graph generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphParams {
    pub seed: u64,
    pub total_points: usize,
    pub bin_stride: usize,
    pub bin_count: usize,
    pub connected_neighbors: usize,
    pub dampening: f32,
    pub stiffness: f32,
}

#[derive(Clone, Debug)]
pub struct Graph {
    pub points: Vec<Point>,
    pub triangulation: Triangulation,
}

impl Graph {
    pub fn build(params: &GraphParams) -> Result<Self, BuildError> {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let capacity = params.total_points.max(params.bin_count);
        let mut positions: Vec<[f32; 2]> = Vec::with_capacity(capacity);
        let mut bins: Vec<Option<usize>> = Vec::with_capacity(positions.capacity());

        let bin_count = params.bin_count;
        let stride = params.bin_stride.max(1);
        for q in (0..bin_count).step_by(stride) {
            let exponent = 1.0 - q as f32 / bin_count as f32;
            let mag = rng.gen::<f32>().powf(exponent) * FREQUENCY_RING_RADIUS;
            let rads = rng.gen::<f32>() * TAU;
            positions.push([rads.cos() * mag, rads.sin() * mag]);
            bins.push(Some(q));
        }

        let fill = params.total_points.saturating_sub(positions.len());
        for _ in 0..fill {
            positions.push([rng.gen::<f32>() * 2.0 - 1.0, rng.gen::<f32>() * 2.0 - 1.0]);
            bins.push(None);
        }

        let triangulation = Triangulation {
            triangles: delaunay::triangulate(&positions)?,
        };

        // insertion-ordered adjacency so the shuffle below is reproducible
        let mut adjacency: Vec<NeighborList> = vec![NeighborList::new(); positions.len()];
        for t in triangulation.triangles.chunks_exact(3) {
            let pairs = [
                (t[0], t[1]),
                (t[0], t[2]),
                (t[1], t[0]),
                (t[1], t[2]),
                (t[2], t[0]),
                (t[2], t[1]),
            ];
            for (a, b) in pairs {
                let list = &mut adjacency[a as usize];
                if !list.contains(&b) {
                    list.push(b);
                }
            }
        }

        let point_dampening = params.dampening * params.stiffness;
        let points = positions
            .into_iter()
            .zip(bins)
            .zip(adjacency)
            .enumerate()
            .map(|(id, ((position, frequency_bin), mut neighbors))| {
                neighbors.shuffle(&mut rng);
                neighbors.truncate(params.connected_neighbors);
                Point {
                    id: id as u32,
                    position,
                    neighbors,
                    spring: Spring::new(point_dampening, params.stiffness, 0.0),
                    frequency_bin,
                }
            })
            .collect();

        Ok(Self {
            points,
            triangulation,
        })
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn tracked_point_count(&self) -> usize {
        self.points.iter().filter(|p| p.frequency_bin.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> GraphParams {
        GraphParams {
            seed,
            total_points: 400,
            bin_stride: 4,
            bin_count: 256,
            connected_neighbors: 5,
            dampening: 1.0,
            stiffness: 0.6,
        }
    }

    #[test]
    fn tracked_points_come_first_with_their_bins() {
        let g = Graph::build(&params(1)).unwrap();
        assert_eq!(g.point_count(), 400);
        assert_eq!(g.tracked_point_count(), 64);
        for (i, p) in g.points.iter().take(64).enumerate() {
            assert_eq!(p.frequency_bin, Some(i * 4));
        }
        assert!(g.points[64..].iter().all(|p| p.frequency_bin.is_none()));
    }

    #[test]
    fn tracked_points_stay_inside_ring() {
        let g = Graph::build(&params(2)).unwrap();
        for p in g.points.iter().filter(|p| p.frequency_bin.is_some()) {
            let r = (p.position[0].powi(2) + p.position[1].powi(2)).sqrt();
            assert!(r <= FREQUENCY_RING_RADIUS + 1e-5);
        }
    }

    #[test]
    fn bins_beyond_point_budget_are_all_placed() {
        let mut p = params(3);
        p.total_points = 10;
        let g = Graph::build(&p).unwrap();
        assert_eq!(g.point_count(), 64);
        assert_eq!(g.tracked_point_count(), 64);
    }

    #[test]
    fn zero_neighbors_leaves_lists_empty() {
        let mut p = params(4);
        p.connected_neighbors = 0;
        let g = Graph::build(&p).unwrap();
        assert!(g.points.iter().all(|p| p.neighbors.is_empty()));
    }

    #[test]
    fn point_springs_use_scaled_dampening() {
        let g = Graph::build(&params(5)).unwrap();
        let s = &g.points[0].spring;
        assert!((s.dampening() - 0.6).abs() < 1e-6);
        assert!((s.stiffness() - 0.6).abs() < 1e-6);
        assert_eq!(s.value(), 0.0);
    }
}
