// Host-side checks of point placement, triangulation and neighbor sampling.

use fabric_core::constants::FREQUENCY_BIN_COUNT;
use fabric_core::{BuildError, Graph, GraphParams, Settings};
use std::collections::BTreeSet;

fn params(
    seed: u64,
    total_points: usize,
    bin_count: usize,
    connected_neighbors: usize,
) -> GraphParams {
    GraphParams {
        seed,
        total_points,
        bin_stride: 1,
        bin_count,
        connected_neighbors,
        dampening: 1.0,
        stiffness: 0.6,
    }
}

#[test]
fn same_seed_builds_identical_graphs() {
    let a = Graph::build(&params(42, 300, 64, 5)).unwrap();
    let b = Graph::build(&params(42, 300, 64, 5)).unwrap();
    assert_eq!(a.triangulation.triangles, b.triangulation.triangles);
    for (pa, pb) in a.points.iter().zip(&b.points) {
        assert_eq!(pa.position, pb.position);
        assert_eq!(pa.neighbors, pb.neighbors);
        assert_eq!(pa.frequency_bin, pb.frequency_bin);
    }
}

#[test]
fn different_seeds_place_points_differently() {
    let a = Graph::build(&params(1, 100, 16, 5)).unwrap();
    let b = Graph::build(&params(2, 100, 16, 5)).unwrap();
    assert!(a.points.iter().zip(&b.points).any(|(pa, pb)| pa.position != pb.position));
}

#[test]
fn triangle_adjacency_is_symmetric() {
    let g = Graph::build(&params(3, 250, 32, 7)).unwrap();
    let adj = g.triangulation.adjacency(g.point_count());
    for (a, set) in adj.iter().enumerate() {
        assert!(!set.contains(&(a as u32)));
        for &b in set {
            assert!(adj[b as usize].contains(&(a as u32)), "{a} -> {b} not mirrored");
        }
    }
}

#[test]
fn neighbors_are_bounded_subsets_of_adjacency() {
    let k = 3;
    let g = Graph::build(&params(4, 250, 32, k)).unwrap();
    let adj = g.triangulation.adjacency(g.point_count());
    for p in &g.points {
        assert!(p.neighbors.len() <= k);
        let unique: BTreeSet<u32> = p.neighbors.iter().copied().collect();
        assert_eq!(unique.len(), p.neighbors.len());
        assert!(unique.is_subset(&adj[p.id as usize]));
        assert_eq!(p.neighbors.len(), k.min(adj[p.id as usize].len()));
    }
}

#[test]
fn triangle_indices_are_in_range() {
    let g = Graph::build(&params(5, 200, 8, 5)).unwrap();
    assert_eq!(g.triangulation.triangles.len() % 3, 0);
    assert!(g
        .triangulation
        .triangles
        .iter()
        .all(|&i| (i as usize) < g.point_count()));
}

#[test]
fn small_seeded_graph_is_stable() {
    let a = Graph::build(&params(0, 16, 8, 3)).unwrap();
    let b = Graph::build(&params(0, 16, 8, 3)).unwrap();
    assert_eq!(a.point_count(), 16);
    assert_eq!(a.tracked_point_count(), 8);
    assert!(a.triangulation.triangle_count() > 0);
    assert_eq!(a.triangulation.triangles, b.triangulation.triangles);
    let total: usize = a.points.iter().map(|p| p.neighbors.len()).sum();
    assert!(total > 0);
}

#[test]
fn too_few_points_is_rejected() {
    let err = Graph::build(&params(0, 2, 0, 3)).unwrap_err();
    assert_eq!(err, BuildError::TooFewPoints { count: 2 });
}

fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn hull_size(g: &Graph) -> usize {
    let mut pts: Vec<[f64; 2]> = g
        .points
        .iter()
        .map(|p| [p.position[0] as f64, p.position[1] as f64])
        .collect();
    pts.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    let mut hull: Vec<[f64; 2]> = Vec::new();
    for pass in [pts.clone(), pts.into_iter().rev().collect()] {
        let start = hull.len();
        for p in pass {
            while hull.len() >= start + 2
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull.len()
}

#[test]
fn default_graph_triangulates_the_whole_hull() {
    let s = Settings::default();
    for seed in 0..5 {
        let g = Graph::build(&GraphParams {
            seed,
            total_points: s.points,
            bin_stride: s.connected_bins_stride,
            bin_count: FREQUENCY_BIN_COUNT,
            connected_neighbors: s.connected_neighbors,
            dampening: s.dampening,
            stiffness: s.stiffness,
        })
        .unwrap();
        let n = g.point_count();
        assert_eq!(
            g.triangulation.triangle_count(),
            2 * n - 2 - hull_size(&g),
            "seed {seed}"
        );
    }
}
