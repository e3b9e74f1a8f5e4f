//! Bowyer-Watson Delaunay triangulation.
//!
//! Points are inserted in x order. A triangle whose circumcircle lies wholly
//! to the left of the current point can never be invalidated again, so it is
//! retired from the active list; this keeps each insertion close to the
//! sweep front instead of scanning the whole mesh.

use crate::error::BuildError;
use fnv::FnvHashMap;

#[derive(Clone, Copy, Debug)]
struct Tri {
    v: [usize; 3],
    cx: f64,
    cy: f64,
    r2: f64,
}

impl Tri {
    fn new(pts: &[[f64; 2]], a: usize, b: usize, c: usize) -> Self {
        // keep counter-clockwise winding
        let v = if orient(pts[a], pts[b], pts[c]) < 0.0 {
            [a, c, b]
        } else {
            [a, b, c]
        };
        let (cx, cy, r2) = circumcircle(pts[v[0]], pts[v[1]], pts[v[2]]);
        Self { v, cx, cy, r2 }
    }

    #[inline]
    fn contains(&self, p: [f64; 2]) -> bool {
        let dx = p[0] - self.cx;
        let dy = p[1] - self.cy;
        dx * dx + dy * dy < self.r2
    }

    #[inline]
    fn left_of(&self, p: [f64; 2]) -> bool {
        let dx = p[0] - self.cx;
        dx > 0.0 && dx * dx > self.r2
    }
}

#[inline]
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> (f64, f64, f64) {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < 1e-18 {
        // sliver: let the next insertion carve it out
        let cx = (a[0] + b[0] + c[0]) / 3.0;
        let cy = (a[1] + b[1] + c[1]) / 3.0;
        return (cx, cy, f64::INFINITY);
    }
    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let cx = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let cy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let dx = a[0] - cx;
    let dy = a[1] - cy;
    (cx, cy, dx * dx + dy * dy)
}

/// Triangulate `points`, returning a flat list of counter-clockwise index
/// triples into the input slice. Coincident points are skipped.
pub fn triangulate(points: &[[f32; 2]]) -> Result<Vec<u32>, BuildError> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i][0]
            .total_cmp(&points[j][0])
            .then(points[i][1].total_cmp(&points[j][1]))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);
    if order.len() < 3 {
        return Err(BuildError::TooFewPoints { count: order.len() });
    }

    let n = points.len();
    let mut pts: Vec<[f64; 2]> = points.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for &i in &order {
        let [x, y] = pts[i];
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let d = (max_x - min_x).max(max_y - min_y).max(1e-9);
    let mid_x = (min_x + max_x) * 0.5;
    let mid_y = (min_y + max_y) * 0.5;
    pts.push([mid_x - 20.0 * d, mid_y - d]);
    pts.push([mid_x, mid_y + 20.0 * d]);
    pts.push([mid_x + 20.0 * d, mid_y - d]);

    let mut active = vec![Tri::new(&pts, n, n + 1, n + 2)];
    let mut retired: Vec<Tri> = Vec::with_capacity(points.len() * 2);
    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut edge_count: FnvHashMap<(usize, usize), u8> = FnvHashMap::default();

    for &i in &order {
        let p = pts[i];
        edges.clear();
        edge_count.clear();

        let mut k = 0;
        while k < active.len() {
            let t = active[k];
            if t.left_of(p) {
                retired.push(active.swap_remove(k));
            } else if t.contains(p) {
                for (a, b) in [(t.v[0], t.v[1]), (t.v[1], t.v[2]), (t.v[2], t.v[0])] {
                    edges.push((a, b));
                    *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
                }
                active.swap_remove(k);
            } else {
                k += 1;
            }
        }

        for &(a, b) in &edges {
            if edge_count.get(&(a.min(b), a.max(b))) == Some(&1) {
                active.push(Tri::new(&pts, a, b, i));
            }
        }
    }

    retired.extend(active);
    let mut tris: Vec<[usize; 3]> = retired
        .iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .filter(|t| orient(pts[t.v[0]], pts[t.v[1]], pts[t.v[2]]).abs() > 1e-12)
        .map(|t| t.v)
        .collect();
    if tris.is_empty() {
        return Err(BuildError::Degenerate);
    }
    close_hull(&pts, &mut tris);

    Ok(tris.iter().flatten().map(|&v| v as u32).collect())
}

type EdgeOwners = FnvHashMap<(usize, usize), usize>;

fn directed_edges(t: [usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

fn third(t: [usize; 3], a: usize, b: usize) -> usize {
    t.into_iter().find(|&v| v != a && v != b).unwrap_or(t[0])
}

/// Positive when `d` lies inside the circumcircle of the ccw triangle `abc`.
fn incircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);
    (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        - (bdx * bdx + bdy * bdy) * (adx * cdy - cdx * ady)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady)
}

/// Hull triangles whose circumcircle reached a super vertex were dropped
/// above. Clip the dents left in the boundary until it is convex, then flip
/// the new edges back to Delaunay.
fn close_hull(pts: &[[f64; 2]], tris: &mut Vec<[usize; 3]>) {
    let mut owners: EdgeOwners = FnvHashMap::default();
    for (k, &t) in tris.iter().enumerate() {
        for e in directed_edges(t) {
            owners.insert(e, k);
        }
    }
    // region lies to the left of every boundary edge
    let mut boundary: Vec<(usize, usize)> = owners
        .keys()
        .filter(|&&(a, b)| !owners.contains_key(&(b, a)))
        .copied()
        .collect();
    boundary.sort_unstable();

    let mut pending = Vec::new();
    while let Some((i, j)) = find_dent(pts, &boundary) {
        let (a, b) = boundary[i];
        let c = boundary[j].1;
        let k = tris.len();
        tris.push([a, c, b]);
        for e in directed_edges([a, c, b]) {
            owners.insert(e, k);
        }
        boundary[i] = (a, c);
        boundary.swap_remove(j);
        pending.extend([(c, b), (b, a)]);
    }
    legalize(pts, tris, &mut owners, pending);
}

/// Two consecutive boundary edges `a -> b -> c` turning right, with no other
/// boundary vertex inside `acb`.
fn find_dent(pts: &[[f64; 2]], boundary: &[(usize, usize)]) -> Option<(usize, usize)> {
    for (i, &(a, b)) in boundary.iter().enumerate() {
        for (j, &(from, c)) in boundary.iter().enumerate() {
            if from != b || c == a || orient(pts[a], pts[b], pts[c]) >= -1e-12 {
                continue;
            }
            let blocked = boundary.iter().any(|&(v, _)| {
                v != a
                    && v != b
                    && v != c
                    && orient(pts[a], pts[c], pts[v]) >= 0.0
                    && orient(pts[c], pts[b], pts[v]) >= 0.0
                    && orient(pts[b], pts[a], pts[v]) >= 0.0
            });
            if !blocked {
                return Some((i, j));
            }
        }
    }
    None
}

/// Lawson flips starting from `pending` until every edge is locally Delaunay.
fn legalize(
    pts: &[[f64; 2]],
    tris: &mut [[usize; 3]],
    owners: &mut EdgeOwners,
    mut pending: Vec<(usize, usize)>,
) {
    while let Some((a, b)) = pending.pop() {
        let (Some(&t1), Some(&t2)) = (owners.get(&(a, b)), owners.get(&(b, a))) else {
            continue;
        };
        let c = third(tris[t1], a, b);
        let d = third(tris[t2], b, a);
        if incircle(pts[a], pts[b], pts[c], pts[d]) <= 1e-12 {
            continue;
        }
        owners.remove(&(a, b));
        owners.remove(&(b, a));
        tris[t1] = [a, d, c];
        tris[t2] = [d, b, c];
        for (k, t) in [(t1, tris[t1]), (t2, tris[t2])] {
            for e in directed_edges(t) {
                owners.insert(e, k);
            }
        }
        pending.extend([(a, d), (d, b), (b, c), (c, a)]);
    }
}
