//! Quadric error edge collapse reduction
//!
//! Implements the [`TriangleReducer`] contract with iterative edge collapse
//! over a half-edge data structure, using quadric error metrics (QEM) to
//! prioritize collapses. Reduction runs in sweeps with a growing error
//! ceiling derived from the aggressiveness parameter, so flat regions thin
//! out first and the reducer stops early rather than destroy detail when
//! the target is unreachable within the ceiling.

use nalgebra::{Matrix4, Vector4};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use viewmesh_core::{CandidateMesh, CandidateTriangle, Error, Point3f, Result, TriangleReducer};

const INVALID: usize = usize::MAX;

/// Base of the per-sweep error ceiling, scaled by
/// `(sweep + 3) ^ aggressiveness`.
const CEILING_BASE: f64 = 1e-9;

// ============================================================
// Half-Edge Data Structure
// ============================================================

#[derive(Debug, Clone)]
struct HalfEdge {
    target: usize,
    twin: usize,
    next: usize,
    prev: usize,
    face: usize,
}

/// Half-edge mesh carrying per-face protection flags.
struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex (INVALID if removed or isolated)
    vertex_edge: Vec<usize>,
    /// One half-edge per face (INVALID if removed)
    face_edge: Vec<usize>,
    /// Keep flag per face, carried through to the output
    face_keep: Vec<bool>,
    active_face_count: usize,
    positions: Vec<Point3f>,
    quadrics: Vec<Matrix4<f64>>,
    vertex_removed: Vec<bool>,
}

impl HalfEdgeMesh {
    fn from_candidate_mesh(mesh: &CandidateMesh) -> Self {
        let nv = mesh.vertices.len();
        let nf = mesh.triangles.len();

        let mut half_edges = Vec::with_capacity(nf * 3);
        let mut vertex_edge = vec![INVALID; nv];
        let mut face_edge = Vec::with_capacity(nf);
        let mut face_keep = Vec::with_capacity(nf);

        for (fi, triangle) in mesh.triangles.iter().enumerate() {
            let face = triangle.vertices;
            let base = fi * 3;
            for j in 0..3usize {
                half_edges.push(HalfEdge {
                    target: face[(j + 1) % 3],
                    twin: INVALID,
                    next: base + (j + 1) % 3,
                    prev: base + (j + 2) % 3,
                    face: fi,
                });
                if vertex_edge[face[j]] == INVALID {
                    vertex_edge[face[j]] = base + j;
                }
            }
            face_edge.push(base);
            face_keep.push(triangle.keep);
        }

        // Build twin pointers
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(nf * 3);
        for (he_idx, he) in half_edges.iter().enumerate() {
            let src = half_edges[he.prev].target;
            edge_map.insert((src, he.target), he_idx);
        }
        for he_idx in 0..half_edges.len() {
            if half_edges[he_idx].twin != INVALID {
                continue;
            }
            let src = half_edges[half_edges[he_idx].prev].target;
            let tgt = half_edges[he_idx].target;
            if let Some(&twin_idx) = edge_map.get(&(tgt, src)) {
                half_edges[he_idx].twin = twin_idx;
                half_edges[twin_idx].twin = he_idx;
            }
        }

        let mut hem = HalfEdgeMesh {
            half_edges,
            vertex_edge,
            face_edge,
            face_keep,
            active_face_count: nf,
            positions: mesh.vertices.clone(),
            quadrics: vec![Matrix4::zeros(); nv],
            vertex_removed: vec![false; nv],
        };
        hem.initialize_quadrics();
        hem
    }

    #[inline]
    fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].target
    }

    fn compute_plane(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> Vector4<f64> {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let n = e1.cross(&e2).normalize();
        if !n.iter().all(|x| x.is_finite()) {
            return Vector4::new(0.0, 0.0, 1.0, 0.0);
        }
        let d = -n.dot(&v0.coords);
        Vector4::new(n.x as f64, n.y as f64, n.z as f64, d as f64)
    }

    fn plane_to_quadric(p: &Vector4<f64>) -> Matrix4<f64> {
        let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
        Matrix4::new(
            a * a, a * b, a * c, a * d,
            a * b, b * b, b * c, b * d,
            a * c, b * c, c * c, c * d,
            a * d, b * d, c * d, d * d,
        )
    }

    fn initialize_quadrics(&mut self) {
        for fi in 0..self.face_edge.len() {
            let he0 = self.face_edge[fi];
            if he0 == INVALID {
                continue;
            }
            let he1 = self.half_edges[he0].next;
            let v0 = self.source(he0);
            let v1 = self.half_edges[he0].target;
            let v2 = self.half_edges[he1].target;
            let plane =
                Self::compute_plane(&self.positions[v0], &self.positions[v1], &self.positions[v2]);
            let q = Self::plane_to_quadric(&plane);
            self.quadrics[v0] += q;
            self.quadrics[v1] += q;
            self.quadrics[v2] += q;
        }
    }

    /// Get all outgoing half-edges from a vertex (handles boundary vertices).
    fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let start = self.vertex_edge[v];
        if start == INVALID {
            return vec![];
        }

        let mut result = Vec::new();
        let mut current = start;

        // Rotate counterclockwise: current.prev.twin
        loop {
            result.push(current);
            let prev = self.half_edges[current].prev;
            let twin = self.half_edges[prev].twin;
            if twin == INVALID {
                break;
            }
            current = twin;
            if current == start {
                return result;
            }
        }

        // Boundary: also rotate clockwise from start via twin.next
        let twin_of_start = self.half_edges[start].twin;
        if twin_of_start != INVALID {
            let mut current = self.half_edges[twin_of_start].next;
            loop {
                if current == start {
                    break;
                }
                result.push(current);
                let twin = self.half_edges[current].twin;
                if twin == INVALID {
                    break;
                }
                current = self.half_edges[twin].next;
            }
        }

        result
    }

    fn neighbors(&self, v: usize) -> HashSet<usize> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].target)
            .collect()
    }

    /// Whether any live face around a vertex carries the keep flag.
    fn touches_protected_face(&self, v: usize) -> bool {
        self.outgoing_half_edges(v).iter().any(|&he| {
            let face = self.half_edges[he].face;
            face != INVALID && self.face_keep[face]
        })
    }

    /// Check the link condition: common neighbors must equal exactly the
    /// face apices opposite the edge (2 for interior, 1 for boundary).
    fn check_link_condition(&self, v1: usize, v2: usize) -> bool {
        let n1 = self.neighbors(v1);
        let n2 = self.neighbors(v2);
        let common_count = n1.intersection(&n2).count();

        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };
        let is_boundary = self.half_edges[h].twin == INVALID;
        let expected = if is_boundary { 1 } else { 2 };
        common_count == expected
    }

    fn find_half_edge(&self, from: usize, to: usize) -> Option<usize> {
        for &he in &self.outgoing_half_edges(from) {
            if self.half_edges[he].target == to {
                return Some(he);
            }
        }
        None
    }

    fn compute_collapse_cost(&self, v1: usize, v2: usize) -> (Point3f, f64) {
        let q = self.quadrics[v1] + self.quadrics[v2];
        let q3 = q.fixed_view::<3, 3>(0, 0);
        let q1 = q.fixed_view::<3, 1>(0, 3);

        let optimal = if let Some(inv) = q3.try_inverse() {
            let p = -inv * q1;
            Point3f::new(p[0] as f32, p[1] as f32, p[2] as f32)
        } else {
            Point3f::from((self.positions[v1].coords + self.positions[v2].coords) * 0.5)
        };

        let vh = Vector4::new(optimal.x as f64, optimal.y as f64, optimal.z as f64, 1.0);
        let cost = (vh.transpose() * q * vh)[0].max(0.0);
        (optimal, cost)
    }

    /// Find any valid outgoing half-edge from a vertex (linear scan fallback).
    fn find_valid_outgoing(&self, v: usize) -> usize {
        for (i, he) in self.half_edges.iter().enumerate() {
            if he.face != INVALID && self.source(i) == v {
                return i;
            }
        }
        INVALID
    }

    /// Collapse edge (v1, v2), merging v2 into v1 at new_pos.
    /// Returns true on success.
    fn collapse_edge(&mut self, v1: usize, v2: usize, new_pos: Point3f) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };

        let h_twin = self.half_edges[h].twin;
        let h_next = self.half_edges[h].next;
        let h_prev = self.half_edges[h].prev;
        let face_a = self.half_edges[h].face;
        let h_next_twin = self.half_edges[h_next].twin;
        let h_prev_twin = self.half_edges[h_prev].twin;
        let c = self.half_edges[h_next].target;

        let (face_b, ht_next, ht_prev, ht_next_twin, ht_prev_twin, d) = if h_twin != INVALID {
            let hn = self.half_edges[h_twin].next;
            let hp = self.half_edges[h_twin].prev;
            (
                self.half_edges[h_twin].face,
                hn,
                hp,
                self.half_edges[hn].twin,
                self.half_edges[hp].twin,
                self.half_edges[hn].target,
            )
        } else {
            (INVALID, INVALID, INVALID, INVALID, INVALID, INVALID)
        };

        // Collect v2 outgoing edges BEFORE any modifications
        let v2_outgoing = self.outgoing_half_edges(v2);

        // Re-pair twins for face A border edges
        if h_next_twin != INVALID {
            self.half_edges[h_next_twin].twin = h_prev_twin;
        }
        if h_prev_twin != INVALID {
            self.half_edges[h_prev_twin].twin = h_next_twin;
        }

        // Mark face A as removed
        self.half_edges[h].face = INVALID;
        self.half_edges[h_next].face = INVALID;
        self.half_edges[h_prev].face = INVALID;
        self.face_edge[face_a] = INVALID;
        self.active_face_count -= 1;

        // Handle face B
        if face_b != INVALID {
            if ht_next_twin != INVALID {
                self.half_edges[ht_next_twin].twin = ht_prev_twin;
            }
            if ht_prev_twin != INVALID {
                self.half_edges[ht_prev_twin].twin = ht_next_twin;
            }
            self.half_edges[h_twin].face = INVALID;
            self.half_edges[ht_next].face = INVALID;
            self.half_edges[ht_prev].face = INVALID;
            self.face_edge[face_b] = INVALID;
            self.active_face_count -= 1;
        }

        // Redirect all v2 references to v1
        for &he in &v2_outgoing {
            let prev = self.half_edges[he].prev;
            self.half_edges[prev].target = v1;

            let twin = self.half_edges[he].twin;
            if twin != INVALID && self.half_edges[twin].face != INVALID {
                self.half_edges[twin].target = v1;
            }
        }

        // Fix vertex_edge pointers for v1
        if self.half_edges[self.vertex_edge[v1]].face == INVALID {
            if h_prev_twin != INVALID && self.half_edges[h_prev_twin].face != INVALID {
                self.vertex_edge[v1] = h_prev_twin;
            } else {
                self.vertex_edge[v1] = self.find_valid_outgoing(v1);
            }
        }

        // Fix vertex_edge for c
        if c != INVALID
            && self.vertex_edge[c] != INVALID
            && self.half_edges[self.vertex_edge[c]].face == INVALID
        {
            if h_next_twin != INVALID && self.half_edges[h_next_twin].face != INVALID {
                self.vertex_edge[c] = h_next_twin;
            } else {
                self.vertex_edge[c] = self.find_valid_outgoing(c);
            }
        }

        // Fix vertex_edge for d
        if d != INVALID
            && d != c
            && self.vertex_edge[d] != INVALID
            && self.half_edges[self.vertex_edge[d]].face == INVALID
        {
            if ht_next_twin != INVALID && self.half_edges[ht_next_twin].face != INVALID {
                self.vertex_edge[d] = ht_next_twin;
            } else {
                self.vertex_edge[d] = self.find_valid_outgoing(d);
            }
        }

        // Mark v2 as removed
        self.vertex_edge[v2] = INVALID;
        self.vertex_removed[v2] = true;

        // Update position and quadric for v1
        let v2_quadric = self.quadrics[v2];
        self.positions[v1] = new_pos;
        self.quadrics[v1] += v2_quadric;

        true
    }

    /// Compact live vertices and faces back into a candidate mesh.
    fn to_candidate_mesh(&self) -> CandidateMesh {
        let mut old_to_new: HashMap<usize, usize> = HashMap::new();
        let mut new_positions = Vec::new();

        for (i, &removed) in self.vertex_removed.iter().enumerate() {
            if !removed && self.vertex_edge[i] != INVALID {
                old_to_new.insert(i, new_positions.len());
                new_positions.push(self.positions[i]);
            }
        }

        let mut new_triangles = Vec::new();
        for fi in 0..self.face_edge.len() {
            let he0 = self.face_edge[fi];
            if he0 == INVALID {
                continue;
            }
            let he1 = self.half_edges[he0].next;
            let v0 = self.source(he0);
            let v1 = self.half_edges[he0].target;
            let v2 = self.half_edges[he1].target;

            if let (Some(&nv0), Some(&nv1), Some(&nv2)) =
                (old_to_new.get(&v0), old_to_new.get(&v1), old_to_new.get(&v2))
            {
                if nv0 != nv1 && nv1 != nv2 && nv2 != nv0 {
                    new_triangles
                        .push(CandidateTriangle::new([nv0, nv1, nv2], self.face_keep[fi]));
                }
            }
        }

        CandidateMesh::from_parts(new_positions, new_triangles)
    }
}

// ============================================================
// Edge Cost for Priority Queue
// ============================================================

#[derive(Debug, Clone)]
struct EdgeCost {
    v1: usize,
    v2: usize,
    cost: f64,
}

impl PartialEq for EdgeCost {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}
impl Eq for EdgeCost {}

impl PartialOrd for EdgeCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other.cost.total_cmp(&self.cost)
    }
}

// ============================================================
// Quadric Reducer
// ============================================================

/// Quadric error edge collapse reducer.
///
/// Collapses run in sweeps; sweep `i` only accepts collapses whose QEM
/// cost stays under `1e-9 * (i + 3) ^ aggressiveness`, so early sweeps
/// thin near-planar regions and later sweeps get progressively more
/// permissive. Reduction stops at the target triangle count, or early
/// when the sweeps are exhausted with only high-cost collapses left.
pub struct QuadricReducer {
    /// Upper bound on cost-ceiling sweeps before giving up on the target
    pub max_sweeps: usize,
}

impl Default for QuadricReducer {
    fn default() -> Self {
        Self { max_sweeps: 100 }
    }
}

impl QuadricReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the priority queue of collapse candidates over live edges.
    fn build_queue(&self, hem: &HalfEdgeMesh) -> PriorityQueue<usize, EdgeCost> {
        let mut queue = PriorityQueue::new();
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();
        let mut edge_id = 0usize;

        for vi in 0..hem.positions.len() {
            if hem.vertex_removed[vi] || hem.vertex_edge[vi] == INVALID {
                continue;
            }
            for &he in &hem.outgoing_half_edges(vi) {
                if hem.half_edges[he].face == INVALID {
                    continue;
                }
                let target = hem.half_edges[he].target;
                let key = (vi.min(target), vi.max(target));
                if !seen_edges.insert(key) {
                    continue;
                }

                let (_, cost) = hem.compute_collapse_cost(vi, target);
                queue.push(
                    edge_id,
                    EdgeCost {
                        v1: vi,
                        v2: target,
                        cost,
                    },
                );
                edge_id += 1;
            }
        }

        queue
    }
}

impl TriangleReducer for QuadricReducer {
    fn reduce(
        &self,
        mesh: &CandidateMesh,
        target_triangles: usize,
        aggressiveness: f64,
        respect_keep: bool,
    ) -> Result<CandidateMesh> {
        // Fully masked-off cameras produce empty soups; pass them through.
        if mesh.is_empty() {
            return Ok(CandidateMesh::new());
        }
        if !mesh.indices_in_bounds() {
            return Err(Error::Simplification(
                "triangle index exceeds vertex count".to_string(),
            ));
        }
        if target_triangles >= mesh.triangle_count() {
            return Ok(mesh.clone());
        }

        let mut hem = HalfEdgeMesh::from_candidate_mesh(mesh);

        for sweep in 0..self.max_sweeps {
            if hem.active_face_count <= target_triangles {
                break;
            }
            let cost_ceiling = CEILING_BASE * (sweep as f64 + 3.0).powf(aggressiveness);
            let mut queue = self.build_queue(&hem);
            if queue.is_empty() {
                break;
            }

            while hem.active_face_count > target_triangles {
                let (_, edge_cost) = match queue.pop() {
                    Some(item) => item,
                    None => break,
                };
                if edge_cost.cost > cost_ceiling {
                    break;
                }

                let v1 = edge_cost.v1;
                let v2 = edge_cost.v2;

                // Validate: both vertices still alive and still neighbors
                if hem.vertex_removed[v1]
                    || hem.vertex_removed[v2]
                    || hem.vertex_edge[v1] == INVALID
                    || hem.vertex_edge[v2] == INVALID
                {
                    continue;
                }
                if hem.find_half_edge(v1, v2).is_none() {
                    continue;
                }

                // First pass leaves protected detail untouched
                if respect_keep
                    && (hem.touches_protected_face(v1) || hem.touches_protected_face(v2))
                {
                    continue;
                }

                // Check link condition to avoid non-manifold topology
                if !hem.check_link_condition(v1, v2) {
                    continue;
                }

                // Recompute cost (may have changed since queuing)
                let (pos, cost) = hem.compute_collapse_cost(v1, v2);
                if cost > cost_ceiling {
                    continue;
                }

                hem.collapse_edge(v1, v2, pos);
            }
        }

        Ok(hem.to_candidate_mesh())
    }
}
