//! Planar cross-sections of a triangle mesh.
//!
//! Each triangle straddling the plane contributes one segment. Segment
//! endpoints are identified topologically (by the mesh edge or vertex they
//! lie on), so neighboring triangles share endpoints exactly and the
//! segments chain into polylines without any distance matching.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use rayon::prelude::*;
use vox_core::Tolerance;
use vox_math::{Plane, Point3};

use crate::TriangleMesh;

/// A polyline where the plane meets the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point3>,
    /// The last point connects back to the first.
    pub closed: bool,
}

/// Intersection of a mesh with one plane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub contours: Vec<Contour>,
    pub segment_count: usize,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.contours.iter().map(|c| c.points.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Node {
    /// Crossing on the edge between two vertices, lower index first.
    Edge(u32, u32),
    /// A vertex lying on the plane.
    Vertex(u32),
}

impl Node {
    fn edge(a: u32, b: u32) -> Self {
        if a < b {
            Node::Edge(a, b)
        } else {
            Node::Edge(b, a)
        }
    }

    fn position(self, positions: &[Point3], distances: &[f64]) -> Point3 {
        match self {
            Node::Vertex(i) => positions[i as usize],
            Node::Edge(a, b) => {
                let (pa, pb) = (positions[a as usize], positions[b as usize]);
                let (da, db) = (distances[a as usize], distances[b as usize]);
                pa + (pb - pa) * (da / (da - db))
            }
        }
    }
}

/// Intersect `mesh` with `plane`.
pub fn section_mesh(mesh: &TriangleMesh, plane: &Plane, tol: Tolerance) -> Section {
    if mesh.is_empty() {
        return Section::default();
    }

    let distances: Vec<f64> = mesh
        .positions
        .par_iter()
        .map(|&p| plane.signed_distance(p))
        .collect();

    let sides: Vec<i8> = distances
        .iter()
        .map(|&d| {
            if tol.is_zero(d) {
                0
            } else if d > 0.0 {
                1
            } else {
                -1
            }
        })
        .collect();

    let candidates: Vec<(Node, Node)> = (0..mesh.triangle_count())
        .into_par_iter()
        .filter_map(|t| mesh.triangle(t).and_then(|tri| triangle_segment(tri, &sides)))
        .collect();

    // An edge lying in the plane is reported by each triangle touching it.
    let mut seen = HashSet::with_capacity(candidates.len());
    let segments: Vec<(Node, Node)> = candidates
        .into_iter()
        .filter(|&(a, b)| seen.insert(if a <= b { (a, b) } else { (b, a) }))
        .collect();

    let contours = chain_segments(&segments)
        .into_iter()
        .map(|(nodes, closed)| Contour {
            points: nodes
                .into_iter()
                .map(|n| n.position(&mesh.positions, &distances))
                .collect(),
            closed,
        })
        .collect();

    Section {
        contours,
        segment_count: segments.len(),
    }
}

fn triangle_segment(tri: [u32; 3], sides: &[i8]) -> Option<(Node, Node)> {
    let s = tri.map(|i| sides[i as usize]);

    // Entirely on one side, or coplanar
    if s.iter().all(|&v| v > 0) || s.iter().all(|&v| v < 0) || s.iter().all(|&v| v == 0) {
        return None;
    }

    let mut nodes: Vec<Node> = Vec::with_capacity(2);
    for k in 0..3 {
        let (a, b) = (tri[k], tri[(k + 1) % 3]);
        let (sa, sb) = (s[k], s[(k + 1) % 3]);
        if sa == 0 {
            nodes.push(Node::Vertex(a));
        } else if sa * sb < 0 {
            nodes.push(Node::edge(a, b));
        }
    }

    match nodes.as_slice() {
        [a, b] => Some((*a, *b)),
        _ => None,
    }
}

/// Link segments sharing endpoints into polylines.
fn chain_segments(segments: &[(Node, Node)]) -> Vec<(Vec<Node>, bool)> {
    let mut adjacency: HashMap<Node, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        adjacency.entry(a).or_default().push(i);
        adjacency.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let next_from = |node: Node, used: &mut Vec<bool>| -> Option<Node> {
        for &i in adjacency.get(&node)? {
            if !used[i] {
                used[i] = true;
                let (a, b) = segments[i];
                return Some(if a == node { b } else { a });
            }
        }
        None
    };

    let mut chains = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let mut chain = VecDeque::from([a, b]);

        while let Some(&tail) = chain.back() {
            match next_from(tail, &mut used) {
                Some(next) => {
                    chain.push_back(next);
                    if Some(&next) == chain.front() {
                        break;
                    }
                }
                None => break,
            }
        }

        let closed = chain.len() > 3 && chain.front() == chain.back();
        if closed {
            chain.pop_back();
        } else {
            while let Some(&head) = chain.front() {
                match next_from(head, &mut used) {
                    Some(prev) => chain.push_front(prev),
                    None => break,
                }
            }
        }

        chains.push((chain.into_iter().collect(), closed));
    }
    chains
}

/// Persistent cutting operator over one world-space mesh.
///
/// The mesh is shared read-only; the plane and the last output are owned.
#[derive(Debug, Clone)]
pub struct PlaneCutter {
    mesh: Arc<TriangleMesh>,
    plane: Option<Plane>,
    output: Section,
    tolerance: Tolerance,
}

impl PlaneCutter {
    pub fn new(mesh: Arc<TriangleMesh>, tolerance: Tolerance) -> Self {
        Self {
            mesh,
            plane: None,
            output: Section::default(),
            tolerance,
        }
    }

    pub fn mesh(&self) -> &Arc<TriangleMesh> {
        &self.mesh
    }

    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    pub fn set_plane(&mut self, plane: Plane) {
        self.plane = Some(plane);
    }

    /// Recompute the section for the current plane.
    pub fn update(&mut self) -> &Section {
        if let Some(plane) = &self.plane {
            self.output = section_mesh(&self.mesh, plane, self.tolerance);
            tracing::trace!(
                segments = self.output.segment_count,
                contours = self.output.contours.len(),
                "recomputed section"
            );
        }
        &self.output
    }

    pub fn output(&self) -> &Section {
        &self.output
    }
}
