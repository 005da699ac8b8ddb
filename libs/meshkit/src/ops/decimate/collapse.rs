//! Edge-collapse engine.
//!
//! Works on an indexed copy of the mesh where dead faces and vertices are
//! flagged rather than removed, so indices stay stable until the final
//! compaction.

use super::quadric::Quadric;
use crate::mesh::{triangle_area, MeshBuffer};
use config::constants::MIN_TRIANGLE_AREA;
use glam::{DVec2, DVec3};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Weight of the constraint planes that keep open borders in place.
const BOUNDARY_WEIGHT: f64 = 1000.0;

/// Counter the loop runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Budget {
    Triangles(usize),
    Vertices(usize),
}

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct CollapseStats {
    pub performed: usize,
    pub rejected: usize,
    pub target_met: bool,
}

/// A queued edge collapse. Stamps record the endpoint versions at push time;
/// an entry whose stamps no longer match is stale and dropped on pop.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    keep: u32,
    remove: u32,
    position: DVec3,
    stamps: (u32, u32),
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and the cheapest edge goes first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| (other.keep, other.remove).cmp(&(self.keep, self.remove)))
    }
}

pub(super) struct Collapser {
    positions: Vec<DVec3>,
    vertex_alive: Vec<bool>,
    boundary: Vec<bool>,
    versions: Vec<u32>,
    quadrics: Vec<Quadric>,
    faces: Vec<[u32; 3]>,
    face_alive: Vec<bool>,
    vertex_faces: Vec<Vec<usize>>,
    heap: BinaryHeap<Candidate>,
    live_faces: usize,
    live_vertices: usize,
}

impl Collapser {
    /// Sets up adjacency, quadrics and the initial queue. Faces repeating an
    /// index carry no area and are dropped up front.
    pub(super) fn new(mesh: &MeshBuffer) -> Self {
        let vertex_count = mesh.vertex_count();
        let faces: Vec<[u32; 3]> = mesh
            .triangles_iter()
            .filter(|[a, b, c]| a != b && b != c && a != c)
            .collect();

        let mut vertex_faces = vec![Vec::new(); vertex_count];
        for (id, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_faces[v as usize].push(id);
            }
        }
        let vertex_alive: Vec<bool> = vertex_faces.iter().map(|f| !f.is_empty()).collect();
        let live_vertices = vertex_alive.iter().filter(|&&a| a).count();

        let mut engine = Self {
            positions: mesh.vertices().to_vec(),
            vertex_alive,
            boundary: vec![false; vertex_count],
            versions: vec![0; vertex_count],
            quadrics: vec![Quadric::default(); vertex_count],
            live_faces: faces.len(),
            face_alive: vec![true; faces.len()],
            faces,
            vertex_faces,
            heap: BinaryHeap::new(),
            live_vertices,
        };
        engine.init_quadrics();
        engine.init_queue();
        engine
    }

    pub(super) fn live_faces(&self) -> usize {
        self.live_faces
    }

    fn met(&self, budget: Budget) -> bool {
        match budget {
            Budget::Triangles(target) => self.live_faces <= target,
            Budget::Vertices(target) => self.live_vertices <= target,
        }
    }

    fn init_quadrics(&mut self) {
        let mut edge_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (id, face) in self.faces.iter().enumerate() {
            let [p0, p1, p2] = face.map(|v| self.positions[v as usize]);
            let cross = (p1 - p0).cross(p2 - p0);
            if cross.length() > 0.0 {
                let q = Quadric::from_point_normal(p0, cross.normalize());
                for &v in face {
                    self.quadrics[v as usize] += q;
                }
            }
            for k in 0..3 {
                edge_faces
                    .entry(edge_key(face[k], face[(k + 1) % 3]))
                    .or_default()
                    .push(id);
            }
        }

        // Open borders get a plane through the edge, perpendicular to its face.
        for (&(a, b), ids) in &edge_faces {
            if ids.len() != 1 {
                continue;
            }
            self.boundary[a as usize] = true;
            self.boundary[b as usize] = true;
            let [p0, p1, p2] = self.faces[ids[0]].map(|v| self.positions[v as usize]);
            let face_normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            let (pa, pb) = (self.positions[a as usize], self.positions[b as usize]);
            let border_normal = (pb - pa).cross(face_normal).normalize_or_zero();
            if border_normal == DVec3::ZERO {
                continue;
            }
            let q = Quadric::from_point_normal(pa, border_normal).scaled(BOUNDARY_WEIGHT);
            self.quadrics[a as usize] += q;
            self.quadrics[b as usize] += q;
        }
    }

    fn init_queue(&mut self) {
        let mut seen = std::collections::HashSet::new();
        for id in 0..self.faces.len() {
            let face = self.faces[id];
            for k in 0..3 {
                let (a, b) = edge_key(face[k], face[(k + 1) % 3]);
                if seen.insert((a, b)) {
                    self.push_edge(a, b);
                }
            }
        }
    }

    fn push_edge(&mut self, a: u32, b: u32) {
        let q = self.quadrics[a as usize] + self.quadrics[b as usize];
        let (pa, pb) = (self.positions[a as usize], self.positions[b as usize]);
        let mut options = vec![pa, pb, (pa + pb) * 0.5];
        if let Some(optimal) = q.optimal_point() {
            options.push(optimal);
        }
        let (position, cost) = options
            .into_iter()
            .map(|p| (p, q.evaluate(p)))
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .unwrap_or((pa, f64::INFINITY));
        // The survivor keeps its attributes; prefer the endpoint the
        // position sits on.
        let (keep, remove) = if position == pb { (b, a) } else { (a, b) };
        self.heap.push(Candidate {
            cost,
            keep,
            remove,
            position,
            stamps: (self.versions[keep as usize], self.versions[remove as usize]),
        });
    }

    /// Collapses edges until the budget is met or the queue runs dry.
    pub(super) fn run(&mut self, budget: Budget) -> CollapseStats {
        let mut stats = CollapseStats::default();
        while !self.met(budget) {
            let Some(candidate) = self.heap.pop() else {
                break;
            };
            let (keep, remove) = (candidate.keep as usize, candidate.remove as usize);
            let fresh = self.vertex_alive[keep]
                && self.vertex_alive[remove]
                && candidate.stamps == (self.versions[keep], self.versions[remove]);
            if !fresh {
                continue;
            }
            if !self.is_collapse_valid(candidate.keep, candidate.remove, candidate.position) {
                stats.rejected += 1;
                continue;
            }
            self.collapse(candidate.keep, candidate.remove, candidate.position);
            stats.performed += 1;
        }
        stats.target_met = self.met(budget);
        stats
    }

    fn live_faces_of(&self, v: u32) -> impl Iterator<Item = usize> + '_ {
        self.vertex_faces[v as usize]
            .iter()
            .copied()
            .filter(move |&f| self.face_alive[f])
    }

    fn neighbors(&self, v: u32) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .live_faces_of(v)
            .flat_map(|f| self.faces[f])
            .filter(|&w| w != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn is_collapse_valid(&self, keep: u32, remove: u32, position: DVec3) -> bool {
        // Faces on the edge and the vertices opposite it.
        let mut opposite: Vec<u32> = self
            .live_faces_of(keep)
            .filter(|&f| self.faces[f].contains(&remove))
            .flat_map(|f| self.faces[f])
            .filter(|&w| w != keep && w != remove)
            .collect();
        let edge_faces = opposite.len();
        if edge_faces == 0 || edge_faces > 2 {
            return false;
        }
        opposite.sort_unstable();
        opposite.dedup();

        // An interior edge between two border vertices would pinch the border.
        if edge_faces == 2 && self.boundary[keep as usize] && self.boundary[remove as usize] {
            return false;
        }

        // Link condition.
        let keep_ring = self.neighbors(keep);
        let shared: Vec<u32> = self
            .neighbors(remove)
            .into_iter()
            .filter(|w| keep_ring.binary_search(w).is_ok())
            .collect();
        if shared != opposite {
            return false;
        }

        // Surviving faces must keep area and orientation and must not
        // duplicate a face already around `keep`.
        let keep_sets: Vec<[u32; 3]> = self
            .live_faces_of(keep)
            .filter(|&f| !self.faces[f].contains(&remove))
            .map(|f| sorted(self.faces[f]))
            .collect();
        for f in self.live_faces_of(keep).chain(self.live_faces_of(remove)) {
            let face = self.faces[f];
            if face.contains(&keep) && face.contains(&remove) {
                continue;
            }
            let old = face.map(|v| self.positions[v as usize]);
            let new = face.map(|v| {
                if v == keep || v == remove {
                    position
                } else {
                    self.positions[v as usize]
                }
            });
            let old_normal = (old[1] - old[0]).cross(old[2] - old[0]);
            let new_normal = (new[1] - new[0]).cross(new[2] - new[0]);
            if triangle_area(new[0], new[1], new[2]) <= MIN_TRIANGLE_AREA {
                return false;
            }
            if old_normal.dot(new_normal) <= 0.0 {
                return false;
            }
            if face.contains(&remove) {
                let renamed = sorted(face.map(|v| if v == remove { keep } else { v }));
                if keep_sets.contains(&renamed) {
                    return false;
                }
            }
        }
        true
    }

    fn collapse(&mut self, keep: u32, remove: u32, position: DVec3) {
        let (k, r) = (keep as usize, remove as usize);
        self.positions[k] = position;
        let removed_quadric = self.quadrics[r];
        self.quadrics[k] += removed_quadric;
        self.boundary[k] |= self.boundary[r];

        let mut touched = Vec::new();
        let moved = std::mem::take(&mut self.vertex_faces[r]);
        for f in moved {
            if !self.face_alive[f] {
                continue;
            }
            if self.faces[f].contains(&keep) {
                self.face_alive[f] = false;
                self.live_faces -= 1;
                touched.extend(self.faces[f].iter().copied().filter(|&w| w != keep && w != remove));
            } else {
                for v in self.faces[f].iter_mut() {
                    if *v == remove {
                        *v = keep;
                    }
                }
                self.vertex_faces[k].push(f);
            }
        }
        self.vertex_alive[r] = false;
        self.live_vertices -= 1;
        self.versions[k] += 1;
        self.versions[r] += 1;

        let alive = &self.face_alive;
        self.vertex_faces[k].retain(|&f| alive[f]);

        for w in touched {
            let w = w as usize;
            let alive = &self.face_alive;
            self.vertex_faces[w].retain(|&f| alive[f]);
            if self.vertex_alive[w] && self.vertex_faces[w].is_empty() {
                self.vertex_alive[w] = false;
                self.live_vertices -= 1;
            }
        }
        if self.vertex_faces[k].is_empty() {
            self.vertex_alive[k] = false;
            self.live_vertices -= 1;
            return;
        }

        for w in self.neighbors(keep) {
            self.push_edge(keep, w);
        }
    }

    /// Builds the output buffer: live vertices in original order, live faces
    /// remapped, UVs and colors carried over from survivors.
    pub(super) fn into_mesh(self, source: &MeshBuffer) -> MeshBuffer {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut vertices = Vec::new();
        let mut kept = Vec::new();
        for (old, alive) in self.vertex_alive.iter().enumerate() {
            if *alive {
                remap[old] = vertices.len() as u32;
                vertices.push(self.positions[old]);
                kept.push(old);
            }
        }
        let triangles: Vec<u32> = self
            .faces
            .iter()
            .zip(&self.face_alive)
            .filter(|(_, &alive)| alive)
            .flat_map(|(face, _)| face.map(|v| remap[v as usize]))
            .collect();

        let carry_colors = source.colors().len() == source.vertex_count();
        let mut out = MeshBuffer::from_parts(vertices, triangles);
        if carry_colors && !source.colors().is_empty() {
            out.colors = kept.iter().map(|&v| source.colors()[v]).collect();
        }
        for channel in 0..out.uv.len() {
            let coords = source.uv(channel);
            if !coords.is_empty() && coords.len() == source.vertex_count() {
                out.uv[channel] = kept.iter().map(|&v| coords[v]).collect::<Vec<DVec2>>();
            }
        }
        if !source.normals().is_empty() {
            out.compute_normals();
        }
        out
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn sorted(mut face: [u32; 3]) -> [u32; 3] {
    face.sort_unstable();
    face
}
