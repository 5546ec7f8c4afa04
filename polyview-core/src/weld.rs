//! Vertex welding for unindexed triangle input.
//!
//! Two positions weld when every axis differs by less than [`WELD_EPSILON`].
//! When several existing vertices qualify, the one created first wins.

use std::collections::HashMap;
use std::str::FromStr;

use nalgebra::Point3;

use crate::geometry::{Mesh, VertexId};

/// Per-axis absolute weld tolerance.
pub const WELD_EPSILON: f32 = 1e-5;

/// Per-axis tolerance test. Not a Euclidean distance.
pub fn coincident(a: &Point3<f32>, b: &Point3<f32>) -> bool {
    (a.x - b.x).abs() < WELD_EPSILON
        && (a.y - b.y).abs() < WELD_EPSILON
        && (a.z - b.z).abs() < WELD_EPSILON
}

/// How candidate vertices are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeldStrategy {
    /// Scan every vertex created so far, `O(V)` per lookup.
    #[default]
    Linear,
    /// Hash into ε-sized cells and probe the 27 neighbouring cells.
    Grid,
}

impl FromStr for WeldStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "grid" => Ok(Self::Grid),
            other => Err(format!("unknown weld strategy '{other}'")),
        }
    }
}

type Cell = [i64; 3];

fn cell_of(p: &Point3<f32>) -> Cell {
    let inv = 1.0 / WELD_EPSILON as f64;
    [
        (p.x as f64 * inv).floor() as i64,
        (p.y as f64 * inv).floor() as i64,
        (p.z as f64 * inv).floor() as i64,
    ]
}

/// Resolves raw corner positions to vertex handles of a mesh under
/// construction.
#[derive(Debug, Default)]
pub struct VertexWelder {
    strategy: WeldStrategy,
    cells: HashMap<Cell, Vec<VertexId>>,
}

impl VertexWelder {
    pub fn new(strategy: WeldStrategy) -> Self {
        Self {
            strategy,
            cells: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> WeldStrategy {
        self.strategy
    }

    /// Return the first vertex of `mesh` coinciding with `position`, creating
    /// a new one when none does.
    ///
    /// The welder must be used with a single mesh whose vertices were all
    /// added through it.
    pub fn weld(&mut self, mesh: &mut Mesh, position: Point3<f32>) -> VertexId {
        if let Some(existing) = self.find(mesh, &position) {
            return existing;
        }

        let id = mesh.add_vertex(position);
        if self.strategy == WeldStrategy::Grid {
            self.cells.entry(cell_of(&position)).or_default().push(id);
        }
        id
    }

    fn find(&self, mesh: &Mesh, position: &Point3<f32>) -> Option<VertexId> {
        match self.strategy {
            WeldStrategy::Linear => mesh
                .vertices()
                .iter()
                .position(|v| coincident(&v.position, position))
                .and_then(|index| mesh.vertex_id(index)),
            WeldStrategy::Grid => {
                let [cx, cy, cz] = cell_of(position);
                let mut best: Option<VertexId> = None;
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            let key = [
                                cx.saturating_add(dx),
                                cy.saturating_add(dy),
                                cz.saturating_add(dz),
                            ];
                            let Some(ids) = self.cells.get(&key) else {
                                continue;
                            };
                            // Ids in a cell are ascending, so the first hit is
                            // the earliest in that cell.
                            if let Some(&id) = ids
                                .iter()
                                .find(|&&id| coincident(&mesh.vertex(id).position, position))
                            {
                                best = Some(best.map_or(id, |b| b.min(id)));
                            }
                        }
                    }
                }
                best
            }
        }
    }
}
