/// Shared-vertex triangle mesh storage
use nalgebra::{Point3, Vector3};

use crate::normals;

/// Stable handle to a vertex in a [`Mesh`] vertex pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(u32);

impl VertexId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the vertex in [`Mesh::vertices`].
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable handle to a face in a [`Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(u32);

impl FaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A mesh vertex with its running normal.
///
/// `normal` is updated every time an incident face is discovered, so it is a
/// best-effort value until the whole mesh has been loaded. `degree` counts the
/// face corners folded into it so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub degree: u32,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self::at(Point3::new(x, y, z))
    }

    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            degree: 0,
        }
    }
}

/// A triangle referencing three vertices of the owning mesh.
///
/// `normal` is the unnormalized flat normal `(p2-p1)×(p3-p1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub vertices: [VertexId; 3],
    pub normal: Vector3<f32>,
}

/// Axis-aligned bounds of a vertex pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Radius of the sphere enclosing the box.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).norm() * 0.5
    }
}

/// A triangle mesh whose faces share vertices by handle.
///
/// Vertices are kept in definition order and are never removed, so a
/// [`VertexId`] stays valid for the lifetime of the mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0 as usize]
    }

    /// Resolve a raw file index into a handle, if it is inside the pool.
    pub fn vertex_id(&self, index: usize) -> Option<VertexId> {
        (index < self.vertices.len()).then(|| VertexId::new(index))
    }

    /// Append a vertex with a zero normal and degree 0.
    pub fn add_vertex(&mut self, position: Point3<f32>) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::at(position));
        id
    }

    /// Append a triangle and fold its flat normal into its corners.
    ///
    /// All three degrees are incremented before any fold happens, so a corner
    /// shared twice by a degenerate triangle is folded twice at its final
    /// degree.
    ///
    /// # Panics
    ///
    /// Panics if a handle does not belong to this mesh.
    pub fn add_face(&mut self, corners: [VertexId; 3]) -> FaceId {
        let [a, b, c] = corners.map(|id| self.vertices[id.index()].position);
        let normal = normals::flat_normal(&a, &b, &c);

        for id in corners {
            self.vertices[id.index()].degree += 1;
        }
        for id in corners {
            normals::fold_normal(&mut self.vertices[id.index()], &normal);
        }

        let id = FaceId(self.faces.len() as u32);
        self.faces.push(Face {
            vertices: corners,
            normal,
        });
        id
    }

    /// Corner positions of a face, in winding order.
    pub fn face_positions(&self, face: &Face) -> [Point3<f32>; 3] {
        face.vertices.map(|id| self.vertices[id.index()].position)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?.position;
        let bounds = self.vertices.iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |acc, v| Bounds {
                min: acc.min.inf(&v.position),
                max: acc.max.sup(&v.position),
            },
        );
        Some(bounds)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Unit octahedron, shown when no mesh file is given
    pub fn octahedron(size: f32) -> Self {
        let mut mesh = Self::with_capacity(6, 8);
        let px = mesh.add_vertex(Point3::new(size, 0.0, 0.0));
        let nx = mesh.add_vertex(Point3::new(-size, 0.0, 0.0));
        let py = mesh.add_vertex(Point3::new(0.0, size, 0.0));
        let ny = mesh.add_vertex(Point3::new(0.0, -size, 0.0));
        let pz = mesh.add_vertex(Point3::new(0.0, 0.0, size));
        let nz = mesh.add_vertex(Point3::new(0.0, 0.0, -size));

        // Upper half
        mesh.add_face([px, py, pz]);
        mesh.add_face([pz, py, nx]);
        mesh.add_face([nx, py, nz]);
        mesh.add_face([nz, py, px]);

        // Lower half
        mesh.add_face([px, pz, ny]);
        mesh.add_face([pz, nx, ny]);
        mesh.add_face([nx, nz, ny]);
        mesh.add_face([nz, px, ny]);

        mesh
    }
}
