//! Flat and running vertex normals.
//!
//! Normals are never renormalized here. Consumers that need unit vectors
//! (shading) normalize at the point of use.

use nalgebra::{Point3, Vector3};

use crate::geometry::Vertex;

/// Right-handed face normal `(p2-p1) × (p3-p1)`, unnormalized.
pub fn flat_normal(p1: &Point3<f32>, p2: &Point3<f32>, p3: &Point3<f32>) -> Vector3<f32> {
    let edge1 = p2 - p1;
    let edge2 = p3 - p1;
    edge1.cross(&edge2)
}

/// Fold a face normal into a vertex's running normal.
///
/// Must be called after `vertex.degree` already counts this face. The update
/// is `normal = (normal + face_normal) / degree`, which divides the whole
/// accumulated value on every fold. It is not an arithmetic mean of the
/// incident face normals once a vertex has three or more faces.
pub fn fold_normal(vertex: &mut Vertex, face_normal: &Vector3<f32>) {
    debug_assert!(vertex.degree > 0, "fold before degree increment");
    let degree = vertex.degree.max(1) as f32;
    vertex.normal = (vertex.normal + face_normal) / degree;
}
