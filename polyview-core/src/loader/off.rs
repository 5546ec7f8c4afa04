//! Indexed polygon (`OFF`) mesh parser
use std::path::Path;

use super::{read_source, Loaded, MeshFormat, TextCursor};
use crate::error::{IntegrityWarning, LoadError, Result};
use crate::geometry::{Mesh, VertexId};

/// Load an indexed mesh file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Loaded> {
    let source = read_source(path.as_ref())?;
    parse(&source)
}

/// Parse indexed mesh text.
///
/// Vertices keep file order. A face whose leading vertex count is not 3 is
/// still read as `a b c` and reported in [`Loaded::warnings`].
pub fn parse(source: &str) -> Result<Loaded> {
    let mut cursor = TextCursor::new(source, MeshFormat::Off);
    cursor.skip_to_tag()?;

    let vertex_count = cursor.count("vertex count")?;
    let face_count = cursor.count("face count")?;
    let _edge_count = cursor.int("edge count")?;

    let mut mesh = Mesh::with_capacity(
        cursor.capacity_hint(vertex_count),
        cursor.capacity_hint(face_count),
    );
    for _ in 0..vertex_count {
        let position = cursor.point("vertex coordinate")?;
        mesh.add_vertex(position);
    }

    let mut warnings = Vec::new();
    for face in 0..face_count {
        let declared = cursor.int("face vertex count")?;
        let line = cursor.line();

        let corners = [
            vertex_index(&mut cursor, &mesh)?,
            vertex_index(&mut cursor, &mesh)?,
            vertex_index(&mut cursor, &mesh)?,
        ];

        if declared != 3 {
            let warning = IntegrityWarning {
                face,
                line,
                declared,
            };
            tracing::warn!("Mesh integrity: {}", warning);
            warnings.push(warning);
        }

        mesh.add_face(corners);
    }

    tracing::info!(
        "Loaded OFF mesh: {} vertices, {} faces, {} warnings",
        mesh.vertices().len(),
        mesh.faces().len(),
        warnings.len()
    );

    Ok(Loaded {
        mesh,
        format: MeshFormat::Off,
        warnings,
    })
}

fn vertex_index(cursor: &mut TextCursor<'_>, mesh: &Mesh) -> Result<VertexId> {
    let value = cursor.int("vertex index")?;
    usize::try_from(value)
        .ok()
        .and_then(|index| mesh.vertex_id(index))
        .ok_or_else(|| {
            LoadError::format(
                MeshFormat::Off,
                cursor.line(),
                format!(
                    "vertex index {value} out of range (mesh has {} vertices)",
                    mesh.vertices().len()
                ),
            )
        })
}
