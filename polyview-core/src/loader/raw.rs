//! Triangle-soup (`RAW`) mesh parser with vertex welding
use std::path::Path;

use super::{read_source, Loaded, MeshFormat, TextCursor};
use crate::error::Result;
use crate::geometry::Mesh;
use crate::weld::{VertexWelder, WeldStrategy};

/// Load a triangle-soup file.
pub fn load<P: AsRef<Path>>(path: P, weld: WeldStrategy) -> Result<Loaded> {
    let source = read_source(path.as_ref())?;
    parse(&source, weld)
}

/// Parse triangle-soup text, welding coincident corners into shared vertices.
///
/// Every corner is looked up among the vertices created so far; the face is
/// added once all three corners are resolved. With [`WeldStrategy::Linear`]
/// this is `O(T·V)` overall.
pub fn parse(source: &str, weld: WeldStrategy) -> Result<Loaded> {
    let mut cursor = TextCursor::new(source, MeshFormat::Raw);
    cursor.skip_to_tag()?;

    let triangle_count = cursor.count("triangle count")?;

    let mut mesh = Mesh::with_capacity(0, cursor.capacity_hint(triangle_count));
    let mut welder = VertexWelder::new(weld);
    for _ in 0..triangle_count {
        let p1 = cursor.point("corner coordinate")?;
        let p2 = cursor.point("corner coordinate")?;
        let p3 = cursor.point("corner coordinate")?;

        let corners = [
            welder.weld(&mut mesh, p1),
            welder.weld(&mut mesh, p2),
            welder.weld(&mut mesh, p3),
        ];
        mesh.add_face(corners);
    }

    tracing::info!(
        "Loaded RAW mesh: {} triangles welded into {} vertices ({:?} weld)",
        mesh.faces().len(),
        mesh.vertices().len(),
        weld
    );

    Ok(Loaded {
        mesh,
        format: MeshFormat::Raw,
        warnings: Vec::new(),
    })
}
