/// polyview core library - mesh ingestion and interactive transforms
///
/// This library provides the renderer-independent parts of the viewer:
/// OFF/RAW loading with vertex welding and running normals, the pointer
/// driven transform controller, and the per-frame event session.

pub mod controller;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod normals;
pub mod projection;
pub mod session;
pub mod transform;
pub mod view;
pub mod weld;

// Re-export commonly used types
pub use controller::{ControllerConfig, Mode, PointerButton, TransformController, Viewport};
pub use error::{IntegrityWarning, LoadError};
pub use geometry::{Bounds, Face, Mesh, Vertex, VertexId};
pub use loader::{Loaded, MeshFormat};
pub use projection::Camera;
pub use session::{Event, Frame, Key, SceneMesh, Session};
pub use transform::{AuxTransform, Transform, TransformState};
pub use view::{PolygonMode, Shading, ViewConfig};
pub use weld::WeldStrategy;
