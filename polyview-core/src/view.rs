//! View configuration handed to the renderer.
//!
//! Geometry and the transform controller never read this; it only describes
//! how the renderer should draw what they produce.

/// How polygons are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    Points,
    Lines,
    #[default]
    Fill,
    /// Filled polygons with their edges drawn on top.
    FillAndLines,
}

/// Which normals drive lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// One flat normal per face.
    #[default]
    Flat,
    /// Per-vertex fold normals, interpolated across the face.
    Smooth,
}

impl Shading {
    pub fn toggled(self) -> Self {
        match self {
            Shading::Flat => Shading::Smooth,
            Shading::Smooth => Shading::Flat,
        }
    }
}

/// Which meshes are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    All,
    Only(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    SetPolygonMode(PolygonMode),
    ToggleShading,
    ToggleStripes,
    /// Cycle All → 0 → 1 → … → All.
    NextMesh,
}

/// Per-face colours cycled by face index when stripes are on.
pub const STRIPE_PALETTE: [[f32; 3]; 8] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 1.0, 1.0],
    [0.0, 0.0, 0.0],
];

pub fn stripe_color(face_index: usize) -> [f32; 3] {
    STRIPE_PALETTE[face_index % STRIPE_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub polygon_mode: PolygonMode,
    pub shading: Shading,
    pub stripes: bool,
    pub visibility: Visibility,
    /// Aux target index used as the light position.
    pub light: usize,
    pub bindings: Vec<(char, ViewCommand)>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::default(),
            shading: Shading::default(),
            stripes: false,
            visibility: Visibility::default(),
            light: 0,
            bindings: vec![
                ('1', ViewCommand::SetPolygonMode(PolygonMode::Points)),
                ('2', ViewCommand::SetPolygonMode(PolygonMode::Lines)),
                ('3', ViewCommand::SetPolygonMode(PolygonMode::Fill)),
                ('4', ViewCommand::SetPolygonMode(PolygonMode::FillAndLines)),
                ('f', ViewCommand::ToggleShading),
                ('c', ViewCommand::ToggleStripes),
                ('n', ViewCommand::NextMesh),
            ],
        }
    }
}

impl ViewConfig {
    pub fn command_for(&self, key: char) -> Option<ViewCommand> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| *command)
    }

    pub fn apply(&mut self, command: ViewCommand, mesh_count: usize) {
        match command {
            ViewCommand::SetPolygonMode(mode) => self.polygon_mode = mode,
            ViewCommand::ToggleShading => self.shading = self.shading.toggled(),
            ViewCommand::ToggleStripes => self.stripes = !self.stripes,
            ViewCommand::NextMesh => {
                self.visibility = match self.visibility {
                    Visibility::All if mesh_count > 1 => Visibility::Only(0),
                    Visibility::Only(i) if i + 1 < mesh_count => Visibility::Only(i + 1),
                    _ => Visibility::All,
                };
            }
        }
    }

    pub fn is_visible(&self, mesh_index: usize) -> bool {
        match self.visibility {
            Visibility::All => true,
            Visibility::Only(i) => i == mesh_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripe_palette_cycles() {
        assert_eq!(stripe_color(0), [0.0, 0.0, 1.0]);
        assert_eq!(stripe_color(9), stripe_color(1));
    }

    #[test]
    fn test_bindings() {
        let mut view = ViewConfig::default();
        let command = view.command_for('4').unwrap();
        view.apply(command, 1);
        assert_eq!(view.polygon_mode, PolygonMode::FillAndLines);

        view.apply(view.command_for('f').unwrap(), 1);
        assert_eq!(view.shading, Shading::Smooth);
        assert!(view.command_for('x').is_none());
    }

    #[test]
    fn test_next_mesh_cycles() {
        let mut view = ViewConfig::default();
        let seen: Vec<Visibility> = (0..4)
            .map(|_| {
                view.apply(ViewCommand::NextMesh, 2);
                view.visibility
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                Visibility::Only(0),
                Visibility::Only(1),
                Visibility::All,
                Visibility::Only(0)
            ]
        );
        assert!(view.is_visible(0));
        assert!(!view.is_visible(1));
    }

    #[test]
    fn test_next_mesh_single() {
        let mut view = ViewConfig::default();
        view.apply(ViewCommand::NextMesh, 1);
        assert_eq!(view.visibility, Visibility::All);
    }
}
