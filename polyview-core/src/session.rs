//! Single-threaded event queue and the per-frame drain.
//!
//! Frontends push [`Event`]s as they arrive and call [`Session::drain`] once
//! per frame. Draining is the only path into the transform controller and the
//! mesh loader while the viewer runs.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::controller::{PointerButton, TransformController};
use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::loader::{self, MeshFormat};
use crate::transform::TransformState;
use crate::view::ViewConfig;
use crate::weld::WeldStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PointerDown { button: PointerButton, x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { button: PointerButton },
    Key(Key),
    /// Frame tick; drives idle spin.
    Tick,
    Resize { width: f32, height: f32 },
    /// Load (or reload) a mesh file into the scene.
    Load {
        path: PathBuf,
        format: Option<MeshFormat>,
    },
    Quit,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}

/// A mesh in the scene and where it came from.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub name: String,
    pub mesh: Mesh,
    pub source: Option<PathBuf>,
}

/// What a renderer needs for one frame.
pub struct Frame<'a> {
    pub transform: TransformState,
    pub view: &'a ViewConfig,
    pub meshes: &'a [SceneMesh],
}

pub struct Session {
    controller: TransformController,
    view: ViewConfig,
    meshes: Vec<SceneMesh>,
    queue: EventQueue,
    weld: WeldStrategy,
    running: bool,
}

impl Session {
    pub fn new(controller: TransformController, view: ViewConfig, weld: WeldStrategy) -> Self {
        Self {
            controller,
            view,
            meshes: Vec::new(),
            queue: EventQueue::new(),
            weld,
            running: true,
        }
    }

    pub fn controller(&self) -> &TransformController {
        &self.controller
    }

    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    pub fn meshes(&self) -> &[SceneMesh] {
        &self.meshes
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn add_mesh(&mut self, mesh: SceneMesh) {
        tracing::debug!("Scene mesh '{}' added", mesh.name);
        self.meshes.push(mesh);
    }

    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Handle every queued event in arrival order.
    ///
    /// Failed loads are logged, leave the scene unchanged, and are returned.
    pub fn drain(&mut self) -> Vec<LoadError> {
        let mut errors = Vec::new();
        while let Some(event) = self.queue.pop() {
            if let Err(err) = self.handle(event) {
                tracing::error!("Failed to load mesh: {}", err);
                errors.push(err);
            }
        }
        errors
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            transform: self.controller.snapshot(),
            view: &self.view,
            meshes: &self.meshes,
        }
    }

    fn handle(&mut self, event: Event) -> Result<(), LoadError> {
        match event {
            Event::PointerDown { button, x, y } => self.controller.pointer_down(button, x, y),
            Event::PointerMove { x, y } => self.controller.pointer_move(x, y),
            Event::PointerUp { button } => self.controller.pointer_up(button),
            Event::Key(key) => self.key(key),
            Event::Tick => self.controller.tick(),
            Event::Resize { width, height } => self.controller.resize(width, height),
            Event::Load { path, format } => self.load(path, format)?,
            Event::Quit => self.running = false,
        }
        Ok(())
    }

    fn key(&mut self, key: Key) {
        let ch = match key {
            Key::Escape | Key::Char('q') => {
                self.running = false;
                return;
            }
            Key::Char(ch) => ch,
        };

        if let Some(command) = self.view.command_for(ch) {
            self.view.apply(command, self.meshes.len());
        } else if !self.controller.key(ch) {
            tracing::trace!("Unbound key {:?}", ch);
        }
    }

    fn load(&mut self, path: PathBuf, format: Option<MeshFormat>) -> Result<(), LoadError> {
        let loaded = loader::load(&path, format, self.weld)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let entry = SceneMesh {
            name,
            mesh: loaded.mesh,
            source: Some(path),
        };

        match self
            .meshes
            .iter_mut()
            .find(|existing| existing.source == entry.source)
        {
            Some(existing) => {
                tracing::info!("Reloaded '{}'", entry.name);
                *existing = entry;
            }
            None => self.add_mesh(entry),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerConfig, Mode, Viewport};
    use crate::view::PolygonMode;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::io::Write;

    fn session() -> Session {
        let controller =
            TransformController::new(ControllerConfig::default(), Viewport::new(800.0, 800.0));
        Session::new(controller, ViewConfig::default(), WeldStrategy::Linear)
    }

    #[test]
    fn test_events_wait_for_drain() {
        let mut s = session();
        s.push(Event::Key(Key::Char('r')));
        s.push(Event::PointerDown {
            button: PointerButton::Primary,
            x: 100.0,
            y: 100.0,
        });
        s.push(Event::PointerMove { x: 110.0, y: 95.0 });
        assert_eq!(s.pending(), 3);
        assert_eq!(s.controller().state().rotation, Vector3::zeros());

        assert!(s.drain().is_empty());
        assert_eq!(s.pending(), 0);
        assert_relative_eq!(s.frame().transform.rotation, Vector3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_view_keys_do_not_reach_controller() {
        let mut s = session();
        s.push(Event::Key(Key::Char('2')));
        s.push(Event::Key(Key::Char('t')));
        s.drain();
        assert_eq!(s.view().polygon_mode, PolygonMode::Lines);
        assert_eq!(s.controller().mode(), Mode::Translate);
    }

    #[test]
    fn test_quit_keys() {
        let mut s = session();
        s.push(Event::Key(Key::Escape));
        s.drain();
        assert!(!s.is_running());

        let mut s = session();
        s.push(Event::Quit);
        s.drain();
        assert!(!s.is_running());
    }

    #[test]
    fn test_tick_and_resize() {
        let mut s = session();
        s.push(Event::Key(Key::Char('i')));
        s.push(Event::Tick);
        s.push(Event::Resize {
            width: 100.0,
            height: 50.0,
        });
        s.drain();
        assert_relative_eq!(s.controller().state().rotation, Vector3::new(0.3, 0.4, 0.0));
        assert_eq!(s.controller().viewport(), Viewport::new(100.0, 50.0));
    }

    #[test]
    fn test_load_and_reload() {
        let mut file = tempfile::Builder::new().suffix(".raw").tempfile().unwrap();
        file.write_all(b"RAW\n1\n0 0 0 1 0 0 0 1 0\n").unwrap();

        let mut s = session();
        s.push(Event::Load {
            path: file.path().to_path_buf(),
            format: None,
        });
        s.push(Event::Load {
            path: file.path().to_path_buf(),
            format: None,
        });
        assert!(s.drain().is_empty());
        assert_eq!(s.meshes().len(), 1);
        assert_eq!(s.meshes()[0].mesh.faces().len(), 1);
    }

    #[test]
    fn test_failed_load_keeps_scene() {
        let mut s = session();
        s.add_mesh(SceneMesh {
            name: "octahedron".into(),
            mesh: Mesh::octahedron(1.0),
            source: None,
        });
        let dir = tempfile::tempdir().unwrap();
        s.push(Event::Load {
            path: dir.path().join("missing.off"),
            format: None,
        });
        s.push(Event::Key(Key::Char('r')));

        let errors = s.drain();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_read());
        assert_eq!(s.meshes().len(), 1);
        // Later events still ran.
        assert_eq!(s.controller().mode(), Mode::Rotate);
    }
}
