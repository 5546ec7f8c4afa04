//! Pointer/keyboard driven transform controller.
//!
//! Pointer positions are in screen pixels with Y growing downward. Deltas are
//! taken in a Y-flipped logical frame where Y grows upward.
//!
//! Releasing the primary button ends the drag and returns the controller to
//! [`Mode::Idle`]; a mode key must be pressed again before the next drag.

use nalgebra::{Point2, Vector3};

use crate::transform::{AuxTransform, TransformState};

/// Which value a drag accumulates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Rotate,
    Translate,
    Scale,
    /// Rotate the aux target at this index.
    RotateAux(usize),
    /// Translate the aux target at this index.
    TranslateAux(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Select a mode and clear the axis lock.
    Select(Mode),
    /// Restrict rotate/translate to Z.
    LockAxis,
    Reset,
    ToggleIdleSpin,
}

/// Radius and scale captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleAnchor {
    pub reference_radius: f32,
    pub reference_scale: f32,
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Screen point to logical, viewport-centred coordinates.
    pub fn centered(&self, p: &Point2<f32>) -> Point2<f32> {
        Point2::new(
            p.x - self.width / 2.0,
            (self.height - p.y) - self.height / 2.0,
        )
    }
}

/// Tunables for [`TransformController`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Rotation added per tick while idle spin is on (degrees).
    pub idle_step: Vector3<f32>,
    /// Initial aux targets; index 0 is the light source by convention.
    pub aux: Vec<AuxTransform>,
    pub bindings: Vec<(char, ControllerCommand)>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            idle_step: Vector3::new(0.3, 0.4, 0.0),
            aux: vec![AuxTransform::at(Vector3::new(5.0, 5.0, 40.0))],
            bindings: vec![
                ('r', ControllerCommand::Select(Mode::Rotate)),
                ('t', ControllerCommand::Select(Mode::Translate)),
                ('s', ControllerCommand::Select(Mode::Scale)),
                ('k', ControllerCommand::Select(Mode::RotateAux(0))),
                ('l', ControllerCommand::Select(Mode::TranslateAux(0))),
                ('z', ControllerCommand::LockAxis),
                ('o', ControllerCommand::Reset),
                ('i', ControllerCommand::ToggleIdleSpin),
            ],
        }
    }
}

pub struct TransformController {
    state: TransformState,
    mode: Mode,
    axis_lock: bool,
    drag_anchor: Option<Point2<f32>>,
    scale_anchor: Option<ScaleAnchor>,
    idle_spin: bool,
    viewport: Viewport,
    config: ControllerConfig,
}

impl TransformController {
    pub fn new(config: ControllerConfig, viewport: Viewport) -> Self {
        Self {
            state: TransformState::with_aux(config.aux.clone()),
            mode: Mode::Idle,
            axis_lock: false,
            drag_anchor: None,
            scale_anchor: None,
            idle_spin: false,
            viewport,
            config,
        }
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    /// Copy of the current transform for this frame.
    pub fn snapshot(&self) -> TransformState {
        self.state.clone()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn axis_lock(&self) -> bool {
        self.axis_lock
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn drag_anchor(&self) -> Option<Point2<f32>> {
        self.drag_anchor
    }

    pub fn scale_anchor(&self) -> Option<ScaleAnchor> {
        self.scale_anchor
    }

    pub fn idle_spin(&self) -> bool {
        self.idle_spin
    }

    pub fn set_idle_spin(&mut self, on: bool) {
        self.idle_spin = on;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Distance in the centred frame from `p` to the current translation.
    pub fn current_radius(&self, p: &Point2<f32>) -> f32 {
        let g = self.viewport.centered(p);
        let dx = g.x - self.state.translation.x;
        let dy = g.y - self.state.translation.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Look up and apply the command bound to `key`. Returns false when the
    /// key is unbound.
    pub fn key(&mut self, key: char) -> bool {
        let command = self
            .config
            .bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| *command);
        match command {
            Some(command) => {
                self.apply(command);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Select(mode) => {
                if let Mode::RotateAux(i) | Mode::TranslateAux(i) = mode {
                    if i >= self.state.aux.len() {
                        tracing::warn!("No aux target {} to select", i);
                        return;
                    }
                }
                tracing::debug!("Transform mode {:?}", mode);
                self.mode = mode;
                self.axis_lock = false;
            }
            ControllerCommand::LockAxis => self.axis_lock = true,
            ControllerCommand::Reset => self.reset(),
            ControllerCommand::ToggleIdleSpin => self.idle_spin = !self.idle_spin,
        }
    }

    /// Zero rotation and translation, unit scale, no scale anchor.
    pub fn reset(&mut self) {
        tracing::debug!("Transform reset");
        self.state.reset();
        self.scale_anchor = None;
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f32, y: f32) {
        if button != PointerButton::Primary {
            return;
        }
        let p = Point2::new(x, y);
        self.drag_anchor = Some(p);
        self.scale_anchor = Some(ScaleAnchor {
            reference_radius: self.current_radius(&p),
            reference_scale: self.state.scale,
        });
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        self.drag_anchor = None;
        self.mode = Mode::Idle;
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let Some(anchor) = self.drag_anchor else {
            return;
        };
        let p = Point2::new(x, y);
        let h = self.viewport.height;
        let dx = p.x - anchor.x;
        let dy = (h - p.y) - (h - anchor.y);
        let lock = self.axis_lock;

        match self.mode {
            Mode::Idle => {}
            Mode::Rotate => rotate_by(&mut self.state.rotation, dx, dy, lock),
            Mode::Translate => translate_by(&mut self.state.translation, dx, dy, lock),
            Mode::RotateAux(i) => {
                if let Some(aux) = self.state.aux.get_mut(i) {
                    rotate_by(&mut aux.rotation, dx, dy, lock);
                }
            }
            Mode::TranslateAux(i) => {
                if let Some(aux) = self.state.aux.get_mut(i) {
                    translate_by(&mut aux.translation, dx, dy, lock);
                }
            }
            Mode::Scale => {
                let radius = self.current_radius(&p);
                if let Some(anchor) = self.scale_anchor {
                    if anchor.reference_radius != 0.0 {
                        self.state.scale =
                            radius / anchor.reference_radius * anchor.reference_scale;
                    }
                }
            }
        }

        self.drag_anchor = Some(p);
    }

    /// Per-frame update; spins the model while idle spin is on and no drag
    /// is active.
    pub fn tick(&mut self) {
        if self.drag_anchor.is_none() && self.idle_spin {
            self.state.rotation += self.config.idle_step;
        }
    }
}

fn rotate_by(rotation: &mut Vector3<f32>, dx: f32, dy: f32, lock: bool) {
    if lock {
        rotation.z += -dx;
    } else {
        rotation.x += dx;
        rotation.y += dy;
    }
}

fn translate_by(translation: &mut Vector3<f32>, dx: f32, dy: f32, lock: bool) {
    if lock {
        translation.z += -dy;
    } else {
        translation.x += dx;
        translation.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> TransformController {
        TransformController::new(ControllerConfig::default(), Viewport::new(800.0, 800.0))
    }

    fn drag(c: &mut TransformController, from: (f32, f32), to: (f32, f32)) {
        c.pointer_down(PointerButton::Primary, from.0, from.1);
        c.pointer_move(to.0, to.1);
    }

    #[test]
    fn test_rotate_drag() {
        let mut c = controller();
        assert!(c.key('r'));
        drag(&mut c, (100.0, 100.0), (110.0, 95.0));
        assert_relative_eq!(c.state().rotation, Vector3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_rotate_axis_lock_uses_z() {
        let mut c = controller();
        c.key('r');
        c.key('z');
        assert_eq!(c.mode(), Mode::Rotate);
        assert!(c.axis_lock());
        drag(&mut c, (100.0, 100.0), (110.0, 95.0));
        assert_relative_eq!(c.state().rotation, Vector3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_translate_drag() {
        let mut c = controller();
        c.key('t');
        drag(&mut c, (100.0, 100.0), (130.0, 80.0));
        assert_relative_eq!(c.state().translation, Vector3::new(30.0, 20.0, 0.0));

        c.key('t');
        c.key('z');
        drag(&mut c, (0.0, 0.0), (5.0, 10.0));
        // dy = -10 in the flipped frame, applied negated to Z.
        assert_relative_eq!(c.state().translation, Vector3::new(30.0, 20.0, 10.0));
    }

    #[test]
    fn test_selecting_mode_clears_axis_lock() {
        let mut c = controller();
        c.key('z');
        assert!(c.axis_lock());
        c.key('s');
        assert!(!c.axis_lock());
    }

    #[test]
    fn test_deltas_follow_previous_sample() {
        let mut c = controller();
        c.key('r');
        c.pointer_down(PointerButton::Primary, 0.0, 0.0);
        c.pointer_move(10.0, 0.0);
        c.pointer_move(15.0, 0.0);
        assert_relative_eq!(c.state().rotation.x, 15.0);
        assert_eq!(c.drag_anchor(), Some(Point2::new(15.0, 0.0)));
    }

    #[test]
    fn test_scale_ratio() {
        let mut c = controller();
        c.key('s');
        // Centre of an 800x800 viewport is (400, 400); 50px to the right.
        c.pointer_down(PointerButton::Primary, 450.0, 400.0);
        assert_eq!(
            c.scale_anchor(),
            Some(ScaleAnchor {
                reference_radius: 50.0,
                reference_scale: 1.0
            })
        );
        c.pointer_move(475.0, 400.0);
        assert_relative_eq!(c.state().scale, 1.5);

        // Ratio stays against the anchor, not the previous sample.
        c.pointer_move(500.0, 400.0);
        assert_relative_eq!(c.state().scale, 2.0);
    }

    #[test]
    fn test_scale_anchor_keeps_previous_factor() {
        let mut c = controller();
        c.key('s');
        drag(&mut c, (450.0, 400.0), (500.0, 400.0));
        c.pointer_up(PointerButton::Primary);
        c.key('s');
        drag(&mut c, (400.0, 300.0), (400.0, 250.0));
        assert_relative_eq!(c.state().scale, 150.0 / 100.0 * 2.0);
    }

    #[test]
    fn test_scale_radius_measured_from_translation() {
        let mut c = controller();
        c.key('t');
        drag(&mut c, (0.0, 0.0), (20.0, 0.0));
        c.pointer_up(PointerButton::Primary);
        // Translation is now (20, 0); pointer at +70 from centre is 50 away.
        c.key('s');
        c.pointer_down(PointerButton::Primary, 470.0, 400.0);
        assert_relative_eq!(c.scale_anchor().unwrap().reference_radius, 50.0);
    }

    #[test]
    fn test_scale_zero_radius_is_noop() {
        let mut c = controller();
        c.key('s');
        drag(&mut c, (400.0, 400.0), (480.0, 400.0));
        assert_eq!(c.state().scale, 1.0);
        assert_eq!(c.drag_anchor(), Some(Point2::new(480.0, 400.0)));
    }

    #[test]
    fn test_pointer_up_returns_to_idle() {
        let mut c = controller();
        c.key('r');
        drag(&mut c, (0.0, 0.0), (10.0, 0.0));
        c.pointer_up(PointerButton::Primary);
        assert!(!c.is_dragging());
        assert_eq!(c.mode(), Mode::Idle);

        drag(&mut c, (0.0, 0.0), (10.0, 0.0));
        assert_relative_eq!(c.state().rotation.x, 10.0);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut c = controller();
        c.key('r');
        c.pointer_down(PointerButton::Secondary, 0.0, 0.0);
        assert!(!c.is_dragging());
        c.pointer_move(10.0, 10.0);
        assert_eq!(c.state().rotation, Vector3::zeros());
    }

    #[test]
    fn test_move_without_drag_ignored() {
        let mut c = controller();
        c.key('t');
        c.pointer_move(10.0, 10.0);
        assert_eq!(c.state().translation, Vector3::zeros());
    }

    #[test]
    fn test_reset() {
        let mut c = controller();
        c.key('r');
        drag(&mut c, (0.0, 0.0), (30.0, 40.0));
        c.key('t');
        drag(&mut c, (0.0, 0.0), (30.0, 40.0));
        c.key('s');
        drag(&mut c, (450.0, 400.0), (600.0, 400.0));
        c.key('z');

        assert!(c.key('o'));
        assert_eq!(c.state().rotation, Vector3::zeros());
        assert_eq!(c.state().translation, Vector3::zeros());
        assert_eq!(c.state().scale, 1.0);
        assert_eq!(c.scale_anchor(), None);
        assert_eq!(c.mode(), Mode::Scale);
        assert!(c.axis_lock());
    }

    #[test]
    fn test_idle_spin() {
        let mut c = controller();
        c.tick();
        assert_eq!(c.state().rotation, Vector3::zeros());

        c.key('i');
        c.tick();
        c.tick();
        assert_relative_eq!(c.state().rotation, Vector3::new(0.6, 0.8, 0.0));

        c.pointer_down(PointerButton::Primary, 0.0, 0.0);
        c.tick();
        assert_relative_eq!(c.state().rotation, Vector3::new(0.6, 0.8, 0.0));
    }

    #[test]
    fn test_aux_target_drag() {
        let mut c = controller();
        let before = c.state().aux[0];
        c.key('l');
        assert_eq!(c.mode(), Mode::TranslateAux(0));
        drag(&mut c, (0.0, 0.0), (3.0, -4.0));
        assert_relative_eq!(
            c.state().aux[0].translation,
            before.translation + Vector3::new(3.0, 4.0, 0.0)
        );
        assert_eq!(c.state().translation, Vector3::zeros());

        c.pointer_up(PointerButton::Primary);
        c.key('k');
        drag(&mut c, (0.0, 0.0), (10.0, 0.0));
        assert_relative_eq!(c.state().aux[0].rotation, Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(c.state().rotation, Vector3::zeros());
    }

    #[test]
    fn test_missing_aux_target_rejected() {
        let mut c = controller();
        c.apply(ControllerCommand::Select(Mode::TranslateAux(3)));
        assert_eq!(c.mode(), Mode::Idle);
    }

    #[test]
    fn test_unbound_key() {
        let mut c = controller();
        assert!(!c.key('#'));
    }

    #[test]
    fn test_resize_changes_flip() {
        let mut c = controller();
        c.resize(200.0, 100.0);
        c.key('s');
        // Centre is (100, 50).
        c.pointer_down(PointerButton::Primary, 100.0, 20.0);
        assert_relative_eq!(c.scale_anchor().unwrap().reference_radius, 30.0);
    }
}
