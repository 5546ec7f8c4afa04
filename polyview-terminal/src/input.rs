//! Crossterm events to viewer events.
//!
//! Terminal rows are stretched by the cell aspect so pointer distances are
//! roughly isotropic; the transform controller sees a square pixel grid.
use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use polyview_core::{Event, Key, PointerButton};

/// Key that reloads every file-backed mesh from disk.
pub const RELOAD_KEY: char = 'u';

/// What the terminal loop should do with an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Forward to the session.
    Session(Event),
    /// Re-read scene files.
    Reload,
}

#[derive(Debug, Clone, Copy)]
pub struct InputMapper {
    cell_aspect: f32,
}

impl InputMapper {
    pub fn new(cell_aspect: f32) -> Self {
        Self { cell_aspect }
    }

    /// Viewport in controller units for a terminal of `columns` x `rows`.
    pub fn viewport(&self, columns: u16, rows: u16) -> (f32, f32) {
        (columns as f32, rows as f32 * self.cell_aspect)
    }

    pub fn map(&self, event: &TermEvent) -> Option<Input> {
        match event {
            TermEvent::Key(key) => self.key(key),
            TermEvent::Mouse(mouse) => self.mouse(mouse).map(Input::Session),
            TermEvent::Resize(columns, rows) => {
                let (width, height) = self.viewport(*columns, *rows);
                Some(Input::Session(Event::Resize { width, height }))
            }
            _ => None,
        }
    }

    fn key(&self, key: &KeyEvent) -> Option<Input> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let input = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Input::Session(Event::Quit)
            }
            KeyCode::Char(RELOAD_KEY) => Input::Reload,
            KeyCode::Char(ch) => Input::Session(Event::Key(Key::Char(ch))),
            KeyCode::Esc => Input::Session(Event::Key(Key::Escape)),
            _ => return None,
        };
        Some(input)
    }

    fn mouse(&self, mouse: &MouseEvent) -> Option<Event> {
        let x = mouse.column as f32;
        let y = mouse.row as f32 * self.cell_aspect;
        match mouse.kind {
            MouseEventKind::Down(button) => Some(Event::PointerDown {
                button: pointer_button(button),
                x,
                y,
            }),
            MouseEventKind::Drag(_) => Some(Event::PointerMove { x, y }),
            MouseEventKind::Up(button) => Some(Event::PointerUp {
                button: pointer_button(button),
            }),
            _ => None,
        }
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}
