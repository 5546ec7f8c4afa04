/// Terminal frontend for the polyview mesh viewer
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use polyview_core::{Camera, Event, MeshFormat, Session};

pub mod input;
pub mod renderer;

pub use input::{Input, InputMapper};
pub use renderer::{AsciiRenderer, CELL_ASPECT};

/// Main application struct for terminal mesh viewing
pub struct TerminalApp {
    session: Session,
    mapper: InputMapper,
    camera: Camera,
    renderer: AsciiRenderer,
    format: Option<MeshFormat>,
    frame_time: Duration,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// `format` is reused when scene files are reloaded.
    pub fn new(mut session: Session, format: Option<MeshFormat>, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let mapper = InputMapper::new(CELL_ASPECT);
        let (vw, vh) = mapper.viewport(width, height);
        session.push(Event::Resize {
            width: vw,
            height: vh,
        });

        Ok(Self {
            session,
            mapper,
            camera: Camera::new(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            format,
            frame_time: Duration::from_secs_f32(1.0 / target_fps.max(1) as f32),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        tracing::info!("Entering render loop at {:?} per frame", self.frame_time);

        while self.session.is_running() {
            let frame_start = Instant::now();

            // Collect input until the frame is due
            loop {
                let remaining = self.frame_time.saturating_sub(frame_start.elapsed());
                if !event::poll(remaining)? {
                    break;
                }
                let event = event::read()?;
                self.handle_input(&event);
            }

            self.session.push(Event::Tick);
            self.session.drain();

            if !self.session.is_running() {
                break;
            }
            self.render()?;

            // Update FPS counter
            self.frame_count += 1;
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self, event: &TermEvent) {
        if let TermEvent::Resize(width, height) = event {
            self.renderer.resize(*width as usize, *height as usize);
        }

        match self.mapper.map(event) {
            Some(Input::Session(event)) => self.session.push(event),
            Some(Input::Reload) => self.reload(),
            None => {}
        }
    }

    fn reload(&mut self) {
        let sources: Vec<_> = self
            .session
            .meshes()
            .iter()
            .filter_map(|mesh| mesh.source.clone())
            .collect();
        tracing::info!("Reloading {} mesh file(s)", sources.len());
        for path in sources {
            self.session.push(Event::Load {
                path,
                format: self.format,
            });
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.session.frame();
        self.renderer.render_frame(&frame, &mut self.camera);

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    fn status_line(&self) -> String {
        let controller = self.session.controller();
        let view = self.session.view();
        let line = format!(
            "polyview | {:?}{} | scale {:.2} | {:?} {:?}{} | FPS: {:.1} | r/t/s z o i k/l 1-4 f c n u q",
            controller.mode(),
            if controller.axis_lock() { " [Z]" } else { "" },
            controller.state().scale,
            view.polygon_mode,
            view.shading,
            if controller.idle_spin() { " spin" } else { "" },
            self.fps
        );
        line.chars().take(self.renderer.width()).collect()
    }
}
