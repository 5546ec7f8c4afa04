/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;
use polyview_core::view::stripe_color;
use polyview_core::{Bounds, Camera, Frame, Mesh, PolygonMode, Shading, Transform, TransformState};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide.
pub const CELL_ASPECT: f32 = 2.0;

/// Depth bias so edges win over the faces they bound.
const LINE_DEPTH_BIAS: f32 = 1e-3;

const POINT_CHAR: char = 'o';

/// A projected corner: screen x, screen y, NDC depth.
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

/// Matrices shared by every mesh in a frame.
struct FrameSetup {
    mvp: Matrix4<f32>,
    normal_matrix: Matrix4<f32>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Rendered rows as strings, for inspection and tests.
    pub fn lines(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    /// Render every visible mesh of a frame, fitting the camera to them.
    pub fn render_frame(&mut self, frame: &Frame<'_>, camera: &mut Camera) {
        self.clear();

        let visible: Vec<&Mesh> = frame
            .meshes
            .iter()
            .enumerate()
            .filter(|(i, _)| frame.view.is_visible(*i))
            .map(|(_, scene)| &scene.mesh)
            .collect();
        let Some(bounds) = scene_bounds(&visible) else {
            return;
        };

        camera.set_viewport(self.width as u32, self.height as u32, CELL_ASPECT);
        camera.fit(&bounds);

        let setup = self.frame_setup(&frame.transform, frame.view.light, &bounds, camera);
        for mesh in visible {
            self.render_mesh(mesh, &setup, frame);
        }
    }

    fn frame_setup(
        &self,
        state: &TransformState,
        light: usize,
        bounds: &Bounds,
        camera: &Camera,
    ) -> FrameSetup {
        // One drag cell moves the model about one cell at the target depth.
        let world_per_cell =
            2.0 * camera.distance() * (camera.fov * 0.5).tan() / (self.height.max(1) as f32 * CELL_ASPECT);
        let centre = Transform::translation_matrix(&-bounds.center().coords);
        let model = Transform::model_matrix(state, world_per_cell) * centre;
        let mvp = Transform::mvp_matrix(&model, &camera.view_matrix(), &camera.projection_matrix());

        let light_dir = state
            .aux
            .get(light)
            .map(|aux| aux.position())
            .and_then(|p| p.try_normalize(1e-9))
            .unwrap_or_else(Vector3::z);

        FrameSetup {
            mvp,
            normal_matrix: Transform::rotation_matrix(&state.rotation),
            light_dir,
        }
    }

    fn render_mesh(&mut self, mesh: &Mesh, setup: &FrameSetup, frame: &Frame<'_>) {
        let projected: Vec<Option<ScreenPoint>> = mesh
            .vertices()
            .iter()
            .map(|v| Camera::project_to_screen(&setup.mvp, &v.position, self.width as u32, self.height as u32))
            .collect();

        let mode = frame.view.polygon_mode;
        if mode == PolygonMode::Points {
            for point in projected.iter().flatten() {
                self.plot(point.0, point.1, point.2, POINT_CHAR, Color::White);
            }
            return;
        }

        for (index, face) in mesh.faces().iter().enumerate() {
            let corners = face.vertices.map(|id| projected[id.index()]);
            let [Some(a), Some(b), Some(c)] = corners else {
                continue; // Triangle is clipped
            };
            let screen = [a, b, c];

            if matches!(mode, PolygonMode::Fill | PolygonMode::FillAndLines) {
                let brightness = match frame.view.shading {
                    Shading::Flat => [self.brightness(&face.normal, setup); 3],
                    Shading::Smooth => face
                        .vertices
                        .map(|id| self.brightness(&mesh.vertex(id).normal, setup)),
                };
                let color = if frame.view.stripes {
                    let [r, g, b] = stripe_color(index);
                    Some(Color::Rgb {
                        r: (r * 255.0) as u8,
                        g: (g * 255.0) as u8,
                        b: (b * 255.0) as u8,
                    })
                } else {
                    None
                };
                self.rasterize_triangle(&screen, brightness, color);
            }

            if matches!(mode, PolygonMode::Lines | PolygonMode::FillAndLines) {
                for (p, q) in [(a, b), (b, c), (c, a)] {
                    self.draw_line(p, q);
                }
            }
        }
    }

    /// Lambert term for a model-space normal. Normals arrive unnormalized.
    fn brightness(&self, normal: &Vector3<f32>, setup: &FrameSetup) -> f32 {
        setup
            .normal_matrix
            .transform_vector(normal)
            .try_normalize(1e-12)
            .map_or(0.0, |n| n.dot(&setup.light_dir).max(0.0))
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], brightness: [f32; 3], color: Option<Color>) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let light = w0 * brightness[0] + w1 * brightness[1] + w2 * brightness[2];
                let character = ramp(light);
                let color = color.unwrap_or_else(|| shade_color(character));
                self.plot(px, py, depth, character, color);
            }
        }
    }

    /// Bresenham line with depth interpolated along its length.
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint) {
        let character = edge_char(to.0 - from.0, to.1 - from.1);
        let Some((from, to)) = clip_segment(from, to, self.width as f32, self.height as f32) else {
            return;
        };
        let (mut x0, mut y0) = (from.0.floor() as i32, from.1.floor() as i32);
        let (x1, y1) = (to.0.floor() as i32, to.1.floor() as i32);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let mut step = 0.0;

        loop {
            let depth = from.2 + (to.2 - from.2) * (step / steps) - LINE_DEPTH_BIAS;
            self.plot(x0 as f32 + 0.5, y0 as f32 + 0.5, depth, character, Color::White);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }

    /// Depth-tested write of one cell.
    fn plot(&mut self, x: f32, y: f32, depth: f32, character: char, color: Color) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Liang-Barsky clip of a screen segment to `[0, width] x [0, height]`.
/// Depth is interpolated with the clipped endpoints.
fn clip_segment(
    from: ScreenPoint,
    to: ScreenPoint,
    width: f32,
    height: f32,
) -> Option<(ScreenPoint, ScreenPoint)> {
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);

    for (p, q) in [(-dx, from.0), (dx, width - from.0), (-dy, from.1), (dy, height - from.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f32| {
        (
            from.0 + dx * t,
            from.1 + dy * t,
            from.2 + (to.2 - from.2) * t,
        )
    };
    Some((at(t0), at(t1)))
}

fn scene_bounds(meshes: &[&Mesh]) -> Option<Bounds> {
    meshes
        .iter()
        .filter_map(|mesh| mesh.bounds())
        .reduce(|a, b| Bounds {
            min: a.min.inf(&b.min),
            max: a.max.sup(&b.max),
        })
}

fn ramp(brightness: f32) -> char {
    let char_index = (brightness.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    // Lit faces never vanish into the background.
    LUMINOSITY_RAMP[char_index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
}

/// Color based on character intensity
fn shade_color(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

fn edge_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs() * CELL_ASPECT);
    if ay < ax * 0.5 {
        '-'
    } else if ax < ay * 0.5 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
