//! Terminal viewer for vm3d scenes: an ASCII rasterizer driven by a
//! free-flying camera, with the spaceship and its launch animation.
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vm3d_core::obj::load_obj;
use vm3d_core::scene::make_ship;
use vm3d_core::{perspective_projection, Mat44f, MeshBuffer};

pub mod config;
pub mod control;
pub mod error;
pub mod renderer;

pub use config::ViewerConfig;
pub use control::{CameraControl, CameraMode};
pub use error::{ViewerError, ViewerResult};
pub use renderer::AsciiRenderer;

/// Radians turned per arrow key press.
const ARROW_TURN: f32 = 0.05;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;

/// Alternate screen, mouse capture, hidden cursor and (for the controlling
/// terminal) raw mode. Everything is undone by [`restore`](Self::restore) or
/// on drop, whichever comes first.
pub struct TerminalSession<W: Write> {
    out: W,
    raw: bool,
    active: bool,
}

impl<W: Write> TerminalSession<W> {
    /// Put the controlling terminal in raw mode and take over the screen.
    pub fn enter(out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Self::start(out, true)
    }

    fn start(out: W, raw: bool) -> io::Result<Self> {
        let mut session = Self { out, raw, active: true };
        execute!(
            session.out,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(session)
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Leave the alternate screen and raw mode. Raw mode is disabled even if
    /// writing the screen commands fails. Later calls do nothing.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let screen = execute!(
            self.out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
        let raw = if self.raw {
            terminal::disable_raw_mode()
        } else {
            Ok(())
        };
        screen.and(raw)
    }
}

impl<W: Write> Drop for TerminalSession<W> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore the terminal");
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    ship: MeshBuffer,
    world: Option<MeshBuffer>,
    control: CameraControl,
    renderer: AsciiRenderer,
    config: ViewerConfig,
    running: bool,
    started: Instant,
    last_update: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build the scene described by `config`: the ship, plus the OBJ model
    /// if one is configured.
    pub fn new(config: ViewerConfig) -> ViewerResult<Self> {
        let ship = make_ship(config.scene.subdivisions);
        let world = match &config.scene.obj {
            Some(path) => {
                let mesh = load_obj(path)?;
                info!(path = %path.display(), vertices = mesh.vertex_count(), "loaded scene model");
                Some(mesh)
            }
            None => None,
        };
        Self::with_meshes(config, ship, world)
    }

    pub fn with_meshes(
        config: ViewerConfig,
        ship: MeshBuffer,
        world: Option<MeshBuffer>,
    ) -> ViewerResult<Self> {
        ship.validate()?;
        if let Some(world) = &world {
            world.validate()?;
        }

        let (width, height) = terminal::size()?;
        let now = Instant::now();

        Ok(Self {
            ship,
            world,
            control: CameraControl::new(config.camera.clone()),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            config,
            running: true,
            started: now,
            last_update: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> ViewerResult<()> {
        let mut session = TerminalSession::enter(stdout())?;
        info!("viewer started");

        let result = self.main_loop();
        let restored = session.restore();
        info!("viewer stopped");

        result?;
        Ok(restored?)
    }

    fn main_loop(&mut self) -> ViewerResult<()> {
        let target_frame_time = Duration::from_secs_f32(1.0 / self.config.render.target_fps as f32);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn clock(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Drag(_) => self.control.mouse_moved(mouse.column, mouse.row),
                MouseEventKind::Up(_) => self.control.mouse_released(),
                _ => {}
            },
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char(' ') => self.control.toggle_active(),
            _ => {}
        }

        if !self.control.active {
            return;
        }

        self.control.fast = modifiers.contains(KeyModifiers::SHIFT);
        self.control.slow = ctrl;

        match code {
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'w' => self.control.movement.forward = true,
                's' => self.control.movement.back = true,
                'a' => self.control.movement.left = true,
                'd' => self.control.movement.right = true,
                'e' => self.control.movement.up = true,
                'q' => self.control.movement.down = true,
                'f' => {
                    let now = self.clock();
                    self.control.launch(now);
                }
                'r' => self.control.reset_launch(),
                'c' if !ctrl => self.control.cycle_mode(),
                _ => {}
            },
            KeyCode::Left => self.control.turn(-ARROW_TURN, 0.0),
            KeyCode::Right => self.control.turn(ARROW_TURN, 0.0),
            KeyCode::Up => self.control.turn(0.0, -ARROW_TURN),
            KeyCode::Down => self.control.turn(0.0, ARROW_TURN),
            _ => {}
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;

        let clock = self.clock();
        self.control.update(dt, clock);
        // Key presses only move the camera for the frame they arrive in.
        self.control.movement = Default::default();
    }

    fn view_projection(&self) -> Mat44f {
        let camera = &self.config.camera;
        let aspect = self.renderer.width() as f32
            / (self.renderer.height().max(1) as f32 * CELL_ASPECT);
        let projection =
            perspective_projection(camera.fov_degrees.to_radians(), aspect, camera.near, camera.far);
        projection * self.control.view_matrix()
    }

    fn render(&mut self) -> ViewerResult<()> {
        let view_projection = self.view_projection();
        let light = self.config.light_direction();
        let ship_model = self.control.ship_model(self.clock());

        self.renderer.clear();
        if let Some(world) = &self.world {
            self.renderer
                .render_mesh(world, &Mat44f::IDENTITY, &view_projection, light)?;
        }
        self.renderer
            .render_mesh(&self.ship, &ship_model, &view_projection, light)?;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let status = if self.control.is_launching() { "launching" } else { "on pad" };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "VM3D | FPS: {:.1} | {:?} camera | ship {} | WASD/QE=Move Arrows/Mouse=Look F=Launch R=Reset C=Camera Space=Pause Esc=Quit",
                self.fps, self.control.mode, status
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
