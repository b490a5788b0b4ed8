use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use maze_caster::camera::{Camera, Command, MoveParams, apply_movement};
use maze_caster::config::{Config, MapSource, StyleKind};
use maze_caster::grid::Grid;
use maze_caster::renderer::{Frame, Style, render_frame};
use maze_caster::scaler::{ScaleLut, blit_nearest, build_scale_lut};
use maze_caster::texture::Texture;

/// Held keys repeat at this rate, independent of the frame rate.
const INPUT_TICK: Duration = Duration::from_millis(33);

const KEY_BINDINGS: &[(KeyCode, Command)] = &[
    (KeyCode::ArrowUp, Command::Forward),
    (KeyCode::KeyW, Command::Forward),
    (KeyCode::ArrowDown, Command::Backward),
    (KeyCode::KeyS, Command::Backward),
    (KeyCode::ArrowLeft, Command::RotateLeft),
    (KeyCode::KeyQ, Command::RotateLeft),
    (KeyCode::ArrowRight, Command::RotateRight),
    (KeyCode::KeyE, Command::RotateRight),
    (KeyCode::KeyA, Command::StrafeLeft),
    (KeyCode::KeyD, Command::StrafeRight),
];

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    grid: Grid,
    camera: Camera,
    moves: MoveParams,
    fov: f32,
    style: Style,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal frame, stretched to the window on present
    frame: Frame,
    scale_lut: ScaleLut,

    // Input
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
    input_accum: Duration,
}

impl App {
    fn new(config: &Config) -> Result<Self> {
        let view = config.view().context("invalid view settings")?;

        let seed = config.seed.unwrap_or_else(clock_seed);
        let grid = config.build_grid(seed).context("failed to build the level")?;
        match config.map {
            MapSource::Fixed => log::info!("Fixed level {}x{}", grid.width(), grid.height()),
            MapSource::Maze => {
                log::info!("Maze {}x{} with seed {}", grid.width(), grid.height(), seed);
                log::debug!("Maze layout:\n{}", grid);
            }
        }

        let camera = config.camera(&grid).context("invalid starting pose")?;
        let style = match config.style {
            StyleKind::Flat => Style::flat(),
            StyleKind::Textured => Style::textured(load_texture(config)),
        };
        let frame = Frame::new(view.screen_width, view.screen_height)?;

        Ok(Self {
            window: None,
            surface: None,
            grid,
            camera,
            moves: view.moves,
            fov: view.fov,
            style,

            frame_counter: 0,
            last_fps_print: Instant::now(),

            frame,
            scale_lut: ScaleLut::empty(),

            keys_down: HashSet::new(),
            last_tick: Instant::now(),
            input_accum: Duration::ZERO,
        })
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn load_texture(config: &Config) -> Texture {
    let Some(path) = &config.texture else {
        return Texture::brick(64);
    };
    match Texture::from_file(path) {
        Ok(tex) => {
            log::debug!(
                "Loaded texture {} ({}x{})",
                path.display(),
                tex.width(),
                tex.height()
            );
            tex
        }
        Err(e) => {
            log::warn!("{}: {}; using brick pattern", path.display(), e);
            Texture::brick(64)
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Maze Caster")
            .with_inner_size(LogicalSize::new(
                self.frame.width() as f64,
                self.frame.height() as f64,
            ));

        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        let surface =
            softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface");

        let size = window.inner_size();
        self.rebuild_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        window.request_redraw();
        self.window = Some(window);

        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => {
                    log::info!("Escape pressed; stopping");
                    event_loop.exit();
                }
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (Some(dw), Some(dh)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // Minimized window, skip drawing
                };

                if let Err(e) = render_frame(
                    &self.grid,
                    self.camera,
                    self.fov,
                    &self.style,
                    &mut self.frame,
                ) {
                    log::error!("Frame failed: {}", e);
                    event_loop.exit();
                    return;
                }

                if let Err(e) = surface.resize(dw, dh) {
                    log::error!("Surface resize failed: {}", e);
                    return;
                }
                let mut buf = match surface.buffer_mut() {
                    Ok(buf) => buf,
                    Err(e) => {
                        log::error!("Surface buffer unavailable: {}", e);
                        return;
                    }
                };
                blit_nearest(
                    &mut buf,
                    dw.get() as usize,
                    self.frame.pixels(),
                    self.frame.width(),
                    &self.scale_lut,
                );
                if let Err(e) = buf.present() {
                    log::error!("Present failed: {}", e);
                }

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
                if elapsed >= 1.0 {
                    log::info!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }

                window.request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                log::debug!("Resized to {}x{}", new_size.width, new_size.height);
                self.rebuild_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    /// Turn held keys into commands at a fixed rate.
    fn tick(&mut self) {
        let now = Instant::now();
        // Cap the backlog so a stalled window does not replay seconds of input
        self.input_accum = (self.input_accum + now.duration_since(self.last_tick)).min(INPUT_TICK * 4);
        self.last_tick = now;

        while self.input_accum >= INPUT_TICK {
            self.input_accum -= INPUT_TICK;
            for &(key, command) in KEY_BINDINGS {
                if self.keys_down.contains(&key) {
                    self.camera = apply_movement(self.camera, &self.grid, command, &self.moves);
                }
            }
        }
    }

    fn rebuild_lut(&mut self, dst_w: usize, dst_h: usize) {
        if dst_w == 0 || dst_h == 0 {
            return;
        }
        self.scale_lut = build_scale_lut(dst_w, dst_h, self.frame.width(), self.frame.height());
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!("Starting with {:?}", config);

    let mut app = App::new(&config)?;

    let event_loop = EventLoop::new()?;
    // Redraws are requested continuously from about_to_wait
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut app)?;

    log::info!("Shut down");
    Ok(())
}
