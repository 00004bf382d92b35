use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::clock::Stopwatch;
use crate::config::Config;
use crate::error::PlatformInitError;
use crate::frame::{Flow, FrameState, InputEvent};
use crate::movement::Key;
use crate::scaler::{ScaleLut, blit_stretch, build_scale_lut};

mod camera;
mod clock;
mod config;
mod error;
mod frame;
mod movement;
mod raycaster;
mod renderer;
mod scaler;
mod world;

type Surface = softbuffer::Surface<Rc<Window>, Rc<Window>>;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<Surface>,
    title: String,

    // Taken by `resumed` to build the frame state
    config: Option<Config>,
    state: Option<FrameState>,
    init_error: Option<PlatformInitError>,

    stopwatch: Stopwatch,
    scale_lut: ScaleLut,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            window: None,
            surface: None,
            title: config.title.clone(),
            config: Some(config),
            state: None,
            init_error: None,
            stopwatch: Stopwatch::new(),
            scale_lut: ScaleLut::empty(),
            frame_counter: 0,
            last_fps_print: Instant::now(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformInitError> {
        let Some(config) = self.config.take() else {
            // Resumed again after a suspend; keep the existing state
            return Ok(());
        };
        let state = FrameState::on_init(config)?;

        let attributes = Window::default_attributes()
            .with_title(self.title.as_str())
            .with_inner_size(LogicalSize::new(state.width as f64, state.height as f64))
            .with_resizable(true);
        let window = Rc::new(event_loop.create_window(attributes)?);

        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| PlatformInitError::Surface(e.to_string()))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| PlatformInitError::Surface(e.to_string()))?;

        let logical = window.inner_size().to_logical::<u32>(window.scale_factor());
        let physical = window.inner_size();
        log::info!("Window size: {}x{}", logical.width, logical.height);
        log::info!("Backbuffer size: {}x{}", physical.width, physical.height);
        if logical.width != physical.width {
            log::info!("This is a high-DPI environment");
        }

        self.scale_lut = build_scale_lut(
            physical.width as usize,
            physical.height as usize,
            state.width,
            state.height,
        );
        self.surface = Some(surface);
        self.window = Some(window.clone());
        self.state = Some(state);

        log::info!("Application started");
        window.request_redraw();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        let (window, surface, state) = match (&self.window, &mut self.surface, &mut self.state) {
            (Some(w), Some(s), Some(st)) if w.id() == id => (w, s, st),
            _ => return,
        };

        if state.on_iterate(self.stopwatch.now_millis()) == Flow::Quit {
            event_loop.exit();
            return;
        }

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return; // Minimized window, skip drawing
        };
        if self.scale_lut.dst_size() != (size.width as usize, size.height as usize) {
            self.scale_lut = build_scale_lut(
                size.width as usize,
                size.height as usize,
                state.width,
                state.height,
            );
        }

        if let Err(e) = surface.resize(dw, dh) {
            log::warn!("Surface resize failed: {e}");
            return;
        }
        // The buffer stays locked until present
        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("Surface lock failed: {e}");
                return;
            }
        };
        blit_stretch(
            &mut buf,
            size.width as usize,
            &state.pixels,
            state.width,
            &self.scale_lut,
        );
        if let Err(e) = buf.present() {
            log::warn!("Present failed: {e}");
        }

        // Print FPS
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            log::info!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
            let stats = state.last_stats();
            if stats.degenerate_rays + stats.unknown_tiles > 0 {
                log::warn!(
                    "{} columns without a wall, {} with unknown tiles",
                    stats.degenerate_rays,
                    stats.unknown_tiles
                );
            }
            self.frame_counter = 0;
            self.last_fps_print = now;
        }

        window.request_redraw();
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        if let Some(state) = &mut self.state {
            if state.on_event(event) == Flow::Quit {
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.init(event_loop) {
            log::error!("Initialization failed: {e}");
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("The close button was pressed; stopping");
                self.dispatch(event_loop, InputEvent::Quit);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    self.dispatch(event_loop, InputEvent::Quit);
                } else if let Some(key) = Key::from_key_code(code) {
                    let event = match state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    };
                    self.dispatch(event_loop, event);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, id),

            WindowEvent::Resized(new_size) => {
                if let Some(state) = &self.state {
                    self.scale_lut = build_scale_lut(
                        new_size.width as usize,
                        new_size.height as usize,
                        state.width,
                        state.height,
                    );
                }
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

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new().map_err(PlatformInitError::from)?;
    // Redraw continuously; the frame loop is driven by RedrawRequested
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(Config::default());
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.init_error.take() {
        return Err(e.into());
    }
    if let Some(state) = app.state.take() {
        state.on_quit();
    }
    log::info!("Application quit successfully");
    Ok(())
}
