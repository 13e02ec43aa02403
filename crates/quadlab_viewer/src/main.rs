//! quadlab: a live viewer for a vertex/fragment shader pair drawn over a quad.
//!
//! winit drives the loop through `ApplicationHandler`. Startup is config →
//! window → GPU → geometry → texture → shaders. After that the loop renders
//! one frame per redraw and reacts to single key presses:
//!
//!   F5 reload config, texture and shaders    F6 screenshot
//!   Space pause/resume                       Left/Right scrub while paused
//!   Q quit with status 2
//!
//! A shader that fails to build leaves the window cleared to red until the
//! next successful reload.

mod args;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use glam::{Vec2, Vec4};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use args::Args;
use quadlab_core::{Command, ExitStatus, Flow, Key, RenderHost, Session};
use quadlab_platform::window::PlatformConfig;
use quadlab_render::{
    BindLayouts, FrameDriver, FrameInputs, GpuContext, GpuVertexBatch, ShaderPipeline,
    TextureStage, SCREENSHOT_PATH,
};

/// Everything that lives on the GPU.
struct Renderer {
    gpu: GpuContext,
    layouts: BindLayouts,
    batch: GpuVertexBatch,
    shaders: ShaderPipeline,
    texture: TextureStage,
    frame: FrameDriver,
}

impl Renderer {
    fn new(gpu: GpuContext) -> Self {
        let layouts = BindLayouts::new(&gpu.device);
        let batch = GpuVertexBatch::new(&gpu.device);
        let shaders = ShaderPipeline::new(gpu.surface_format);
        let texture = TextureStage::new(&gpu.device, &gpu.queue, &layouts);
        Self {
            gpu,
            layouts,
            batch,
            shaders,
            texture,
            frame: FrameDriver::new(),
        }
    }

    fn build_geometry(&mut self, grid: Option<u32>) {
        let batch = self.batch.batch_mut();
        batch.clear();
        match grid {
            Some(n) => batch.push_checkerboard(n),
            None => batch.push_quad(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0), Vec4::ZERO),
        }
        self.batch.sync(&self.gpu.queue);
    }
}

impl RenderHost for Renderer {
    fn reload_texture(&mut self, path: &Path) {
        if let Err(err) = self
            .texture
            .reload(&self.gpu.device, &self.gpu.queue, &self.layouts, path)
        {
            log::error!("{err}");
        }
    }

    fn reload_shaders(&mut self, vert: &Path, frag: &Path) {
        match self
            .shaders
            .reload(&self.gpu.device, &self.layouts, vert, frag)
        {
            Ok(()) => log::info!("Successfully reloaded the shaders"),
            Err(err) => log::error!("{err}"),
        }
    }

    fn invalidate_shaders(&mut self) {
        self.shaders.invalidate();
    }

    fn request_screenshot(&mut self) {
        self.frame.request_capture();
    }
}

struct EngineState {
    window: Arc<Window>,
    renderer: Renderer,
    session: Session,
    cursor: (f64, f64),
}

impl EngineState {
    fn render(&mut self) {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        if (size.width, size.height) != self.renderer.gpu.size {
            self.renderer.gpu.resize(size.width, size.height);
        }

        let inputs = FrameInputs {
            framebuffer: (size.width, size.height),
            cursor: self.cursor,
            time: self.session.time.time,
        };
        let renderer = &mut self.renderer;
        let captured = renderer.frame.render(
            &renderer.gpu,
            &renderer.batch,
            &renderer.shaders,
            &renderer.texture,
            inputs,
        );

        match captured {
            Some(Ok(frame)) => match frame.save(Path::new(SCREENSHOT_PATH)) {
                Ok(()) => log::info!(
                    "Saved {}x{} screenshot to {}",
                    frame.width,
                    frame.height,
                    SCREENSHOT_PATH
                ),
                Err(err) => log::error!("{err}"),
            },
            Some(Err(err)) => log::error!("Screenshot failed: {err}"),
            None => {}
        }

        self.session.time.advance(Instant::now());
    }
}

struct App {
    config: PlatformConfig,
    args: Args,
    session: Option<Session>,
    state: Option<EngineState>,
    exit: Option<ExitStatus>,
}

impl App {
    fn new(args: Args, session: Session) -> Self {
        Self {
            config: PlatformConfig::default(),
            args,
            session: Some(session),
            state: None,
            exit: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, message: &dyn std::fmt::Display) {
        log::error!("{message}");
        self.exit = Some(ExitStatus::Fatal);
        event_loop.exit();
    }

    fn exit_status(&self) -> ExitStatus {
        self.exit.unwrap_or(ExitStatus::Normal)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(session) = self.session.take() else {
            return;
        };

        let window = match quadlab_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => return self.fail(event_loop, &err),
        };
        let gpu = match GpuContext::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(err) => return self.fail(event_loop, &err),
        };

        let mut renderer = Renderer::new(gpu);
        renderer.build_geometry(self.args.grid);
        session.load_resources(&mut renderer);
        log::info!("Pipeline is {}", renderer.shaders.status());

        self.state = Some(EngineState {
            window,
            renderer,
            session,
            cursor: (0.0, 0.0),
        });
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                state
                    .renderer
                    .gpu
                    .resize(physical_size.width, physical_size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                let Some(command) = map_key(key_code).and_then(Command::from_key) else {
                    return;
                };
                log::debug!("Command: {command}");
                if let Flow::Exit(status) = state.session.dispatch(command, &mut state.renderer) {
                    log::info!("Quit requested, exiting with status {}", status.code());
                    self.exit = Some(status);
                    event_loop.exit();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.cursor = (position.x, position.y);
            }

            WindowEvent::RedrawRequested => state.render(),

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::F5 => Some(Key::F5),
        KeyCode::F6 => Some(Key::F6),
        KeyCode::Space => Some(Key::Space),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        _ => None,
    }
}

fn run() -> ExitStatus {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            log::error!("{err}");
            return ExitStatus::Fatal;
        }
    };

    let session = match Session::start(&args.config) {
        Ok(session) => session,
        Err(err) => {
            log::error!("{err}");
            return ExitStatus::Fatal;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return ExitStatus::Fatal;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args, session);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        return ExitStatus::Fatal;
    }
    app.exit_status()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("quadlab starting...");
    run().into()
}
