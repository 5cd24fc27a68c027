//! Scene builder and runner.
//!
//! [`Scene::run`] owns the winit event loop. The particle cloud is generated
//! up front, the renderer is created when the window first resumes, and the
//! title text arrives later from a [`FontTask`] through the event loop proxy.

use std::sync::Arc;
use std::time::Instant;

use glam::Mat4;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::error::{FontError, SceneError};
use crate::font::{should_retry, FontRequest, FontTask, TextMesh, TextStyle};
use crate::gpu::Renderer;
use crate::input::OrbitControls;
use crate::spawn::ParticleCloud;
use crate::time::Clock;

/// Events delivered to the main thread from outside the window system.
#[derive(Debug)]
pub enum SceneEvent {
    /// The font worker finished, with the mesh or the reason there is none.
    TextReady(Result<TextMesh, FontError>),
}

/// The pulsating heart scene.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct Scene {
    config: SceneConfig,
}

impl Scene {
    /// Create a scene with default settings.
    pub fn new() -> Self {
        Self {
            config: SceneConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the title text. An empty string disables it.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.config.text.content = text.into();
        self
    }

    /// Set the typeface JSON file.
    pub fn with_font(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.font.path = path.into();
        self
    }

    /// Fix the particle RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.particles.field.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Run the scene. Blocks until the window is closed.
    pub fn run(self) -> Result<(), SceneError> {
        self.config.validate()?;

        let started = Instant::now();
        let cloud = self.config.particles.field.generate();
        log::info!(
            "generated {} particles in {:.1?}",
            cloud.len(),
            started.elapsed()
        );

        let event_loop = EventLoop::<SceneEvent>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, cloud, event_loop.create_proxy());
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: SceneConfig,
    cloud: ParticleCloud,
    proxy: EventLoopProxy<SceneEvent>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    controls: OrbitControls,
    clock: Clock,
    font_task: Option<FontTask>,
    font_attempts: u32,
    /// First fatal error; reported by `Scene::run` once the loop exits.
    error: Option<SceneError>,
}

impl App {
    fn new(config: SceneConfig, cloud: ParticleCloud, proxy: EventLoopProxy<SceneEvent>) -> Self {
        let controls = OrbitControls::new(config.camera.rotate_speed);
        Self {
            config,
            cloud,
            proxy,
            window: None,
            renderer: None,
            controls,
            clock: Clock::new(),
            font_task: None,
            font_attempts: 0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        log::error!("{err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SceneError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let renderer = pollster::block_on(Renderer::new(window, &self.config, &self.cloud))?;
        self.renderer = Some(renderer);

        // The cloud lives on the GPU now.
        self.cloud = ParticleCloud::default();
        self.clock = Clock::new();
        self.load_font();
        Ok(())
    }

    fn load_font(&mut self) {
        if self.config.text.content.is_empty() {
            return;
        }

        let request = FontRequest {
            path: self.config.font.path.clone(),
            text: self.config.text.content.clone(),
            style: TextStyle {
                size: self.config.text.size,
                depth: self.config.text.depth,
                curve_segments: self.config.text.curve_segments,
            },
        };
        let proxy = self.proxy.clone();
        self.font_attempts += 1;

        match FontTask::spawn(request, move |result| {
            if proxy.send_event(SceneEvent::TextReady(result)).is_err() {
                log::debug!("event loop closed before the font finished loading");
            }
        }) {
            Ok(task) => self.font_task = Some(task),
            Err(err) => log::error!("failed to start font loader: {err}; continuing without text"),
        }
    }

    fn text_ready(&mut self, result: Result<TextMesh, FontError>) {
        if let Some(task) = self.font_task.take() {
            task.join();
        }

        match result {
            Ok(mesh) => {
                log::info!("title text ready ({} triangles)", mesh.triangle_count());
                if let Some(renderer) = &mut self.renderer {
                    renderer.set_text_mesh(&mesh);
                }
            }
            Err(FontError::Cancelled) => log::debug!("font load cancelled"),
            Err(err) if should_retry(&err, self.font_attempts, self.config.font.retries) => {
                log::warn!("{err}; retrying (attempt {})", self.font_attempts + 1);
                self.load_font();
            }
            Err(err) => log::warn!("{err}; continuing without title text"),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        let size = window.inner_size();
        if size != renderer.size() {
            renderer.resize(size);
        }

        let (elapsed, _) = self.clock.tick();
        let model = Mat4::from_rotation_y(elapsed * self.config.rotation_speed);

        match renderer.render(elapsed, model) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("skipping frame: {e:?}"),
        }

        if self.clock.frame() % 600 == 0 {
            log::debug!("{:.1} fps", self.clock.fps());
        }

        window.request_redraw();
    }
}

impl ApplicationHandler<SceneEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: SceneEvent) {
        match event {
            SceneEvent::TextReady(result) => self.text_ready(result),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(task) = &self.font_task {
                    task.cancel();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.set_pixel_ratio(scale_factor as f32);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            event => {
                if let Some(renderer) = &mut self.renderer {
                    let height = renderer.size().height as f32;
                    self.controls
                        .handle_event(&event, &mut renderer.camera, height);
                }
            }
        }
    }
}
