//! GPU state: surface, scene targets, pipelines and the frame sequence.
//!
//! A frame renders particles and text into an HDR offscreen target with
//! depth, then the bloom chain composites that target onto the surface.

pub mod bloom;
pub mod camera;
pub mod particles;
pub mod text;

use std::sync::Arc;

use bytemuck::Zeroable;
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use bloom::BloomPass;
pub use camera::OrbitCamera;
pub use particles::ParticlePipeline;
pub use text::TextPipeline;

use crate::config::SceneConfig;
use crate::error::{GpuError, SceneError};
use crate::font::TextMesh;
use crate::shader::FrameUniforms;
use crate::spawn::ParticleCloud;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Offscreen colour and depth the scene is drawn into before bloom.
struct SceneTarget {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
}

impl SceneTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene HDR Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            color: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }
}

/// Colours and sprite size baked into every frame's uniforms.
#[derive(Debug, Clone, Copy)]
struct SceneStyle {
    particle_colors: [[f32; 4]; 2],
    text_colors: [[f32; 4]; 2],
    point_size: f32,
}

/// Rendering context: created once the window exists, dropped on shutdown.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    scene_target: SceneTarget,
    particles: ParticlePipeline,
    text: TextPipeline,
    bloom: BloomPass,
    style: SceneStyle,
    pixel_ratio: f32,
    pub camera: OrbitCamera,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        scene: &SceneConfig,
        cloud: &ParticleCloud,
    ) -> Result<Self, SceneError> {
        let size = window.inner_size();
        let pixel_ratio = window.scale_factor() as f32;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).map_err(GpuError::from)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(GpuError::from)?;
        log::info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(GpuError::from)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let scene_target = SceneTarget::new(&device, config.width, config.height);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let particles = ParticlePipeline::new(
            &device,
            &uniform_bind_group_layout,
            &cloud.to_vertices(),
            HDR_FORMAT,
        )?;
        let text = TextPipeline::new(&device, &uniform_bind_group_layout, HDR_FORMAT)?;
        let bloom = BloomPass::new(
            &device,
            &queue,
            &scene.bloom,
            &scene_target.color,
            config.width,
            config.height,
            surface_format,
        )?;

        log::info!(
            "renderer ready: {}x{} {:?}, {} particles",
            config.width,
            config.height,
            surface_format,
            particles.num_particles()
        );

        let style = SceneStyle {
            particle_colors: [
                scene.particles.color_start.to_linear_array(),
                scene.particles.color_end.to_linear_array(),
            ],
            text_colors: [
                scene.text.color_start.to_linear_array(),
                scene.text.color_end.to_linear_array(),
            ],
            point_size: scene.particles.size,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            uniform_bind_group,
            scene_target,
            particles,
            text,
            bloom,
            style,
            pixel_ratio,
            camera: OrbitCamera::new(&scene.camera),
        })
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Reconfigure the surface and rebuild every size-dependent target.
    /// Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.scene_target = SceneTarget::new(&self.device, new_size.width, new_size.height);
        self.bloom.resize(
            &self.device,
            &self.queue,
            &self.scene_target.color,
            new_size.width,
            new_size.height,
        );
        log::debug!("resized to {}x{}", new_size.width, new_size.height);
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Upload the title mesh; it is drawn from the next frame on.
    pub fn set_text_mesh(&mut self, mesh: &TextMesh) {
        self.text.set_mesh(&self.device, mesh);
    }

    /// Uniforms for a frame at `time` seconds with the given model transform.
    pub fn frame_uniforms(&self, time: f32, model: Mat4) -> FrameUniforms {
        FrameUniforms {
            view: self.camera.view_matrix().to_cols_array_2d(),
            proj: self.camera.projection(self.aspect()).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            particle_color_a: self.style.particle_colors[0],
            particle_color_b: self.style.particle_colors[1],
            text_color_a: self.style.text_colors[0],
            text_color_b: self.style.text_colors[1],
            viewport: [self.config.width as f32, self.config.height as f32],
            time,
            point_size: self.style.point_size,
            pixel_ratio: self.pixel_ratio,
            _padding: [0.0; 3],
        }
    }

    pub fn render(&mut self, time: f32, model: Mat4) -> Result<(), wgpu::SurfaceError> {
        let uniforms = self.frame_uniforms(time, model);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_target.color,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.scene_target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.particles.draw(&mut render_pass, &self.uniform_bind_group);
            self.text.draw(&mut render_pass, &self.uniform_bind_group);
        }

        self.bloom.render(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
