//! Unreal-style bloom.
//!
//! The HDR scene is high-passed into a half-resolution bright buffer, blurred
//! down a chain of [`MIP_COUNT`] progressively smaller targets (horizontal then
//! vertical per level), and the blurred levels are weighted back onto the scene
//! with linear tone mapping into the surface.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::HDR_FORMAT;
use crate::config::BloomConfig;
use crate::error::ShaderError;
use crate::shader;

/// Number of blur levels.
pub const MIP_COUNT: usize = 5;

/// Gaussian kernel radius (and sigma) per level.
pub const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];

/// Base weights per level before the radius lerp.
pub const BLOOM_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Width of the high-pass luminance ramp above the threshold.
pub const SMOOTH_WIDTH: f32 = 0.01;

/// Size of each blur level: half the surface at level 0, halving after.
pub fn mip_sizes(width: u32, height: u32) -> [(u32, u32); MIP_COUNT] {
    let mut sizes = [(1, 1); MIP_COUNT];
    for (i, size) in sizes.iter_mut().enumerate() {
        let shift = i as u32 + 1;
        *size = ((width >> shift).max(1), (height >> shift).max(1));
    }
    sizes
}

/// Per-level weights: `radius` blends each factor toward its mirror `1.2 - f`.
pub fn bloom_factors(radius: f32) -> [f32; MIP_COUNT] {
    BLOOM_FACTORS.map(|f| f + (1.2 - f - f) * radius)
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct HighPassParams {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct BlurParams {
    direction: [f32; 2],
    texel_size: [f32; 2],
    kernel_radius: f32,
    sigma: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CompositeParams {
    factors: [[f32; 4]; 2],
    strength: f32,
    exposure: f32,
    _pad: [f32; 2],
}

impl CompositeParams {
    fn new(config: &BloomConfig) -> Self {
        let f = bloom_factors(config.radius);
        Self {
            factors: [[f[0], f[1], f[2], f[3]], [f[4], 0.0, 0.0, 0.0]],
            strength: config.strength,
            exposure: config.exposure,
            _pad: [0.0; 2],
        }
    }
}

/// Size-dependent textures and the bind groups that read them.
struct BloomTargets {
    bright: wgpu::TextureView,
    horizontal: Vec<wgpu::TextureView>,
    vertical: Vec<wgpu::TextureView>,
    high_pass_group: wgpu::BindGroup,
    /// Two per level: horizontal then vertical.
    blur_groups: Vec<wgpu::BindGroup>,
    composite_group: wgpu::BindGroup,
}

/// GPU resources for the bloom chain.
pub struct BloomPass {
    high_pass_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    source_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    high_pass_params: wgpu::Buffer,
    /// One buffer per blur pass; texel sizes differ per level.
    blur_params: Vec<wgpu::Buffer>,
    composite_params: wgpu::Buffer,
    targets: BloomTargets,
}

impl BloomPass {
    /// Build the chain for a `width` x `height` scene rendered into `scene_view`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &BloomConfig,
        scene_view: &wgpu::TextureView,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let high_pass_shader = shader::compile(device, "Bloom High-Pass", shader::HIGH_PASS_SOURCE)?;
        let blur_shader = shader::compile(device, "Bloom Blur", shader::BLUR_SOURCE)?;
        let composite_shader = shader::compile(device, "Bloom Composite", shader::COMPOSITE_SOURCE)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Texture + sampler + params, shared by the high-pass and blur programs.
        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Source Bind Group Layout"),
            entries: &[
                texture_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                uniform_entry(2),
            ],
        });

        let mut composite_entries: Vec<wgpu::BindGroupLayoutEntry> =
            (0..=MIP_COUNT as u32).map(texture_entry).collect();
        composite_entries.push(wgpu::BindGroupLayoutEntry {
            binding: MIP_COUNT as u32 + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        composite_entries.push(uniform_entry(MIP_COUNT as u32 + 2));
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Bind Group Layout"),
            entries: &composite_entries,
        });

        let high_pass_pipeline = fullscreen_pipeline(
            device,
            "Bloom High-Pass Pipeline",
            &high_pass_shader,
            &source_layout,
            HDR_FORMAT,
        );
        let blur_pipeline =
            fullscreen_pipeline(device, "Bloom Blur Pipeline", &blur_shader, &source_layout, HDR_FORMAT);
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Bloom Composite Pipeline",
            &composite_shader,
            &composite_layout,
            surface_format,
        );

        let high_pass_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom High-Pass Params"),
            contents: bytemuck::bytes_of(&HighPassParams {
                threshold: config.threshold,
                smooth_width: SMOOTH_WIDTH,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let blur_params: Vec<wgpu::Buffer> = (0..MIP_COUNT * 2)
            .map(|_| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Bloom Blur Params"),
                    size: std::mem::size_of::<BlurParams>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let composite_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Composite Params"),
            contents: bytemuck::bytes_of(&CompositeParams::new(config)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let targets = BloomTargets::new(
            device,
            &source_layout,
            &composite_layout,
            &sampler,
            &high_pass_params,
            &blur_params,
            &composite_params,
            scene_view,
            width,
            height,
        );

        let bloom = Self {
            high_pass_pipeline,
            blur_pipeline,
            composite_pipeline,
            source_layout,
            composite_layout,
            sampler,
            high_pass_params,
            blur_params,
            composite_params,
            targets,
        };
        bloom.write_params(queue, width, height);
        Ok(bloom)
    }

    /// Write texel sizes for the current level sizes.
    fn write_params(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        for (level, &(w, h)) in mip_sizes(width, height).iter().enumerate() {
            let radius = KERNEL_RADII[level] as f32;
            let texel_size = [1.0 / w as f32, 1.0 / h as f32];
            for (pass, direction) in [[1.0, 0.0], [0.0, 1.0]].into_iter().enumerate() {
                let params = BlurParams {
                    direction,
                    texel_size,
                    kernel_radius: radius,
                    sigma: radius,
                    _pad: [0.0; 2],
                };
                queue.write_buffer(&self.blur_params[level * 2 + pass], 0, bytemuck::bytes_of(&params));
            }
        }
    }

    /// Recreate every target after the scene target changed size.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene_view: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) {
        self.targets = BloomTargets::new(
            device,
            &self.source_layout,
            &self.composite_layout,
            &self.sampler,
            &self.high_pass_params,
            &self.blur_params,
            &self.composite_params,
            scene_view,
            width,
            height,
        );
        self.write_params(queue, width, height);
    }

    /// High-pass, blur chain, then composite into `output_view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output_view: &wgpu::TextureView) {
        let targets = &self.targets;

        fullscreen_pass(
            encoder,
            "Bloom High-Pass",
            &targets.bright,
            &self.high_pass_pipeline,
            &targets.high_pass_group,
        );

        for level in 0..MIP_COUNT {
            fullscreen_pass(
                encoder,
                "Bloom Blur Horizontal",
                &targets.horizontal[level],
                &self.blur_pipeline,
                &targets.blur_groups[level * 2],
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur Vertical",
                &targets.vertical[level],
                &self.blur_pipeline,
                &targets.blur_groups[level * 2 + 1],
            );
        }

        fullscreen_pass(
            encoder,
            "Bloom Composite",
            output_view,
            &self.composite_pipeline,
            &targets.composite_group,
        );
    }
}

impl BloomTargets {
    #[allow(clippy::too_many_arguments)]
    fn new(
        device: &wgpu::Device,
        source_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        high_pass_params: &wgpu::Buffer,
        blur_params: &[wgpu::Buffer],
        composite_params: &wgpu::Buffer,
        scene_view: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        let sizes = mip_sizes(width, height);
        let (bright_w, bright_h) = sizes[0];
        let bright = create_target(device, "Bloom Bright Texture", bright_w, bright_h);
        let horizontal: Vec<_> = sizes
            .iter()
            .map(|&(w, h)| create_target(device, "Bloom Horizontal Texture", w, h))
            .collect();
        let vertical: Vec<_> = sizes
            .iter()
            .map(|&(w, h)| create_target(device, "Bloom Vertical Texture", w, h))
            .collect();

        let source_group = |label: &str, view: &wgpu::TextureView, params: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params.as_entire_binding(),
                    },
                ],
            })
        };

        let high_pass_group = source_group("Bloom High-Pass Bind Group", scene_view, high_pass_params);

        // Level 0 reads the bright buffer; each later level reads the
        // previous level's vertical result, downsampling through the sampler.
        let mut blur_groups = Vec::with_capacity(MIP_COUNT * 2);
        for level in 0..MIP_COUNT {
            let input = if level == 0 { &bright } else { &vertical[level - 1] };
            blur_groups.push(source_group(
                "Bloom Blur Horizontal Bind Group",
                input,
                &blur_params[level * 2],
            ));
            blur_groups.push(source_group(
                "Bloom Blur Vertical Bind Group",
                &horizontal[level],
                &blur_params[level * 2 + 1],
            ));
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(scene_view),
        }];
        for (level, view) in vertical.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: level as u32 + 1,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: MIP_COUNT as u32 + 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: MIP_COUNT as u32 + 2,
            resource: composite_params.as_entire_binding(),
        });
        let composite_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Composite Bind Group"),
            layout: composite_layout,
            entries: &entries,
        });

        Self {
            bright,
            horizontal,
            vertical,
            high_pass_group,
            blur_groups,
            composite_group,
        }
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_sizes_halve() {
        let sizes = mip_sizes(1280, 720);
        assert_eq!(sizes, [(640, 360), (320, 180), (160, 90), (80, 45), (40, 22)]);
    }

    #[test]
    fn test_mip_sizes_never_zero() {
        for &(w, h) in &mip_sizes(3, 1) {
            assert!(w >= 1 && h >= 1);
        }
        assert_eq!(mip_sizes(1, 1), [(1, 1); MIP_COUNT]);
    }

    #[test]
    fn test_bloom_factors_lerp() {
        assert_eq!(bloom_factors(0.0), BLOOM_FACTORS);
        let mirrored = bloom_factors(1.0);
        for (m, f) in mirrored.iter().zip(BLOOM_FACTORS) {
            assert!((m - (1.2 - f)).abs() < 1e-6);
        }
        let f = bloom_factors(0.1);
        assert!((f[0] - 0.92).abs() < 1e-6);
        assert!((f[4] - 0.28).abs() < 1e-6);
    }

    #[test]
    fn test_param_layouts_match_wgsl() {
        assert_eq!(std::mem::size_of::<HighPassParams>(), 16);
        assert_eq!(std::mem::size_of::<BlurParams>(), 32);
        assert_eq!(std::mem::size_of::<CompositeParams>(), 48);
    }

    #[test]
    fn test_composite_params_pack_factors() {
        let params = CompositeParams::new(&BloomConfig::default());
        assert_eq!(params.strength, 1.6);
        assert_eq!(params.exposure, 1.5);
        assert!((params.factors[1][0] - 0.28).abs() < 1e-6);
        assert_eq!(params.factors[1][1..], [0.0; 3]);
    }
}
