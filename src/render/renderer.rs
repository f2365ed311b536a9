//! Gallery renderer
//!
//! One render pass per frame: the equirectangular background first (no depth
//! write), then every plaque with depth testing. Both are tone mapped with
//! ACES filmic at the configured exposure.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::mesh::{plaque_transform, PlaqueMesh, PlaqueVertex};
use crate::gpu_context::DEPTH_FORMAT;
use crate::media::{EnvironmentTexture, MediaLibrary};
use crate::scene::{PerspectiveCamera, SurfaceHandle, SurfaceRegistry, TextureHandle};
use crate::shaders;

/// Uniforms shared by both pipelines
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GlobalUniforms {
    view_proj: [[f32; 4]; 4],
    inv_view_proj: [[f32; 4]; 4],
    /// xyz: eye position, w: exposure
    camera: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PlaqueUniforms {
    model: [[f32; 4]; 4],
}

/// GPU state for one registered plaque
struct PlaqueBinding {
    uniform_buffer: wgpu::Buffer,
    texture: TextureHandle,
    double_sided: bool,
    /// Missing until the media library has created the texture
    bind_group: Option<wgpu::BindGroup>,
}

/// Draws the background and the plaques
pub struct GalleryRenderer {
    background_pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    single_sided_pipeline: wgpu::RenderPipeline,
    plaque_layout: wgpu::BindGroupLayout,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    environment_bind_group: wgpu::BindGroup,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    plaque_sampler: wgpu::Sampler,

    plaques: HashMap<SurfaceHandle, PlaqueBinding>,
    /// Draw order, matching registry order
    draw_order: Vec<SurfaceHandle>,
    exposure: f32,
}

impl GalleryRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        environment: &EnvironmentTexture,
        exposure: f32,
    ) -> Self {
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gallery Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // Environment: [0] float texture (not filterable), [1] sampler
        let environment_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Environment Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        // Plaque: [0] model uniform, [1] frame texture, [2] sampler
        let plaque_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Plaque Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::with_tone_mapping(shaders::BACKGROUND).into()),
        });
        let plaque_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Plaque Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::with_tone_mapping(shaders::PLAQUE).into()),
        });

        let background_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &environment_layout],
            push_constant_ranges: &[],
        });
        let plaque_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Plaque Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &plaque_layout],
            push_constant_ranges: &[],
        });

        let color_targets = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let background_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&background_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &background_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &background_shader,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            // Behind everything, never occludes
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let plaque_pipeline = |label: &str, cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&plaque_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &plaque_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[PlaqueVertex::buffer_layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &plaque_shader,
                    entry_point: Some("fs_main"),
                    targets: &color_targets,
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let double_sided_pipeline = plaque_pipeline("Plaque Pipeline (double sided)", None);
        let single_sided_pipeline = plaque_pipeline("Plaque Pipeline (single sided)", Some(wgpu::Face::Back));

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Gallery Globals Buffer"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gallery Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let environment_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let environment_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Environment Bind Group"),
            layout: &environment_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(environment.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&environment_sampler),
                },
            ],
        });

        let plaque_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Plaque Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mesh = PlaqueMesh::unit_quad();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plaque Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plaque Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            background_pipeline,
            double_sided_pipeline,
            single_sided_pipeline,
            plaque_layout,
            globals_buffer,
            globals_bind_group,
            environment_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            plaque_sampler,
            plaques: HashMap::new(),
            draw_order: Vec::new(),
            exposure,
        }
    }

    /// Upload camera uniforms and sync per-plaque GPU state with the registry.
    ///
    /// `recreated` lists textures whose views changed since the last call.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &PerspectiveCamera,
        registry: &SurfaceRegistry,
        media: &MediaLibrary,
        recreated: &[TextureHandle],
    ) {
        let view_proj = camera.view_projection_matrix();
        let uniforms = GlobalUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera: camera.position.extend(self.exposure).to_array(),
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.draw_order.clear();
        for (handle, surface) in registry.iter() {
            self.draw_order.push(handle);

            let binding = self.plaques.entry(handle).or_insert_with(|| {
                let model = PlaqueUniforms {
                    model: plaque_transform(surface).to_cols_array_2d(),
                };
                PlaqueBinding {
                    uniform_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Plaque Uniform Buffer"),
                        contents: bytemuck::bytes_of(&model),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    }),
                    texture: surface.texture,
                    double_sided: surface.double_sided,
                    bind_group: None,
                }
            });

            let stale = binding.bind_group.is_none() || recreated.contains(&binding.texture);
            if !stale {
                continue;
            }
            if let Some(view) = media.view(binding.texture) {
                binding.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Plaque Bind Group"),
                    layout: &self.plaque_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: binding.uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.plaque_sampler),
                        },
                    ],
                }));
            }
        }

        // Drop GPU state for removed plaques
        let live = &self.draw_order;
        self.plaques.retain(|handle, _| live.contains(handle));
    }

    /// Record the gallery pass into `encoder`
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Gallery Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

        render_pass.set_pipeline(&self.background_pipeline);
        render_pass.set_bind_group(1, &self.environment_bind_group, &[]);
        render_pass.draw(0..3, 0..1);

        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        for handle in &self.draw_order {
            let Some(binding) = self.plaques.get(handle) else {
                continue;
            };
            let Some(bind_group) = &binding.bind_group else {
                continue;
            };
            let pipeline = if binding.double_sided {
                &self.double_sided_pipeline
            } else {
                &self.single_sided_pipeline
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, bind_group, &[]);
            render_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }
}
