use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use glam::UVec3;
use tracing::{info, warn};
use wgpu::util::DeviceExt;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{DeviceEvent, ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowBuilder},
};

use blockview::constants::{CLEAR_COLOR, DEBUG_ATLAS_FILE};
use blockview::core::{Block, BlockRegistry, Uniforms, Vertex, quad_indices};
use blockview::player::{InputState, Player, break_block, place_block};
use blockview::render::{
    FrameRenderer, GpuBackend, RendererConfig, TextureAtlas, frame_uniforms,
};
use blockview::utils::settings::DEFAULT_SETTINGS_PATH;
use blockview::utils::{FrameTimer, GameSettings};
use blockview::world::{TerrainGenerator, World};

/// Voxel world viewer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Terrain seed (random when omitted)
    #[arg(long)]
    seed: Option<u32>,

    /// Settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Directory of block textures
    #[arg(long)]
    textures: Option<PathBuf>,

    /// Write the packed texture sheet to blockSheet.png
    #[arg(long, default_value_t = false)]
    debug_textures: bool,

    /// Chunk radius kept meshed around the player
    #[arg(long)]
    view_distance: Option<i32>,
}

/// Chunk mesh resident on the GPU.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

/// Uploads through the device and draws into the open terrain pass.
struct WgpuBackend<'a, 'p> {
    device: &'a wgpu::Device,
    pass: &'a mut wgpu::RenderPass<'p>,
}

impl GpuBackend for WgpuBackend<'_, '_> {
    type Mesh = GpuMesh;

    fn upload(&mut self, vertices: &[Vertex]) -> GpuMesh {
        let indices = quad_indices(vertices.len() as u32 / 4);
        GpuMesh {
            vertex_buffer: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Chunk Vertex Buffer"),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            index_buffer: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Chunk Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
        }
    }

    fn draw(&mut self, mesh: &GpuMesh, vertex_count: u32) {
        self.pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..vertex_count / 4 * 6, 0, 0..1);
    }
}

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    terrain_pipeline: wgpu::RenderPipeline,
    highlight_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    renderer: FrameRenderer<GpuMesh>,
    world: Arc<World>,
    player: Player,
    input: InputState,
    timer: FrameTimer,
    settings: GameSettings,
    placed_block: Arc<dyn Block>,
    mouse_captured: bool,
}

impl State {
    async fn new(
        window: Window,
        world: Arc<World>,
        atlas: Arc<TextureAtlas>,
        settings: GameSettings,
        placed_block: Arc<dyn Block>,
    ) -> Result<Self> {
        let window = Arc::new(window);
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        let info = adapter.get_info();
        info!("Selected adapter: {} on {:?} backend", info.name, info.backend);
        if info.device_type == wgpu::DeviceType::Cpu {
            warn!("Running on a software renderer. Performance will be poor.");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.graphics.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_texture(&device, &config);

        let terrain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/terrain.wgsl").into()),
        });
        let highlight_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Highlight Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/highlight.wgsl").into()),
        });

        let player = Player::spawn(&world);
        let renderer = FrameRenderer::new(
            world.clone(),
            atlas.clone(),
            RendererConfig::from(&settings.graphics),
            config.width,
            config.height,
        )
        .context("failed to start mesh workers")?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[frame_uniforms(
                &player,
                renderer.projection(),
                settings.graphics.view_distance,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let (atlas_width, atlas_height) = atlas.dimensions();
        let atlas_size = wgpu::Extent3d {
            width: atlas_width,
            height: atlas_height,
            depth_or_array_layers: 1,
        };
        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Block Atlas"),
            size: atlas_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &atlas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * atlas_width),
                rows_per_image: Some(atlas_height),
            },
            atlas_size,
        );
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("uniform_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&atlas_sampler),
                },
            ],
            label: Some("uniform_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            immediate_size: 0,
        });

        let terrain_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &terrain_shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            "Terrain Pipeline",
        );
        let highlight_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &highlight_shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            "Highlight Pipeline",
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            terrain_pipeline,
            highlight_pipeline,
            uniform_buffer,
            uniform_bind_group,
            renderer,
            world,
            player,
            input: InputState::default(),
            timer: FrameTimer::new(),
            settings,
            placed_block,
            mouse_captured: false,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let triangles = topology == wgpu::PrimitiveTopology::TriangleList;
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: triangles.then_some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: triangles,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_texture(&self.device, &self.config);
            self.renderer.resize(new_size.width, new_size.height);
        }
    }

    fn update(&mut self) {
        // Long stalls (window drags) must not launch the player through the floor.
        let dt = self.timer.tick().min(0.1);
        self.player.update(&self.world, dt, &self.input);

        if self.timer.should_report() {
            let pos = self.player.position;
            self.window.set_title(&format!(
                "blockview | {:.0} fps | {} chunks | {:.1} {:.1} {:.1}",
                self.timer.average_fps(),
                self.renderer.meshes().stats().drawn,
                pos.x,
                pos.y,
                pos.z
            ));
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let uniforms: Uniforms;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: CLEAR_COLOR[0] as f64,
                            g: CLEAR_COLOR[1] as f64,
                            b: CLEAR_COLOR[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.terrain_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            let mut backend = WgpuBackend {
                device: &self.device,
                pass: &mut render_pass,
            };
            let frame = self.renderer.render_frame(&self.player, &mut backend);

            if let Some(lines) = &frame.highlight {
                let highlight_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Highlight Vertex Buffer"),
                            contents: bytemuck::cast_slice(lines),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                render_pass.set_pipeline(&self.highlight_pipeline);
                render_pass.set_vertex_buffer(0, highlight_buffer.slice(..));
                render_pass.draw(0..lines.len() as u32, 0..1);
            }

            uniforms = frame.uniforms;
        }

        // Staged writes land before the submitted pass executes.
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn handle_mouse_input(&mut self, button: MouseButton) {
        let edited = match button {
            MouseButton::Left => break_block(&self.player, &self.world),
            MouseButton::Right => {
                place_block(&self.player, &self.world, self.placed_block.as_ref())
            }
            _ => None,
        };
        if let Some(pos) = edited {
            tracing::debug!("Edited block at {:?}", pos);
        }
    }

    fn capture_mouse(&mut self, captured: bool) {
        self.mouse_captured = captured;
        if captured {
            let _ = self
                .window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked));
            self.window.set_cursor_visible(false);
            let _ = self.window.set_cursor_position(PhysicalPosition::new(
                self.config.width / 2,
                self.config.height / 2,
            ));
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
            self.window.set_cursor_visible(true);
        }
    }
}

pub fn run_game() -> Result<()> {
    let args = Args::parse();

    let mut settings = GameSettings::load_or_default(&args.settings);
    if let Some(view_distance) = args.view_distance {
        settings.graphics.view_distance = view_distance;
    }
    if let Some(textures) = args.textures {
        settings.paths.textures = textures;
    }
    let seed = args
        .seed
        .or(settings.world.seed)
        .unwrap_or_else(rand::random::<u32>);

    let registry = Arc::new(BlockRegistry::with_defaults());
    let world = Arc::new(World::new(
        UVec3::new(
            settings.world.width,
            settings.world.height,
            settings.world.depth,
        ),
        registry.clone(),
    ));
    TerrainGenerator::new(seed).generate(&world);

    let atlas = Arc::new(TextureAtlas::load_or_procedural(&settings.paths.textures));
    if args.debug_textures {
        if let Err(e) = atlas.save_png(DEBUG_ATLAS_FILE) {
            warn!("{}", e);
        }
    }

    let placed_block = registry
        .by_name("gold_block")
        .context("placeable block is not registered")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = WindowBuilder::new()
        .with_title("blockview | Loading...")
        .with_inner_size(LogicalSize::new(800, 600))
        .build(&event_loop)
        .context("failed to create window")?;

    let mut state = pollster::block_on(State::new(
        window,
        world,
        atlas,
        settings,
        placed_block,
    ))?;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => {
                state.resize(size);
                state.window.request_redraw();
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                state.update();
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.window.inner_size())
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(e) => warn!("Render error: {:?}", e),
                }
            }
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state: key_state,
                                ..
                            },
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                match key {
                    KeyCode::KeyW => state.input.forward = pressed,
                    KeyCode::KeyS => state.input.backward = pressed,
                    KeyCode::KeyA => state.input.left = pressed,
                    KeyCode::KeyD => state.input.right = pressed,
                    KeyCode::Space => state.input.jump = pressed,
                    KeyCode::Escape if pressed => {
                        if state.mouse_captured {
                            state.capture_mouse(false);
                        } else {
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::WindowEvent {
                event:
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button,
                        ..
                    },
                ..
            } => {
                if state.mouse_captured {
                    state.handle_mouse_input(button);
                } else {
                    state.capture_mouse(true);
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if state.mouse_captured {
                    let controls = &state.settings.controls;
                    let dy = if controls.invert_mouse { -delta.1 } else { delta.1 };
                    let sensitivity = controls.mouse_sensitivity;
                    state
                        .player
                        .apply_mouse_delta(delta.0 as f32, dy as f32, sensitivity);
                }
            }
            Event::AboutToWait => {
                state.window.request_redraw();
            }
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            _ => {}
        }
    })?;

    Ok(())
}
