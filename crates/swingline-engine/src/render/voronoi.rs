use std::path::Path;

use crate::config::VoronoiConfig;
use crate::error::Result;

use super::geometry::{self, ConeVertex, Geometry, QuadVertex, SeedOffset, VertexStream};
use super::offscreen::{OffscreenTarget, COLOR_FORMAT, DEPTH_FORMAT};
use super::readback::{self, ColorImage};
use super::shader::{self, Program, ProgramDesc, ProgramKind};
use super::{RenderCtx, RenderTarget};

/// Background of the offscreen pass; shows wherever no cone reaches.
pub const OFFSCREEN_CLEAR: wgpu::Color = wgpu::Color { r: 1.0, g: 1.0, b: 0.0, a: 1.0 };

/// Background of the present pass.
pub const PRESENT_CLEAR: wgpu::Color = wgpu::Color::BLACK;

/// Owns every GPU resource of the Voronoi pipeline.
///
/// Passes:
/// - offscreen: instanced cones into the color+depth target, depth-tested
/// - present: fullscreen quad copying the color attachment to the surface
///
/// Each pass opens and closes its own wgpu render pass, so no binding state
/// carries over from one to the other.
pub struct VoronoiRenderer {
    voronoi: Program,
    blit: Program,
    cones: Geometry,
    quad: Geometry,
    target: OffscreenTarget,
    blit_bindings: wgpu::BindGroup,
    offsets: Vec<SeedOffset>,
}

impl VoronoiRenderer {
    /// Builds the pipeline with `config.point_count` seeds drawn from
    /// `config.seeds`.
    pub fn new(ctx: &RenderCtx<'_>, config: &VoronoiConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = config.seeds.rng();
        let (instances, offsets) = geometry::build_instances(ctx.device, config.point_count, &mut rng)?;
        log::info!("placed {} seeds ({:?})", offsets.len(), config.seeds);
        Self::build(ctx, config, instances, offsets)
    }

    /// Builds the pipeline around caller-chosen seed positions.
    ///
    /// `config.point_count` and `config.seeds` are ignored.
    pub fn with_offsets(
        ctx: &RenderCtx<'_>,
        config: &VoronoiConfig,
        offsets: Vec<SeedOffset>,
    ) -> Result<Self> {
        let point_count = offsets.len().try_into().unwrap_or(u32::MAX);
        VoronoiConfig { point_count, ..config.clone() }.validate()?;
        let instances = geometry::upload_instances(ctx.device, &offsets)?;
        Self::build(ctx, config, instances, offsets)
    }

    fn build(
        ctx: &RenderCtx<'_>,
        config: &VoronoiConfig,
        instances: VertexStream,
        offsets: Vec<SeedOffset>,
    ) -> Result<Self> {
        let device = ctx.device;

        let cone = geometry::build_cone(device, config.cone_res, config.cone_radius)?;
        let cones = Geometry::cones(device, cone, instances);
        let quad = Geometry::quad(device);

        let voronoi = Program::build(
            device,
            &ProgramDesc {
                kind: ProgramKind::Voronoi,
                vertex_source: shader::VORONOI_VERT,
                fragment_source: shader::VORONOI_FRAG,
                attributes: &[ConeVertex::layout(), SeedOffset::layout()],
                bindings: &[],
                color_format: COLOR_FORMAT,
                depth: Some(shader::nearest_wins_depth(DEPTH_FORMAT)),
            },
        )?;

        let blit = Program::build(
            device,
            &ProgramDesc {
                kind: ProgramKind::Blit,
                vertex_source: shader::BLIT_VERT,
                fragment_source: shader::BLIT_FRAG,
                attributes: &[QuadVertex::layout()],
                bindings: &BLIT_BINDINGS,
                color_format: ctx.target_format,
                depth: None,
            },
        )?;

        let target = OffscreenTarget::new(device, config.width, config.height)?;
        let blit_bindings = blit_bind_group(device, &blit, &target);

        Ok(Self {
            voronoi,
            blit,
            cones,
            quad,
            target,
            blit_bindings,
            offsets,
        })
    }

    pub fn offsets(&self) -> &[SeedOffset] {
        &self.offsets
    }

    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    /// Records the offscreen pass into `encoder`.
    pub fn encode_offscreen(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("swingline voronoi pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.target.color().view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(OFFSCREEN_CLEAR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.target.depth().view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        self.voronoi
            .draw(&mut pass, &self.cones, None, self.offsets.len() as u32);
    }

    /// Runs the offscreen pass and submits it.
    ///
    /// Called once at startup; calling again redraws the same diagram.
    pub fn render_offscreen(&self, ctx: &RenderCtx<'_>) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("swingline voronoi encoder"),
            });
        self.encode_offscreen(&mut encoder);
        ctx.queue.submit(std::iter::once(encoder.finish()));
        log::debug!(
            "offscreen pass submitted: {} cones, {} indices each",
            self.offsets.len(),
            self.cones.index_count()
        );
    }

    /// Opens the present pass on `target`, cleared to black. Nothing is drawn
    /// until the caller issues draws on the returned pass.
    pub fn begin_present_pass<'e>(target: &'e mut RenderTarget<'_>) -> wgpu::RenderPass<'e> {
        target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("swingline present pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(PRESENT_CLEAR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    /// Records the present pass: clear, then blit the color attachment.
    pub fn present(&self, target: &mut RenderTarget<'_>) {
        let mut pass = Self::begin_present_pass(target);
        self.blit
            .draw(&mut pass, &self.quad, Some(&self.blit_bindings), 1);
    }

    /// Reads the offscreen color attachment back to the CPU.
    pub fn read_color(&self, ctx: &RenderCtx<'_>) -> Result<ColorImage> {
        readback::read_texture(ctx, self.target.color().texture())
    }

    /// Writes the offscreen color attachment to `path` as an RGB PNG.
    pub fn export_png(&self, ctx: &RenderCtx<'_>, path: &Path) -> anyhow::Result<()> {
        self.read_color(ctx)?.save_png(path)
    }
}

const BLIT_BINDINGS: [wgpu::BindGroupLayoutEntry; 2] = [
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    },
    wgpu::BindGroupLayoutEntry {
        binding: 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    },
];

fn blit_bind_group(device: &wgpu::Device, blit: &Program, target: &OffscreenTarget) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("swingline blit bind group"),
        layout: blit.bind_group_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(target.color().view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(target.sampler()),
            },
        ],
    })
}
