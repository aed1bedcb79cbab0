//! Shader pipeline factory.
//!
//! Each stage is a standalone WGSL module. `compile` parses and validates one
//! module with naga; `link` checks the vertex/fragment interface and the
//! attribute streams, then the pair is handed to wgpu as naga IR.
//!
//! Both programs of the Voronoi pipeline are described by the same
//! [`ProgramDesc`] record and drawn through [`Program::draw`].

use std::borrow::Cow;
use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{Result, VoronoiError};

use super::geometry::Geometry;

pub const VORONOI_VERT: &str = include_str!("shaders/voronoi_vert.wgsl");
pub const VORONOI_FRAG: &str = include_str!("shaders/voronoi_frag.wgsl");
pub const BLIT_VERT: &str = include_str!("shaders/blit_vert.wgsl");
pub const BLIT_FRAG: &str = include_str!("shaders/blit_frag.wgsl");

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A validated single-stage module.
#[derive(Debug)]
pub struct Shader {
    stage: ShaderStage,
    entry_index: usize,
    module: naga::Module,
}

impl Shader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry().name
    }

    fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }
}

/// Parses and validates one stage. The module must declare exactly one entry
/// point for `stage`.
pub fn compile(stage: ShaderStage, source: &str) -> Result<Shader> {
    let fail = |log: String| VoronoiError::Compile { stage, log };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    let mut entries = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == stage.naga());
    let entry_index = match (entries.next(), entries.next()) {
        (Some((i, _)), None) => i,
        (None, _) => return Err(fail(format!("no {stage} entry point"))),
        (Some(_), Some(_)) => return Err(fail(format!("more than one {stage} entry point"))),
    };

    let shader = Shader {
        stage,
        entry_index,
        module,
    };
    log::debug!("compiled {stage} shader `{}`", shader.entry_point());
    Ok(shader)
}

/// A location-bound value crossing a stage boundary.
#[derive(Debug, Clone, PartialEq)]
struct Varying {
    location: u32,
    ty: naga::TypeInner,
    interpolation: Option<naga::Interpolation>,
}

fn collect_varyings(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(naga::Binding::Location {
            location,
            interpolation,
            ..
        }) => out.push(Varying {
            location: *location,
            ty: module.types[ty].inner.clone(),
            interpolation: *interpolation,
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_varyings(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn stage_inputs(shader: &Shader) -> Vec<Varying> {
    let mut out = Vec::new();
    for arg in &shader.entry().function.arguments {
        collect_varyings(&shader.module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn stage_outputs(shader: &Shader) -> Vec<Varying> {
    let mut out = Vec::new();
    if let Some(result) = &shader.entry().function.result {
        collect_varyings(&shader.module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

/// A vertex + fragment pair whose interfaces agree.
#[derive(Debug)]
pub struct Linked {
    vertex: Shader,
    fragment: Shader,
}

/// Checks that the stages fit together and that every vertex input location
/// is fed by one of `attributes`.
pub fn link(
    vertex: Shader,
    fragment: Shader,
    attributes: &[wgpu::VertexBufferLayout<'_>],
) -> Result<Linked> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(VoronoiError::link(format!("expected a vertex shader, got {}", vertex.stage)));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(VoronoiError::link(format!(
            "expected a fragment shader, got {}",
            fragment.stage
        )));
    }

    let fed: Vec<u32> = attributes
        .iter()
        .flat_map(|layout| layout.attributes.iter().map(|a| a.shader_location))
        .collect();
    for input in stage_inputs(&vertex) {
        if !fed.contains(&input.location) {
            return Err(VoronoiError::link(format!(
                "vertex input @location({}) has no attribute stream",
                input.location
            )));
        }
    }

    let produced = stage_outputs(&vertex);
    for input in stage_inputs(&fragment) {
        match produced.iter().find(|v| v.location == input.location) {
            None => {
                return Err(VoronoiError::link(format!(
                    "fragment input @location({}) is not written by the vertex stage",
                    input.location
                )));
            }
            Some(out) if out.ty != input.ty => {
                return Err(VoronoiError::link(format!(
                    "@location({}) type mismatch: vertex writes {:?}, fragment reads {:?}",
                    input.location, out.ty, input.ty
                )));
            }
            Some(out) if out.interpolation != input.interpolation => {
                return Err(VoronoiError::link(format!(
                    "@location({}) interpolation mismatch: {:?} vs {:?}",
                    input.location, out.interpolation, input.interpolation
                )));
            }
            Some(_) => {}
        }
    }

    Ok(Linked { vertex, fragment })
}

/// Which of the two pipeline programs a [`Program`] is.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgramKind {
    /// Instanced cones, instance index encoded as color.
    Voronoi,
    /// Fullscreen quad fetching texels from the offscreen color attachment.
    Blit,
}

impl ProgramKind {
    fn label(self) -> &'static str {
        match self {
            Self::Voronoi => "swingline voronoi",
            Self::Blit => "swingline blit",
        }
    }
}

/// Everything that distinguishes one program from another.
pub struct ProgramDesc<'a> {
    pub kind: ProgramKind,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    /// Attribute streams in slot order.
    pub attributes: &'a [wgpu::VertexBufferLayout<'a>],
    /// Group 0 resources; may be empty.
    pub bindings: &'a [wgpu::BindGroupLayoutEntry],
    pub color_format: wgpu::TextureFormat,
    pub depth: Option<wgpu::DepthStencilState>,
}

/// A linked render pipeline plus its group-0 layout.
pub struct Program {
    kind: ProgramKind,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl Program {
    pub fn build(device: &wgpu::Device, desc: &ProgramDesc<'_>) -> Result<Self> {
        let label = desc.kind.label();

        let vertex = compile(ShaderStage::Vertex, desc.vertex_source)?;
        let fragment = compile(ShaderStage::Fragment, desc.fragment_source)?;
        let Linked { vertex, fragment } = link(vertex, fragment, desc.attributes)?;

        let vs_entry = vertex.entry_point().to_owned();
        let fs_entry = fragment.entry_point().to_owned();
        let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex.module)),
        });
        let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment.module)),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: desc.bindings,
        });

        // Every group in a pipeline layout must be bound before drawing, so a
        // program without resources gets no group at all.
        let layouts = [&bind_group_layout];
        let groups: &[&wgpu::BindGroupLayout] = if desc.bindings.is_empty() { &[] } else { &layouts };
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: groups,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(vs_entry.as_str()),
                compilation_options: Default::default(),
                buffers: desc.attributes,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(fs_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: desc.depth.clone(),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("linked {label} pipeline");

        Ok(Self {
            kind: desc.kind,
            pipeline,
            bind_group_layout,
        })
    }

    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Binds this program and `geometry`, then issues one indexed draw of
    /// `instance_count` instances.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        geometry: &Geometry,
        bind_group: Option<&wgpu::BindGroup>,
        instance_count: u32,
    ) {
        debug_assert!(
            geometry
                .instance_capacity()
                .is_none_or(|cap| instance_count <= cap),
            "{:?} draw exceeds the instance stream",
            self.kind
        );

        pass.set_pipeline(&self.pipeline);
        if let Some(bg) = bind_group {
            pass.set_bind_group(0, bg, &[]);
        }
        geometry.bind(pass);
        pass.draw_indexed(0..geometry.index_count(), 0, 0..instance_count);
    }
}

/// Depth state of the Voronoi program: strict less-than, so among equidistant
/// fragments the lowest instance index keeps the pixel.
pub fn nearest_wins_depth(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::geometry::{ConeVertex, QuadVertex, SeedOffset};
    use super::*;

    #[test]
    fn pipeline_sources_compile() {
        for (stage, src) in [
            (ShaderStage::Vertex, VORONOI_VERT),
            (ShaderStage::Fragment, VORONOI_FRAG),
            (ShaderStage::Vertex, BLIT_VERT),
            (ShaderStage::Fragment, BLIT_FRAG),
        ] {
            if let Err(e) = compile(stage, src) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn pipeline_programs_link() {
        let cones = [ConeVertex::layout(), SeedOffset::layout()];
        let vs = compile(ShaderStage::Vertex, VORONOI_VERT).unwrap();
        let fs = compile(ShaderStage::Fragment, VORONOI_FRAG).unwrap();
        assert!(link(vs, fs, &cones).is_ok());

        let quad = [QuadVertex::layout()];
        let vs = compile(ShaderStage::Vertex, BLIT_VERT).unwrap();
        let fs = compile(ShaderStage::Fragment, BLIT_FRAG).unwrap();
        assert!(link(vs, fs, &quad).is_ok());
    }

    #[test]
    fn fragment_without_output_binding_fails_to_compile() {
        let src = r#"
            struct FsIn {
                @location(0) @interpolate(flat) color: vec3<f32>,
            };

            @fragment
            fn fs_main(input: FsIn) -> vec4<f32> {
                return vec4<f32>(input.color, 1.0);
            }
        "#;
        match compile(ShaderStage::Fragment, src) {
            Err(VoronoiError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.trim().is_empty());
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
    }

    #[test]
    fn syntax_error_carries_log() {
        let err = compile(ShaderStage::Vertex, "@vertex fn vs_main( -> {").unwrap_err();
        let VoronoiError::Compile { log, .. } = err else { panic!("wrong variant") };
        assert!(!log.is_empty());
    }

    #[test]
    fn wrong_stage_is_a_compile_error() {
        let err = compile(ShaderStage::Fragment, VORONOI_VERT).unwrap_err();
        assert!(matches!(err, VoronoiError::Compile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn entry_point_names_come_from_source() {
        let vs = compile(ShaderStage::Vertex, VORONOI_VERT).unwrap();
        assert_eq!(vs.entry_point(), "vs_main");
        let fs = compile(ShaderStage::Fragment, BLIT_FRAG).unwrap();
        assert_eq!(fs.entry_point(), "fs_main");
    }

    #[test]
    fn missing_attribute_stream_fails_to_link() {
        let vs = compile(ShaderStage::Vertex, VORONOI_VERT).unwrap();
        let fs = compile(ShaderStage::Fragment, VORONOI_FRAG).unwrap();
        let err = link(vs, fs, &[ConeVertex::layout()]).unwrap_err();
        assert!(matches!(err, VoronoiError::Link { .. }));
    }

    #[test]
    fn unmatched_varying_fails_to_link() {
        let fs_src = r#"
            @fragment
            fn fs_main(@location(3) v: vec2<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(v, 0.0, 1.0);
            }
        "#;
        let vs = compile(ShaderStage::Vertex, VORONOI_VERT).unwrap();
        let fs = compile(ShaderStage::Fragment, fs_src).unwrap();
        let err = link(vs, fs, &[ConeVertex::layout(), SeedOffset::layout()]).unwrap_err();
        let VoronoiError::Link { log } = err else { panic!("wrong variant") };
        assert!(log.contains("location(3)"), "{log}");
    }

    #[test]
    fn varying_type_mismatch_fails_to_link() {
        let fs_src = r#"
            @fragment
            fn fs_main(@location(0) @interpolate(flat) c: vec4<f32>) -> @location(0) vec4<f32> {
                return c;
            }
        "#;
        let vs = compile(ShaderStage::Vertex, VORONOI_VERT).unwrap();
        let fs = compile(ShaderStage::Fragment, fs_src).unwrap();
        let err = link(vs, fs, &[ConeVertex::layout(), SeedOffset::layout()]).unwrap_err();
        assert!(matches!(err, VoronoiError::Link { .. }));
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        let vs = compile(ShaderStage::Vertex, BLIT_VERT).unwrap();
        let fs = compile(ShaderStage::Fragment, BLIT_FRAG).unwrap();
        assert!(link(fs, vs, &[QuadVertex::layout()]).is_err());
    }
}
