//! Geometry factory: the cone fan, the per-seed offset stream, and the
//! fullscreen quad.
//!
//! Both meshes are authored as triangle fans (`N+2` cone vertices, 4 quad
//! vertices). wgpu has no fan topology, so every bundle carries an index
//! buffer that expands the fan into a triangle list.

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::error::{Result, VoronoiError};

// ── vertex types ──────────────────────────────────────────────────────────

/// Cone vertex, attribute stream 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ConeVertex {
    pub pos: [f32; 3],
}

impl ConeVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ConeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Seed position, attribute stream 1, advancing once per instance.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SeedOffset {
    pub offset: [f32; 2],
}

impl SeedOffset {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { offset: [x, y] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SeedOffset>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Fullscreen quad vertex (clip space).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Fan order, counter-clockwise from the bottom-left corner.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [-1.0, -1.0] },
    QuadVertex { pos: [1.0, -1.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [-1.0, 1.0] },
];

// ── CPU construction ──────────────────────────────────────────────────────

/// Builds the cone fan: apex at `(0, 0, -1)`, then `segments + 1` ring
/// vertices at `(r·cos θ, r·sin θ, +1)` with `θ = 2π·i/segments`.
///
/// The last ring vertex is the first one repeated, so the fan closes exactly.
pub fn cone_vertices(segments: u32, radius: f32) -> Result<Vec<ConeVertex>> {
    if segments < 3 {
        return Err(VoronoiError::InvalidConfig(format!(
            "a cone needs at least 3 segments (got {segments})"
        )));
    }

    let count = segments as usize + 2;
    let mut verts = Vec::new();
    verts
        .try_reserve_exact(count)
        .map_err(|_| VoronoiError::Allocation { bytes: count * std::mem::size_of::<ConeVertex>() })?;

    verts.push(ConeVertex { pos: [0.0, 0.0, -1.0] });
    for i in 0..=segments {
        let angle = std::f64::consts::TAU * f64::from(i % segments) / f64::from(segments);
        verts.push(ConeVertex {
            pos: [
                radius * angle.cos() as f32,
                radius * angle.sin() as f32,
                1.0,
            ],
        });
    }

    Ok(verts)
}

/// Draws `count` offsets with both components uniform in `[-1, 1)`.
pub fn random_offsets<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Result<Vec<SeedOffset>> {
    if count == 0 {
        return Err(VoronoiError::InvalidConfig("at least one seed is required".into()));
    }

    let mut offsets = Vec::new();
    offsets
        .try_reserve_exact(count as usize)
        .map_err(|_| VoronoiError::Allocation {
            bytes: count as usize * std::mem::size_of::<SeedOffset>(),
        })?;

    offsets.extend((0..count).map(|_| {
        SeedOffset::new(rng.random_range(-1.0f32..1.0), rng.random_range(-1.0f32..1.0))
    }));

    Ok(offsets)
}

/// Expands a fan of `vertex_count` vertices into triangle-list indices
/// `(0, i, i+1)`.
pub fn fan_indices(vertex_count: u32) -> Vec<u32> {
    (1..vertex_count.saturating_sub(1))
        .flat_map(|i| [0, i, i + 1])
        .collect()
}

// ── GPU streams ───────────────────────────────────────────────────────────

/// One vertex buffer bound to one attribute stream.
pub struct VertexStream {
    buffer: wgpu::Buffer,
    len: u32,
}

impl VertexStream {
    fn upload<T: Pod>(device: &wgpu::Device, label: &str, items: &[T]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(items),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            len: items.len() as u32,
        }
    }

    /// Number of elements in the stream.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Uploads the cone fan (stream 0).
pub fn build_cone(device: &wgpu::Device, segments: u32, radius: f32) -> Result<VertexStream> {
    let verts = cone_vertices(segments, radius)?;
    Ok(VertexStream::upload(device, "swingline cone vbo", &verts))
}

/// Draws `count` random offsets and uploads them (stream 1, per instance).
///
/// The CPU copy comes back alongside so decoded pixels can be related to
/// seed positions.
pub fn build_instances<R: Rng + ?Sized>(
    device: &wgpu::Device,
    count: u32,
    rng: &mut R,
) -> Result<(VertexStream, Vec<SeedOffset>)> {
    let offsets = random_offsets(count, rng)?;
    let stream = upload_instances(device, &offsets)?;
    Ok((stream, offsets))
}

/// Uploads caller-provided offsets (stream 1, per instance).
pub fn upload_instances(device: &wgpu::Device, offsets: &[SeedOffset]) -> Result<VertexStream> {
    if offsets.is_empty() {
        return Err(VoronoiError::InvalidConfig("at least one seed is required".into()));
    }
    Ok(VertexStream::upload(device, "swingline instance vbo", offsets))
}

// ── bundles ───────────────────────────────────────────────────────────────

/// Vertex streams in slot order plus the fan index buffer.
///
/// Owns its buffers; they are released when the bundle is dropped.
pub struct Geometry {
    streams: Vec<VertexStream>,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl Geometry {
    /// Bundles `streams` (slot `i` = stream `i`); the fan size is taken from
    /// stream 0.
    pub fn new(device: &wgpu::Device, label: &str, streams: Vec<VertexStream>) -> Self {
        let fan_len = streams.first().map_or(0, VertexStream::len);
        let indices = fan_indices(fan_len);
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            streams,
            indices: index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Cone fan in slot 0, seed offsets in slot 1.
    pub fn cones(device: &wgpu::Device, cone: VertexStream, offsets: VertexStream) -> Self {
        Self::new(device, "swingline cone ibo", vec![cone, offsets])
    }

    /// Screen-covering quad in slot 0.
    pub fn quad(device: &wgpu::Device) -> Self {
        let stream = VertexStream::upload(device, "swingline quad vbo", &QUAD_VERTICES);
        Self::new(device, "swingline quad ibo", vec![stream])
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Instances available in the per-instance stream, if the bundle has one.
    pub fn instance_capacity(&self) -> Option<u32> {
        self.streams.get(1).map(VertexStream::len)
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (slot, stream) in self.streams.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, stream.buffer.slice(..));
        }
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
    }
}
