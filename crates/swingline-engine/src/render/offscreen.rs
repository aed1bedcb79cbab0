//! Offscreen render target: one color and one depth attachment, both at
//! viewport resolution.

use std::fmt;

use crate::error::{Result, VoronoiError};

/// Color attachment format. 8-bit unorm, linear: the stored bytes are exactly
/// the encoded instance identities.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth attachment format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shape of one attachment, enough to judge completeness before any texture
/// exists.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttachmentDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl AttachmentDesc {
    pub const fn color(width: u32, height: u32) -> Self {
        Self { width, height, format: COLOR_FORMAT }
    }

    pub const fn depth(width: u32, height: u32) -> Self {
        Self { width, height, format: DEPTH_FORMAT }
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Outcome of the completeness check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetStatus {
    Complete,
    /// An attachment has zero width or height.
    EmptyAttachment { width: u32, height: u32 },
    /// Color and depth attachments differ in size.
    DimensionMismatch { color: (u32, u32), depth: (u32, u32) },
    /// The color attachment is not a linear color format.
    UnsupportedColorFormat(wgpu::TextureFormat),
    /// The depth attachment has no depth aspect.
    UnsupportedDepthFormat(wgpu::TextureFormat),
    /// An attachment is larger than the device's 2D texture limit.
    ExceedsLimit { width: u32, height: u32, max: u32 },
}

impl TargetStatus {
    pub fn check(color: &AttachmentDesc, depth: &AttachmentDesc) -> Self {
        for a in [color, depth] {
            if a.width == 0 || a.height == 0 {
                return Self::EmptyAttachment { width: a.width, height: a.height };
            }
        }
        if (color.width, color.height) != (depth.width, depth.height) {
            return Self::DimensionMismatch {
                color: (color.width, color.height),
                depth: (depth.width, depth.height),
            };
        }
        if !color.format.has_color_aspect() || color.format.remove_srgb_suffix() != color.format {
            return Self::UnsupportedColorFormat(color.format);
        }
        if !depth.format.has_depth_aspect() {
            return Self::UnsupportedDepthFormat(depth.format);
        }
        Self::Complete
    }

    /// Checks one attachment against the device's `max_texture_dimension_2d`.
    pub fn check_limit(desc: &AttachmentDesc, max: u32) -> Self {
        if desc.width > max || desc.height > max {
            return Self::ExceedsLimit { width: desc.width, height: desc.height, max };
        }
        Self::Complete
    }

    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::EmptyAttachment { width, height } => {
                write!(f, "empty attachment {width}x{height}")
            }
            Self::DimensionMismatch { color, depth } => write!(
                f,
                "color is {}x{} but depth is {}x{}",
                color.0, color.1, depth.0, depth.1
            ),
            Self::UnsupportedColorFormat(fmt) => write!(f, "{fmt:?} is not a linear color format"),
            Self::UnsupportedDepthFormat(fmt) => write!(f, "{fmt:?} has no depth aspect"),
            Self::ExceedsLimit { width, height, max } => {
                write!(f, "{width}x{height} exceeds the device limit of {max}")
            }
        }
    }
}

/// A texture used as a render attachment, plus its default view.
pub struct Attachment {
    desc: AttachmentDesc,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Attachment {
    /// Allocates the texture described by `desc`.
    ///
    /// Fails with `TargetIncomplete` for an empty extent or one beyond the
    /// device limit, both of which wgpu would reject at creation.
    pub fn new(device: &wgpu::Device, label: &str, desc: AttachmentDesc) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(VoronoiError::TargetIncomplete {
                status: TargetStatus::EmptyAttachment { width: desc.width, height: desc.height },
            });
        }
        let status = TargetStatus::check_limit(&desc, device.limits().max_texture_dimension_2d);
        if !status.is_complete() {
            return Err(VoronoiError::TargetIncomplete { status });
        }

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if desc.format.has_color_aspect() {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: desc.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self { desc, texture, view })
    }

    pub fn desc(&self) -> AttachmentDesc {
        self.desc
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Color + depth attachments of equal size, and the sampler used to read the
/// color attachment downstream.
pub struct OffscreenTarget {
    color: Attachment,
    depth: Attachment,
    sampler: wgpu::Sampler,
}

impl OffscreenTarget {
    /// Allocates a `width`×`height` color and depth pair and checks it.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        let color = Attachment::new(device, "swingline voronoi color", AttachmentDesc::color(width, height))?;
        let depth = Attachment::new(device, "swingline voronoi depth", AttachmentDesc::depth(width, height))?;
        Self::from_attachments(device, color, depth)
    }

    /// Assembles a target from existing attachments.
    pub fn from_attachments(device: &wgpu::Device, color: Attachment, depth: Attachment) -> Result<Self> {
        let status = TargetStatus::check(&color.desc, &depth.desc);
        if !status.is_complete() {
            return Err(VoronoiError::TargetIncomplete { status });
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("swingline voronoi sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!("offscreen target {}x{} complete", color.desc.width, color.desc.height);

        Ok(Self { color, depth, sampler })
    }

    pub fn width(&self) -> u32 {
        self.color.desc.width
    }

    pub fn height(&self) -> u32 {
        self.color.desc.height
    }

    pub fn color(&self) -> &Attachment {
        &self.color
    }

    pub fn depth(&self) -> &Attachment {
        &self.depth
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
