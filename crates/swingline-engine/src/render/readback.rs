//! Copies an 8-bit RGBA texture back to the CPU.
//!
//! Used to treat the offscreen color attachment as a pixel -> seed lookup
//! table, and to write it out as a PNG.

use std::path::Path;

use crate::encoding;
use crate::error::{Result, VoronoiError};

use super::RenderCtx;

/// Tightly packed RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ColorImage {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height, "pixel ({x}, {y}) outside {}x{}", self.width, self.height);
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// Decodes every pixel's RGB back to an instance index.
    pub fn ids(&self) -> IdMap {
        let ids = self
            .rgba
            .chunks_exact(4)
            .map(|px| encoding::decode([px[0], px[1], px[2]]))
            .collect();
        IdMap {
            width: self.width,
            height: self.height,
            ids,
        }
    }

    /// Writes the image as an RGB PNG (alpha dropped).
    pub fn save_png(&self, path: &Path) -> anyhow::Result<()> {
        let rgb: Vec<u8> = self
            .rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let img = image::RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| anyhow::anyhow!("pixel buffer does not match {}x{}", self.width, self.height))?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Owning instance index per pixel, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct IdMap {
    pub width: u32,
    pub height: u32,
    pub ids: Vec<u32>,
}

impl IdMap {
    #[inline]
    pub fn owner_at(&self, x: u32, y: u32) -> u32 {
        debug_assert!(x < self.width && y < self.height, "pixel ({x}, {y}) outside {}x{}", self.width, self.height);
        self.ids[y as usize * self.width as usize + x as usize]
    }

    /// Clip-space center of pixel `(x, y)`; row 0 is the top (`+1`) edge.
    #[inline]
    pub fn pixel_center(&self, x: u32, y: u32) -> [f32; 2] {
        [
            (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0,
        ]
    }

    /// Iterates `(x, y, owner)` over all pixels.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let w = self.width;
        self.ids
            .iter()
            .enumerate()
            .map(move |(i, &k)| (i as u32 % w, i as u32 / w, k))
    }
}

/// Rows of a buffer copy must be padded to this many bytes.
fn padded_row_bytes(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copies a whole 4-byte-per-texel texture to the CPU. Blocks until the GPU
/// has finished all previously submitted work.
pub fn read_texture(ctx: &RenderCtx<'_>, texture: &wgpu::Texture) -> Result<ColorImage> {
    let (width, height) = (texture.width(), texture.height());
    if texture.format().block_copy_size(None) != Some(4) {
        return Err(VoronoiError::Readback(format!(
            "{:?} is not a 4-byte color format",
            texture.format()
        )));
    }

    let row = padded_row_bytes(width);
    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("swingline readback staging"),
        size: u64::from(row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("swingline readback encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(row),
                rows_per_image: Some(height),
            },
        },
        texture.size(),
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .map_err(|e| VoronoiError::Readback(format!("device poll failed: {e}")))?;

    receiver
        .recv()
        .map_err(|e| VoronoiError::Readback(format!("map callback dropped: {e}")))?
        .map_err(|e| VoronoiError::Readback(format!("buffer map failed: {e}")))?;

    let tight = width as usize * 4;
    let mut rgba = Vec::new();
    rgba.try_reserve_exact(tight * height as usize)
        .map_err(|_| VoronoiError::Allocation { bytes: tight * height as usize })?;
    {
        let data = slice.get_mapped_range();
        for line in data.chunks_exact(row as usize) {
            rgba.extend_from_slice(&line[..tight]);
        }
    }
    staging.unmap();

    Ok(ColorImage { width, height, rgba })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_of(ids: &[u32], width: u32) -> ColorImage {
        let rgba = ids
            .iter()
            .flat_map(|&k| {
                let [r, g, b] = encoding::encode(k);
                [r, g, b, 255]
            })
            .collect();
        ColorImage {
            width,
            height: ids.len() as u32 / width,
            rgba,
        }
    }

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(65), 512);
        assert_eq!(padded_row_bytes(400), 1792);
        assert_eq!(padded_row_bytes(1), 256);
    }

    #[test]
    fn decodes_ids_row_major() {
        let img = image_of(&[0, 1, 256, 70_000, 99, 65535], 3);
        let ids = img.ids();
        assert_eq!(ids.owner_at(0, 0), 0);
        assert_eq!(ids.owner_at(2, 0), 256);
        assert_eq!(ids.owner_at(0, 1), 70_000);
        assert_eq!(ids.owner_at(2, 1), 65535);
        assert_eq!(img.pixel(1, 1), [99, 0, 0, 255]);
    }

    #[test]
    fn pixel_centers_span_clip_space() {
        let map = IdMap { width: 4, height: 2, ids: vec![0; 8] };
        assert_eq!(map.pixel_center(0, 0), [-0.75, 0.5]);
        assert_eq!(map.pixel_center(3, 1), [0.75, -0.5]);
    }

    #[test]
    fn iter_visits_every_pixel_once() {
        let map = image_of(&[5, 6, 7, 8, 9, 10], 2).ids();
        let seen: Vec<_> = map.iter().collect();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[3], (1, 1, 8));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside 3x2")]
    fn owner_at_rejects_column_past_the_edge() {
        let ids = image_of(&[0, 1, 2, 3, 4, 5], 3).ids();
        // (3, 0) would otherwise alias (0, 1).
        ids.owner_at(3, 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside 3x2")]
    fn pixel_rejects_row_past_the_edge() {
        image_of(&[0, 1, 2, 3, 4, 5], 3).pixel(0, 2);
    }

    #[test]
    fn png_round_trips_rgb() {
        let img = image_of(&[0, 1, 2, 3, 300, 70_000], 3);
        let path = std::env::temp_dir().join(format!("swingline-readback-{}.png", std::process::id()));
        img.save_png(&path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(1, 1).0, encoding::encode(300));
    }
}
