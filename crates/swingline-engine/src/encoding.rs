//! Instance identity <-> 24-bit color.
//!
//! The Voronoi vertex stage stamps each cone with the color of its instance
//! index; these functions are the CPU side of the same map. The color
//! attachment therefore doubles as a pixel -> seed lookup table.

/// Number of distinct identities representable in 8-bit RGB.
pub const MAX_INSTANCES: u32 = 1 << 24;

/// Encodes an instance index as `(k mod 256, k/256 mod 256, k/65536 mod 256)`.
#[inline]
pub const fn encode(k: u32) -> [u8; 3] {
    [
        (k % 256) as u8,
        ((k / 256) % 256) as u8,
        ((k / 65536) % 256) as u8,
    ]
}

/// Recovers the instance index from an 8-bit-per-channel color.
#[inline]
pub const fn decode(rgb: [u8; 3]) -> u32 {
    rgb[0] as u32 | (rgb[1] as u32) << 8 | (rgb[2] as u32) << 16
}
