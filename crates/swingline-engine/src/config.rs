use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::encoding::MAX_INSTANCES;
use crate::error::{Result, VoronoiError};

/// Base radius that covers the whole viewport from any seed inside it
/// (the viewport diagonal, `2√2`).
pub const FULL_COVERAGE_RADIUS: f32 = 2.0 * std::f32::consts::SQRT_2;

/// Source of randomness for seed placement.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SeedSource {
    /// Deterministic seed; the same value always yields the same diagram.
    Fixed(u64),
    /// Fresh system entropy on every run.
    #[default]
    Entropy,
}

impl SeedSource {
    pub fn rng(self) -> StdRng {
        match self {
            Self::Fixed(seed) => StdRng::seed_from_u64(seed),
            Self::Entropy => StdRng::from_os_rng(),
        }
    }
}

/// Parameters of one Voronoi diagram.
///
/// `width`/`height` size both the window viewport and the offscreen target.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiConfig {
    /// Base-ring segments per cone.
    pub cone_res: u32,

    /// Number of seeds.
    pub point_count: u32,

    pub width: u32,
    pub height: u32,

    /// Cone base radius in clip units.
    ///
    /// `1.0` reproduces the classic setup and can leave the clear color visible
    /// near the corners when seeds are sparse; [`FULL_COVERAGE_RADIUS`] never does.
    pub cone_radius: f32,

    pub seeds: SeedSource,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            cone_res: 64,
            point_count: 100,
            width: 400,
            height: 400,
            cone_radius: 1.0,
            seeds: SeedSource::Entropy,
        }
    }
}

impl VoronoiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cone_res < 3 {
            return Err(VoronoiError::InvalidConfig(format!(
                "cone_res must be at least 3 (got {})",
                self.cone_res
            )));
        }
        if self.point_count == 0 || self.point_count >= MAX_INSTANCES {
            return Err(VoronoiError::InvalidConfig(format!(
                "point_count must be in [1, {MAX_INSTANCES}) (got {})",
                self.point_count
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "viewport must be non-empty (got {}x{})",
                self.width, self.height
            )));
        }
        if !(self.cone_radius.is_finite() && self.cone_radius > 0.0) {
            return Err(VoronoiError::InvalidConfig(format!(
                "cone_radius must be positive and finite (got {})",
                self.cone_radius
            )));
        }
        Ok(())
    }

    /// Vertices per cone fan (apex + closed ring).
    #[inline]
    pub fn cone_vertex_count(&self) -> u32 {
        self.cone_res + 2
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn defaults_match_classic_setup() {
        let c = VoronoiConfig::default();
        assert_eq!((c.cone_res, c.point_count, c.width, c.height), (64, 100, 400, 400));
        assert_eq!(c.cone_radius, 1.0);
        assert_eq!(c.seeds, SeedSource::Entropy);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_cone() {
        let c = VoronoiConfig { cone_res: 2, ..Default::default() };
        assert!(matches!(c.validate(), Err(VoronoiError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_and_oversized_seed_sets() {
        let empty = VoronoiConfig { point_count: 0, ..Default::default() };
        assert!(empty.validate().is_err());

        let huge = VoronoiConfig { point_count: MAX_INSTANCES, ..Default::default() };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn rejects_zero_viewport() {
        let c = VoronoiConfig { height: 0, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_radius() {
        for r in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let c = VoronoiConfig { cone_radius: r, ..Default::default() };
            assert!(c.validate().is_err(), "radius {r} accepted");
        }
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let a: Vec<u32> = SeedSource::Fixed(7).rng().random_iter().take(8).collect();
        let b: Vec<u32> = SeedSource::Fixed(7).rng().random_iter().take(8).collect();
        assert_eq!(a, b);
    }
}
