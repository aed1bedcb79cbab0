mod support;

use swingline_engine::encoding;
use swingline_engine::render::geometry::SeedOffset;
use swingline_engine::render::voronoi::VoronoiRenderer;
use swingline_engine::{SeedSource, VoronoiConfig};

#[test]
fn single_seed_owns_every_pixel() {
    let Some(gpu) = support::device() else { return };
    let ids = support::render_ids(&gpu, &support::covering_config(), &[SeedOffset::new(0.0, 0.0)]);

    assert_eq!((ids.width, ids.height), (400, 400));
    assert!(ids.iter().all(|(_, _, k)| k == 0));
}

#[test]
fn two_symmetric_seeds_split_at_x_zero() {
    let Some(gpu) = support::device() else { return };
    let offsets = [SeedOffset::new(-0.5, 0.0), SeedOffset::new(0.5, 0.0)];
    let ids = support::render_ids(&gpu, &support::covering_config(), &offsets);

    for (x, y, k) in ids.iter() {
        let [cx, _] = ids.pixel_center(x, y);
        if cx.abs() < 0.02 {
            continue;
        }
        let expected = if cx < 0.0 { 0 } else { 1 };
        assert_eq!(k, expected, "pixel ({x}, {y}) at x={cx}");
    }
}

#[test]
fn four_seeds_own_their_quadrants() {
    let Some(gpu) = support::device() else { return };
    let offsets = [
        SeedOffset::new(-0.5, -0.5),
        SeedOffset::new(0.5, -0.5),
        SeedOffset::new(-0.5, 0.5),
        SeedOffset::new(0.5, 0.5),
    ];
    let ids = support::render_ids(&gpu, &support::covering_config(), &offsets);

    for (x, y, k) in ids.iter() {
        let [cx, cy] = ids.pixel_center(x, y);
        if cx.abs() < 0.02 || cy.abs() < 0.02 {
            continue;
        }
        let expected = match (cx > 0.0, cy > 0.0) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        };
        assert_eq!(k, expected, "pixel ({x}, {y}) at ({cx}, {cy})");
    }
}

#[test]
fn every_pixel_belongs_to_a_nearest_seed() {
    let Some(gpu) = support::device() else { return };
    let config = VoronoiConfig {
        seeds: SeedSource::Fixed(0x5eed),
        ..support::covering_config()
    };
    let ctx = support::ctx(&gpu);
    let renderer = VoronoiRenderer::new(&ctx, &config).unwrap();
    renderer.render_offscreen(&ctx);
    let ids = renderer.read_color(&ctx).unwrap().ids();
    let offsets = renderer.offsets();
    assert_eq!(offsets.len(), 100);

    // A facet of the N-gon cone overestimates distance by at most 1/cos(pi/N).
    let slack = 1.0 / (std::f32::consts::PI / config.cone_res as f32).cos();

    for (x, y, k) in ids.iter().step_by(7) {
        let p = ids.pixel_center(x, y);
        assert!((k as usize) < offsets.len(), "pixel ({x}, {y}) decoded to {k}");

        let nearest = offsets
            .iter()
            .map(|o| support::distance(o, p))
            .fold(f32::INFINITY, f32::min);
        let got = support::distance(&offsets[k as usize], p);
        assert!(
            got <= nearest * slack + 1e-4,
            "pixel ({x}, {y}): seed {k} at {got}, nearest at {nearest}"
        );
    }
}

#[test]
fn unit_radius_leaves_far_corners_clear() {
    let Some(gpu) = support::device() else { return };
    let ids = support::render_ids(&gpu, &VoronoiConfig::default(), &[SeedOffset::new(0.0, 0.0)]);

    // Background (1, 1, 0) decodes past any real instance.
    let background = encoding::decode([255, 255, 0]);
    assert_eq!(ids.owner_at(0, 0), background);
    assert_eq!(ids.owner_at(399, 399), background);
    assert_eq!(ids.owner_at(200, 200), 0);
}

#[test]
fn rerunning_the_offscreen_pass_is_stable() {
    let Some(gpu) = support::device() else { return };
    let config = VoronoiConfig {
        point_count: 16,
        seeds: SeedSource::Fixed(3),
        ..support::covering_config()
    };
    let ctx = support::ctx(&gpu);
    let renderer = VoronoiRenderer::new(&ctx, &config).unwrap();

    renderer.render_offscreen(&ctx);
    let first = renderer.read_color(&ctx).unwrap();
    renderer.render_offscreen(&ctx);
    let second = renderer.read_color(&ctx).unwrap();

    assert_eq!(first, second);
    assert!(first.rgba.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn coincident_seeds_go_to_the_lower_index() {
    let Some(gpu) = support::device() else { return };
    let offsets = [
        SeedOffset::new(0.25, 0.0),
        SeedOffset::new(0.25, 0.0),
        SeedOffset::new(-0.5, 0.0),
    ];
    let ids = support::render_ids(&gpu, &support::covering_config(), &offsets);

    assert!(ids.iter().all(|(_, _, k)| k != 1), "duplicate seed won a pixel");
    assert!(ids.iter().any(|(_, _, k)| k == 0));
    assert!(ids.iter().any(|(_, _, k)| k == 2));
}
