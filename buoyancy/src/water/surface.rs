//! Surface queries against the displaced water grid.
//!
//! Every query maps the world point into the surface's local frame, finds the
//! grid cell containing it and solves the plane of one of the cell's two
//! triangles. Points outside the grid footprint fall back to the volume's
//! transform (its world height and up vector).

use bevy::math::Vec3;
use bevy::transform::components::Transform;

use super::config::WaterSurfaceConfig;
use super::grid::WaterGrid;
use super::waves::WaveDisplacement;
use crate::constants::DEGENERATE_NORMAL_EPSILON;

/// Three displaced world-space vertices surrounding a queried point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePatch {
    pub vertices: [Vec3; 3],
}

impl SurfacePatch {
    /// Unit normal of the patch plane, flipped to point upward.
    pub fn normal(&self) -> Vec3 {
        let [v0, v1, v2] = self.vertices;
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        if normal.y < 0.0 {
            -normal
        } else {
            normal
        }
    }

    /// Height of the patch plane above (x, z).
    pub fn level_at(&self, x: f32, z: f32) -> f32 {
        self.level_with_normal(x, z, self.normal())
    }

    fn level_with_normal(&self, x: f32, z: f32, normal: Vec3) -> f32 {
        let v0 = self.vertices[0];
        // A vertical patch has no unique height; use its first corner.
        if normal.y.abs() < DEGENERATE_NORMAL_EPSILON {
            return v0.y;
        }
        (v0.dot(normal) - x * normal.x - z * normal.z) / normal.y
    }
}

/// Result of one combined level + normal query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterSample {
    /// World height of the water surface above the queried point
    pub level: f32,
    /// Upward-facing surface normal
    pub normal: Vec3,
    /// False when the point is outside the grid and fallbacks were used
    pub on_surface: bool,
}

#[derive(Debug, Clone)]
pub struct WaterSurface {
    grid: WaterGrid,
    waves: WaveDisplacement,
    transform: Transform,
    /// Seconds since the level was loaded, drives the wave animation.
    elapsed: f32,
}

impl WaterSurface {
    pub fn new(config: &WaterSurfaceConfig, transform: Transform) -> Self {
        Self::from_parts(
            WaterGrid::from_config(config),
            WaveDisplacement::new(&config.waves),
            transform,
        )
    }

    pub fn from_parts(grid: WaterGrid, waves: WaveDisplacement, transform: Transform) -> Self {
        Self {
            grid,
            waves,
            transform,
            elapsed: 0.0,
        }
    }

    pub fn grid(&self) -> &WaterGrid {
        &self.grid
    }

    pub fn waves(&self) -> &WaveDisplacement {
        &self.waves
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
    }

    /// World-space up vector of the volume.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.transform.rotation * Vec3::Y
    }

    /// Displaced local position of base vertex `index` at `time`.
    #[inline]
    pub fn height_at(&self, index: usize, time: f32) -> Vec3 {
        self.waves.displace(self.grid.base_vertex(index), time)
    }

    /// Displaced vertex `index` at the current elapsed time, in world space.
    #[inline]
    pub fn displaced_world_vertex(&self, index: usize) -> Vec3 {
        self.transform
            .transform_point(self.height_at(index, self.elapsed))
    }

    pub fn surrounding_patch(&self, world_point: Vec3) -> Option<SurfacePatch> {
        let local = self
            .transform
            .compute_affine()
            .inverse()
            .transform_point3(world_point);
        let cell_size = self.grid.cell_size();
        // NaN casts to 0 and is rejected below
        let x = (local.x / cell_size).ceil() as i64;
        let z = (local.z / cell_size).ceil() as i64;
        if x <= 0
            || z <= 0
            || x >= self.grid.columns() as i64 + 1
            || z >= self.grid.rows() as i64 + 1
        {
            return None;
        }
        let (x, z) = (x as u32, z as u32);

        let near = self.displaced_world_vertex(self.grid.index(z, x));
        let far = self.displaced_world_vertex(self.grid.index(z - 1, x - 1));
        let first = if horizontal_distance_squared(world_point, near)
            < horizontal_distance_squared(world_point, far)
        {
            near
        } else {
            far
        };

        Some(SurfacePatch {
            vertices: [
                first,
                self.displaced_world_vertex(self.grid.index(z - 1, x)),
                self.displaced_world_vertex(self.grid.index(z, x - 1)),
            ],
        })
    }

    pub fn surface_normal(&self, world_point: Vec3) -> Vec3 {
        match self.surrounding_patch(world_point) {
            Some(patch) => patch.normal(),
            None => self.up(),
        }
    }

    pub fn water_level(&self, world_point: Vec3) -> f32 {
        match self.surrounding_patch(world_point) {
            Some(patch) => patch.level_at(world_point.x, world_point.z),
            None => self.transform.translation.y,
        }
    }

    pub fn is_submerged(&self, world_point: Vec3) -> bool {
        self.water_level(world_point) - world_point.y > 0.0
    }

    /// Level and normal from a single patch lookup.
    pub fn sample(&self, world_point: Vec3) -> WaterSample {
        match self.surrounding_patch(world_point) {
            Some(patch) => {
                let normal = patch.normal();
                WaterSample {
                    level: patch.level_with_normal(world_point.x, world_point.z, normal),
                    normal,
                    on_surface: true,
                }
            }
            None => WaterSample {
                level: self.transform.translation.y,
                normal: self.up(),
                on_surface: false,
            },
        }
    }
}

#[inline]
fn horizontal_distance_squared(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::config::{WaveConfig, WavePreset};
    use bevy::math::Quat;

    fn surface(rows: u32, columns: u32, waves: WaveConfig, transform: Transform) -> WaterSurface {
        WaterSurface::new(
            &WaterSurfaceConfig {
                rows,
                columns,
                cell_size: 1.0,
                waves,
            },
            transform,
        )
    }

    #[test]
    fn test_outside_footprint_uses_transform_fallbacks() {
        let transform = Transform::from_xyz(0.0, 2.0, 0.0);
        let water = surface(4, 4, WavePreset::Lake.to_config(), transform);

        for point in [
            Vec3::new(-0.5, 0.0, 1.5),
            Vec3::new(1.5, 0.0, -0.5),
            Vec3::new(4.5, 0.0, 1.5),
            Vec3::new(1.5, 0.0, 4.5),
            Vec3::new(0.0, 0.0, 1.5),
        ] {
            assert!(water.surrounding_patch(point).is_none(), "{point}");
            assert_eq!(water.water_level(point), 2.0);
            assert_eq!(water.surface_normal(point), Vec3::Y);
            assert!(!water.sample(point).on_surface);
        }
    }

    #[test]
    fn test_flat_water_level_and_normal() {
        let water = surface(
            4,
            4,
            WavePreset::Still.to_config(),
            Transform::from_xyz(-2.0, 1.5, -2.0),
        );
        let point = Vec3::new(0.3, -4.0, 0.7);
        assert!((water.water_level(point) - 1.5).abs() < 1e-5);
        assert!((water.surface_normal(point) - Vec3::Y).length() < 1e-5);
        assert!(water.is_submerged(point));
        assert!(!water.is_submerged(Vec3::new(0.3, 1.6, 0.7)));
    }

    #[test]
    fn test_level_on_vertex_matches_displaced_vertex() {
        let waves = WaveConfig {
            speed: 0.0,
            amplitude: 0.4,
            noise: None,
        };
        let water = surface(6, 6, waves, Transform::IDENTITY);
        let index = water.grid().index(3, 2);
        let vertex = water.displaced_world_vertex(index);
        let level = water.water_level(Vec3::new(vertex.x, -10.0, vertex.z));
        assert!((level - vertex.y).abs() < 1e-5, "{level} vs {}", vertex.y);
    }

    #[test]
    fn test_patch_prefers_nearer_diagonal_corner() {
        let water = surface(4, 4, WavePreset::Still.to_config(), Transform::IDENTITY);
        let patch = water.surrounding_patch(Vec3::new(1.9, 0.0, 1.9)).unwrap();
        assert_eq!(patch.vertices[0], Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(patch.vertices[1], Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(patch.vertices[2], Vec3::new(1.0, 0.0, 2.0));

        let patch = water.surrounding_patch(Vec3::new(1.1, 0.0, 1.1)).unwrap();
        assert_eq!(patch.vertices[0], Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_normal_always_points_up() {
        let water = surface(
            8,
            8,
            WavePreset::Storm.to_config(),
            Transform::from_rotation(Quat::from_rotation_z(0.2)),
        );
        let mut water = water;
        for step in 0..5 {
            water.set_elapsed(step as f32 * 0.7);
            for i in 0..16 {
                for j in 0..16 {
                    let point = Vec3::new(0.25 + i as f32 * 0.5, 0.0, 0.25 + j as f32 * 0.5);
                    if water.surrounding_patch(point).is_some() {
                        assert!(water.surface_normal(point).y >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_is_submerged_matches_level() {
        let mut water = surface(5, 5, WavePreset::Lake.to_config(), Transform::IDENTITY);
        water.set_elapsed(1.3);
        for i in 0..12 {
            let point = Vec3::new(-0.5 + i as f32 * 0.5, -0.4 + i as f32 * 0.07, 2.2);
            assert_eq!(
                water.is_submerged(point),
                water.water_level(point) - point.y > 0.0
            );
        }
    }

    #[test]
    fn test_height_at_is_pure() {
        let water = surface(3, 3, WavePreset::Storm.to_config(), Transform::IDENTITY);
        for index in 0..water.grid().vertex_count() {
            assert_eq!(water.height_at(index, 4.2), water.height_at(index, 4.2));
        }
    }

    #[test]
    fn test_sample_agrees_with_separate_queries() {
        let mut water = surface(5, 5, WavePreset::Lake.to_config(), Transform::IDENTITY);
        water.set_elapsed(0.4);
        let point = Vec3::new(2.3, 0.0, 3.6);
        let sample = water.sample(point);
        assert!(sample.on_surface);
        assert_eq!(sample.level, water.water_level(point));
        assert_eq!(sample.normal, water.surface_normal(point));
    }

    #[test]
    fn test_vertical_patch_does_not_divide_by_zero() {
        let patch = SurfacePatch {
            vertices: [
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, 1.0, 1.0),
            ],
        };
        assert!(patch.normal().y.abs() < 1e-6);
        assert_eq!(patch.level_at(0.0, 0.5), 1.0);
    }
}
