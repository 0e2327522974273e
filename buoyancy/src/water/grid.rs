//! Flat tessellated grid that the wave function displaces.
//!
//! Vertex `(row, column)` lives at local `(column * cell_size, 0, row * cell_size)`
//! and is stored at index `row * (columns + 1) + column`.

use bevy::math::{Vec2, Vec3};

use super::config::WaterSurfaceConfig;
use crate::constants::WATER_TRIGGER_DEPTH;

/// Local-space box used as the overlap region of a water volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

#[derive(Debug, Clone)]
pub struct WaterGrid {
    rows: u32,
    columns: u32,
    cell_size: f32,
    base_vertices: Vec<Vec3>,
}

impl WaterGrid {
    pub fn new(rows: u32, columns: u32, cell_size: f32) -> Self {
        let mut base_vertices = Vec::with_capacity(((rows + 1) * (columns + 1)) as usize);
        for row in 0..=rows {
            for column in 0..=columns {
                base_vertices.push(Vec3::new(
                    column as f32 * cell_size,
                    0.0,
                    row as f32 * cell_size,
                ));
            }
        }

        Self {
            rows,
            columns,
            cell_size,
            base_vertices,
        }
    }

    pub fn from_config(config: &WaterSurfaceConfig) -> Self {
        Self::new(config.rows, config.columns, config.cell_size)
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.base_vertices.len()
    }

    #[inline]
    pub fn index(&self, row: u32, column: u32) -> usize {
        (row * (self.columns + 1) + column) as usize
    }

    /// Inverse of [`WaterGrid::index`].
    #[inline]
    pub fn row_col(&self, index: usize) -> (u32, u32) {
        let stride = (self.columns + 1) as usize;
        ((index / stride) as u32, (index % stride) as u32)
    }

    #[inline]
    pub fn base_vertex(&self, index: usize) -> Vec3 {
        self.base_vertices[index]
    }

    pub fn base_vertices(&self) -> &[Vec3] {
        &self.base_vertices
    }

    /// Two counter-clockwise (seen from above) triangles per cell, for mesh consumers.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let mut triangles = Vec::with_capacity((self.rows * self.columns * 2) as usize);
        for row in 0..self.rows {
            for column in 0..self.columns {
                let a = self.index(row, column) as u32;
                let b = self.index(row, column + 1) as u32;
                let c = self.index(row + 1, column) as u32;
                let d = self.index(row + 1, column + 1) as u32;
                triangles.push([a, c, b]);
                triangles.push([b, c, d]);
            }
        }
        triangles
    }

    /// Horizontal extent of the grid in local units (x, z).
    pub fn footprint(&self) -> Vec2 {
        Vec2::new(
            self.columns as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    /// Box hanging under the surface, raised by `wave_height` so crests stay inside.
    pub fn trigger_volume(&self, wave_height: f32) -> TriggerVolume {
        let footprint = self.footprint();
        let size = Vec3::new(footprint.x, WATER_TRIGGER_DEPTH, footprint.y);
        TriggerVolume {
            center: Vec3::new(size.x / 2.0, -size.y / 2.0 + wave_height, size.z / 2.0),
            half_extents: size / 2.0,
        }
    }
}
