//! Voxel field sampling
//!
//! Samples an implicit distance function (and optionally a color function)
//! on an N³ lattice spanning a world-space AABB. Lattice coordinates live in
//! local [-1,1]³ and are mapped affinely into world space: center = bbox
//! center, half-extent = bbox half-size.
//!
//! Sign convention of the stored field: the sampler stores `-f`, so values
//! are **positive inside** the shape with the surface at isolevel 0. The
//! extractor in [`crate::mesh`] owns the conversion back to the convention
//! its triangulation library expects.

use crate::sdf::{Aabb, Sdf};
use glam::Vec3;
use rayon::prelude::*;

/// A sampled scalar field (plus optional colors) on a cubic lattice
#[derive(Debug, Clone)]
pub struct VoxelField {
    /// Lattice points per axis
    pub resolution: u32,
    /// World-space region the lattice spans
    pub bounds: Aabb,
    /// `resolution³` samples, positive inside, indexed `(z * n + y) * n + x`
    pub values: Vec<f32>,
    /// Per-lattice-point colors, sampled alongside the distances
    pub colors: Option<Vec<Vec3>>,
}

impl VoxelField {
    /// Total number of lattice points
    pub fn len(&self) -> usize {
        let n = self.resolution as usize;
        n * n * n
    }

    pub fn is_empty(&self) -> bool {
        self.resolution == 0
    }

    /// World-space position of lattice point `(x, y, z)`
    pub fn lattice_to_world(&self, x: u32, y: u32, z: u32) -> Vec3 {
        lattice_to_world(self.bounds, self.resolution, x, y, z)
    }
}

fn lattice_to_world(bounds: Aabb, resolution: u32, x: u32, y: u32, z: u32) -> Vec3 {
    let last = (resolution - 1).max(1) as f32;
    let local = Vec3::new(x as f32, y as f32, z as f32) / last * 2.0 - Vec3::ONE;
    bounds.center() + local * bounds.half_size()
}

/// Sample `sdf` (and optionally `color`) over `bounds` at `resolution`
/// points per axis.
///
/// Sampling is parallelized over the flat lattice index with rayon. The
/// distance sign is flipped on store (positive = inside).
pub fn sample_field<S>(
    sdf: &S,
    bounds: Aabb,
    resolution: u32,
    color: Option<&(dyn Fn(Vec3) -> Vec3 + Sync)>,
) -> VoxelField
where
    S: Sdf + ?Sized,
{
    let n = resolution as usize;
    let total = n * n * n;

    let values: Vec<f32> = (0..total)
        .into_par_iter()
        .map(|idx| {
            let x = (idx % n) as u32;
            let y = ((idx / n) % n) as u32;
            let z = (idx / (n * n)) as u32;
            let p = lattice_to_world(bounds, resolution, x, y, z);
            -sdf.distance(p)
        })
        .collect();

    let colors = color.map(|color_fn| {
        (0..total)
            .into_par_iter()
            .map(|idx| {
                let x = (idx % n) as u32;
                let y = ((idx / n) % n) as u32;
                let z = (idx / (n * n)) as u32;
                color_fn(lattice_to_world(bounds, resolution, x, y, z))
            })
            .collect()
    });

    VoxelField {
        resolution,
        bounds,
        values,
        colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_sphere(p: Vec3) -> f32 {
        p.length() - 0.5
    }

    #[test]
    fn lattice_corners_map_to_bounds() {
        let bounds = Aabb::new(Vec3::new(-2.0, -1.0, 0.0), Vec3::new(2.0, 1.0, 4.0));
        let field = sample_field(&unit_sphere, bounds, 9, None);
        assert_eq!(field.lattice_to_world(0, 0, 0), bounds.min);
        assert_eq!(field.lattice_to_world(8, 8, 8), bounds.max);
        let mid = field.lattice_to_world(4, 4, 4);
        assert_relative_eq!(mid.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(mid.z, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn sign_is_positive_inside() {
        let bounds = Aabb::cube(1.0);
        let field = sample_field(&unit_sphere, bounds, 9, None);
        let n = 9usize;
        // Lattice center (4,4,4) is the sphere center
        let center = field.values[(4 * n + 4) * n + 4];
        assert!(center > 0.0, "inside must store positive, got {center}");
        // A corner of the bounds is well outside
        let corner = field.values[0];
        assert!(corner < 0.0, "outside must store negative, got {corner}");
    }

    #[test]
    fn colors_sampled_on_same_lattice() {
        let bounds = Aabb::cube(1.0);
        let color = |p: Vec3| {
            if p.x < 0.0 {
                Vec3::X
            } else {
                Vec3::Z
            }
        };
        let field = sample_field(&unit_sphere, bounds, 5, Some(&color));
        let colors = field.colors.as_ref().unwrap();
        assert_eq!(colors.len(), field.len());
        // x index 0 is on the negative-x side
        assert_eq!(colors[0], Vec3::X);
        assert_eq!(colors[4], Vec3::Z);
    }

    #[test]
    fn resolution_controls_sample_count() {
        let field = sample_field(&unit_sphere, Aabb::cube(1.0), 16, None);
        assert_eq!(field.values.len(), 16 * 16 * 16);
    }
}
