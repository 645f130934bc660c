//! Per-pass evaluable shape descriptors
//!
//! An [`Evaluable`] is the flattened form of one primitive node: shape kind,
//! inverse world matrix, half-extents, corner radius, color. It is built
//! fresh every evaluation pass from an already transform-synced world matrix
//! and owned solely within that pass.

use super::{Aabb, Sdf};
use glam::{Mat4, Vec3};

/// Half-diagonal of the unit cube, the worst-case local radius of any
/// unit primitive.
const UNIT_HALF_DIAGONAL: f32 = 0.866_025_4;

/// Shape kind of an evaluable primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Box,
}

/// One primitive flattened for SDF evaluation
#[derive(Debug, Clone, Copy)]
pub struct Evaluable {
    pub kind: ShapeKind,
    /// World-to-local matrix, inverted once at construction
    pub inv_world: Mat4,
    /// Local half-extents; unit primitives use 0.5 on every axis
    pub half_extents: Vec3,
    /// Edge rounding for boxes, ignored for spheres
    pub corner_radius: f32,
    /// Base color, used for inverse-distance-weighted field coloring
    pub color: Vec3,
}

impl Evaluable {
    /// Build a unit-sized evaluable from a world matrix.
    ///
    /// The matrix must be invertible; the compositor checks the determinant
    /// and skips degenerate nodes before calling this.
    pub fn unit(kind: ShapeKind, world: &Mat4, corner_radius: f32, color: Vec3) -> Self {
        Self {
            kind,
            inv_world: world.inverse(),
            half_extents: Vec3::splat(0.5),
            corner_radius,
            color,
        }
    }

    /// Distance in local space of the untransformed shape
    fn local_distance(&self, p: Vec3) -> f32 {
        match self.kind {
            // Unit sphere: diameter 1
            ShapeKind::Sphere => p.length() - 0.5,
            ShapeKind::Box => {
                let r = self.corner_radius.clamp(0.0, self.half_extents.min_element());
                let q = p.abs() - (self.half_extents - Vec3::splat(r));
                q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0) - r
            }
        }
    }
}

impl Sdf for Evaluable {
    fn distance(&self, p: Vec3) -> f32 {
        self.local_distance(self.inv_world.transform_point3(p))
    }
}

/// Conservative world-space bounds of a unit primitive under `world`.
///
/// A sphere of radius unit-half-diagonal × max axis scale × 2 around the
/// translation. Intentionally loose: it feeds the sampling lattice, where
/// clipping the surface is worse than wasted cells.
pub fn conservative_bounds(world: &Mat4) -> Aabb {
    let (scale, _, translation) = world.to_scale_rotation_translation();
    let radius = UNIT_HALF_DIAGONAL * scale.abs().max_element() * 2.0;
    Aabb::from_center(translation, Vec3::splat(radius))
}

/// Tight world-space bounds: the AABB of the transformed local box corners.
///
/// Exact for boxes; encloses spheres since the unit sphere is inscribed in
/// the unit cube.
pub fn tight_bounds(world: &Mat4, half_extents: Vec3) -> Aabb {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for i in 0..8 {
        let corner = Vec3::new(
            if i & 1 == 0 { -half_extents.x } else { half_extents.x },
            if i & 2 == 0 { -half_extents.y } else { half_extents.y },
            if i & 4 == 0 { -half_extents.z } else { half_extents.z },
        );
        let world_corner = world.transform_point3(corner);
        min = min.min(world_corner);
        max = max.max(world_corner);
    }
    Aabb::new(min, max)
}
