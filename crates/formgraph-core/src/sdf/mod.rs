//! Signed Distance Functions (SDF) for shape composition
//!
//! SDFs represent shapes as functions returning the distance from any point
//! in space to the nearest surface. Negative values are inside, positive
//! values are outside, zero is exactly on the surface.
//!
//! The evaluator builds one [`Evaluable`](evaluable::Evaluable) per
//! contributing primitive each pass and folds them with the polynomial
//! blend kernels in [`blend`].

pub mod blend;
pub mod evaluable;

use glam::Vec3;

/// The core SDF trait - any type that can compute distance from a point
pub trait Sdf: Send + Sync {
    /// Calculate the signed distance from point `p` to the surface.
    ///
    /// - Returns negative values for points inside the shape
    /// - Returns positive values for points outside the shape
    /// - Returns zero for points exactly on the surface
    fn distance(&self, p: Vec3) -> f32;
}

impl<F: Fn(Vec3) -> f32 + Send + Sync> Sdf for F {
    fn distance(&self, p: Vec3) -> f32 {
        self(p)
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a cube centered at origin
    pub fn cube(half_size: f32) -> Self {
        Self::new(Vec3::splat(-half_size), Vec3::splat(half_size))
    }

    /// Create from center and half-extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Expand the bounding box by a margin
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min - Vec3::splat(margin),
            self.max + Vec3::splat(margin),
        )
    }

    /// Merge two bounding boxes
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Get the size of the bounding box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the size along each axis
    pub fn half_size(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// True if the box encloses no volume on some axis
    pub fn is_degenerate(&self) -> bool {
        let s = self.size();
        s.x <= 0.0 || s.y <= 0.0 || s.z <= 0.0 || !s.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_union_covers_both() {
        let a = Aabb::cube(1.0);
        let b = Aabb::from_center(Vec3::new(3.0, 0.0, 0.0), Vec3::splat(0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(u.max, Vec3::new(3.5, 1.0, 1.0));
    }

    #[test]
    fn aabb_center_and_half_size() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 2.0, 4.0));
        assert_eq!(b.center(), Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(b.half_size(), Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn degenerate_detection() {
        let flat = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.is_degenerate());
        assert!(!Aabb::cube(1.0).is_degenerate());
    }

    #[test]
    fn closures_are_sdfs() {
        let s = |p: Vec3| p.length() - 1.0;
        assert_eq!(Sdf::distance(&s, Vec3::new(2.0, 0.0, 0.0)), 1.0);
    }
}
