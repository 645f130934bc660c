//! # formgraph core
//!
//! Geometry kernel for the formgraph evaluator: per-pass evaluable shape
//! descriptors, polynomial smooth blending, voxel field sampling, and
//! isosurface extraction into triangle meshes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formgraph_core::prelude::*;
//! use glam::{Mat4, Vec3};
//!
//! let a = Evaluable::unit(ShapeKind::Sphere, &Mat4::IDENTITY, 0.0, Vec3::ONE);
//! let b = Evaluable::unit(
//!     ShapeKind::Box,
//!     &Mat4::from_translation(Vec3::new(0.6, 0.0, 0.0)),
//!     0.05,
//!     Vec3::ONE,
//! );
//!
//! let sdf = |p: Vec3| group_distance(&[a, b], 0.25, p);
//! let field = sample_field(&sdf, Aabb::cube(1.5), 64, None);
//! let mesh = SurfaceExtractor::new(64)?.extract(&field)?;
//! ```
//!
//! ## Units and Conventions
//!
//! - Unit primitives: sphere of diameter 1, box of side 1, both centered
//!   at the origin; size comes from the world matrix
//! - Signed distances are negative inside; the *sampled* field flips the
//!   sign (positive inside, surface at isolevel 0)
//! - All math is `f32`, right-handed, Y-up

pub mod mesh;
pub mod sdf;
pub mod voxel;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::sdf::blend::{group_color, group_distance, smooth_max, smooth_min};
    pub use crate::sdf::evaluable::{
        Evaluable, ShapeKind, conservative_bounds, tight_bounds,
    };
    pub use crate::sdf::{Aabb, Sdf};

    pub use crate::mesh::{Mesh, SurfaceExtractor, Vertex};
    pub use crate::voxel::{VoxelField, sample_field};

    // Math (re-export glam)
    pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

    // Error handling
    pub use crate::{Error, Result};
}
