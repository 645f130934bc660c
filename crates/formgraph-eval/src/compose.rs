//! SDF composition
//!
//! Turns the primitives of one input group into per-pass [`Evaluable`]
//! descriptors plus the bookkeeping the boolean evaluator needs: sampling
//! bounds, tight reported bounds, a content-hash fragment, and the pivot
//! candidate.
//!
//! World transforms are read from the committed scene (the synced state),
//! not from raw node data: a primitive that has not been committed yet is
//! skipped silently and picked up next pass.

use crate::scene::{SceneList, SceneObject};
use crate::snapshot::{Node, NodeKind};
use formgraph_core::prelude::{
    Aabb, Evaluable, ShapeKind, conservative_bounds, tight_bounds,
};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Id → committed object lookup built once per pass
pub type SceneIndex<'a> = HashMap<&'a str, &'a Arc<SceneObject>>;

pub fn index(list: &SceneList) -> SceneIndex<'_> {
    list.iter().map(|o| (o.id.as_str(), o)).collect()
}

/// World matrix of a committed object's synced transform
pub fn synced_world_matrix(object: &SceneObject) -> Mat4 {
    let r = object.rotation;
    Mat4::from_scale_rotation_translation(
        object.scale,
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
        object.position,
    )
}

/// Snap a float onto a 1e-3 lattice for content hashing.
///
/// Round-to-nearest, so edits above half a lattice step always change the
/// hash and sub-threshold float noise never does.
pub(crate) fn quantize(v: f32) -> i64 {
    (v * 1000.0).round() as i64
}

/// Composition result for one input group
#[derive(Debug, Clone, Default)]
pub struct GroupEval {
    pub evaluables: Vec<Evaluable>,
    /// Loose bounds for the sampling lattice
    pub sample_bounds: Option<Aabb>,
    /// Tight bounds reported on the result object
    pub tight_bounds: Option<Aabb>,
    /// Content-hash fragment over contributing transforms and params
    pub hash: u64,
    /// Id and world position of the first resolved primitive
    pub pivot: Option<(String, Vec3)>,
}

impl GroupEval {
    pub fn is_empty(&self) -> bool {
        self.evaluables.is_empty()
    }
}

/// Build the evaluables, bounds and hash fragment for one group of
/// primitives.
///
/// Skipped silently: primitives not yet in the committed scene (unsynced
/// this frame) and primitives with a non-invertible world matrix (zero
/// scale).
pub fn compose_group(primitives: &[&Node], scene: &SceneIndex<'_>) -> GroupEval {
    let mut out = GroupEval::default();
    let mut hasher = std::hash::DefaultHasher::new();

    for node in primitives {
        let Some(object) = scene.get(node.id.as_str()) else {
            continue;
        };
        let world = synced_world_matrix(object);
        if !world.determinant().is_finite() || world.determinant().abs() < 1e-12 {
            continue;
        }

        let kind = match node.kind {
            NodeKind::Box => ShapeKind::Box,
            NodeKind::Sphere => ShapeKind::Sphere,
            _ => continue,
        };
        let corner_radius = node.data.corner_radius;

        // Hash: shape kind, world matrix on the fixed-precision lattice,
        // corner radius
        (kind == ShapeKind::Box).hash(&mut hasher);
        for v in world.to_cols_array() {
            quantize(v).hash(&mut hasher);
        }
        quantize(corner_radius).hash(&mut hasher);

        let loose = conservative_bounds(&world);
        let tight = tight_bounds(&world, Vec3::splat(0.5));
        out.sample_bounds = Some(match out.sample_bounds {
            Some(b) => b.union(&loose),
            None => loose,
        });
        out.tight_bounds = Some(match out.tight_bounds {
            Some(b) => b.union(&tight),
            None => tight,
        });

        if out.pivot.is_none() {
            out.pivot = Some((node.id.clone(), object.position));
        }

        out.evaluables
            .push(Evaluable::unit(kind, &world, corner_radius, object.color));
    }

    out.evaluables.len().hash(&mut hasher);
    out.hash = hasher.finish();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneKind;
    use crate::snapshot::{MaterialStyle, NodeData};
    use approx::assert_relative_eq;
    use formgraph_core::sdf::Sdf;

    fn prim_node(id: &str, kind: NodeKind) -> Node {
        Node {
            id: id.into(),
            kind,
            data: NodeData::default(),
        }
    }

    fn synced(id: &str, position: Vec3, scale: Vec3) -> Arc<SceneObject> {
        Arc::new(SceneObject {
            id: id.into(),
            kind: SceneKind::Box,
            position,
            rotation: Vec3::ZERO,
            scale,
            mesh: None,
            bounds: None,
            color: Vec3::splat(0.8),
            material: MaterialStyle::Matte,
            is_ghost: false,
            is_faded: false,
            proxy_selection_id: None,
            generation: 0,
        })
    }

    fn scene_of(objects: &[Arc<SceneObject>]) -> SceneList {
        Arc::new(objects.to_vec())
    }

    #[test]
    fn unsynced_primitive_is_skipped() {
        let a = prim_node("a", NodeKind::Box);
        let scene = scene_of(&[]);
        let group = compose_group(&[&a], &index(&scene));
        assert!(group.is_empty());
        assert!(group.sample_bounds.is_none());
    }

    #[test]
    fn zero_scale_is_skipped() {
        let a = prim_node("a", NodeKind::Box);
        let scene = scene_of(&[synced("a", Vec3::ZERO, Vec3::new(0.0, 1.0, 1.0))]);
        let group = compose_group(&[&a], &index(&scene));
        assert!(group.is_empty());
    }

    #[test]
    fn bounds_and_pivot_from_synced_transforms() {
        let a = prim_node("a", NodeKind::Box);
        let b = prim_node("b", NodeKind::Box);
        let scene = scene_of(&[
            synced("a", Vec3::new(-0.6, 0.0, 0.0), Vec3::ONE),
            synced("b", Vec3::new(0.6, 0.0, 0.0), Vec3::ONE),
        ]);
        let group = compose_group(&[&a, &b], &index(&scene));

        assert_eq!(group.evaluables.len(), 2);
        let tight = group.tight_bounds.unwrap();
        assert_relative_eq!(tight.min.x, -1.1, epsilon = 1e-5);
        assert_relative_eq!(tight.max.x, 1.1, epsilon = 1e-5);
        assert_relative_eq!(tight.max.y, 0.5, epsilon = 1e-5);

        // Loose sampling bounds strictly contain the tight bounds
        let loose = group.sample_bounds.unwrap();
        assert!(loose.min.x < tight.min.x && loose.max.x > tight.max.x);

        let (pivot_id, pivot_pos) = group.pivot.unwrap();
        assert_eq!(pivot_id, "a");
        assert_eq!(pivot_pos, Vec3::new(-0.6, 0.0, 0.0));
    }

    #[test]
    fn evaluable_distance_uses_synced_transform() {
        let a = prim_node("a", NodeKind::Sphere);
        let scene = scene_of(&[synced("a", Vec3::new(2.0, 0.0, 0.0), Vec3::ONE)]);
        let group = compose_group(&[&a], &index(&scene));
        let d = group.evaluables[0].distance(Vec3::new(2.5, 0.0, 0.0));
        assert_relative_eq!(d, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn hash_changes_past_rounding_threshold() {
        let a = prim_node("a", NodeKind::Box);

        let at = |x: f32| {
            let scene = scene_of(&[synced("a", Vec3::new(x, 0.0, 0.0), Vec3::ONE)]);
            compose_group(&[&a], &index(&scene)).hash
        };

        let base = at(0.6);
        assert_eq!(base, at(0.6));
        // Below half a lattice step: same hash
        assert_eq!(base, at(0.6002));
        // Above: different hash
        assert_ne!(base, at(0.601));
        assert_ne!(base, at(0.7));
    }

    #[test]
    fn corner_radius_feeds_hash() {
        let mut a = prim_node("a", NodeKind::Box);
        let scene = scene_of(&[synced("a", Vec3::ZERO, Vec3::ONE)]);
        let h1 = compose_group(&[&a], &index(&scene)).hash;
        a.data.corner_radius = 0.1;
        let h2 = compose_group(&[&a], &index(&scene)).hash;
        assert_ne!(h1, h2);
    }
}
