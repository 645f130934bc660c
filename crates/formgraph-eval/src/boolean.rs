//! Boolean operation evaluation
//!
//! Each boolean node owns a cached `{content hash, result object}` pair.
//! Per pass the input groups are re-resolved and re-hashed; the expensive
//! voxel sampling and triangulation only run when the hash moved or no
//! mesh exists yet. A cache hit refreshes color and material in place of
//! the object fields without touching geometry.

use crate::compose::{GroupEval, SceneIndex, compose_group, quantize};
use crate::resolve::gather_primitives;
use crate::scene::{SceneKind, SceneObject};
use crate::snapshot::{GraphSnapshot, Node, NodeKind, PortGroup};
use formgraph_core::prelude::{
    Evaluable, SurfaceExtractor, group_color, group_distance, sample_field, smooth_max,
};
use glam::Vec3;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};

/// Memoized state for one boolean node
pub(crate) struct CacheEntry {
    pub hash: u64,
    pub object: Arc<SceneObject>,
}

/// Result of evaluating one boolean node for one pass
pub(crate) struct BooleanOutcome {
    /// The object to commit; `None` tears down any stale scene entry
    pub object: Option<Arc<SceneObject>>,
    pub remeshed: bool,
    pub cache_hit: bool,
}

impl BooleanOutcome {
    fn none() -> Self {
        Self {
            object: None,
            remeshed: false,
            cache_hit: false,
        }
    }
}

/// Distance of the combined operation at `p`.
///
/// Groups are pre-folded with the smooth-min kernel; a missing secondary
/// group degrades to the primary group alone, which keeps mid-edit
/// feedback alive while the second input is being wired up.
fn combined_distance(
    kind: NodeKind,
    primary: &GroupEval,
    secondary: &GroupEval,
    k: f32,
    p: Vec3,
) -> f32 {
    let da = group_distance(&primary.evaluables, k, p);
    match kind {
        NodeKind::Union => da,
        NodeKind::Intersection => {
            if secondary.is_empty() || primary.is_empty() {
                let db = group_distance(&secondary.evaluables, k, p);
                da.min(db)
            } else {
                smooth_max(da, group_distance(&secondary.evaluables, k, p), k)
            }
        }
        NodeKind::Difference => {
            if secondary.is_empty() {
                da
            } else {
                smooth_max(da, -group_distance(&secondary.evaluables, k, p), k)
            }
        }
        _ => da,
    }
}

pub(crate) fn evaluate_boolean(
    node: &Node,
    snapshot: &GraphSnapshot,
    scene: &SceneIndex<'_>,
    cache: &mut HashMap<String, CacheEntry>,
    extractor: &mut SurfaceExtractor,
    resolution: u32,
) -> BooleanOutcome {
    let primary_prims = gather_primitives(snapshot, &node.id, PortGroup::Primary);
    let primary = compose_group(&primary_prims, scene);

    let has_secondary = node
        .kind
        .info()
        .input_groups
        .iter()
        .any(|(_, g)| *g == PortGroup::Secondary);
    let secondary = if has_secondary {
        let prims = gather_primitives(snapshot, &node.id, PortGroup::Secondary);
        compose_group(&prims, scene)
    } else {
        GroupEval::default()
    };

    // No resolved primitive anywhere: no object this pass
    if primary.is_empty() && secondary.is_empty() {
        return BooleanOutcome::none();
    }

    let smoothness = node.data.smoothness;
    let hash = combinator_hash(node.kind, smoothness, &primary, &secondary);

    let color = Vec3::from_array(node.data.color);
    let material = node.data.material;

    // Cache hit: reuse geometry, refresh display fields only
    if let Some(entry) = cache.get_mut(&node.id) {
        if entry.hash == hash && entry.object.mesh.is_some() {
            let object = if entry.object.color == color && entry.object.material == material {
                entry.object.clone()
            } else {
                let refreshed = Arc::new(SceneObject {
                    color,
                    material,
                    generation: entry.object.generation + 1,
                    ..(*entry.object).clone()
                });
                entry.object = refreshed.clone();
                refreshed
            };
            return BooleanOutcome {
                object: Some(object),
                remeshed: false,
                cache_hit: true,
            };
        }
    }

    // Remesh
    let sample_bounds = match (primary.sample_bounds, secondary.sample_bounds) {
        (Some(a), Some(b)) => a.union(&b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return BooleanOutcome::none(),
    };
    if sample_bounds.is_degenerate() {
        return BooleanOutcome::none();
    }

    let all_evaluables: Vec<Evaluable> = primary
        .evaluables
        .iter()
        .chain(&secondary.evaluables)
        .copied()
        .collect();

    let kind = node.kind;
    let distance = |p: Vec3| combined_distance(kind, &primary, &secondary, smoothness, p);
    let color_fn = |p: Vec3| group_color(&all_evaluables, p);

    let field = sample_field(&distance, sample_bounds, resolution, Some(&color_fn));
    let mesh = match extractor.extract(&field) {
        Ok(mesh) => mesh,
        Err(err) => {
            warn!(node = %node.id, %err, "isosurface extraction failed");
            return BooleanOutcome::none();
        }
    };
    debug!(
        node = %node.id,
        triangles = mesh.triangle_count(),
        "remeshed boolean node"
    );

    let tight_bounds = match (primary.tight_bounds, secondary.tight_bounds) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, b) => a.or(b),
    };

    // Pivot: first primitive off the primary port keeps the gizmo anchored
    // somewhere intuitive; fall back to the bbox center
    let (proxy_selection_id, position) = match &primary.pivot {
        Some((id, pos)) => (Some(id.clone()), *pos),
        None => (
            None,
            tight_bounds.map_or(sample_bounds.center(), |b| b.center()),
        ),
    };

    let generation = cache
        .get(&node.id)
        .map_or(1, |e| e.object.generation + 1);

    let object = Arc::new(SceneObject {
        id: node.id.clone(),
        kind: SceneKind::CsgResult,
        position,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
        mesh: Some(Arc::new(mesh)),
        bounds: tight_bounds,
        color,
        material,
        is_ghost: false,
        is_faded: false,
        proxy_selection_id,
        generation,
    });
    cache.insert(
        node.id.clone(),
        CacheEntry {
            hash,
            object: object.clone(),
        },
    );

    BooleanOutcome {
        object: Some(object),
        remeshed: true,
        cache_hit: false,
    }
}

/// `kind | smoothness | group hashes`, on the same fixed-precision lattice
/// as the group fragments
fn combinator_hash(kind: NodeKind, smoothness: f32, primary: &GroupEval, secondary: &GroupEval) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    std::mem::discriminant(&kind).hash(&mut hasher);
    quantize(smoothness).hash(&mut hasher);
    primary.hash.hash(&mut hasher);
    secondary.hash.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgraph_core::sdf::Aabb;
    use formgraph_core::sdf::evaluable::ShapeKind;
    use glam::Mat4;

    fn eval_at(kind: NodeKind, k: f32, p: Vec3, a: Vec3, b: Vec3) -> f32 {
        let make = |t: Vec3| {
            Evaluable::unit(ShapeKind::Sphere, &Mat4::from_translation(t), 0.0, Vec3::ONE)
        };
        let primary = GroupEval {
            evaluables: vec![make(a)],
            sample_bounds: Some(Aabb::cube(2.0)),
            tight_bounds: Some(Aabb::cube(1.0)),
            hash: 1,
            pivot: None,
        };
        let secondary = GroupEval {
            evaluables: vec![make(b)],
            sample_bounds: Some(Aabb::cube(2.0)),
            tight_bounds: Some(Aabb::cube(1.0)),
            hash: 2,
            pivot: None,
        };
        combined_distance(kind, &primary, &secondary, k, p)
    }

    #[test]
    fn difference_carves_the_secondary() {
        // Overlapping spheres at the origin: inside A, inside B
        let d = eval_at(
            NodeKind::Difference,
            0.0,
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(0.25, 0.0, 0.0),
        );
        // Point is inside the cutter, so it is outside the result
        assert!(d > 0.0);
    }

    #[test]
    fn intersection_keeps_only_overlap() {
        let a = Vec3::new(-0.25, 0.0, 0.0);
        let b = Vec3::new(0.25, 0.0, 0.0);
        // Origin is inside both
        assert!(eval_at(NodeKind::Intersection, 0.0, Vec3::ZERO, a, b) < 0.0);
        // (-0.4, 0, 0) is inside A but 0.15 outside B, so it is cut away.
        // A's own center sits exactly on B's surface, so probe past it.
        let probe = Vec3::new(-0.4, 0.0, 0.0);
        assert!(eval_at(NodeKind::Intersection, 0.0, probe, a, b) > 0.1);
    }

    #[test]
    fn difference_without_secondary_is_identity() {
        let primary = GroupEval {
            evaluables: vec![Evaluable::unit(
                ShapeKind::Sphere,
                &Mat4::IDENTITY,
                0.0,
                Vec3::ONE,
            )],
            ..GroupEval::default()
        };
        let secondary = GroupEval::default();
        let d = combined_distance(
            NodeKind::Difference,
            &primary,
            &secondary,
            0.0,
            Vec3::new(0.5, 0.0, 0.0),
        );
        assert!(d.abs() < 1e-3);
    }

    #[test]
    fn combinator_hash_separates_kinds_and_smoothness() {
        let g1 = GroupEval {
            hash: 11,
            ..GroupEval::default()
        };
        let g2 = GroupEval {
            hash: 22,
            ..GroupEval::default()
        };
        let h_union = combinator_hash(NodeKind::Union, 0.5, &g1, &g2);
        assert_ne!(h_union, combinator_hash(NodeKind::Difference, 0.5, &g1, &g2));
        assert_ne!(h_union, combinator_hash(NodeKind::Union, 0.6, &g1, &g2));
        // Sub-lattice smoothness jitter does not invalidate
        assert_eq!(h_union, combinator_hash(NodeKind::Union, 0.5002, &g1, &g2));
        // Group order matters: A|B is not B|A
        assert_ne!(h_union, combinator_hash(NodeKind::Union, 0.5, &g2, &g1));
    }
}
