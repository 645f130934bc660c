//! Scene list reconciliation
//!
//! Commits one pass's outputs onto the previous scene list. Object
//! identity is the dirty signal: producers hand back the same `Arc` when
//! nothing changed, so no deep equality is needed here, and the commit
//! returns the previous *list* handle untouched when every entry
//! survived unchanged. Downstream render state can then skip work via
//! `Arc::ptr_eq` on either granularity, or via the per-object
//! `generation` counter.

use crate::scene::{SceneList, SceneObject};
use crate::visibility::VisibilityFlags;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Commit one pass onto `previous`.
///
/// Ordered steps: merge field updates onto surviving entries, upsert
/// boolean results, drop entries whose id left `live_ids`, append new
/// primitives, then stamp ghost/faded flags (replacing an object only
/// when its flags actually moved).
pub(crate) fn commit(
    previous: &SceneList,
    new_primitives: Vec<Arc<SceneObject>>,
    updated_fields: HashMap<String, Arc<SceneObject>>,
    boolean_objects: HashMap<String, Arc<SceneObject>>,
    live_ids: &HashSet<String>,
    flags: &VisibilityFlags,
) -> SceneList {
    let mut next: Vec<Arc<SceneObject>> = Vec::with_capacity(previous.len() + new_primitives.len());
    let mut changed = false;

    let mut pending_booleans = boolean_objects;

    for obj in previous.iter() {
        if !live_ids.contains(&obj.id) {
            changed = true;
            continue;
        }
        let replacement = pending_booleans
            .remove(obj.id.as_str())
            .or_else(|| updated_fields.get(obj.id.as_str()).cloned());
        match replacement {
            Some(new_obj) => {
                if !Arc::ptr_eq(&new_obj, obj) {
                    changed = true;
                }
                next.push(new_obj);
            }
            None => next.push(obj.clone()),
        }
    }

    if !new_primitives.is_empty() {
        changed = true;
        next.extend(new_primitives);
    }
    if !pending_booleans.is_empty() {
        changed = true;
        // First-seen order is not meaningful for fresh boolean results,
        // but keep it deterministic for tests and logs
        let mut fresh: Vec<Arc<SceneObject>> = pending_booleans.into_values().collect();
        fresh.sort_by(|a, b| a.id.cmp(&b.id));
        next.extend(fresh);
    }

    // Flag stamping: replace only on an actual flag transition
    for obj in &mut next {
        let ghost = flags.is_ghost(&obj.id);
        let faded = flags.is_faded(&obj.id);
        if obj.is_ghost != ghost || obj.is_faded != faded {
            changed = true;
            *obj = Arc::new(SceneObject {
                is_ghost: ghost,
                is_faded: faded,
                generation: obj.generation + 1,
                ..(**obj).clone()
            });
        }
    }

    if changed {
        debug!(objects = next.len(), "scene commit");
        Arc::new(next)
    } else {
        previous.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneKind;
    use glam::Vec3;

    fn object(id: &str) -> Arc<SceneObject> {
        Arc::new(SceneObject {
            id: id.into(),
            kind: SceneKind::Box,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            mesh: None,
            bounds: None,
            color: Vec3::ONE,
            material: Default::default(),
            is_ghost: false,
            is_faded: false,
            proxy_selection_id: None,
            generation: 0,
        })
    }

    fn live(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn unchanged_pass_returns_the_same_list_handle() {
        let previous: SceneList = Arc::new(vec![object("a"), object("b")]);
        let next = commit(
            &previous,
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            &live(&["a", "b"]),
            &VisibilityFlags::default(),
        );
        assert!(Arc::ptr_eq(&previous, &next));
    }

    #[test]
    fn vanished_id_is_dropped() {
        let previous: SceneList = Arc::new(vec![object("a"), object("b")]);
        let next = commit(
            &previous,
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            &live(&["a"]),
            &VisibilityFlags::default(),
        );
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, "a");
    }

    #[test]
    fn field_update_replaces_only_its_entry() {
        let previous: SceneList = Arc::new(vec![object("a"), object("b")]);
        let moved = Arc::new(SceneObject {
            position: Vec3::new(1.0, 0.0, 0.0),
            generation: 1,
            ..(*previous[0]).clone()
        });
        let mut updates = HashMap::new();
        updates.insert("a".to_string(), moved.clone());
        let next = commit(
            &previous,
            Vec::new(),
            updates,
            HashMap::new(),
            &live(&["a", "b"]),
            &VisibilityFlags::default(),
        );
        assert!(!Arc::ptr_eq(&previous, &next));
        assert!(Arc::ptr_eq(&next[0], &moved));
        assert!(Arc::ptr_eq(&next[1], &previous[1]));
    }

    #[test]
    fn boolean_upsert_appends_then_replaces() {
        let previous: SceneList = Arc::new(vec![object("a")]);
        let mut booleans = HashMap::new();
        booleans.insert("u".to_string(), object("u"));
        let next = commit(
            &previous,
            Vec::new(),
            HashMap::new(),
            booleans,
            &live(&["a", "u"]),
            &VisibilityFlags::default(),
        );
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].id, "u");

        // Second commit with the same handle keeps the list stable
        let mut booleans = HashMap::new();
        booleans.insert("u".to_string(), next[1].clone());
        let again = commit(
            &next,
            Vec::new(),
            HashMap::new(),
            booleans,
            &live(&["a", "u"]),
            &VisibilityFlags::default(),
        );
        assert!(Arc::ptr_eq(&next, &again));
    }

    #[test]
    fn flag_transition_bumps_generation() {
        let previous: SceneList = Arc::new(vec![object("a")]);
        let mut flags = VisibilityFlags::default();
        flags.ghost_ids.insert("a".to_string());
        let next = commit(
            &previous,
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            &live(&["a"]),
            &flags,
        );
        assert!(next[0].is_ghost);
        assert_eq!(next[0].generation, 1);

        // Same flags again: no churn
        let again = commit(
            &next,
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            &live(&["a"]),
            &flags,
        );
        assert!(Arc::ptr_eq(&next, &again));
    }
}
