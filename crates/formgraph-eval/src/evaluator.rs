//! Evaluation driver
//!
//! One [`Evaluator`] owns the committed scene list, the per-node mesh
//! caches, and the reusable surface extractor. [`Evaluator::tick`] runs a
//! single run-to-completion pass over a graph snapshot: primitives sync
//! first, boolean nodes evaluate against the synced transforms, then the
//! reconciler commits. `&mut self` makes overlapping passes unrepresentable;
//! callers coalesce frame and edit triggers by simply calling again.

use crate::boolean::{CacheEntry, evaluate_boolean};
use crate::compose;
use crate::reconcile;
use crate::scene::{SceneKind, SceneList, SceneObject};
use crate::snapshot::{Connection, GraphSnapshot, Node, NodeKind};
use crate::visibility::compute_visibility;
use formgraph_core::mesh::SurfaceExtractor;
use glam::Vec3;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info_span};

/// Tuning knobs for a pass. Defaults favor interactive latency.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    /// Lattice resolution per axis for boolean remeshing
    pub resolution: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { resolution: 64 }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }
}

/// What one pass did, for logging and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStats {
    /// Boolean nodes that re-sampled and re-triangulated
    pub remeshed: usize,
    /// Boolean nodes served from their hash cache
    pub cache_hits: usize,
    /// Committed scene objects after the pass
    pub objects: usize,
    /// Whether the committed list handle changed
    pub changed: bool,
}

pub struct Evaluator {
    config: EvalConfig,
    scene: SceneList,
    cache: HashMap<String, CacheEntry>,
    extractor: SurfaceExtractor,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> formgraph_core::Result<Self> {
        Ok(Self {
            config,
            scene: Arc::new(Vec::new()),
            cache: HashMap::new(),
            extractor: SurfaceExtractor::new(config.resolution)?,
        })
    }

    /// The committed scene list, stable between passes when nothing changed
    pub fn scene(&self) -> &SceneList {
        &self.scene
    }

    /// Run one full evaluation pass over the given editor lists.
    pub fn tick(&mut self, nodes: Vec<Node>, connections: Vec<Connection>) -> PassStats {
        let span = info_span!("eval_pass", nodes = nodes.len());
        let _guard = span.enter();

        let snapshot = GraphSnapshot::new(nodes, connections);
        let flags = compute_visibility(&snapshot);
        let previous = self.scene.clone();

        // Primitive sync: diff node data against committed objects
        let mut live_ids: HashSet<String> = HashSet::new();
        let mut new_primitives: Vec<Arc<SceneObject>> = Vec::new();
        let mut updated_fields: HashMap<String, Arc<SceneObject>> = HashMap::new();

        let mut index = compose::index(&previous);
        for node in snapshot.nodes() {
            if !node.kind.info().is_primitive {
                continue;
            }
            live_ids.insert(node.id.clone());
            let desired = desired_primitive(node, index.get(node.id.as_str()).copied());
            match index.get(node.id.as_str()) {
                Some(existing) if existing.fields_match(&desired) => {}
                Some(_) => {
                    updated_fields.insert(node.id.clone(), Arc::new(desired));
                }
                None => new_primitives.push(Arc::new(desired)),
            }
        }
        // Transform edits take effect for booleans within the same pass;
        // brand-new primitives are picked up next pass once committed
        for (id, obj) in &updated_fields {
            index.insert(id.as_str(), obj);
        }

        // Boolean evaluation against the synced view
        let mut boolean_objects: HashMap<String, Arc<SceneObject>> = HashMap::new();
        let mut stats = PassStats::default();
        for node in snapshot.nodes() {
            if !node.kind.is_boolean() {
                continue;
            }
            let outcome = evaluate_boolean(
                node,
                &snapshot,
                &index,
                &mut self.cache,
                &mut self.extractor,
                self.config.resolution,
            );
            stats.remeshed += usize::from(outcome.remeshed);
            stats.cache_hits += usize::from(outcome.cache_hit);
            if let Some(object) = outcome.object {
                live_ids.insert(node.id.clone());
                boolean_objects.insert(node.id.clone(), object);
            }
        }
        drop(index);

        let next = reconcile::commit(
            &previous,
            new_primitives,
            updated_fields,
            boolean_objects,
            &live_ids,
            &flags,
        );

        // Evict caches for nodes that left the graph entirely
        self.cache.retain(|id, _| snapshot.contains(id));

        // Re-point cache entries at the committed objects so an unchanged
        // follow-up pass hands back reference-equal results
        for obj in next.iter() {
            if obj.kind != SceneKind::CsgResult {
                continue;
            }
            if let Some(entry) = self.cache.get_mut(obj.id.as_str())
                && !Arc::ptr_eq(&entry.object, obj)
            {
                entry.object = obj.clone();
            }
        }

        stats.objects = next.len();
        stats.changed = !Arc::ptr_eq(&previous, &next);
        debug!(
            remeshed = stats.remeshed,
            cache_hits = stats.cache_hits,
            objects = stats.objects,
            changed = stats.changed,
            "pass complete"
        );
        self.scene = next;
        stats
    }
}

/// Build the target object for a primitive node, preserving the existing
/// entry's flags and generation lineage so the diff stays minimal.
fn desired_primitive(node: &Node, existing: Option<&Arc<SceneObject>>) -> SceneObject {
    let kind = match node.kind {
        NodeKind::Sphere => SceneKind::Sphere,
        _ => SceneKind::Box,
    };
    SceneObject {
        id: node.id.clone(),
        kind,
        position: Vec3::from_array(node.data.location),
        rotation: Vec3::from_array(node.data.rotation),
        scale: Vec3::from_array(node.data.scale),
        mesh: None,
        bounds: None,
        color: Vec3::from_array(node.data.color),
        material: node.data.material,
        is_ghost: existing.is_some_and(|e| e.is_ghost),
        is_faded: existing.is_some_and(|e| e.is_faded),
        proxy_selection_id: None,
        generation: existing.map_or(0, |e| e.generation + 1),
    }
}
