//! Ghost / faded flag propagation
//!
//! Recomputed from scratch every pass as a pure function of the snapshot,
//! in two tiers. Boolean ops get per-port control (rules 1 and 2), then a
//! generic pass ghosts anything whose sole consumer declares
//! `ghosts_inputs`, so new passthrough kinds need no bespoke visibility
//! code here.

use crate::resolve::gather_primitives;
use crate::snapshot::{GraphSnapshot, NodeKind, PortGroup};
use std::collections::HashSet;
use tracing::trace;

/// Per-pass visibility verdicts, keyed by node id.
///
/// The sets are disjoint: an id forced shown by a toggle lands in
/// `faded_ids` and is exempt from ghosting for the rest of the pass.
#[derive(Debug, Default, Clone)]
pub struct VisibilityFlags {
    pub ghost_ids: HashSet<String>,
    pub faded_ids: HashSet<String>,
}

impl VisibilityFlags {
    pub fn is_ghost(&self, id: &str) -> bool {
        self.ghost_ids.contains(id)
    }

    pub fn is_faded(&self, id: &str) -> bool {
        self.faded_ids.contains(id)
    }
}

pub fn compute_visibility(snapshot: &GraphSnapshot) -> VisibilityFlags {
    let mut ghost_candidates: HashSet<String> = HashSet::new();
    let mut faded_ids: HashSet<String> = HashSet::new();
    // Ids pinned visible by a show toggle; ghosting never overrides these
    let mut unghostable: HashSet<String> = HashSet::new();

    for node in snapshot.nodes() {
        // Rule 1: secondary-port inputs of a two-sided boolean are
        // construction geometry, hidden unless the node shows them
        if node.kind.is_boolean() && has_group(node.kind, PortGroup::Secondary) {
            for prim in gather_primitives(snapshot, &node.id, PortGroup::Secondary) {
                if node.data.show_secondary {
                    faded_ids.insert(prim.id.clone());
                    unghostable.insert(prim.id.clone());
                } else {
                    ghost_candidates.insert(prim.id.clone());
                }
            }
        }

        // Rule 2: "show both" on an intersection pins both groups
        if node.kind == NodeKind::Intersection && node.data.show_both {
            for group in [PortGroup::Primary, PortGroup::Secondary] {
                for prim in gather_primitives(snapshot, &node.id, group) {
                    faded_ids.insert(prim.id.clone());
                    unghostable.insert(prim.id.clone());
                }
            }
        }
    }

    // Rule 3: generic consumer pass over everything that emits geometry
    for node in snapshot.nodes() {
        let info = node.kind.info();
        if !info.is_primitive && !node.kind.is_boolean() {
            continue;
        }

        let consumers: Vec<&str> = {
            let mut seen: Vec<&str> = Vec::new();
            for c in snapshot.outgoing(&node.id) {
                let Some(target) = snapshot.node(&c.target_node_id) else {
                    continue;
                };
                // Scalar ports do not consume geometry
                if target.kind.port_group(&c.target_port).is_none() {
                    continue;
                }
                if !seen.contains(&target.id.as_str()) {
                    seen.push(&target.id);
                }
            }
            seen
        };

        let &[sole] = consumers.as_slice() else {
            continue;
        };
        let Some(consumer) = snapshot.node(sole) else {
            continue;
        };
        let cinfo = consumer.kind.info();
        if !cinfo.ghosts_inputs {
            continue;
        }
        // A dead-end passthrough displays its inputs itself
        if cinfo.is_passthrough && !has_active_downstream(snapshot, sole) {
            continue;
        }
        ghost_candidates.insert(node.id.clone());
    }

    let ghost_ids: HashSet<String> = ghost_candidates
        .difference(&unghostable)
        .cloned()
        .collect();

    trace!(
        ghosts = ghost_ids.len(),
        faded = faded_ids.len(),
        "visibility pass"
    );
    VisibilityFlags {
        ghost_ids,
        faded_ids,
    }
}

fn has_group(kind: NodeKind, group: PortGroup) -> bool {
    kind.info().input_groups.iter().any(|(_, g)| *g == group)
}

/// At least one outgoing connection lands on a registered geometry port
/// of a node that exists.
fn has_active_downstream(snapshot: &GraphSnapshot, id: &str) -> bool {
    snapshot.outgoing(id).any(|c| {
        snapshot
            .node(&c.target_node_id)
            .is_some_and(|t| t.kind.port_group(&c.target_port).is_some())
    })
}
