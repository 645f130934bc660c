//! Primitive resolution
//!
//! Walks backward through incoming connections to collect the primitives
//! feeding one input group of a node. Passthrough kinds (layers, boolean
//! ops) are transparent; primitives terminate the walk; anything else
//! contributes nothing.
//!
//! The traversal is an explicit worklist with a visited set, so cycle
//! handling is a hard boundary instead of recursion-depth behavior: the
//! graph is not guaranteed acyclic, and revisiting an id simply yields
//! nothing.

use crate::snapshot::{GraphSnapshot, Node, PortGroup};
use std::collections::HashSet;

/// Collect the primitives reachable through one input group of `node_id`.
///
/// Results are deduplicated by id with first-occurrence order preserved;
/// the first entry later becomes the pivot of the boolean result.
pub fn gather_primitives<'a>(
    snapshot: &'a GraphSnapshot,
    node_id: &str,
    group: PortGroup,
) -> Vec<&'a Node> {
    let Some(start) = snapshot.node(node_id) else {
        return Vec::new();
    };

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(node_id);

    // Seed with sources feeding the requested group, in connection order.
    // The stack is LIFO, so push in reverse to pop in order.
    let mut worklist: Vec<&str> = Vec::new();
    let seeds: Vec<&str> = snapshot
        .incoming(node_id)
        .filter(|c| start.kind.port_group(&c.target_port) == Some(group))
        .map(|c| c.source_node_id.as_str())
        .collect();
    worklist.extend(seeds.iter().rev());

    let mut primitives: Vec<&Node> = Vec::new();
    while let Some(id) = worklist.pop() {
        // Cycle / dedup guard: each id is considered once
        if !visited.insert(id) {
            continue;
        }
        // Dangling endpoint: no contribution
        let Some(node) = snapshot.node(id) else {
            continue;
        };

        let info = node.kind.info();
        if info.is_primitive {
            primitives.push(node);
        } else if info.is_passthrough {
            // Walk through every registered geometry port; scalar ports
            // are not listed and never traversed
            let upstream: Vec<&str> = snapshot
                .incoming(id)
                .filter(|c| node.kind.port_group(&c.target_port).is_some())
                .map(|c| c.source_node_id.as_str())
                .collect();
            worklist.extend(upstream.iter().rev());
        }
        // Neither primitive nor passthrough: contributes nothing
    }

    primitives
}
