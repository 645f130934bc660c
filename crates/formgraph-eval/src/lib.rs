//! # formgraph eval
//!
//! Graph evaluator for node-based parametric CSG modeling. Each pass
//! ingests the editor's node and connection lists, resolves which
//! primitives feed each boolean operation, composes smooth-blended
//! signed-distance fields, remeshes only the boolean nodes whose content
//! hash moved, propagates ghost/faded visibility, and commits a diffed
//! scene-object list for the renderer and gizmo.
//!
//! ```rust,ignore
//! use formgraph_eval::{EvalConfig, Evaluator};
//!
//! let mut evaluator = Evaluator::new(EvalConfig::default())?;
//! let stats = evaluator.tick(nodes, connections);
//! for object in evaluator.scene().iter() {
//!     // hand off to the renderer; `generation` is the dirty signal
//! }
//! ```
//!
//! The pass is single-threaded and run-to-completion; only the voxel
//! sampling inside a remesh fans out across cores.

pub mod scene;
pub mod snapshot;
pub mod visibility;

mod boolean;
mod compose;
mod evaluator;
mod reconcile;
mod resolve;

pub use compose::{GroupEval, SceneIndex, compose_group, index, synced_world_matrix};
pub use evaluator::{EvalConfig, Evaluator, PassStats};
pub use resolve::gather_primitives;
pub use scene::{SceneKind, SceneList, SceneObject};
pub use snapshot::{Connection, GraphSnapshot, MaterialStyle, Node, NodeData, NodeKind, PortGroup};
pub use visibility::{VisibilityFlags, compute_visibility};
