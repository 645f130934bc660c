//! Scene objects handed to the renderer/gizmo collaborator
//!
//! A [`SceneObject`] mirrors one graph node. Its id is stable for the
//! node's lifetime; its `generation` counts committed changes, giving the
//! renderer an explicit dirty signal on top of `Arc` identity.

use crate::snapshot::MaterialStyle;
use formgraph_core::mesh::Mesh;
use formgraph_core::sdf::Aabb;
use glam::Vec3;
use std::sync::Arc;

/// What the renderer should draw for an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Box,
    Sphere,
    /// Extracted CSG mesh; geometry lives in the `mesh` handle
    CsgResult,
}

/// One renderable object in the committed scene list
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Mirrors the originating node id
    pub id: String,
    pub kind: SceneKind,
    pub position: Vec3,
    /// Euler angles in radians, XYZ order
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Extracted geometry for CSG results; primitives render natively
    pub mesh: Option<Arc<Mesh>>,
    /// Tight world bounds of the represented geometry
    pub bounds: Option<Aabb>,
    pub color: Vec3,
    pub material: MaterialStyle,
    /// Hidden, construction-only
    pub is_ghost: bool,
    /// Dimmed but shown
    pub is_faded: bool,
    /// Representative primitive for picking and gizmo anchoring
    pub proxy_selection_id: Option<String>,
    /// Bumped on every committed change to this object
    pub generation: u64,
}

impl SceneObject {
    /// Field equality for reconciliation, ignoring visibility flags and
    /// generation. The mesh handle compares by identity: producers return
    /// a new handle only when geometry changed.
    pub fn fields_match(&self, other: &SceneObject) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.position == other.position
            && self.rotation == other.rotation
            && self.scale == other.scale
            && self.color == other.color
            && self.material == other.material
            && self.bounds == other.bounds
            && self.proxy_selection_id == other.proxy_selection_id
            && match (&self.mesh, &other.mesh) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

/// The committed scene list, shared with the renderer.
///
/// An unchanged pass returns the same `Arc`, so downstream layers can skip
/// re-render on pointer equality alone.
pub type SceneList = Arc<Vec<Arc<SceneObject>>>;

/// Find an object by id
pub fn find<'a>(list: &'a SceneList, id: &str) -> Option<&'a Arc<SceneObject>> {
    list.iter().find(|o| o.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: &str) -> SceneObject {
        SceneObject {
            id: id.into(),
            kind: SceneKind::Box,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            mesh: None,
            bounds: None,
            color: Vec3::splat(0.8),
            material: MaterialStyle::Matte,
            is_ghost: false,
            is_faded: false,
            proxy_selection_id: None,
            generation: 0,
        }
    }

    #[test]
    fn fields_match_ignores_flags_and_generation() {
        let a = object("x");
        let mut b = object("x");
        b.is_ghost = true;
        b.generation = 7;
        assert!(a.fields_match(&b));

        b.position = Vec3::X;
        assert!(!a.fields_match(&b));
    }

    #[test]
    fn mesh_handles_compare_by_identity() {
        let mesh = Arc::new(Mesh::new());
        let mut a = object("m");
        a.mesh = Some(mesh.clone());
        let mut b = object("m");
        b.mesh = Some(mesh);
        assert!(a.fields_match(&b));

        b.mesh = Some(Arc::new(Mesh::new()));
        assert!(!a.fields_match(&b));
    }
}
