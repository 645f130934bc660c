//! Graph snapshot ingest
//!
//! The editor collaborator hands over flat node and connection lists as
//! plain data (JSON over whatever transport it likes). [`GraphSnapshot`]
//! indexes them once per pass: id → node lookup plus incoming/outgoing
//! connection adjacency.
//!
//! Node-kind capabilities live on a static descriptor ([`KindInfo`]) rather
//! than in scattered type lists: whether a kind emits geometry, whether the
//! resolver may walk through it, which ports carry geometry and into which
//! input group, and how it participates in generic ghost propagation.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node type in the editor graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Box,
    Sphere,
    Union,
    Intersection,
    Difference,
    /// Grouping passthrough: forwards upstream geometry to its consumer
    Layer,
    /// Anything this evaluator does not know; contributes nothing
    #[serde(other)]
    Unknown,
}

/// Which input group of a boolean operation a port feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortGroup {
    Primary,
    Secondary,
}

/// Static capabilities of a node kind
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    /// Emits geometry directly (terminates primitive resolution)
    pub is_primitive: bool,
    /// Transparent to primitive resolution
    pub is_passthrough: bool,
    /// Generic visibility pass: consuming this kind ghosts its sole input
    pub ghosts_inputs: bool,
    /// Geometry ports and the input group each belongs to; ports not
    /// listed here (scalar inputs like smoothness) are never traversed
    pub input_groups: &'static [(&'static str, PortGroup)],
}

const PRIMITIVE: KindInfo = KindInfo {
    is_primitive: true,
    is_passthrough: false,
    ghosts_inputs: false,
    input_groups: &[],
};

const UNION: KindInfo = KindInfo {
    is_primitive: false,
    is_passthrough: true,
    ghosts_inputs: false,
    input_groups: &[("M", PortGroup::Primary)],
};

const TWO_SIDED: KindInfo = KindInfo {
    is_primitive: false,
    is_passthrough: true,
    ghosts_inputs: false,
    input_groups: &[("A", PortGroup::Primary), ("B", PortGroup::Secondary)],
};

const LAYER: KindInfo = KindInfo {
    is_primitive: false,
    is_passthrough: true,
    ghosts_inputs: true,
    input_groups: &[("in", PortGroup::Primary)],
};

const INERT: KindInfo = KindInfo {
    is_primitive: false,
    is_passthrough: false,
    ghosts_inputs: false,
    input_groups: &[],
};

impl NodeKind {
    pub fn info(self) -> &'static KindInfo {
        match self {
            NodeKind::Box | NodeKind::Sphere => &PRIMITIVE,
            NodeKind::Union => &UNION,
            NodeKind::Intersection | NodeKind::Difference => &TWO_SIDED,
            NodeKind::Layer => &LAYER,
            NodeKind::Unknown => &INERT,
        }
    }

    /// True for the CSG combinator kinds
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            NodeKind::Union | NodeKind::Intersection | NodeKind::Difference
        )
    }

    /// The input group a given target port of this kind feeds, if it is a
    /// registered geometry port
    pub fn port_group(self, port: &str) -> Option<PortGroup> {
        self.info()
            .input_groups
            .iter()
            .find(|(name, _)| *name == port)
            .map(|(_, group)| *group)
    }
}

/// Surface style applied to an object's material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStyle {
    #[default]
    Matte,
    Glossy,
    Metal,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_color() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

/// The per-node data bag the editor maintains
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeData {
    pub location: [f32; 3],
    /// Euler angles in radians, XYZ order
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    /// Box edge rounding
    pub corner_radius: f32,
    /// Blend radius for boolean combination
    pub smoothness: f32,
    /// Force-show the secondary input of a boolean op
    pub show_secondary: bool,
    /// Intersection only: show both input groups
    pub show_both: bool,
    pub color: [f32; 3],
    pub material: MaterialStyle,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
            corner_radius: 0.0,
            smoothness: 0.0,
            show_secondary: false,
            show_both: false,
            color: default_color(),
            material: MaterialStyle::default(),
        }
    }
}

/// A node as sent by the editor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    /// World matrix from the node's own transform fields
    pub fn world_matrix(&self) -> Mat4 {
        let r = self.data.rotation;
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.data.scale),
            Quat::from_euler(EulerRot::XYZ, r[0], r[1], r[2]),
            Vec3::from_array(self.data.location),
        )
    }
}

/// A directed connection between two node ports
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_node_id: String,
    pub source_port: String,
    pub target_node_id: String,
    pub target_port: String,
}

/// An indexed view over one frame's node and connection lists
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    node_index: HashMap<String, usize>,
    incoming: HashMap<String, Vec<usize>>,
    outgoing: HashMap<String, Vec<usize>>,
}

impl GraphSnapshot {
    /// Index raw editor lists for one evaluation pass.
    ///
    /// Connections with endpoints that do not resolve to a node are kept
    /// but naturally degrade to "no contribution" at lookup time.
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        let node_index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut incoming: HashMap<String, Vec<usize>> = HashMap::new();
        let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, c) in connections.iter().enumerate() {
            incoming.entry(c.target_node_id.clone()).or_default().push(i);
            outgoing.entry(c.source_node_id.clone()).or_default().push(i);
        }

        Self {
            nodes,
            connections,
            node_index,
            incoming,
            outgoing,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connections arriving at `id`, in list order
    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &Connection> {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.connections[i])
    }

    /// Connections leaving `id`, in list order
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Connection> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.connections[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }
}
