//! In-memory reference drawing
//!
//! A small element tree implementing [`DocumentTree`] and [`DocumentMutator`].
//! It is loaded from a JSON scene description (nested elements, a selection
//! and an optional current layer), which makes cycles impossible by
//! construction.

use crate::document::{
    CreationRequest, DocumentError, DocumentMutator, DocumentTree, LineRequest, TextRequest,
};
use crate::geometry::{BoundingBox, Transform};
use crate::marker::MarkerDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Index of a node inside a [`Scene`]
pub type NodeId = usize;

/// What an element is, and the geometry it carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Layer,
    Group,
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    /// Element without renderable geometry (empty text, bare `use`, ...)
    Empty,
    /// Annotation line appended by a run
    Path { line: LineRequest },
    /// Annotation label appended by a run
    Text { label: TextRequest },
}

impl ElementKind {
    fn is_grouping(&self) -> bool {
        matches!(self, ElementKind::Layer | ElementKind::Group)
    }

    fn own_bounding_box(&self) -> Option<BoundingBox> {
        match *self {
            ElementKind::Rect {
                x,
                y,
                width,
                height,
            } => Some(BoundingBox::new(x, y, x + width, y + height)),
            ElementKind::Ellipse { cx, cy, rx, ry } => {
                Some(BoundingBox::new(cx - rx, cy - ry, cx + rx, cy + ry))
            }
            ElementKind::Line { x1, y1, x2, y2 } => Some(BoundingBox::new(x1, y1, x2, y2)),
            _ => None,
        }
    }
}

/// Serialized form of one element and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescription {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Transform::is_identity")]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDescription>,
}

/// Serialized form of a whole scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub elements: Vec<ElementDescription>,
    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_layer: Option<String>,
    /// `None` when the drawing has no definitions container yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<Vec<MarkerDefinition>>,
}

/// Errors raised while loading a scene
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate element id `{0}`")]
    DuplicateId(String),
    #[error("selected element `{0}` does not exist")]
    UnknownSelection(String),
    #[error("current layer `{0}` does not exist")]
    UnknownLayer(String),
    #[error("current layer `{0}` is not a layer or group")]
    NotAContainer(String),
}

#[derive(Debug, Clone)]
struct SceneNode {
    id: String,
    kind: ElementKind,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable element tree
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
    by_id: HashMap<String, NodeId>,
    selection: Vec<NodeId>,
    current_layer: Option<NodeId>,
    defs: Option<Vec<MarkerDefinition>>,
    next_generated: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from its description
    pub fn from_description(description: SceneDescription) -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        for element in description.elements {
            scene.insert_description(element, None)?;
        }

        for id in description.selection {
            let node = scene
                .find(&id)
                .ok_or_else(|| SceneError::UnknownSelection(id.clone()))?;
            scene.select(node);
        }

        if let Some(layer_id) = description.current_layer {
            let layer = scene
                .find(&layer_id)
                .ok_or_else(|| SceneError::UnknownLayer(layer_id.clone()))?;
            if !scene.nodes[layer].kind.is_grouping() {
                return Err(SceneError::NotAContainer(layer_id));
            }
            scene.current_layer = Some(layer);
        }

        scene.defs = description.defs;
        Ok(scene)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Self::from_description(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn insert_description(
        &mut self,
        description: ElementDescription,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        if self.by_id.contains_key(&description.id) {
            return Err(SceneError::DuplicateId(description.id));
        }
        let node = self.add_element(
            description.id,
            description.kind,
            description.transform,
            parent,
        );
        for child in description.children {
            self.insert_description(child, Some(node))?;
        }
        Ok(node)
    }

    /// Append an element under `parent` (top level when `None`)
    ///
    /// Ids are expected to be unique; a repeated id shadows the earlier
    /// element for lookups.
    pub fn add_element(
        &mut self,
        id: impl Into<String>,
        kind: ElementKind,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = id.into();
        let node = self.nodes.len();
        self.by_id.insert(id.clone(), node);
        self.nodes.push(SceneNode {
            id,
            kind,
            transform,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(node),
            None => self.roots.push(node),
        }
        node
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Add `node` to the selection; unknown or already selected nodes are ignored
    pub fn select(&mut self, node: NodeId) {
        if self.nodes.get(node).is_some() && !self.selection.contains(&node) {
            self.selection.push(node);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn definitions(&self) -> Option<&[MarkerDefinition]> {
        self.defs.as_deref()
    }

    /// Elements appended as annotations, in insertion order
    pub fn annotations(&self) -> Vec<&ElementKind> {
        self.nodes
            .iter()
            .map(|n| &n.kind)
            .filter(|kind| matches!(kind, ElementKind::Path { .. } | ElementKind::Text { .. }))
            .collect()
    }

    /// Snapshot the scene back into its description
    pub fn to_description(&self) -> SceneDescription {
        SceneDescription {
            elements: self.roots.iter().map(|&n| self.describe(n)).collect(),
            selection: self.selection.iter().map(|&n| self.nodes[n].id.clone()).collect(),
            current_layer: self.current_layer.map(|n| self.nodes[n].id.clone()),
            defs: self.defs.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(&self.to_description())?)
    }

    fn describe(&self, node: NodeId) -> ElementDescription {
        let n = &self.nodes[node];
        ElementDescription {
            id: n.id.clone(),
            kind: n.kind.clone(),
            transform: n.transform,
            children: n.children.iter().map(|&c| self.describe(c)).collect(),
        }
    }

    fn node(&self, node: NodeId) -> Result<&SceneNode, DocumentError> {
        self.nodes
            .get(node)
            .ok_or_else(|| DocumentError::UnknownNode(format!("#{node}")))
    }

    fn generate_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_generated += 1;
            let id = format!("{prefix}{}", self.next_generated);
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }
}

impl DocumentTree for Scene {
    type Node = NodeId;

    fn selection(&self) -> Vec<(String, NodeId)> {
        self.selection
            .iter()
            .map(|&n| (self.nodes[n].id.clone(), n))
            .collect()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(*node).and_then(|n| n.parent)
    }

    fn local_transform(&self, node: &NodeId) -> Transform {
        self.nodes
            .get(*node)
            .map(|n| n.transform)
            .unwrap_or_default()
    }

    fn local_bounding_box(&self, node: &NodeId) -> Result<BoundingBox, DocumentError> {
        let n = self.node(*node)?;
        if let Some(bbox) = n.kind.own_bounding_box() {
            return Ok(bbox);
        }

        if n.kind.is_grouping() {
            // union of the children, each in this group's user space
            let union = n
                .children
                .iter()
                .filter_map(|child| {
                    let bbox = self.local_bounding_box(child).ok()?;
                    Some(bbox.transformed(&self.local_transform(child)))
                })
                .reduce(|a, b| a.union(&b));
            if let Some(bbox) = union {
                return Ok(bbox);
            }
        }

        Err(DocumentError::NoGeometry { id: n.id.clone() })
    }

    fn is_grouping_container(&self, node: &NodeId) -> bool {
        self.nodes
            .get(*node)
            .is_some_and(|n| n.kind.is_grouping())
    }

    fn element_id(&self, node: &NodeId) -> String {
        self.nodes
            .get(*node)
            .map(|n| n.id.clone())
            .unwrap_or_else(|| format!("#{node}"))
    }
}

impl DocumentMutator for Scene {
    fn append_to_current_layer(&mut self, request: CreationRequest) -> Result<(), DocumentError> {
        let (prefix, kind) = match request {
            CreationRequest::Path(line) => ("path", ElementKind::Path { line }),
            CreationRequest::Text(label) => ("text", ElementKind::Text { label }),
        };
        let id = self.generate_id(prefix);
        self.add_element(id, kind, Transform::IDENTITY, self.current_layer);
        Ok(())
    }

    fn has_definition(&self, id: &str) -> bool {
        self.defs
            .as_ref()
            .is_some_and(|defs| defs.iter().any(|d| d.id == id))
    }

    fn insert_definition(&mut self, definition: MarkerDefinition) -> Result<(), DocumentError> {
        self.defs.get_or_insert_with(Vec::new).push(definition);
        Ok(())
    }
}
