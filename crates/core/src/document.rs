//! Narrow interface onto the host drawing
//!
//! The measurement engine never looks at concrete node kinds. It reads the
//! tree through [`DocumentTree`] and writes through [`DocumentMutator`].

use crate::geometry::{BoundingBox, Transform};
use crate::marker::MarkerDefinition;
use serde::{Deserialize, Serialize};

/// Errors raised by a document implementation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("element `{id}` has no renderable geometry")]
    NoGeometry { id: String },
    #[error("unknown element `{0}`")]
    UnknownNode(String),
    #[error("document rejected the change: {0}")]
    Rejected(String),
}

/// Read access to the element tree
pub trait DocumentTree {
    /// Opaque handle to an element
    type Node: Clone;

    /// Currently selected elements with their unique ids
    fn selection(&self) -> Vec<(String, Self::Node)>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The element's own transform, identity if it has none
    fn local_transform(&self, node: &Self::Node) -> Transform;

    /// Bounding box in the element's own user space (before its transform)
    fn local_bounding_box(&self, node: &Self::Node) -> Result<BoundingBox, DocumentError>;

    /// Whether descendants of this node inherit its transform
    fn is_grouping_container(&self, node: &Self::Node) -> bool;

    fn element_id(&self, node: &Self::Node) -> String;
}

/// Write access to the drawing
pub trait DocumentMutator {
    /// Append a new element to the active drawing layer
    fn append_to_current_layer(&mut self, request: CreationRequest) -> Result<(), DocumentError>;

    /// Whether the definitions container already holds an entry with `id`
    fn has_definition(&self, id: &str) -> bool;

    /// Insert a definition, creating the definitions container if needed
    fn insert_definition(&mut self, definition: MarkerDefinition) -> Result<(), DocumentError>;
}

/// Path element creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
    /// SVG path data, `M x1,y1 L x2,y2`
    pub d: String,
    pub style: String,
}

/// Text element creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
    pub style: String,
    pub x: f64,
    pub y: f64,
    /// `rotate(angle,x,y)`
    pub transform: String,
}

/// Declarative element creation handed to the host document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreationRequest {
    Path(LineRequest),
    Text(TextRequest),
}
