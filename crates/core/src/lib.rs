//! Connector Core Library
//!
//! Measured arrow annotations between objects of a vector drawing: effective
//! centers through nested group transforms, arrowhead-clearance line geometry,
//! and upright distance labels.

pub mod annotate;
pub mod center;
pub mod compositor;
pub mod document;
pub mod error;
pub mod geometry;
pub mod label;
pub mod marker;
pub mod options;
pub mod scene;
pub mod segment;
pub mod sequence;

pub use annotate::{
    AnnotationPlan, AnnotationReport, AnnotationSpec, Annotator, LineStyle, SkippedPair,
};
pub use center::center;
pub use compositor::{effective_transform, full_transform};
pub use document::{
    CreationRequest, DocumentError, DocumentMutator, DocumentTree, LineRequest, TextRequest,
};
pub use error::{AnnotateError, AnnotateResult};
pub use geometry::{BoundingBox, Point, Segment, Transform};
pub use label::{format_length, place, LabelPlacement};
pub use marker::{ensure_arrowhead, MarkerDefinition, ARROWHEAD_ID, MARKER_BASE_LENGTH};
pub use options::{ConnectorOptions, EmissionMode, OptionsError, UngeometricPolicy};
pub use scene::{ElementDescription, ElementKind, NodeId, Scene, SceneDescription, SceneError};
pub use segment::{offset_segment, segment_angle_degrees, LengthMetric};
pub use sequence::{sequence, sequence_entries, SelectionEntry};
