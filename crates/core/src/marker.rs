//! Arrowhead marker definition
//!
//! Markers are rendered centered on path ends (`refX`/`refY` at the middle of
//! the view box) and scale with the stroke width.

use crate::document::{DocumentError, DocumentMutator};
use serde::{Deserialize, Serialize};

/// Id every annotation line references in `marker-start`/`marker-end`
pub const ARROWHEAD_ID: &str = "Arrowhead";

/// Side length of the marker view box, in marker units
pub const MARKER_BASE_LENGTH: f64 = 10.0;

/// Geometry and presentation of a reusable marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDefinition {
    pub id: String,
    pub view_box: [f64; 4],
    pub ref_x: f64,
    pub ref_y: f64,
    pub marker_units: String,
    pub marker_width: f64,
    pub marker_height: f64,
    pub orient: String,
    pub path: String,
    pub fill: String,
}

impl MarkerDefinition {
    /// Triangular arrowhead that orients itself along the path
    pub fn arrowhead() -> Self {
        Self {
            id: ARROWHEAD_ID.to_string(),
            view_box: [0.0, 0.0, MARKER_BASE_LENGTH, MARKER_BASE_LENGTH],
            ref_x: MARKER_BASE_LENGTH / 2.0,
            ref_y: MARKER_BASE_LENGTH / 2.0,
            marker_units: "strokeWidth".to_string(),
            marker_width: 4.0,
            marker_height: 3.0,
            orient: "auto-start-reverse".to_string(),
            path: "M 0 0 L 10 5 L 0 10 z".to_string(),
            fill: "black".to_string(),
        }
    }

    /// `url(#id)` reference for style properties
    pub fn url(&self) -> String {
        marker_url(&self.id)
    }
}

pub fn marker_url(id: &str) -> String {
    format!("url(#{id})")
}

/// Make sure the arrowhead marker exists in the document
///
/// Returns `true` when the definition had to be created.
pub fn ensure_arrowhead<D: DocumentMutator + ?Sized>(doc: &mut D) -> Result<bool, DocumentError> {
    ensure_definition(doc, MarkerDefinition::arrowhead())
}

/// Lookup-then-insert keyed by the definition id
pub fn ensure_definition<D: DocumentMutator + ?Sized>(
    doc: &mut D,
    definition: MarkerDefinition,
) -> Result<bool, DocumentError> {
    if doc.has_definition(&definition.id) {
        tracing::debug!(id = %definition.id, "reusing existing marker definition");
        return Ok(false);
    }
    tracing::debug!(id = %definition.id, "creating marker definition");
    doc.insert_definition(definition)?;
    Ok(true)
}
