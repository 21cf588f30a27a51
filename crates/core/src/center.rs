//! Document-space centers of selected elements

use crate::compositor::full_transform;
use crate::document::DocumentTree;
use crate::error::{AnnotateError, AnnotateResult};
use crate::geometry::Point;

/// Center of the element's bounding box in document space
///
/// The local box is pushed through the element's own transform and then every
/// grouping ancestor, and the center of the resulting axis-aligned box is
/// returned.
pub fn center<T: DocumentTree + ?Sized>(tree: &T, node: &T::Node) -> AnnotateResult<Point> {
    let local = tree
        .local_bounding_box(node)
        .map_err(|source| AnnotateError::UngeometricElement {
            id: tree.element_id(node),
            source,
        })?;
    let global = local.transformed(&full_transform(tree, node));
    let center = global.center();
    tracing::debug!(id = %tree.element_id(node), x = center.x, y = center.y, "resolved center");
    Ok(center)
}
