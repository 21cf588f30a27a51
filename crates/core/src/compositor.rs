//! Effective transform of nested elements
//!
//! An element inside groups is drawn through every ancestor group's
//! transform. Folding those transforms from the innermost ancestor outward
//! yields the map from the element's parent space into document space.

use crate::document::DocumentTree;
use crate::geometry::Transform;

/// Iterator over the ancestors of a node, nearest first
pub struct Ancestors<'a, T: DocumentTree + ?Sized> {
    tree: &'a T,
    next: Option<T::Node>,
}

impl<T: DocumentTree + ?Sized> Iterator for Ancestors<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.tree.parent(&current);
        Some(current)
    }
}

pub fn ancestors<'a, T: DocumentTree + ?Sized>(tree: &'a T, node: &T::Node) -> Ancestors<'a, T> {
    Ancestors {
        tree,
        next: tree.parent(node),
    }
}

/// Composed transform of all grouping ancestors of `node`
///
/// The node's own transform is not included. Ancestors that are not grouping
/// containers contribute nothing.
pub fn effective_transform<T: DocumentTree + ?Sized>(tree: &T, node: &T::Node) -> Transform {
    ancestors(tree, node)
        .filter(|ancestor| tree.is_grouping_container(ancestor))
        .fold(Transform::IDENTITY, |acc, ancestor| {
            Transform::compose(&tree.local_transform(&ancestor), &acc)
        })
}

/// Map from the node's own user space into document space
pub fn full_transform<T: DocumentTree + ?Sized>(tree: &T, node: &T::Node) -> Transform {
    Transform::compose(&effective_transform(tree, node), &tree.local_transform(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point};
    use crate::scene::{ElementKind, Scene};

    fn nested_groups(depth: usize, step: Transform) -> (Scene, usize) {
        let mut scene = Scene::new();
        let mut parent = None;
        for i in 0..depth {
            let group = scene.add_element(format!("g{i}"), ElementKind::Group, step, parent);
            parent = Some(group);
        }
        let leaf = scene.add_element(
            "leaf",
            ElementKind::Rect {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            },
            Transform::IDENTITY,
            parent,
        );
        (scene, leaf)
    }

    #[test]
    fn test_identity_without_ancestors() {
        let (scene, leaf) = nested_groups(0, Transform::IDENTITY);
        assert!(effective_transform(&scene, &leaf).is_identity());
    }

    #[test]
    fn test_translation_chain_accumulates() {
        for depth in [1, 2, 5, 12] {
            let (scene, leaf) = nested_groups(depth, Transform::translate(1.0, 0.0));
            let effective = effective_transform(&scene, &leaf);
            assert_eq!(
                effective.apply(Point::new(0.0, 0.0)),
                Point::new(depth as f64, 0.0)
            );
        }
    }

    #[test]
    fn test_outer_transform_applies_last() {
        let mut scene = Scene::new();
        let outer = scene.add_element("outer", ElementKind::Group, Transform::scale(2.0, 2.0), None);
        let inner = scene.add_element(
            "inner",
            ElementKind::Group,
            Transform::translate(5.0, 0.0),
            Some(outer),
        );
        let leaf = scene.add_element("leaf", ElementKind::Group, Transform::IDENTITY, Some(inner));

        // translate first, then scale
        let effective = effective_transform(&scene, &leaf);
        assert_eq!(effective.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_non_grouping_ancestor_is_skipped() {
        let mut scene = Scene::new();
        let group = scene.add_element("g", ElementKind::Group, Transform::translate(3.0, 0.0), None);
        // shapes never nest in real drawings, but the walk must not rely on that
        let shape = scene.add_element(
            "shape",
            ElementKind::Rect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
            Transform::translate(100.0, 100.0),
            Some(group),
        );
        let leaf = scene.add_element("leaf", ElementKind::Group, Transform::IDENTITY, Some(shape));

        let effective = effective_transform(&scene, &leaf);
        assert_eq!(effective.apply(Point::new(0.0, 0.0)), Point::new(3.0, 0.0));
    }

    #[test]
    fn test_full_transform_includes_own_transform() {
        let mut scene = Scene::new();
        let group = scene.add_element("g", ElementKind::Group, Transform::translate(0.0, 10.0), None);
        let leaf = scene.add_element(
            "leaf",
            ElementKind::Rect {
                x: 0.0,
                y: 0.0,
                width: 2.0,
                height: 2.0,
            },
            Transform::translate(1.0, 0.0),
            Some(group),
        );
        let full = full_transform(&scene, &leaf);
        assert_eq!(full.apply(Point::new(0.0, 0.0)), Point::new(1.0, 10.0));

        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0).transformed(&full);
        assert_eq!(bbox, BoundingBox::new(1.0, 10.0, 3.0, 12.0));
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (scene, leaf) = nested_groups(3, Transform::IDENTITY);
        let ids: Vec<String> = ancestors(&scene, &leaf)
            .map(|node| scene.element_id(&node))
            .collect();
        assert_eq!(ids, ["g2", "g1", "g0"]);
    }
}
