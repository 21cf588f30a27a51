//! Deterministic pairing of selected elements
//!
//! Selections are ordered by element id rather than click order or position,
//! so the same set of objects always produces the same chain of annotations.

use crate::error::{AnnotateError, AnnotateResult};

/// A selected element together with its unique id
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEntry<N> {
    pub id: String,
    pub node: N,
}

impl<N> From<(String, N)> for SelectionEntry<N> {
    fn from((id, node): (String, N)) -> Self {
        Self { id, node }
    }
}

/// Fail unless at least two elements are selected
pub fn require_pairable(count: usize) -> AnnotateResult<()> {
    if count < 2 {
        return Err(AnnotateError::InsufficientSelection { count });
    }
    Ok(())
}

/// Sort by id and pair each entry with its successor
///
/// Repeated ids count once.
pub fn sequence_entries<N: Clone>(
    selection: impl IntoIterator<Item = (String, N)>,
) -> AnnotateResult<Vec<(SelectionEntry<N>, SelectionEntry<N>)>> {
    let mut entries: Vec<SelectionEntry<N>> = selection.into_iter().map(Into::into).collect();
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    entries.dedup_by(|a, b| a.id == b.id);
    require_pairable(entries.len())?;

    Ok(entries
        .windows(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}

/// Consecutive element pairs in id order
pub fn sequence<N: Clone>(selection: impl IntoIterator<Item = (String, N)>) -> AnnotateResult<Vec<(N, N)>> {
    Ok(sequence_entries(selection)?
        .into_iter()
        .map(|(first, second)| (first.node, second.node))
        .collect())
}
