use crate::document::DocumentError;
use crate::options::OptionsError;

/// Failures reported to whoever invoked an annotation run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotateError {
    #[error("please select at least two objects (got {count})")]
    InsufficientSelection { count: usize },
    #[error("cannot compute the center of `{id}`")]
    UngeometricElement {
        id: String,
        #[source]
        source: DocumentError,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),
}

pub type AnnotateResult<T> = Result<T, AnnotateError>;
