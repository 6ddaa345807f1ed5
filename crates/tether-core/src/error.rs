#![forbid(unsafe_code)]

//! Error types for node construction and synchronization.

/// Errors from node construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A live model node already owns this name.
    ///
    /// Model names are process-wide singletons; the conflicting creation is
    /// rejected immediately and is never retried.
    ModelNameTaken(String),
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelNameTaken(name) => {
                write!(f, "model node '{name}' exists")
            }
        }
    }
}

impl std::error::Error for NodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_conflicting_node() {
        let err = NodeError::ModelNameTaken("gain".to_string());
        assert_eq!(err.to_string(), "model node 'gain' exists");
    }
}
