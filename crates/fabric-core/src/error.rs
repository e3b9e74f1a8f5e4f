use thiserror::Error;

/// Reasons a graph rebuild is rejected. The previous generation stays live.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("triangulation needs at least 3 distinct points, got {count}")]
    TooFewPoints { count: usize },
    #[error("point set is degenerate (collinear), no triangles produced")]
    Degenerate,
}
