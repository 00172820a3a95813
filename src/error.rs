//! Error types for structural graph operations.

use crate::graph::{ArcRef, VertexId};
use thiserror::Error;

/// Which end of an arc a vertex was supposed to be.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Endpoint {
    Tail,
    Head,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tail => write!(f, "tail"),
            Endpoint::Head => write!(f, "head"),
        }
    }
}

/// Errors raised by mutating or positional operations on a graph.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    /// The vertex handle is stale or belongs to no live/deactivated vertex.
    #[error("unknown vertex: {0:?}")]
    UnknownVertex(VertexId),

    /// The arc handle is stale or the arc is not attached.
    #[error("unknown arc: {0:?}")]
    UnknownArc(ArcRef),

    /// An arc was attached to a vertex which is not its tail/head.
    #[error("arc {arc:?} has another {role} than {vertex:?}")]
    InvalidEndpoint {
        arc: ArcRef,
        vertex: VertexId,
        role: Endpoint,
    },

    /// A positional lookup beyond the current bounds.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A removal did not find the arc in the vertex's adjacency.
    #[error("arc {arc:?} is not incident to {vertex:?}")]
    UnknownIncidence { arc: ArcRef, vertex: VertexId },

    /// Bookkeeping drift detected by [`crate::graph::DiGraph::validate`].
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, Error>;
