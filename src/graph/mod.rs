//! Identity handles, graph traits and the incidence-list digraph.
//!
//! # Handles
//!
//! Vertices, arcs and bundles are addressed by lightweight ids carrying a
//! raw integer and a generation. Raw integers are reused once their objects
//! are pooled and recycled, but the generation changes, so a handle kept
//! across a removal no longer resolves.
//!
//! # `DiGraph`
//!
//! Each vertex holds its outgoing and incoming arcs, plus shadow copies of
//! both for arcs which are temporarily deactivated. See [incidence_list]
//! for costs.

mod vertex;
pub use self::vertex::*;
mod arc;
pub use self::arc::*;
mod r#trait;
pub use self::r#trait::*;
mod graph_debug;
pub use self::graph_debug::*;
mod id_mapping;
pub use self::id_mapping::*;

pub mod incidence_list;
pub use self::incidence_list::{DiGraph, GraphConfig};
