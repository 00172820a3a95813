//! A mutable directed graph stored as per-vertex incidence lists.
//!
//! [graph::DiGraph] keeps removed vertices and arcs in pools and hands them
//! out again on later additions. Vertices and arcs can be deactivated and
//! activated again without being freed, and parallel arcs can be folded into
//! bundles which occupy a single adjacency slot.
//!
//! [algorithm] holds breadth-first and depth-first search, written against
//! [graph::QueryableGraph].
//!
//! ```
//! use incigraph::{algorithm::{BreadthFirstSearch, Traversal}, graph::*};
//!
//! let mut g = DiGraph::new();
//! let a = g.add_vertex();
//! let b = g.add_vertex();
//! g.add_arc(a, b).unwrap();
//!
//! let mut bfs = BreadthFirstSearch::new(&g);
//! bfs.start_vertex(a);
//! assert!(bfs.run());
//! assert_eq!(bfs.deliver(), Some(2));
//! ```

pub mod algorithm;
pub mod graph;
pub mod property;
mod error;
pub use self::error::*;
