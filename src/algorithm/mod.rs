//! Traversals over any [QueryableGraph](crate::graph::QueryableGraph).
mod traversal;
pub use self::traversal::*;
mod breadth_first;
pub use self::breadth_first::*;
mod depth_first;
pub use self::depth_first::*;
