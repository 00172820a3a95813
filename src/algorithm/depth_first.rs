use super::traversal::*;
use crate::{graph::*, property::PropertyMap};
use tracing::debug;

/// Per-vertex outcome of a [DepthFirstSearch].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DfsResult {
    /// Arrival order.
    pub dfs_number: usize,
    /// Smallest discovery number reachable from the subtree through at
    /// most one non-tree arc.
    pub low_number: usize,
    /// `None` for the start vertex.
    pub parent: Option<VertexId>,
}

/// A vertex whose arcs are being explored.
struct Frame<'g> {
    vertex: VertexId,
    parent: Option<VertexId>,
    arcs: Box<dyn Iterator<Item = Arc> + 'g>,
}

enum Discovery {
    Explore,
    Veto,
    Stop,
}

/// Depth-first search computing discovery numbers, low numbers and parents.
///
/// The walk runs on an explicit stack of frames rather than on the call
/// stack, so path-like graphs of any length are fine. A child's low number
/// is folded into its parent's when the child's frame is popped.
pub struct DepthFirstSearch<'a, G>
where
    G: QueryableGraph,
{
    graph: &'a G,
    setup: TraversalSetup<'a>,
    compute_values: bool,
    results: PropertyMap<VertexId, Option<DfsResult>>,
    discovered: PropertyMap<VertexId, bool>,
    max_dfs_number: Option<usize>,
}

impl<'a, G> Traversal<'a> for DepthFirstSearch<'a, G>
where
    G: QueryableGraph,
{
    fn setup(&mut self) -> &mut TraversalSetup<'a> {
        &mut self.setup
    }
}

impl<'a, G> DepthFirstSearch<'a, G>
where
    G: QueryableGraph,
{
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            setup: TraversalSetup::default(),
            compute_values: true,
            results: PropertyMap::new(None),
            discovered: PropertyMap::new(false),
            max_dfs_number: None,
        }
    }

    pub fn compute_values(&mut self, compute: bool) -> &mut Self {
        self.compute_values = compute;
        self
    }

    pub fn results(&self) -> &PropertyMap<VertexId, Option<DfsResult>> {
        &self.results
    }

    pub fn result(&self, v: &VertexId) -> Option<DfsResult> {
        self.results.value(v)
    }

    pub fn vertex_discovered(&self, v: &VertexId) -> bool {
        *self.discovered.get(v)
    }

    pub fn num_vertices_reached(&self) -> usize {
        self.max_dfs_number.map_or(0, |n| n + 1)
    }

    /// Number of vertices reached, or `None` if the search never ran.
    pub fn deliver(&self) -> Option<usize> {
        self.max_dfs_number.map(|n| n + 1)
    }

    /// Answers `false` if there is no vertex to start from.
    pub fn run(&mut self) -> bool {
        let start = match self.setup.start.or_else(|| self.graph.any_vertex()) {
            Some(v) if self.graph.contains_vertex(&v) => v,
            _ => return false,
        };
        self.results.reset_all();
        self.discovered.reset_all();
        let mut depth = 0;
        let stopped = self.walk(start, &mut depth);
        self.max_dfs_number = depth.checked_sub(1);
        debug!(reached = depth, stopped, "dfs finished");
        true
    }

    /// Returns `true` iff a stop predicate fired.
    fn walk(&mut self, start: VertexId, depth: &mut usize) -> bool {
        let graph = self.graph;
        let direction = self.setup.direction;
        let mut stack: Vec<Frame<'a>> = vec![];
        match self.discover(start, None, depth) {
            Discovery::Explore => stack.push(Frame {
                vertex: start,
                parent: None,
                arcs: direction.arcs(graph, &start),
            }),
            Discovery::Veto => return false,
            Discovery::Stop => return true,
        }

        while let Some(frame) = stack.last_mut() {
            let (v, parent) = (frame.vertex, frame.parent);
            let arc = match frame.arcs.next() {
                Some(arc) => arc,
                None => {
                    stack.pop();
                    if let Some(up) = stack.last() {
                        self.fold_child(up.vertex, v);
                    }
                    continue;
                }
            };
            let consider = (self.setup.on_arc_discovered)(&arc);
            if (self.setup.arc_stop)(&arc) {
                return true;
            }
            if !consider {
                continue;
            }
            let u = direction.peer(&arc, v);
            if !*self.discovered.get(&u) {
                (self.setup.on_tree_arc)(&arc);
                match self.discover(u, Some(v), depth) {
                    Discovery::Explore => stack.push(Frame {
                        vertex: u,
                        parent: Some(v),
                        arcs: direction.arcs(graph, &u),
                    }),
                    Discovery::Veto => self.fold_child(v, u),
                    Discovery::Stop => return true,
                }
            } else {
                (self.setup.on_non_tree_arc)(&arc);
                if parent != Some(u) {
                    if let Some(peer) = self.results.value(&u) {
                        self.lower(v, peer.dfs_number);
                    }
                }
            }
        }
        false
    }

    /// Stamps `v` and asks the vertex callbacks whether to explore it.
    fn discover(&mut self, v: VertexId, parent: Option<VertexId>, depth: &mut usize) -> Discovery {
        self.discovered.set(v, true);
        if self.compute_values {
            self.results.set(
                v,
                Some(DfsResult {
                    dfs_number: *depth,
                    low_number: *depth,
                    parent,
                }),
            );
        }
        *depth += 1;

        if !(self.setup.on_vertex_discovered)(v) {
            Discovery::Veto
        } else if (self.setup.vertex_stop)(v) {
            Discovery::Stop
        } else {
            Discovery::Explore
        }
    }

    fn fold_child(&mut self, v: VertexId, child: VertexId) {
        if let Some(c) = self.results.value(&child) {
            self.lower(v, c.low_number);
        }
    }

    fn lower(&mut self, v: VertexId, low: usize) {
        if let Some(r) = self.results.get_mut(v).as_mut() {
            r.low_number = r.low_number.min(low);
        }
    }
}
