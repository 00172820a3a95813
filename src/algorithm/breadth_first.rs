use super::traversal::*;
use crate::{graph::*, property::PropertyMap};
use std::collections::VecDeque;
use tracing::debug;

/// What [BreadthFirstSearch] records per reached vertex.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum BfsValues {
    /// Discovery order, starting with 0 at the start vertex.
    #[default]
    Order,
    /// Distance in arcs from the start vertex.
    Level,
}

/// Level-ordered search from a start vertex.
///
/// The queue carries one `None` marker per level, so levels are counted
/// without storing a level per queued vertex.
pub struct BreadthFirstSearch<'a, G>
where
    G: QueryableGraph,
{
    graph: &'a G,
    setup: TraversalSetup<'a>,
    compute_values: bool,
    kind: BfsValues,
    values: PropertyMap<VertexId, Option<usize>>,
    discovered: PropertyMap<VertexId, bool>,
    queue: VecDeque<Option<VertexId>>,
    max_bfs_number: Option<usize>,
    max_level: Option<usize>,
}

impl<'a, G> Traversal<'a> for BreadthFirstSearch<'a, G>
where
    G: QueryableGraph,
{
    fn setup(&mut self) -> &mut TraversalSetup<'a> {
        &mut self.setup
    }
}

impl<'a, G> BreadthFirstSearch<'a, G>
where
    G: QueryableGraph,
{
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            setup: TraversalSetup::default(),
            compute_values: true,
            kind: BfsValues::Order,
            values: PropertyMap::new(None),
            discovered: PropertyMap::new(false),
            queue: VecDeque::new(),
            max_bfs_number: None,
            max_level: None,
        }
    }

    pub fn compute_values(&mut self, compute: bool) -> &mut Self {
        self.compute_values = compute;
        self
    }

    pub fn values_as(&mut self, kind: BfsValues) -> &mut Self {
        self.kind = kind;
        self
    }

    /// Order or level of each reached vertex, `None` for the others.
    pub fn values(&self) -> &PropertyMap<VertexId, Option<usize>> {
        &self.values
    }

    pub fn value(&self, v: &VertexId) -> Option<usize> {
        self.values.value(v)
    }

    /// Discovery number of the last discovered vertex.
    pub fn max_bfs_number(&self) -> Option<usize> {
        self.max_bfs_number
    }

    /// Number of completed level transitions.
    pub fn max_level(&self) -> Option<usize> {
        self.max_level
    }

    pub fn vertex_discovered(&self, v: &VertexId) -> bool {
        *self.discovered.get(v)
    }

    pub fn num_vertices_reached(&self) -> usize {
        self.max_bfs_number.map_or(0, |n| n + 1)
    }

    /// Number of vertices reached, or `None` if the search never ran.
    pub fn deliver(&self) -> Option<usize> {
        self.max_bfs_number.map(|n| n + 1)
    }

    /// Starts over from the start vertex. Answers `false` if there is no
    /// vertex to start from.
    pub fn run(&mut self) -> bool {
        let start = match self.setup.start.or_else(|| self.graph.any_vertex()) {
            Some(v) if self.graph.contains_vertex(&v) => v,
            _ => return false,
        };
        self.max_bfs_number = Some(0);
        self.max_level = Some(0);
        self.discovered.reset_all();
        self.values.reset_all();
        self.queue.clear();
        self.queue.reserve(self.graph.vertex_size() + 1);

        self.queue.push_back(Some(start));
        self.queue.push_back(None);
        self.discovered.set(start, true);
        if self.compute_values {
            self.values.set(start, Some(0));
        }
        if (self.setup.on_vertex_discovered)(start) && !(self.setup.vertex_stop)(start) {
            self.resume();
        }
        debug!(
            reached = self.num_vertices_reached(),
            levels = ?self.max_level,
            "bfs finished"
        );
        true
    }

    /// Continues a search which halted on a stop predicate.
    pub fn resume(&mut self) {
        let mut max = match self.max_bfs_number {
            Some(n) => n,
            None => return,
        };
        let graph = self.graph;
        let direction = self.setup.direction;
        'search: while let Some(front) = self.queue.front().copied() {
            let curr = match front {
                Some(v) => {
                    if (self.setup.vertex_stop)(v) {
                        break;
                    }
                    self.queue.pop_front();
                    v
                }
                None => {
                    self.queue.pop_front();
                    if !self.queue.is_empty() {
                        self.queue.push_back(None);
                        self.max_level = self.max_level.map(|l| l + 1);
                    }
                    continue;
                }
            };

            for arc in direction.arcs(graph, &curr) {
                let consider = (self.setup.on_arc_discovered)(&arc);
                if (self.setup.arc_stop)(&arc) {
                    break 'search;
                }
                if !consider {
                    continue;
                }
                let peer = direction.peer(&arc, curr);
                if *self.discovered.get(&peer) {
                    (self.setup.on_non_tree_arc)(&arc);
                    continue;
                }
                max += 1;
                self.max_bfs_number = Some(max);
                if self.compute_values {
                    let value = match self.kind {
                        BfsValues::Order => max,
                        BfsValues::Level => self.values.value(&curr).map_or(0, |l| l + 1),
                    };
                    self.values.set(peer, Some(value));
                }
                (self.setup.on_tree_arc)(&arc);
                self.discovered.set(peer, true);
                if (self.setup.on_vertex_discovered)(peer) {
                    self.queue.push_back(Some(peer));
                }
            }
        }
    }
}
