use crate::graph::*;

/// Which arcs of a vertex a traversal follows.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Direction {
    /// Outgoing arcs, towards their heads.
    #[default]
    Forward,
    /// Incoming arcs, towards their tails. Answers who reaches the start.
    Reverse,
    /// Both, outgoing first.
    Undirected,
}

impl Direction {
    pub fn arcs<'g, G>(&self, graph: &'g G, v: &VertexId) -> Box<dyn Iterator<Item = Arc> + 'g>
    where
        G: QueryableGraph,
    {
        match self {
            Direction::Forward => graph.out_arcs(v),
            Direction::Reverse => graph.in_arcs(v),
            Direction::Undirected => Box::new(graph.out_arcs(v).chain(graph.in_arcs(v))),
        }
    }

    /// The vertex `arc` leads to when entered from `from`.
    pub fn peer(&self, arc: &Arc, from: VertexId) -> VertexId {
        match self {
            Direction::Forward => arc.head,
            Direction::Reverse => arc.tail,
            Direction::Undirected => arc.peer(from),
        }
    }
}

pub type VertexPredicate<'a> = Box<dyn FnMut(VertexId) -> bool + 'a>;
pub type ArcPredicate<'a> = Box<dyn FnMut(&Arc) -> bool + 'a>;
pub type ArcVisitor<'a> = Box<dyn FnMut(&Arc) + 'a>;

/// Start vertex, direction and callbacks shared by all traversals.
pub struct TraversalSetup<'a> {
    pub(crate) start: Option<VertexId>,
    pub(crate) direction: Direction,
    pub(crate) on_vertex_discovered: VertexPredicate<'a>,
    pub(crate) on_arc_discovered: ArcPredicate<'a>,
    pub(crate) vertex_stop: VertexPredicate<'a>,
    pub(crate) arc_stop: ArcPredicate<'a>,
    pub(crate) on_tree_arc: ArcVisitor<'a>,
    pub(crate) on_non_tree_arc: ArcVisitor<'a>,
}

impl<'a> Default for TraversalSetup<'a> {
    fn default() -> Self {
        Self {
            start: None,
            direction: Direction::Forward,
            on_vertex_discovered: Box::new(|_| true),
            on_arc_discovered: Box::new(|_| true),
            vertex_stop: Box::new(|_| false),
            arc_stop: Box::new(|_| false),
            on_tree_arc: Box::new(|_| {}),
            on_non_tree_arc: Box::new(|_| {}),
        }
    }
}

/// Configuration of a graph traversal.
///
/// Stop predicates are sticky: once one fires, the traversal halts and
/// callbacks already made are not undone.
pub trait Traversal<'a> {
    fn setup(&mut self) -> &mut TraversalSetup<'a>;

    /// Where to start. Defaults to any vertex of the graph.
    fn start_vertex(&mut self, v: VertexId) -> &mut Self {
        self.setup().start = Some(v);
        self
    }

    fn direction(&mut self, direction: Direction) -> &mut Self {
        self.setup().direction = direction;
        self
    }

    /// Called on each newly discovered vertex. Answering `false` stops
    /// the traversal from exploring beyond it.
    fn on_vertex_discovered<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(VertexId) -> bool + 'a,
    {
        self.setup().on_vertex_discovered = Box::new(f);
        self
    }

    /// Called on each arc before it is followed. Answering `false` skips it.
    fn on_arc_discovered<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&Arc) -> bool + 'a,
    {
        self.setup().on_arc_discovered = Box::new(f);
        self
    }

    fn vertex_stop<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(VertexId) -> bool + 'a,
    {
        self.setup().vertex_stop = Box::new(f);
        self
    }

    fn arc_stop<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&Arc) -> bool + 'a,
    {
        self.setup().arc_stop = Box::new(f);
        self
    }

    /// Called on each arc leading to an undiscovered vertex.
    fn on_tree_arc<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&Arc) + 'a,
    {
        self.setup().on_tree_arc = Box::new(f);
        self
    }

    /// Called on each arc leading to a vertex discovered before.
    fn on_non_tree_arc<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&Arc) + 'a,
    {
        self.setup().on_non_tree_arc = Box::new(f);
        self
    }
}
