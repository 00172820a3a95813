use crate::{graph::*, Result};

pub trait GrowableGraph {
    fn new() -> Self;
    fn add_vertex(&mut self) -> VertexId;
    fn add_arc(&mut self, tail: VertexId, head: VertexId) -> Result<ArcId>;
}

pub trait ArcShrinkableGraph {
    /// Removes an arc, or a bundle together with all of its members.
    fn remove_arc(&mut self, arc: &ArcRef) -> Result<Arc>;
}

pub trait VertexShrinkableGraph: ArcShrinkableGraph {
    /// Removes a vertex and returns the arcs which were incident to it.
    fn remove_vertex(&mut self, vertex: &VertexId) -> Result<Vec<Arc>>;
}

/// The iteration contract traversals are written against.
pub trait QueryableGraph {
    fn vertex_size(&self) -> usize;
    fn iter_vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_>;
    fn contains_vertex(&self, v: &VertexId) -> bool;
    /// A vertex to start from when none is given.
    fn any_vertex(&self) -> Option<VertexId>;

    fn arc_size(&self) -> usize;
    fn iter_arcs(&self) -> Box<dyn Iterator<Item = Arc> + '_>;
    fn contains_arc(&self, a: &ArcRef) -> bool;
    fn find_arc(&self, tail: &VertexId, head: &VertexId) -> Option<Arc>;
    fn in_arcs(&self, v: &VertexId) -> Box<dyn Iterator<Item = Arc> + '_>;
    fn out_arcs(&self, v: &VertexId) -> Box<dyn Iterator<Item = Arc> + '_>;

    /// Visits out-arcs of `v` until `stop` fires on the next one.
    /// Returns `false` iff stopped.
    fn map_outgoing_arcs_until(
        &self,
        v: &VertexId,
        visit: &mut dyn FnMut(&Arc),
        stop: &mut dyn FnMut(&Arc) -> bool,
    ) -> bool {
        for a in self.out_arcs(v) {
            if stop(&a) {
                return false;
            }
            visit(&a);
        }
        true
    }

    /// Visits in-arcs of `v` until `stop` fires on the next one.
    /// Returns `false` iff stopped.
    fn map_incoming_arcs_until(
        &self,
        v: &VertexId,
        visit: &mut dyn FnMut(&Arc),
        stop: &mut dyn FnMut(&Arc) -> bool,
    ) -> bool {
        for a in self.in_arcs(v) {
            if stop(&a) {
                return false;
            }
            visit(&a);
        }
        true
    }
}
