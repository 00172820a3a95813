use crate::graph::*;
use bimap::BiHashMap;

/// How vertices and arcs of a copied graph correspond to the original.
///
/// Left values are ids in the original, right values ids in the copy.
/// A copy draws ids from its own pools, so the two generally differ.
#[derive(Clone, Debug, Default)]
pub struct IdMapping {
    pub vmap: BiHashMap<VertexId, VertexId>,
    pub amap: BiHashMap<ArcId, ArcId>,
}

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_of_vertex(&self, original: &VertexId) -> Option<VertexId> {
        self.vmap.get_by_left(original).copied()
    }

    pub fn original_of_vertex(&self, copy: &VertexId) -> Option<VertexId> {
        self.vmap.get_by_right(copy).copied()
    }

    pub fn copy_of_arc(&self, original: &ArcId) -> Option<ArcId> {
        self.amap.get_by_left(original).copied()
    }

    pub fn original_of_arc(&self, copy: &ArcId) -> Option<ArcId> {
        self.amap.get_by_right(copy).copied()
    }
}
