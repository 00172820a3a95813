/// ID for vertices.
///
/// `raw` is the stable identity, which is reissued when a pooled vertex is
/// recycled. `generation` changes on every reissue, so a handle kept across
/// a removal no longer matches the recycled vertex.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct VertexId {
    raw: usize,
    generation: u32,
}

impl VertexId {
    pub const MIN: VertexId = VertexId {
        raw: 0,
        generation: 0,
    };

    pub fn new(raw: usize) -> Self {
        Self { raw, generation: 0 }
    }

    pub(crate) fn with_generation(raw: usize, generation: u32) -> Self {
        Self { raw, generation }
    }

    pub fn to_raw(&self) -> usize {
        self.raw
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}
