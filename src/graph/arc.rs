use super::VertexId;

/// ID for arcs, a raw identity plus the generation of its pool slot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct ArcId {
    raw: usize,
    generation: u32,
}

/// ID for bundles of parallel arcs.
///
/// Bundles are pooled separately from arcs and never count as arcs themselves.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct BundleId {
    raw: usize,
    generation: u32,
}

/// What an adjacency slot holds: a single arc or a bundle of parallel arcs.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum ArcRef {
    Simple(ArcId),
    Bundle(BundleId),
}

/// Information about an adjacency entry as seen by visitors.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Arc {
    pub id: ArcRef,
    pub tail: VertexId,
    pub head: VertexId,
}

impl ArcId {
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

impl BundleId {
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

impl ArcRef {
    pub fn is_bundle(&self) -> bool {
        matches!(self, ArcRef::Bundle(_))
    }

    pub fn as_simple(&self) -> Option<ArcId> {
        match self {
            ArcRef::Simple(a) => Some(*a),
            ArcRef::Bundle(_) => None,
        }
    }

    pub fn as_bundle(&self) -> Option<BundleId> {
        match self {
            ArcRef::Simple(_) => None,
            ArcRef::Bundle(b) => Some(*b),
        }
    }
}

impl From<ArcId> for ArcRef {
    fn from(a: ArcId) -> Self {
        ArcRef::Simple(a)
    }
}

impl From<BundleId> for ArcRef {
    fn from(b: BundleId) -> Self {
        ArcRef::Bundle(b)
    }
}

impl Arc {
    /// The endpoint opposite to `from`. For a self-loop this is `from` itself.
    pub fn peer(&self, from: VertexId) -> VertexId {
        if self.tail == from {
            self.head
        } else {
            self.tail
        }
    }
}
