use super::pool::Recyclable;
use crate::{graph::*, property::PropertyMap, Endpoint, Error, Result};

/// Where an arc sits within an [ArcList].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Slot {
    /// Position in the simple list.
    SimpleAt(usize),
    /// Position of a bundle in the multi list.
    MultiAt(usize),
    /// The arc is folded into this bundle, which owns the slot.
    BundledIn(BundleId),
}

/// What [ArcList::remove] took out.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Removal {
    Simple,
    Multi,
    /// A member left the bundle. The bundle keeps its slot.
    Bundled(BundleId),
}

/// One direction of a vertex's adjacency: simple arcs, then bundles.
///
/// Every entry's position is recorded in `slots`, so removal swaps the last
/// entry into the hole in $O(1)$.
#[derive(Clone)]
pub struct ArcList {
    simple: Vec<ArcId>,
    multi: Vec<(BundleId, usize)>,
    slots: PropertyMap<ArcRef, Option<Slot>>,
}

impl Default for ArcList {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcList {
    pub fn new() -> Self {
        Self {
            simple: vec![],
            multi: vec![],
            slots: PropertyMap::new(None),
        }
    }

    pub fn push_simple(&mut self, arc: ArcId) {
        self.slots
            .set(ArcRef::Simple(arc), Some(Slot::SimpleAt(self.simple.len())));
        self.simple.push(arc);
    }

    pub fn push_bundle(&mut self, bundle: BundleId, members: &[ArcId]) {
        self.slots
            .set(ArcRef::Bundle(bundle), Some(Slot::MultiAt(self.multi.len())));
        self.multi.push((bundle, members.len()));
        for m in members {
            self.slots.set(ArcRef::Simple(*m), Some(Slot::BundledIn(bundle)));
        }
    }

    pub fn slot_of(&self, arc: &ArcRef) -> Option<Slot> {
        *self.slots.get(arc)
    }

    /// Takes `arc` out, trying the simple list, the multi list and bundle
    /// membership in this order.
    ///
    /// `members` must list the bundle's arcs when `arc` is a bundle, so that
    /// their membership records are dropped with it.
    pub fn remove(&mut self, arc: ArcRef, members: &[ArcId]) -> Option<Removal> {
        match self.slot_of(&arc)? {
            Slot::SimpleAt(i) => {
                debug_assert_eq!(ArcRef::Simple(self.simple[i]), arc);
                self.simple.swap_remove(i);
                if let Some(moved) = self.simple.get(i) {
                    self.slots
                        .set(ArcRef::Simple(*moved), Some(Slot::SimpleAt(i)));
                }
                self.slots.reset_to_default(&arc);
                Some(Removal::Simple)
            }
            Slot::MultiAt(i) => {
                debug_assert_eq!(ArcRef::Bundle(self.multi[i].0), arc);
                let (bundle, _) = self.multi.swap_remove(i);
                if let Some((moved, _)) = self.multi.get(i) {
                    self.slots
                        .set(ArcRef::Bundle(*moved), Some(Slot::MultiAt(i)));
                }
                self.slots.reset_to_default(&arc);
                for m in members {
                    let m = ArcRef::Simple(*m);
                    if self.slot_of(&m) == Some(Slot::BundledIn(bundle)) {
                        self.slots.reset_to_default(&m);
                    }
                }
                Some(Removal::Multi)
            }
            Slot::BundledIn(bundle) => match self.slot_of(&ArcRef::Bundle(bundle)) {
                Some(Slot::MultiAt(i)) => {
                    self.multi[i].1 -= 1;
                    self.slots.reset_to_default(&arc);
                    Some(Removal::Bundled(bundle))
                }
                _ => {
                    debug_assert!(false, "{:?} points at a bundle not in this list", arc);
                    None
                }
            },
        }
    }

    /// Whether `arc` is in this list, directly or folded into a bundle here.
    pub fn contains(&self, arc: &ArcRef) -> bool {
        match self.slot_of(arc) {
            None => false,
            Some(Slot::SimpleAt(_)) | Some(Slot::MultiAt(_)) => true,
            Some(Slot::BundledIn(b)) => {
                matches!(self.slot_of(&ArcRef::Bundle(b)), Some(Slot::MultiAt(_)))
            }
        }
    }

    /// Position within the simple or multi list. Bundled members have none.
    pub fn index_of(&self, arc: &ArcRef) -> Option<usize> {
        match self.slot_of(arc)? {
            Slot::SimpleAt(i) | Slot::MultiAt(i) => Some(i),
            Slot::BundledIn(_) => None,
        }
    }

    /// Number of entries, counting a bundle once or as its member count.
    pub fn degree(&self, multi_arcs_as_simple: bool) -> usize {
        if multi_arcs_as_simple {
            self.simple.len() + self.multi.len()
        } else {
            self.simple.len() + self.multi.iter().map(|(_, n)| n).sum::<usize>()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.multi.is_empty()
    }

    /// The `i`-th entry. With bundles expanded, each bundle covers as many
    /// positions as it has members and answers for all of them.
    pub fn arc_at(&self, i: usize, multi_arcs_as_simple: bool) -> Option<ArcRef> {
        if let Some(a) = self.simple.get(i) {
            return Some(ArcRef::Simple(*a));
        }
        let mut i = i - self.simple.len();
        if multi_arcs_as_simple {
            return self.multi.get(i).map(|(b, _)| ArcRef::Bundle(*b));
        }
        for (b, n) in self.multi.iter() {
            if i < *n {
                return Some(ArcRef::Bundle(*b));
            }
            i -= n;
        }
        None
    }

    pub fn simple_arcs(&self) -> &[ArcId] {
        &self.simple
    }

    pub fn bundles(&self) -> impl Iterator<Item = BundleId> + '_ {
        self.multi.iter().map(|(b, _)| *b)
    }

    pub fn iter(&self) -> impl Iterator<Item = ArcRef> + '_ {
        self.simple
            .iter()
            .map(|a| ArcRef::Simple(*a))
            .chain(self.bundles().map(ArcRef::Bundle))
    }

    /// Visits simple arcs, then bundles. Returns `false` iff `stop` fired.
    pub fn map_until<V, S>(&self, mut visit: V, mut stop: S) -> bool
    where
        V: FnMut(ArcRef),
        S: FnMut(ArcRef) -> bool,
    {
        for a in self.iter() {
            if stop(a) {
                return false;
            }
            visit(a);
        }
        true
    }

    pub fn clear(&mut self) {
        self.simple.clear();
        self.multi.clear();
        self.slots.reset_all();
    }

    /// Checks that every recorded slot agrees with the list position.
    pub fn check(&self) -> std::result::Result<(), String> {
        for (i, a) in self.simple.iter().enumerate() {
            let r = ArcRef::Simple(*a);
            if self.slot_of(&r) != Some(Slot::SimpleAt(i)) {
                return Err(format!("{:?} at {} has slot {:?}", r, i, self.slot_of(&r)));
            }
        }
        for (i, (b, n)) in self.multi.iter().enumerate() {
            let r = ArcRef::Bundle(*b);
            if self.slot_of(&r) != Some(Slot::MultiAt(i)) {
                return Err(format!("{:?} at {} has slot {:?}", r, i, self.slot_of(&r)));
            }
            let members = self
                .slots
                .iter()
                .filter(|(_, s)| **s == Some(Slot::BundledIn(*b)))
                .count();
            if members != *n {
                return Err(format!("{:?} records {} members, found {}", r, n, members));
            }
        }
        for (r, s) in self.slots.iter() {
            let ok = match s {
                None => true,
                Some(Slot::SimpleAt(i)) => self.simple.get(*i).map(|a| ArcRef::Simple(*a)) == Some(*r),
                Some(Slot::MultiAt(i)) => self.multi.get(*i).map(|(b, _)| ArcRef::Bundle(*b)) == Some(*r),
                Some(Slot::BundledIn(b)) => self.contains(&ArcRef::Bundle(*b)),
            };
            if !ok {
                return Err(format!("stale slot {:?} for {:?}", s, r));
            }
        }
        Ok(())
    }
}

/// Per-vertex state of an incidence-list graph.
///
/// Holds the live outgoing and incoming [ArcList]s plus their deactivated
/// shadows, the vertex's position in the graph's vertex sequence and its
/// validity.
///
/// With consistency checking enabled, attaching an arc whose tail (head)
/// differs from this vertex fails with [Error::InvalidEndpoint]. With
/// checking disabled such an arc is attached as given and the graph's
/// behavior is undefined from then on.
#[derive(Clone)]
pub struct VertexAdjacency {
    index: usize,
    active: bool,
    valid: bool,
    check_consistency: bool,
    outgoing: ArcList,
    incoming: ArcList,
    deactivated_outgoing: ArcList,
    deactivated_incoming: ArcList,
}

impl Recyclable for VertexAdjacency {
    fn hibernate(&mut self) {
        self.valid = false;
        self.active = false;
        self.outgoing.clear();
        self.incoming.clear();
        self.deactivated_outgoing.clear();
        self.deactivated_incoming.clear();
    }

    fn recycle(&mut self) {
        self.valid = true;
        self.active = true;
    }
}

impl VertexAdjacency {
    pub fn new(index: usize, check_consistency: bool) -> Self {
        Self {
            index,
            active: true,
            valid: true,
            check_consistency,
            outgoing: ArcList::new(),
            incoming: ArcList::new(),
            deactivated_outgoing: ArcList::new(),
            deactivated_incoming: ArcList::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the vertex is in the live sequence rather than the deactivated one.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn enable_consistency_check(&mut self, enable: bool) {
        self.check_consistency = enable;
    }

    pub fn checks_consistency(&self) -> bool {
        self.check_consistency
    }

    fn check_endpoint(&self, this: VertexId, arc: ArcRef, actual: VertexId, role: Endpoint) -> Result<()> {
        if self.check_consistency && actual != this {
            return Err(Error::InvalidEndpoint {
                arc,
                vertex: this,
                role,
            });
        }
        Ok(())
    }

    pub fn add_outgoing_simple(&mut self, this: VertexId, arc: ArcId, tail: VertexId) -> Result<()> {
        self.check_endpoint(this, arc.into(), tail, Endpoint::Tail)?;
        self.outgoing.push_simple(arc);
        Ok(())
    }

    pub fn add_incoming_simple(&mut self, this: VertexId, arc: ArcId, head: VertexId) -> Result<()> {
        self.check_endpoint(this, arc.into(), head, Endpoint::Head)?;
        self.incoming.push_simple(arc);
        Ok(())
    }

    pub fn add_outgoing_multi_arc(
        &mut self,
        this: VertexId,
        bundle: BundleId,
        tail: VertexId,
        members: &[ArcId],
    ) -> Result<()> {
        self.check_endpoint(this, bundle.into(), tail, Endpoint::Tail)?;
        self.outgoing.push_bundle(bundle, members);
        Ok(())
    }

    pub fn add_incoming_multi_arc(
        &mut self,
        this: VertexId,
        bundle: BundleId,
        head: VertexId,
        members: &[ArcId],
    ) -> Result<()> {
        self.check_endpoint(this, bundle.into(), head, Endpoint::Head)?;
        self.incoming.push_bundle(bundle, members);
        Ok(())
    }

    /// Attaches `arc` as outgoing, dispatching on whether it is a bundle.
    pub fn add_outgoing(&mut self, this: VertexId, arc: &Arc, members: &[ArcId]) -> Result<()> {
        match arc.id {
            ArcRef::Simple(a) => self.add_outgoing_simple(this, a, arc.tail),
            ArcRef::Bundle(b) => self.add_outgoing_multi_arc(this, b, arc.tail, members),
        }
    }

    /// Attaches `arc` as incoming, dispatching on whether it is a bundle.
    pub fn add_incoming(&mut self, this: VertexId, arc: &Arc, members: &[ArcId]) -> Result<()> {
        match arc.id {
            ArcRef::Simple(a) => self.add_incoming_simple(this, a, arc.head),
            ArcRef::Bundle(b) => self.add_incoming_multi_arc(this, b, arc.head, members),
        }
    }

    /// Removes a live outgoing arc. `None` if it is not here.
    pub fn remove_outgoing(&mut self, arc: ArcRef, members: &[ArcId]) -> Option<Removal> {
        self.outgoing.remove(arc, members)
    }

    /// Removes a live incoming arc. `None` if it is not here.
    pub fn remove_incoming(&mut self, arc: ArcRef, members: &[ArcId]) -> Option<Removal> {
        self.incoming.remove(arc, members)
    }

    /// Removes an outgoing arc whether live or deactivated.
    pub(crate) fn detach_outgoing(&mut self, arc: ArcRef, members: &[ArcId]) -> Option<Removal> {
        self.outgoing
            .remove(arc, members)
            .or_else(|| self.deactivated_outgoing.remove(arc, members))
    }

    /// Removes an incoming arc whether live or deactivated.
    pub(crate) fn detach_incoming(&mut self, arc: ArcRef, members: &[ArcId]) -> Option<Removal> {
        self.incoming
            .remove(arc, members)
            .or_else(|| self.deactivated_incoming.remove(arc, members))
    }

    pub fn clear_outgoing(&mut self) {
        self.outgoing.clear();
    }

    pub fn clear_incoming(&mut self) {
        self.incoming.clear();
    }

    pub fn out_degree(&self, multi_arcs_as_simple: bool) -> usize {
        self.outgoing.degree(multi_arcs_as_simple)
    }

    pub fn in_degree(&self, multi_arcs_as_simple: bool) -> usize {
        self.incoming.degree(multi_arcs_as_simple)
    }

    pub fn is_source(&self) -> bool {
        self.incoming.is_empty()
    }

    pub fn is_sink(&self) -> bool {
        self.outgoing.is_empty()
    }

    pub fn has_outgoing(&self, arc: &ArcRef) -> bool {
        self.outgoing.contains(arc)
    }

    pub fn has_incoming(&self, arc: &ArcRef) -> bool {
        self.incoming.contains(arc)
    }

    pub fn out_index_of(&self, arc: &ArcRef) -> Option<usize> {
        self.outgoing.index_of(arc)
    }

    pub fn in_index_of(&self, arc: &ArcRef) -> Option<usize> {
        self.incoming.index_of(arc)
    }

    pub fn outgoing_arc_at(&self, i: usize, multi_arcs_as_simple: bool) -> Result<ArcRef> {
        self.outgoing
            .arc_at(i, multi_arcs_as_simple)
            .ok_or(Error::IndexOutOfRange {
                index: i,
                len: self.out_degree(multi_arcs_as_simple),
            })
    }

    pub fn incoming_arc_at(&self, i: usize, multi_arcs_as_simple: bool) -> Result<ArcRef> {
        self.incoming
            .arc_at(i, multi_arcs_as_simple)
            .ok_or(Error::IndexOutOfRange {
                index: i,
                len: self.in_degree(multi_arcs_as_simple),
            })
    }

    /// Moves a live outgoing arc into the shadow list.
    ///
    /// A bundle moves as one slot; a single member of a bundle cannot move
    /// on its own and is refused.
    pub fn deactivate_outgoing(&mut self, arc: ArcRef, members: &[ArcId]) -> bool {
        move_between(&mut self.outgoing, &mut self.deactivated_outgoing, arc, members)
    }

    pub fn activate_outgoing(&mut self, arc: ArcRef, members: &[ArcId]) -> bool {
        move_between(&mut self.deactivated_outgoing, &mut self.outgoing, arc, members)
    }

    pub fn deactivate_incoming(&mut self, arc: ArcRef, members: &[ArcId]) -> bool {
        move_between(&mut self.incoming, &mut self.deactivated_incoming, arc, members)
    }

    pub fn activate_incoming(&mut self, arc: ArcRef, members: &[ArcId]) -> bool {
        move_between(&mut self.deactivated_incoming, &mut self.incoming, arc, members)
    }

    pub fn map_outgoing_until<V, S>(&self, visit: V, stop: S) -> bool
    where
        V: FnMut(ArcRef),
        S: FnMut(ArcRef) -> bool,
    {
        self.outgoing.map_until(visit, stop)
    }

    pub fn map_incoming_until<V, S>(&self, visit: V, stop: S) -> bool
    where
        V: FnMut(ArcRef),
        S: FnMut(ArcRef) -> bool,
    {
        self.incoming.map_until(visit, stop)
    }

    pub fn map_deactivated_outgoing_until<V, S>(&self, visit: V, stop: S) -> bool
    where
        V: FnMut(ArcRef),
        S: FnMut(ArcRef) -> bool,
    {
        self.deactivated_outgoing.map_until(visit, stop)
    }

    pub fn map_deactivated_incoming_until<V, S>(&self, visit: V, stop: S) -> bool
    where
        V: FnMut(ArcRef),
        S: FnMut(ArcRef) -> bool,
    {
        self.deactivated_incoming.map_until(visit, stop)
    }

    pub fn outgoing(&self) -> &ArcList {
        &self.outgoing
    }

    pub fn incoming(&self) -> &ArcList {
        &self.incoming
    }

    pub fn deactivated_outgoing(&self) -> &ArcList {
        &self.deactivated_outgoing
    }

    pub fn deactivated_incoming(&self) -> &ArcList {
        &self.deactivated_incoming
    }
}

fn move_between(from: &mut ArcList, to: &mut ArcList, arc: ArcRef, members: &[ArcId]) -> bool {
    match from.slot_of(&arc) {
        None | Some(Slot::BundledIn(_)) => false,
        Some(_) => {
            from.remove(arc, members);
            match arc {
                ArcRef::Simple(a) => to.push_simple(a),
                ArcRef::Bundle(b) => to.push_bundle(b, members),
            }
            true
        }
    }
}
