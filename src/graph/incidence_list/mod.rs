//! An incidence-list digraph with pooled vertices and arcs.
//!
//! | Operation                 | Complexity                                   |
//! | ------------------------- | -------------------------------------------- |
//! | `add_vertex`              | amortized $O(1)$                             |
//! | `remove_vertex`           | $O(\deg(v))$                                 |
//! | `add_arc`                 | amortized $O(1)$                             |
//! | `remove_arc`              | $O(1)$, $O(k)$ for a member of a $k$-bundle  |
//! | `find_arc`                | $O(\deg^+(tail))$                            |
//! | `(de)activate_vertex`     | $O(\deg(v))$                                 |
//! | `(de)activate_arc`        | $O(1)$                                       |
//! | `(un)bundle_parallel_arcs`| $O(\|V\| + \|E\|)$                           |
//!
//! Removal swaps the last list entry into the hole, so positions are not
//! stable. Mutations need `&mut DiGraph` while enumeration borrows it
//! shared, which rules out mutating a list during a scan over it.
mod activation;
mod adjacency;
pub use self::adjacency::*;
mod bundle;
mod pool;

use self::pool::{Acquired, Pool, Recyclable};
use crate::{graph::*, Error, Result};
use std::num::NonZeroUsize;
use tracing::{debug, trace};

/// Behavior switches of a [DiGraph].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GraphConfig {
    /// Reject arcs attached to the wrong vertex and report arcs missing
    /// from an adjacency on removal. Disabling this trades detection for
    /// speed: mistakes are undefined behavior of the graph, not corrected.
    pub check_consistency: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            check_consistency: true,
        }
    }
}

struct ArcEntry {
    tail: VertexId,
    head: VertexId,
    bundle: Option<BundleId>,
    valid: bool,
}

impl Recyclable for ArcEntry {
    fn hibernate(&mut self) {
        self.bundle = None;
        self.valid = false;
    }

    fn recycle(&mut self) {
        self.valid = true;
    }
}

struct BundleEntry {
    tail: VertexId,
    head: VertexId,
    members: Vec<ArcId>,
    valid: bool,
}

impl Recyclable for BundleEntry {
    fn hibernate(&mut self) {
        self.members.clear();
        self.valid = false;
    }

    fn recycle(&mut self) {
        self.valid = true;
    }
}

type VertexObserver = Box<dyn FnMut(VertexId)>;
type ArcObserver = Box<dyn FnMut(&Arc)>;

#[derive(Default)]
struct Observers {
    vertex_added: Vec<VertexObserver>,
    vertex_removed: Vec<VertexObserver>,
    arc_added: Vec<ArcObserver>,
    arc_removed: Vec<ArcObserver>,
}

/// A mutable directed graph backed by per-vertex incidence lists.
///
/// Removed vertices and arcs are hibernated into pools and recycled by
/// later additions, which reissue their raw ids with a new generation.
/// Vertices and arcs can be deactivated, which hides them from queries and
/// traversals until they are activated again. Parallel arcs can be folded
/// into bundles occupying a single adjacency slot.
pub struct DiGraph {
    config: GraphConfig,
    vertices: Pool<VertexAdjacency>,
    arcs: Pool<ArcEntry>,
    bundles: Pool<BundleEntry>,
    live: Vec<VertexId>,
    deactivated: Vec<VertexId>,
    num_arcs: usize,
    observers: Observers,
}

impl Default for DiGraph {
    fn default() -> Self {
        Self::with_config(GraphConfig::default())
    }
}

impl std::fmt::Debug for DiGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DiGraph {{")?;
        write!(f, "{:?}", self.debug().indent(2, 2))?;
        writeln!(f, "}}")
    }
}

impl DiGraph {
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            vertices: Pool::new(),
            arcs: Pool::new(),
            bundles: Pool::new(),
            live: vec![],
            deactivated: vec![],
            num_arcs: 0,
            observers: Observers::default(),
        }
    }

    /// An indented dump including deactivated vertices and shadowed arcs.
    pub fn debug(&self) -> GraphDebug<'_> {
        GraphDebug::new(self)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Toggles consistency checking for the graph and all of its vertices.
    pub fn enable_consistency_check(&mut self, enable: bool) {
        self.config.check_consistency = enable;
        for v in self.live.iter().chain(self.deactivated.iter()) {
            if let Some(adj) = self.vertices.get_mut(v.to_raw(), v.generation()) {
                adj.enable_consistency_check(enable);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of active vertices.
    pub fn size(&self) -> usize {
        self.live.len()
    }

    pub fn deactivated_size(&self) -> usize {
        self.deactivated.len()
    }

    pub fn deactivated_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.deactivated.iter().copied()
    }

    /// Number of arcs owned by the graph, active or not, bundled or not.
    pub fn num_arcs(&self) -> usize {
        self.num_arcs
    }

    /// Number of active arcs, counting a bundle once or as its member count.
    pub fn num_active_arcs(&self, multi_arcs_as_simple: bool) -> usize {
        self.live
            .iter()
            .filter_map(|v| self.adjacency(*v))
            .map(|adj| adj.out_degree(multi_arcs_as_simple))
            .sum()
    }

    /// Pooled vertices ready for recycling.
    pub fn vertex_reserve(&self) -> usize {
        self.vertices.hibernated_len()
    }

    /// Pooled arcs ready for recycling.
    pub fn arc_reserve(&self) -> usize {
        self.arcs.hibernated_len()
    }

    pub fn adjacency(&self, v: VertexId) -> Option<&VertexAdjacency> {
        self.vertices.get(v.to_raw(), v.generation())
    }

    fn vertex(&self, v: VertexId) -> Result<&VertexAdjacency> {
        self.adjacency(v).ok_or(Error::UnknownVertex(v))
    }

    fn vertex_mut(&mut self, v: VertexId) -> Result<&mut VertexAdjacency> {
        self.vertices
            .get_mut(v.to_raw(), v.generation())
            .ok_or(Error::UnknownVertex(v))
    }

    /// Whether `v` is a vertex of this graph which is currently active.
    pub fn is_active(&self, v: VertexId) -> bool {
        self.adjacency(v).map_or(false, |adj| adj.is_active())
    }

    /// Resolves an arc or bundle handle to its endpoints.
    pub fn arc(&self, arc: ArcRef) -> Option<Arc> {
        match arc {
            ArcRef::Simple(a) => self.arcs.get(a.to_raw(), a.generation()).map(|e| Arc {
                id: arc,
                tail: e.tail,
                head: e.head,
            }),
            ArcRef::Bundle(b) => self.bundles.get(b.to_raw(), b.generation()).map(|e| Arc {
                id: arc,
                tail: e.tail,
                head: e.head,
            }),
        }
    }

    fn resolve(&self, arc: ArcRef) -> Result<Arc> {
        self.arc(arc).ok_or(Error::UnknownArc(arc))
    }

    /// Arcs folded into `bundle`, in bundling order.
    pub fn bundle_members(&self, bundle: BundleId) -> Option<&[ArcId]> {
        self.bundles
            .get(bundle.to_raw(), bundle.generation())
            .map(|e| e.members.as_slice())
    }

    /// The bundle an arc is folded into, if any.
    pub fn bundle_of(&self, arc: ArcId) -> Option<BundleId> {
        self.arcs
            .get(arc.to_raw(), arc.generation())
            .and_then(|e| e.bundle)
    }

    fn members_of(&self, arc: ArcRef) -> Vec<ArcId> {
        match arc {
            ArcRef::Simple(_) => vec![],
            ArcRef::Bundle(b) => self.bundle_members(b).map(|m| m.to_vec()).unwrap_or_default(),
        }
    }

    /// Number of arcs behind an adjacency entry.
    pub fn multiplicity(&self, arc: ArcRef) -> usize {
        match arc {
            ArcRef::Simple(_) => 1,
            ArcRef::Bundle(b) => self.bundle_members(b).map_or(0, |m| m.len()),
        }
    }

    pub fn vertex_at(&self, i: usize) -> Result<VertexId> {
        self.live.get(i).copied().ok_or(Error::IndexOutOfRange {
            index: i,
            len: self.live.len(),
        })
    }

    pub fn out_degree(&self, v: VertexId, multi_arcs_as_simple: bool) -> Result<usize> {
        Ok(self.vertex(v)?.out_degree(multi_arcs_as_simple))
    }

    pub fn in_degree(&self, v: VertexId, multi_arcs_as_simple: bool) -> Result<usize> {
        Ok(self.vertex(v)?.in_degree(multi_arcs_as_simple))
    }

    pub fn is_source(&self, v: VertexId) -> Result<bool> {
        Ok(self.vertex(v)?.is_source())
    }

    pub fn is_sink(&self, v: VertexId) -> Result<bool> {
        Ok(self.vertex(v)?.is_sink())
    }

    pub fn outgoing_arc_at(&self, v: VertexId, i: usize, multi_arcs_as_simple: bool) -> Result<Arc> {
        let r = self.vertex(v)?.outgoing_arc_at(i, multi_arcs_as_simple)?;
        self.resolve(r)
    }

    pub fn incoming_arc_at(&self, v: VertexId, i: usize, multi_arcs_as_simple: bool) -> Result<Arc> {
        let r = self.vertex(v)?.incoming_arc_at(i, multi_arcs_as_simple)?;
        self.resolve(r)
    }

    pub fn on_vertex_add<F>(&mut self, f: F)
    where
        F: FnMut(VertexId) + 'static,
    {
        self.observers.vertex_added.push(Box::new(f));
    }

    pub fn on_vertex_remove<F>(&mut self, f: F)
    where
        F: FnMut(VertexId) + 'static,
    {
        self.observers.vertex_removed.push(Box::new(f));
    }

    pub fn on_arc_add<F>(&mut self, f: F)
    where
        F: FnMut(&Arc) + 'static,
    {
        self.observers.arc_added.push(Box::new(f));
    }

    pub fn on_arc_remove<F>(&mut self, f: F)
    where
        F: FnMut(&Arc) + 'static,
    {
        self.observers.arc_removed.push(Box::new(f));
    }

    /// Visits active vertices in sequence order until `stop` fires.
    pub fn map_vertices_until<V, S>(&self, mut visit: V, mut stop: S) -> bool
    where
        V: FnMut(VertexId),
        S: FnMut(VertexId) -> bool,
    {
        for v in self.live.iter() {
            if stop(*v) {
                return false;
            }
            visit(*v);
        }
        true
    }

    /// Visits every active adjacency entry, grouped by tail, until `stop` fires.
    pub fn map_arcs_until<V, S>(&self, mut visit: V, mut stop: S) -> bool
    where
        V: FnMut(&Arc),
        S: FnMut(&Arc) -> bool,
    {
        for v in self.live.iter() {
            if !self.map_list_until(self.adjacency(*v).map(|adj| adj.outgoing()), &mut visit, &mut stop) {
                return false;
            }
        }
        true
    }

    pub fn map_deactivated_outgoing_arcs_until<V, S>(&self, v: VertexId, mut visit: V, mut stop: S) -> bool
    where
        V: FnMut(&Arc),
        S: FnMut(&Arc) -> bool,
    {
        let list = self.adjacency(v).map(|adj| adj.deactivated_outgoing());
        self.map_list_until(list, &mut visit, &mut stop)
    }

    pub fn map_deactivated_incoming_arcs_until<V, S>(&self, v: VertexId, mut visit: V, mut stop: S) -> bool
    where
        V: FnMut(&Arc),
        S: FnMut(&Arc) -> bool,
    {
        let list = self.adjacency(v).map(|adj| adj.deactivated_incoming());
        self.map_list_until(list, &mut visit, &mut stop)
    }

    /// Entries whose handle does not resolve are invalid and skipped.
    fn map_list_until(
        &self,
        list: Option<&ArcList>,
        visit: &mut dyn FnMut(&Arc),
        stop: &mut dyn FnMut(&Arc) -> bool,
    ) -> bool {
        let list = match list {
            Some(list) => list,
            None => return true,
        };
        for r in list.iter() {
            let a = match self.arc(r) {
                Some(a) => a,
                None => {
                    debug_assert!(false, "invalid arc {:?} in adjacency", r);
                    continue;
                }
            };
            if stop(&a) {
                return false;
            }
            visit(&a);
        }
        true
    }

    /// Adds `multiplicity` parallel arcs from `tail` to `head`, folded into one bundle.
    pub fn add_multi_arc(
        &mut self,
        tail: VertexId,
        head: VertexId,
        multiplicity: NonZeroUsize,
    ) -> Result<BundleId> {
        self.vertex(tail)?;
        self.vertex(head)?;
        let members: Vec<ArcId> = (0..multiplicity.get())
            .map(|_| self.acquire_arc(tail, head))
            .collect();
        let bundle = self.acquire_bundle(tail, head, &members);
        let arc = Arc {
            id: bundle.into(),
            tail,
            head,
        };
        self.attach(&arc, &members)?;
        self.num_arcs += members.len();
        for m in members {
            self.greet_arc(&Arc {
                id: m.into(),
                tail,
                head,
            });
        }
        Ok(bundle)
    }

    fn acquire_arc(&mut self, tail: VertexId, head: VertexId) -> ArcId {
        let (raw, generation, how) = self.arcs.acquire(|| ArcEntry {
            tail,
            head,
            bundle: None,
            valid: true,
        });
        if let Some(e) = self.arcs.get_mut(raw, generation) {
            e.tail = tail;
            e.head = head;
            e.bundle = None;
        }
        let recycled = how == Acquired::Recycled;
        trace!(arc = raw, recycled, "acquire arc");
        ArcId::with_generation(raw, generation)
    }

    fn acquire_bundle(&mut self, tail: VertexId, head: VertexId, members: &[ArcId]) -> BundleId {
        let (raw, generation, _) = self.bundles.acquire(|| BundleEntry {
            tail,
            head,
            members: vec![],
            valid: true,
        });
        let bundle = BundleId::with_generation(raw, generation);
        if let Some(e) = self.bundles.get_mut(raw, generation) {
            e.tail = tail;
            e.head = head;
            e.members.clear();
            e.members.extend_from_slice(members);
        }
        for m in members {
            if let Some(e) = self.arcs.get_mut(m.to_raw(), m.generation()) {
                e.bundle = Some(bundle);
            }
        }
        bundle
    }

    fn release_arc(&mut self, arc: ArcId) {
        if self.arcs.contains(arc.to_raw(), arc.generation()) {
            self.arcs.release(arc.to_raw());
            self.num_arcs -= 1;
        }
    }

    fn release_bundle(&mut self, bundle: BundleId) {
        if self.bundles.contains(bundle.to_raw(), bundle.generation()) {
            self.bundles.release(bundle.to_raw());
        }
    }

    /// Attaches `arc` at both endpoints. The arc goes into the shadow lists
    /// if either endpoint is deactivated.
    fn attach(&mut self, arc: &Arc, members: &[ArcId]) -> Result<()> {
        let active = self.is_active(arc.tail) && self.is_active(arc.head);
        self.vertex_mut(arc.tail)?.add_outgoing(arc.tail, arc, members)?;
        let head = self.vertex_mut(arc.head)?;
        if let Err(e) = head.add_incoming(arc.head, arc, members) {
            self.vertex_mut(arc.tail)?.remove_outgoing(arc.id, members);
            return Err(e);
        }
        if !active {
            self.vertex_mut(arc.tail)?.deactivate_outgoing(arc.id, members);
            self.vertex_mut(arc.head)?.deactivate_incoming(arc.id, members);
        }
        Ok(())
    }

    /// Detaches `arc` from both endpoints, live or deactivated.
    fn detach(&mut self, arc: &Arc, members: &[ArcId]) -> Result<(Option<Removal>, Option<Removal>)> {
        let at_tail = self.vertex_mut(arc.tail)?.detach_outgoing(arc.id, members);
        let at_head = self.vertex_mut(arc.head)?.detach_incoming(arc.id, members);
        if self.config.check_consistency {
            if at_tail.is_none() {
                return Err(Error::UnknownIncidence {
                    arc: arc.id,
                    vertex: arc.tail,
                });
            }
            if at_head.is_none() {
                return Err(Error::UnknownIncidence {
                    arc: arc.id,
                    vertex: arc.head,
                });
            }
        }
        Ok((at_tail, at_head))
    }

    /// Takes `arc` out of its bundle. An emptied bundle is detached and pooled.
    fn leave_bundle(&mut self, arc: ArcId, bundle: BundleId) -> Result<()> {
        let emptied = match self.bundles.get_mut(bundle.to_raw(), bundle.generation()) {
            Some(e) => {
                e.members.retain(|m| *m != arc);
                e.members.is_empty()
            }
            None => false,
        };
        if let Some(e) = self.arcs.get_mut(arc.to_raw(), arc.generation()) {
            e.bundle = None;
        }
        if emptied {
            let shell = self.resolve(bundle.into())?;
            self.detach(&shell, &[])?;
            self.release_bundle(bundle);
        }
        Ok(())
    }

    fn greet_vertex(&mut self, v: VertexId) {
        for f in self.observers.vertex_added.iter_mut() {
            f(v);
        }
    }

    fn dismiss_vertex(&mut self, v: VertexId) {
        for f in self.observers.vertex_removed.iter_mut() {
            f(v);
        }
    }

    fn greet_arc(&mut self, a: &Arc) {
        for f in self.observers.arc_added.iter_mut() {
            f(a);
        }
    }

    fn dismiss_arc(&mut self, a: &Arc) {
        for f in self.observers.arc_removed.iter_mut() {
            f(a);
        }
    }

    /// Appends `v` to the live or deactivated sequence and records its index.
    fn link_vertex(&mut self, v: VertexId, active: bool) -> Result<()> {
        let seq = if active {
            &mut self.live
        } else {
            &mut self.deactivated
        };
        let index = seq.len();
        seq.push(v);
        let adj = self.vertex_mut(v)?;
        adj.set_index(index);
        adj.set_active(active);
        Ok(())
    }

    /// Swap-removes `v` from whichever sequence holds it.
    fn unlink_vertex(&mut self, v: VertexId) -> Result<()> {
        let adj = self.vertex(v)?;
        let (index, active) = (adj.index(), adj.is_active());
        let seq = if active {
            &mut self.live
        } else {
            &mut self.deactivated
        };
        debug_assert_eq!(seq.get(index), Some(&v));
        seq.swap_remove(index);
        if let Some(moved) = seq.get(index).copied() {
            self.vertex_mut(moved)?.set_index(index);
        }
        Ok(())
    }

    /// Pre-populates the vertex pool so that the next `n` additions recycle.
    pub fn reserve_vertex_capacity(&mut self, n: usize) {
        let check = self.config.check_consistency;
        self.vertices.reserve(n, || VertexAdjacency::new(0, check));
        self.live.reserve(n);
        debug!(n, reserve = self.vertices.hibernated_len(), "reserved vertices");
    }

    /// Pre-populates the arc pool so that the next `n` additions recycle.
    pub fn reserve_arc_capacity(&mut self, n: usize) {
        self.arcs.reserve(n, || ArcEntry {
            tail: VertexId::MIN,
            head: VertexId::MIN,
            bundle: None,
            valid: false,
        });
        debug!(n, reserve = self.arcs.hibernated_len(), "reserved arcs");
    }

    /// Hibernates all vertices and arcs into the pools.
    ///
    /// Removal observers see every arc, then every vertex. With
    /// `empty_reserves`, the pools are freed as well and ids are reissued
    /// from zero in ascending order. Otherwise, with `restore_order`, pooled
    /// objects are recycled in ascending id order.
    pub fn clear(&mut self, empty_reserves: bool, restore_order: bool) -> Result<()> {
        self.activate_all()?;
        let (vertices, arcs) = (self.live.len(), self.num_arcs);
        for v in self.live.clone() {
            let entries: Vec<ArcRef> = self.vertex(v)?.outgoing().iter().collect();
            for r in entries {
                let arc = self.resolve(r)?;
                let simple = match r {
                    ArcRef::Simple(a) => vec![a],
                    ArcRef::Bundle(b) => {
                        let members = self.members_of(r);
                        self.release_bundle(b);
                        members
                    }
                };
                for a in simple {
                    self.release_arc(a);
                    self.dismiss_arc(&Arc {
                        id: a.into(),
                        tail: arc.tail,
                        head: arc.head,
                    });
                }
            }
        }
        for v in std::mem::take(&mut self.live) {
            self.vertices.release(v.to_raw());
            self.dismiss_vertex(v);
        }
        debug_assert_eq!(self.num_arcs, 0);
        self.num_arcs = 0;
        if empty_reserves {
            self.vertices.empty_reserves();
            self.arcs.empty_reserves();
            self.bundles.empty_reserves();
        }
        if empty_reserves || restore_order {
            self.vertices.restore_order();
            self.arcs.restore_order();
            self.bundles.restore_order();
        }
        debug!(vertices, arcs, empty_reserves, restore_order, "cleared graph");
        Ok(())
    }

    /// Replaces the content of this graph by a copy of the active part of `other`.
    ///
    /// Bundles are copied as their member arcs. Pooled objects of `self` are
    /// reused. Observers of `self` see the clearing and every addition.
    pub fn copy_from(&mut self, other: &DiGraph) -> Result<IdMapping> {
        self.clear(false, false)?;
        let mut mapping = IdMapping::new();
        for v in other.live.iter() {
            let nv = self.add_vertex();
            mapping.vmap.insert(*v, nv);
        }
        for v in other.live.iter() {
            let adj = other.vertex(*v)?;
            for r in adj.outgoing().iter() {
                let arc = other.resolve(r)?;
                let originals = match r {
                    ArcRef::Simple(a) => vec![a],
                    ArcRef::Bundle(_) => other.members_of(r),
                };
                let tail = mapping.copy_of_vertex(&arc.tail).ok_or(Error::UnknownVertex(arc.tail))?;
                let head = mapping.copy_of_vertex(&arc.head).ok_or(Error::UnknownVertex(arc.head))?;
                for a in originals {
                    let na = self.add_arc(tail, head)?;
                    mapping.amap.insert(a, na);
                }
            }
        }
        debug!(
            vertices = mapping.vmap.len(),
            arcs = mapping.amap.len(),
            "copied graph"
        );
        Ok(mapping)
    }

    /// Checks every bookkeeping invariant and reports the first drift.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::ConsistencyViolation(msg));
        for (active, seq) in [(true, &self.live), (false, &self.deactivated)] {
            for (i, v) in seq.iter().enumerate() {
                let adj = match self.adjacency(*v) {
                    Some(adj) => adj,
                    None => return fail(format!("{:?} at {} is not a vertex", v, i)),
                };
                if !adj.is_valid() || adj.is_active() != active || adj.index() != i {
                    return fail(format!(
                        "{:?} at {} records index {} active {}",
                        v,
                        i,
                        adj.index(),
                        adj.is_active()
                    ));
                }
                for list in [
                    adj.outgoing(),
                    adj.incoming(),
                    adj.deactivated_outgoing(),
                    adj.deactivated_incoming(),
                ] {
                    if let Err(msg) = list.check() {
                        return fail(format!("{:?}: {}", v, msg));
                    }
                }
                if !active && !(adj.outgoing().is_empty() && adj.incoming().is_empty()) {
                    return fail(format!("deactivated {:?} has active arcs", v));
                }
                for (outgoing, list) in [
                    (true, adj.outgoing()),
                    (true, adj.deactivated_outgoing()),
                    (false, adj.incoming()),
                    (false, adj.deactivated_incoming()),
                ] {
                    for r in list.iter() {
                        match self.arc(r) {
                            Some(a) if (outgoing && a.tail == *v) || (!outgoing && a.head == *v) => {}
                            _ => return fail(format!("{:?} holds foreign arc {:?}", v, r)),
                        }
                    }
                }
            }
        }
        if self.live.len() + self.deactivated.len() != self.vertices.live_len() {
            return fail("vertex sequences disagree with the vertex pool".to_owned());
        }
        if self.num_arcs != self.arcs.live_len() {
            return fail(format!(
                "arc counter {} but {} arcs in use",
                self.num_arcs,
                self.arcs.live_len()
            ));
        }
        for (raw, generation, e) in self.arcs.iter_live() {
            let r = ArcRef::Simple(ArcId::with_generation(raw, generation));
            let (tail, head) = match (self.adjacency(e.tail), self.adjacency(e.head)) {
                (Some(t), Some(h)) => (t, h),
                _ => return fail(format!("{:?} has a dangling endpoint", r)),
            };
            let holder = match e.bundle {
                Some(b) => {
                    let members = self.bundle_members(b).unwrap_or_default();
                    if !members.contains(&ArcId::with_generation(raw, generation)) {
                        return fail(format!("{:?} is not a member of {:?}", r, b));
                    }
                    if tail.outgoing().slot_of(&r).or(tail.deactivated_outgoing().slot_of(&r))
                        != Some(Slot::BundledIn(b))
                    {
                        return fail(format!("{:?} not recorded in {:?} at its tail", r, b));
                    }
                    ArcRef::Bundle(b)
                }
                None => r,
            };
            let live = tail.outgoing().index_of(&holder).is_some() && head.incoming().index_of(&holder).is_some();
            let shadow = tail.deactivated_outgoing().index_of(&holder).is_some()
                && head.deactivated_incoming().index_of(&holder).is_some();
            if !(live || shadow) {
                return fail(format!("{:?} is not attached at both endpoints", holder));
            }
        }
        for (raw, generation, e) in self.bundles.iter_live() {
            let b = BundleId::with_generation(raw, generation);
            if e.members.is_empty() {
                return fail(format!("{:?} is empty", b));
            }
            for m in e.members.iter() {
                if self.bundle_of(*m) != Some(b) {
                    return fail(format!("{:?} in {:?} does not point back", m, b));
                }
            }
        }
        Ok(())
    }
}

impl GrowableGraph for DiGraph {
    fn new() -> Self {
        Self::default()
    }

    /// Recycles a pooled vertex if there is one, and appends it to the
    /// active sequence.
    fn add_vertex(&mut self) -> VertexId {
        let index = self.live.len();
        let check = self.config.check_consistency;
        let (raw, generation, how) = self.vertices.acquire(|| VertexAdjacency::new(index, check));
        let v = VertexId::with_generation(raw, generation);
        if let Some(adj) = self.vertices.get_mut(raw, generation) {
            adj.set_index(index);
            adj.set_active(true);
            adj.enable_consistency_check(check);
        }
        self.live.push(v);
        let recycled = how == Acquired::Recycled;
        trace!(vertex = raw, index, recycled, "add vertex");
        self.greet_vertex(v);
        v
    }

    fn add_arc(&mut self, tail: VertexId, head: VertexId) -> Result<ArcId> {
        self.vertex(tail)?;
        self.vertex(head)?;
        let a = self.acquire_arc(tail, head);
        let arc = Arc {
            id: a.into(),
            tail,
            head,
        };
        if let Err(e) = self.attach(&arc, &[]) {
            self.arcs.release(a.to_raw());
            return Err(e);
        }
        self.num_arcs += 1;
        self.greet_arc(&arc);
        Ok(a)
    }
}

impl ArcShrinkableGraph for DiGraph {
    fn remove_arc(&mut self, arc: &ArcRef) -> Result<Arc> {
        let found = self.resolve(*arc)?;
        match *arc {
            ArcRef::Simple(a) => {
                self.detach(&found, &[])?;
                if let Some(b) = self.bundle_of(a) {
                    self.leave_bundle(a, b)?;
                }
                self.release_arc(a);
                self.dismiss_arc(&found);
            }
            ArcRef::Bundle(b) => {
                let members = self.members_of(*arc);
                self.detach(&found, &members)?;
                self.release_bundle(b);
                for m in members {
                    self.release_arc(m);
                    self.dismiss_arc(&Arc {
                        id: m.into(),
                        tail: found.tail,
                        head: found.head,
                    });
                }
            }
        }
        Ok(found)
    }
}

impl VertexShrinkableGraph for DiGraph {
    /// Detaches every incident arc from its other endpoint and pools it,
    /// then swap-removes the vertex from its sequence and pools it.
    fn remove_vertex(&mut self, vertex: &VertexId) -> Result<Vec<Arc>> {
        let v = *vertex;
        let adj = self.vertex(v)?;
        let mut entries: Vec<ArcRef> = adj
            .outgoing()
            .iter()
            .chain(adj.deactivated_outgoing().iter())
            .chain(adj.incoming().iter())
            .chain(adj.deactivated_incoming().iter())
            .collect();
        entries.sort_unstable();
        entries.dedup();

        let mut removed = Vec::with_capacity(entries.len());
        for r in entries {
            let arc = self.resolve(r)?;
            let members = self.members_of(r);
            self.detach(&arc, &members)?;
            let simple: Vec<ArcId> = match r {
                ArcRef::Simple(a) => vec![a],
                ArcRef::Bundle(b) => {
                    self.release_bundle(b);
                    members
                }
            };
            for a in simple {
                self.release_arc(a);
                let gone = Arc {
                    id: a.into(),
                    tail: arc.tail,
                    head: arc.head,
                };
                self.dismiss_arc(&gone);
                removed.push(gone);
            }
        }

        self.unlink_vertex(v)?;
        self.vertices.release(v.to_raw());
        trace!(vertex = v.to_raw(), arcs = removed.len(), "remove vertex");
        self.dismiss_vertex(v);
        Ok(removed)
    }
}

impl QueryableGraph for DiGraph {
    fn vertex_size(&self) -> usize {
        self.live.len()
    }

    fn iter_vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.live.iter().copied())
    }

    fn contains_vertex(&self, v: &VertexId) -> bool {
        self.is_active(*v)
    }

    fn any_vertex(&self) -> Option<VertexId> {
        self.live.first().copied()
    }

    /// Number of active adjacency entries, a bundle counting once, so that
    /// it always matches `iter_arcs()`. See [DiGraph::num_arcs] for owned arcs.
    fn arc_size(&self) -> usize {
        self.num_active_arcs(true)
    }

    fn iter_arcs(&self) -> Box<dyn Iterator<Item = Arc> + '_> {
        let it = self
            .live
            .iter()
            .flat_map(move |v| self.out_arcs(v));
        Box::new(it)
    }

    /// Whether the arc is active. A bundled arc is contained iff its bundle is.
    fn contains_arc(&self, a: &ArcRef) -> bool {
        match self.arc(*a) {
            Some(arc) => self
                .adjacency(arc.tail)
                .map_or(false, |adj| adj.has_outgoing(a)),
            None => false,
        }
    }

    /// Scans the out-arcs of `tail`. Parallel arcs make a keyed lookup
    /// ambiguous, so there is none.
    fn find_arc(&self, tail: &VertexId, head: &VertexId) -> Option<Arc> {
        self.out_arcs(tail).find(|a| a.head == *head)
    }

    fn in_arcs(&self, v: &VertexId) -> Box<dyn Iterator<Item = Arc> + '_> {
        match self.adjacency(*v) {
            Some(adj) => Box::new(adj.incoming().iter().filter_map(move |r| self.arc(r))),
            None => Box::new(std::iter::empty()),
        }
    }

    fn out_arcs(&self, v: &VertexId) -> Box<dyn Iterator<Item = Arc> + '_> {
        match self.adjacency(*v) {
            Some(adj) => Box::new(adj.outgoing().iter().filter_map(move |r| self.arc(r))),
            None => Box::new(std::iter::empty()),
        }
    }

    fn map_outgoing_arcs_until(
        &self,
        v: &VertexId,
        visit: &mut dyn FnMut(&Arc),
        stop: &mut dyn FnMut(&Arc) -> bool,
    ) -> bool {
        self.map_list_until(self.adjacency(*v).map(|adj| adj.outgoing()), visit, stop)
    }

    fn map_incoming_arcs_until(
        &self,
        v: &VertexId,
        visit: &mut dyn FnMut(&Arc),
        stop: &mut dyn FnMut(&Arc) -> bool,
    ) -> bool {
        self.map_list_until(self.adjacency(*v).map(|adj| adj.incoming()), visit, stop)
    }
}

#[cfg(test)]
pub use self::tests::*;

#[cfg(test)]
mod properties;
