use super::tests::*;
use crate::graph::*;
use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableDiGraph},
    visit::EdgeRef,
    Direction::{Incoming, Outgoing},
};
use quickcheck_macros::*;
use std::{
    collections::{BTreeMap, BTreeSet},
    num::NonZeroUsize,
};

/// Replays [Ops] on a [DiGraph] and on a petgraph oracle side by side.
///
/// An arc counts as active iff both endpoints are active and it is not in
/// `shadowed`, which holds arcs parked by `deactivate_arc` or left behind by
/// `activate_vertex(_, false)`.
struct Replay {
    graph: DiGraph,
    oracle: StableDiGraph<usize, usize>,
    vertices: BTreeMap<usize, (VertexId, NodeIndex)>,
    arcs: BTreeMap<usize, (ArcId, EdgeIndex)>,
    deactivated: BTreeSet<usize>,
    shadowed: BTreeSet<usize>,
}

impl Replay {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            oracle: StableDiGraph::new(),
            vertices: BTreeMap::new(),
            arcs: BTreeMap::new(),
            deactivated: BTreeSet::new(),
            shadowed: BTreeSet::new(),
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::AddVertex(vid) => {
                let v = self.graph.add_vertex();
                let n = self.oracle.add_node(vid);
                self.vertices.insert(vid, (v, n));
            }
            Op::RemoveVertex(vid) => {
                if let Some((v, n)) = self.vertices.remove(&vid) {
                    let gone = self.graph.remove_vertex(&v).unwrap();
                    let loops = self
                        .oracle
                        .edges_directed(n, Outgoing)
                        .filter(|e| e.target() == n)
                        .count();
                    let expected = self.oracle.edges_directed(n, Outgoing).count()
                        + self.oracle.edges_directed(n, Incoming).count()
                        - loops;
                    assert_eq!(gone.len(), expected);
                    self.oracle.remove_node(n);
                    self.forget_dangling_arcs();
                    self.deactivated.remove(&vid);
                }
            }
            Op::AddArc((tail, head, aid)) => {
                if let (Some((t, tn)), Some((h, hn))) =
                    (self.vertices.get(&tail).copied(), self.vertices.get(&head).copied())
                {
                    let a = self.graph.add_arc(t, h).unwrap();
                    let e = self.oracle.add_edge(tn, hn, aid);
                    self.arcs.insert(aid, (a, e));
                }
            }
            Op::AddMultiArc((tail, head, k, aid)) => {
                if let (Some((t, tn)), Some((h, hn))) =
                    (self.vertices.get(&tail).copied(), self.vertices.get(&head).copied())
                {
                    let b = self
                        .graph
                        .add_multi_arc(t, h, NonZeroUsize::new(k).unwrap())
                        .unwrap();
                    let members = self.graph.bundle_members(b).unwrap().to_vec();
                    assert_eq!(members.len(), k);
                    for (i, a) in members.into_iter().enumerate() {
                        assert_eq!(self.graph.bundle_of(a), Some(b));
                        let e = self.oracle.add_edge(tn, hn, aid + i);
                        self.arcs.insert(aid + i, (a, e));
                    }
                }
            }
            Op::RemoveArc(aid) => {
                if let Some((a, e)) = self.arcs.remove(&aid) {
                    let gone = self.graph.remove_arc(&a.into()).unwrap();
                    assert_eq!(gone.id, ArcRef::Simple(a));
                    self.oracle.remove_edge(e);
                    self.shadowed.remove(&aid);
                }
            }
            Op::DeactivateVertex(vid) => {
                if let Some((v, _)) = self.vertices.get(&vid) {
                    let changed = self.graph.deactivate_vertex(*v).unwrap();
                    assert_eq!(changed, self.deactivated.insert(vid));
                }
            }
            Op::ActivateVertex((vid, with_arcs)) => {
                if let Some((v, n)) = self.vertices.get(&vid).copied() {
                    let changed = self.graph.activate_vertex(v, with_arcs).unwrap();
                    assert_eq!(changed, self.deactivated.remove(&vid));
                    if changed {
                        for (aid, peer) in self.incident(n) {
                            if !with_arcs {
                                self.shadowed.insert(aid);
                            } else if self.is_active(peer) {
                                self.shadowed.remove(&aid);
                            }
                        }
                    }
                }
            }
            Op::DeactivateArc(aid) => {
                if let Some((a, _)) = self.arcs.get(&aid).copied() {
                    let expected = self.arc_active(aid) && self.graph.bundle_of(a).is_none();
                    let changed = self.graph.deactivate_arc(a.into()).unwrap();
                    assert_eq!(changed, expected);
                    if changed {
                        self.shadowed.insert(aid);
                    }
                }
            }
            Op::ActivateArc(aid) => {
                if let Some((a, e)) = self.arcs.get(&aid).copied() {
                    let (tn, hn) = self.oracle.edge_endpoints(e).unwrap();
                    let expected = self.is_active(tn)
                        && self.is_active(hn)
                        && self.shadowed.contains(&aid)
                        && self.graph.bundle_of(a).is_none();
                    let changed = self.graph.activate_arc(a.into()).unwrap();
                    assert_eq!(changed, expected);
                    if changed {
                        self.shadowed.remove(&aid);
                    }
                }
            }
            Op::Bundle => self.graph.bundle_parallel_arcs().unwrap(),
            Op::Unbundle => self.graph.unbundle_parallel_arcs().unwrap(),
            Op::Clear => {
                self.graph.clear(false, false).unwrap();
                self.oracle.clear();
                self.vertices.clear();
                self.arcs.clear();
                self.deactivated.clear();
                self.shadowed.clear();
            }
            Op::CopyFrom => {
                let mut copy = DiGraph::new();
                let mapping = copy.copy_from(&self.graph).unwrap();
                let inactive: Vec<usize> = self
                    .arcs
                    .keys()
                    .copied()
                    .filter(|aid| !self.arc_active(*aid))
                    .collect();
                for aid in inactive {
                    if let Some((_, e)) = self.arcs.remove(&aid) {
                        self.oracle.remove_edge(e);
                    }
                }
                for vid in std::mem::take(&mut self.deactivated) {
                    if let Some((_, n)) = self.vertices.remove(&vid) {
                        self.oracle.remove_node(n);
                    }
                }
                self.forget_dangling_arcs();
                self.shadowed.clear();
                assert_eq!(mapping.amap.len(), self.arcs.len());
                for (v, _) in self.vertices.values_mut() {
                    *v = mapping.copy_of_vertex(v).unwrap();
                }
                for (a, _) in self.arcs.values_mut() {
                    *a = mapping.copy_of_arc(a).unwrap();
                }
                self.graph = copy;
            }
        }
    }

    fn forget_dangling_arcs(&mut self) {
        let oracle = &self.oracle;
        self.arcs.retain(|_, (_, e)| oracle.edge_endpoints(*e).is_some());
        let arcs = &self.arcs;
        self.shadowed.retain(|aid| arcs.contains_key(aid));
    }

    /// Oracle ids of the arcs at `n`, each with its endpoint opposite `n`.
    fn incident(&self, n: NodeIndex) -> Vec<(usize, NodeIndex)> {
        self.oracle
            .edges_directed(n, Outgoing)
            .map(|e| (*e.weight(), e.target()))
            .chain(
                self.oracle
                    .edges_directed(n, Incoming)
                    .map(|e| (*e.weight(), e.source())),
            )
            .collect()
    }

    fn is_active(&self, n: NodeIndex) -> bool {
        self.oracle
            .node_weight(n)
            .map_or(false, |vid| !self.deactivated.contains(vid))
    }

    fn arc_active(&self, aid: usize) -> bool {
        match self.arcs.get(&aid).and_then(|(_, e)| self.oracle.edge_endpoints(*e)) {
            Some((tn, hn)) => {
                self.is_active(tn) && self.is_active(hn) && !self.shadowed.contains(&aid)
            }
            None => false,
        }
    }

    /// Checks the graph against the oracle.
    fn check(&self) {
        self.graph.validate().unwrap();
        assert_eq!(self.graph.num_arcs(), self.oracle.edge_count());
        assert_eq!(
            self.graph.size() + self.graph.deactivated_size(),
            self.oracle.node_count()
        );
        assert_eq!(self.graph.deactivated_size(), self.deactivated.len());
        assert_eq!(self.graph.arc_size(), self.graph.iter_arcs().count());
        let active = self.arcs.keys().filter(|aid| self.arc_active(**aid)).count();
        assert_eq!(self.graph.num_active_arcs(false), active);
        for (vid, (v, n)) in self.vertices.iter() {
            let is_active = !self.deactivated.contains(vid);
            assert_eq!(self.graph.contains_vertex(v), is_active);
            if !is_active {
                continue;
            }
            let out = self
                .oracle
                .edges_directed(*n, Outgoing)
                .filter(|e| self.arc_active(*e.weight()))
                .count();
            let inc = self
                .oracle
                .edges_directed(*n, Incoming)
                .filter(|e| self.arc_active(*e.weight()))
                .count();
            assert_eq!(self.graph.out_degree(*v, false).unwrap(), out);
            assert_eq!(self.graph.in_degree(*v, false).unwrap(), inc);
        }
        for (a, e) in self.arcs.values() {
            let (tn, hn) = self.oracle.edge_endpoints(*e).unwrap();
            let arc = self.graph.arc((*a).into()).unwrap();
            assert_eq!(Some(arc.tail), self.vertex_of(tn));
            assert_eq!(Some(arc.head), self.vertex_of(hn));
        }
    }

    fn vertex_of(&self, n: NodeIndex) -> Option<VertexId> {
        let vid = self.oracle.node_weight(n)?;
        self.vertices.get(vid).map(|(v, _)| *v)
    }
}

fn replay(ops: &Ops) -> Replay {
    let mut r = Replay::new();
    for op in ops.iter() {
        r.apply(op);
        r.check();
    }
    r
}

#[quickcheck]
fn agrees_with_oracle(ops: Ops) {
    replay(&ops);
}

#[quickcheck]
fn bundling_round_trip(ops: Ops) {
    let mut r = replay(&ops);
    r.graph.unbundle_parallel_arcs().unwrap();
    let before: BTreeSet<_> = r.graph.iter_arcs().map(|a| (a.id, a.tail, a.head)).collect();
    r.graph.bundle_parallel_arcs().unwrap();
    r.check();
    r.graph.unbundle_parallel_arcs().unwrap();
    let after: BTreeSet<_> = r.graph.iter_arcs().map(|a| (a.id, a.tail, a.head)).collect();
    assert_eq!(before, after);
}

#[quickcheck]
fn deactivation_round_trip(ops: Ops) {
    let mut r = replay(&ops);
    r.graph.activate_all().unwrap();
    r.deactivated.clear();
    r.shadowed.clear();
    let snapshot = |g: &DiGraph| -> Vec<(VertexId, BTreeSet<Arc>, BTreeSet<Arc>)> {
        g.iter_vertices()
            .map(|v| {
                (
                    v,
                    g.out_arcs(&v).collect::<BTreeSet<_>>(),
                    g.in_arcs(&v).collect::<BTreeSet<_>>(),
                )
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };
    let before = snapshot(&r.graph);
    for v in r.graph.iter_vertices().collect::<Vec<_>>() {
        r.graph.deactivate_vertex(v).unwrap();
        r.graph.activate_vertex(v, true).unwrap();
        assert_eq!(snapshot(&r.graph), before);
    }
    r.check();
}

#[quickcheck]
fn clear_fills_pools(ops: Ops) {
    let mut r = replay(&ops);
    let (vertices, arcs) = (
        r.graph.size() + r.graph.deactivated_size(),
        r.graph.num_arcs(),
    );
    let (vertex_reserve, arc_reserve) = (r.graph.vertex_reserve(), r.graph.arc_reserve());
    r.graph.clear(false, false).unwrap();
    assert_eq!(r.graph.vertex_reserve(), vertex_reserve + vertices);
    assert_eq!(r.graph.arc_reserve(), arc_reserve + arcs);
    assert!(r.graph.is_empty());
    r.graph.validate().unwrap();

    let v = r.graph.add_vertex();
    if vertices + vertex_reserve > 0 {
        assert!(v.generation() > 0);
    }
}

#[quickcheck]
fn find_arc_agrees_with_oracle(ops: Ops) {
    let mut r = replay(&ops);
    r.graph.activate_all().unwrap();
    r.deactivated.clear();
    r.shadowed.clear();
    r.graph.unbundle_parallel_arcs().unwrap();
    for (t, tn) in r.vertices.values() {
        for (h, hn) in r.vertices.values() {
            let found = r.graph.find_arc(t, h);
            match r.oracle.find_edge(*tn, *hn) {
                None => assert!(found.is_none()),
                Some(_) => {
                    let found = found.unwrap();
                    assert_eq!((found.tail, found.head), (*t, *h));
                }
            }
        }
    }
}

#[quickcheck]
fn copy_from_maps_every_arc(ops: Ops) {
    let r = replay(&ops);
    let mut copy = DiGraph::new();
    let mapping = copy.copy_from(&r.graph).unwrap();
    copy.validate().unwrap();
    assert_eq!(copy.size(), r.graph.size());
    assert_eq!(copy.num_arcs(), r.graph.num_active_arcs(false));
    for (a, c) in mapping.amap.iter() {
        let original = r.graph.arc((*a).into()).unwrap();
        let copied = copy.arc((*c).into()).unwrap();
        assert_eq!(mapping.copy_of_vertex(&original.tail), Some(copied.tail));
        assert_eq!(mapping.copy_of_vertex(&original.head), Some(copied.head));
    }
}

#[test]
fn dense_indices_after_removal() {
    let mut g = DiGraph::new();
    let vs: Vec<_> = (0..5).map(|_| g.add_vertex()).collect();
    g.remove_vertex(&vs[1]).unwrap();
    assert_eq!(g.vertex_at(1).unwrap(), vs[4]);
    assert_eq!(g.adjacency(vs[4]).unwrap().index(), 1);
    assert!(g.vertex_at(4).is_err());
    g.validate().unwrap();

    let recycled = g.add_vertex();
    assert_eq!(recycled.to_raw(), vs[1].to_raw());
    assert_ne!(recycled, vs[1]);
    assert!(g.remove_vertex(&vs[1]).is_err());
}

#[test]
fn restore_order_reissues_ascending_ids() {
    let mut g = DiGraph::new();
    for _ in 0..4 {
        g.add_vertex();
    }
    let first = g.vertex_at(0).unwrap();
    g.remove_vertex(&first).unwrap();
    g.clear(false, true).unwrap();
    let raws: Vec<_> = (0..4).map(|_| g.add_vertex().to_raw()).collect();
    assert_eq!(raws, vec![0, 1, 2, 3]);

    g.clear(true, false).unwrap();
    assert_eq!(g.vertex_reserve(), 0);
    let raws: Vec<_> = (0..2).map(|_| g.add_vertex().to_raw()).collect();
    assert_eq!(raws, vec![0, 1]);
}

#[test]
fn observers_see_mutations() {
    use std::{cell::RefCell, rc::Rc};

    let log = Rc::new(RefCell::new(vec![]));
    let mut g = DiGraph::new();
    {
        let log = log.clone();
        g.on_vertex_add(move |v| log.borrow_mut().push(format!("+v{}", v.to_raw())));
    }
    {
        let log = log.clone();
        g.on_vertex_remove(move |v| log.borrow_mut().push(format!("-v{}", v.to_raw())));
    }
    {
        let log = log.clone();
        g.on_arc_add(move |a| log.borrow_mut().push(format!("+{:?}", a.id)));
    }
    {
        let log = log.clone();
        g.on_arc_remove(move |a| log.borrow_mut().push(format!("-{:?}", a.id)));
    }
    let v0 = g.add_vertex();
    let v1 = g.add_vertex();
    let a = g.add_arc(v0, v1).unwrap();
    g.remove_vertex(&v1).unwrap();
    let expected = vec![
        "+v0".to_owned(),
        "+v1".to_owned(),
        format!("+{:?}", ArcRef::from(a)),
        format!("-{:?}", ArcRef::from(a)),
        "-v1".to_owned(),
    ];
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn strict_mode_rejects_stale_and_foreign_handles() {
    let mut g = DiGraph::new();
    let v0 = g.add_vertex();
    let v1 = g.add_vertex();
    let a = g.add_arc(v0, v1).unwrap();
    g.remove_arc(&a.into()).unwrap();
    assert_eq!(
        g.remove_arc(&a.into()).unwrap_err(),
        crate::Error::UnknownArc(a.into())
    );
    g.remove_vertex(&v1).unwrap();
    assert_eq!(
        g.add_arc(v0, v1).unwrap_err(),
        crate::Error::UnknownVertex(v1)
    );
    assert!(matches!(
        g.outgoing_arc_at(v0, 0, false),
        Err(crate::Error::IndexOutOfRange { index: 0, len: 0 })
    ));
}

#[test]
fn reserved_capacity_is_recycled() {
    let mut g = DiGraph::new();
    g.reserve_vertex_capacity(3);
    g.reserve_arc_capacity(4);
    assert_eq!((g.vertex_reserve(), g.arc_reserve()), (3, 4));
    assert!(g.is_empty());

    let vs: Vec<_> = (0..3).map(|_| g.add_vertex()).collect();
    assert!(vs.iter().all(|v| v.generation() > 0));
    assert_eq!(g.vertex_reserve(), 0);
    let a = g.add_arc(vs[0], vs[1]).unwrap();
    let b = g.add_multi_arc(vs[1], vs[2], NonZeroUsize::new(3).unwrap()).unwrap();
    assert!(a.generation() > 0);
    assert!(g.bundle_members(b).unwrap().iter().all(|m| m.generation() > 0));
    assert_eq!(g.arc_reserve(), 0);

    assert_eq!(g.add_vertex().generation(), 0);
    assert_eq!(g.add_arc(vs[2], vs[0]).unwrap().generation(), 0);
    g.validate().unwrap();
}

#[test]
fn activating_a_vertex_alone_leaves_its_arcs_shadowed() {
    let mut g = DiGraph::new();
    let vs: Vec<_> = (0..3).map(|_| g.add_vertex()).collect();
    let a = g.add_arc(vs[0], vs[1]).unwrap();
    let b = g.add_arc(vs[1], vs[2]).unwrap();
    g.deactivate_vertex(vs[1]).unwrap();
    assert!(g.activate_vertex(vs[1], false).unwrap());
    assert!(g.is_active(vs[1]));
    assert!(!g.contains_arc(&a.into()));
    assert!(!g.contains_arc(&b.into()));
    assert_eq!(g.out_degree(vs[1], false).unwrap(), 0);
    assert_eq!(g.arc_size(), 0);
    g.validate().unwrap();

    assert!(g.activate_arc(a.into()).unwrap());
    assert!(g.contains_arc(&a.into()));
    assert!(!g.contains_arc(&b.into()));
    g.activate_all().unwrap();
    assert!(g.contains_arc(&b.into()));
    assert_eq!(g.arc_size(), 2);
    g.validate().unwrap();
}

#[test]
fn map_until_stops_before_the_stopping_element() {
    let mut g = DiGraph::new();
    let vs: Vec<_> = (0..4).map(|_| g.add_vertex()).collect();
    let arcs: Vec<_> = vs
        .windows(2)
        .map(|w| g.add_arc(w[0], w[1]).unwrap())
        .collect();

    let mut seen = vec![];
    assert!(!g.map_vertices_until(|v| seen.push(v), |v| v == vs[2]));
    assert_eq!(seen, vs[..2].to_vec());
    let mut seen = vec![];
    assert!(g.map_vertices_until(|v| seen.push(v), |_| false));
    assert_eq!(seen, vs);

    let mut seen = vec![];
    assert!(!g.map_arcs_until(|a| seen.push(a.id), |a| a.id == ArcRef::from(arcs[1])));
    assert_eq!(seen, vec![ArcRef::from(arcs[0])]);
    let mut count = 0;
    assert!(g.map_arcs_until(|_| count += 1, |_| false));
    assert_eq!(count, 3);

    g.deactivate_vertex(vs[1]).unwrap();
    let mut seen = vec![];
    assert!(g.map_deactivated_outgoing_arcs_until(vs[1], |a| seen.push(a.id), |_| false));
    assert_eq!(seen, vec![ArcRef::from(arcs[1])]);
    let mut seen = vec![];
    assert!(g.map_deactivated_incoming_arcs_until(vs[1], |a| seen.push(a.id), |_| false));
    assert_eq!(seen, vec![ArcRef::from(arcs[0])]);
    let mut seen = vec![];
    assert!(!g.map_deactivated_incoming_arcs_until(vs[1], |a| seen.push(a.id), |_| true));
    assert!(seen.is_empty());
    assert!(!g.map_deactivated_outgoing_arcs_until(vs[0], |a| seen.push(a.id), |_| true));
    assert!(g.map_deactivated_outgoing_arcs_until(vs[3], |a| seen.push(a.id), |_| true));
    assert!(seen.is_empty());
}

#[test]
fn consistency_check_reaches_every_vertex() {
    let mut g = DiGraph::new();
    let vs: Vec<_> = (0..3).map(|_| g.add_vertex()).collect();
    g.deactivate_vertex(vs[2]).unwrap();
    g.reserve_vertex_capacity(1);
    g.enable_consistency_check(false);
    assert!(!g.config().check_consistency);
    assert!(vs.iter().all(|v| !g.adjacency(*v).unwrap().checks_consistency()));
    let recycled = g.add_vertex();
    assert!(!g.adjacency(recycled).unwrap().checks_consistency());

    g.enable_consistency_check(true);
    assert!(vs
        .iter()
        .chain([recycled].iter())
        .all(|v| g.adjacency(*v).unwrap().checks_consistency()));
}

#[test]
fn clear_reports_arcs_then_vertices() {
    use std::{cell::RefCell, rc::Rc};

    let log = Rc::new(RefCell::new(vec![]));
    let mut g = DiGraph::new();
    let v0 = g.add_vertex();
    let v1 = g.add_vertex();
    g.add_arc(v1, v0).unwrap();
    g.add_multi_arc(v0, v1, NonZeroUsize::new(2).unwrap()).unwrap();
    g.deactivate_vertex(v1).unwrap();
    {
        let log = log.clone();
        g.on_vertex_remove(move |v| log.borrow_mut().push(format!("v{}", v.to_raw())));
    }
    {
        let log = log.clone();
        g.on_arc_remove(move |a| log.borrow_mut().push(format!("{:?}", a.id)));
    }
    g.clear(false, false).unwrap();
    let log = log.borrow();
    assert_eq!(log.len(), 5);
    assert!(log[..3].iter().all(|e| e.starts_with("Simple")));
    assert_eq!(log[3..].iter().cloned().collect::<BTreeSet<_>>().len(), 2);
    assert!(log[3..].iter().all(|e| e.starts_with('v')));
}

#[test]
fn arc_size_counts_what_iter_arcs_yields() {
    let mut g = DiGraph::new();
    let v0 = g.add_vertex();
    let v1 = g.add_vertex();
    for _ in 0..3 {
        g.add_arc(v0, v1).unwrap();
    }
    let lone = g.add_arc(v1, v0).unwrap();
    g.bundle_parallel_arcs().unwrap();
    assert_eq!(g.num_arcs(), 4);
    assert_eq!(g.arc_size(), 2);
    assert_eq!(g.iter_arcs().count(), 2);
    g.deactivate_arc(lone.into()).unwrap();
    assert_eq!(g.arc_size(), 1);
    assert_eq!(g.iter_arcs().count(), 1);
    assert_eq!(g.num_active_arcs(false), 3);
}
