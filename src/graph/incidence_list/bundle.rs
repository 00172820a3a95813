use super::DiGraph;
use crate::{graph::*, Result};
use std::collections::HashMap;
use tracing::debug;

impl DiGraph {
    /// Folds every group of parallel live arcs into a single bundle.
    ///
    /// Outgoing simple arcs of each live vertex are grouped by head in
    /// order of first appearance. Groups of two or more become bundles;
    /// single arcs stay simple. Incoming lists are rebuilt from scratch,
    /// so positions within them change. Existing bundles are dissolved and
    /// regrouped first. Shadowed arcs are left alone.
    pub fn bundle_parallel_arcs(&mut self) -> Result<()> {
        self.unbundle_parallel_arcs()?;
        let vertices = self.live.clone();
        for v in vertices.iter() {
            self.vertex_mut(*v)?.clear_incoming();
        }

        let (mut bundles, mut bundled) = (0, 0);
        for v in vertices {
            let simple = self.vertex(v)?.outgoing().simple_arcs().to_vec();
            self.vertex_mut(v)?.clear_outgoing();

            let mut heads = vec![];
            let mut groups: HashMap<VertexId, Vec<ArcId>, ahash::RandomState> = HashMap::default();
            for a in simple {
                let head = self.resolve(a.into())?.head;
                groups
                    .entry(head)
                    .or_insert_with(|| {
                        heads.push(head);
                        vec![]
                    })
                    .push(a);
            }

            for head in heads {
                let members = groups.remove(&head).unwrap_or_default();
                if let [a] = members.as_slice() {
                    let arc = Arc {
                        id: (*a).into(),
                        tail: v,
                        head,
                    };
                    self.attach(&arc, &[])?;
                    continue;
                }
                let b = self.acquire_bundle(v, head, &members);
                let arc = Arc {
                    id: b.into(),
                    tail: v,
                    head,
                };
                self.attach(&arc, &members)?;
                bundles += 1;
                bundled += members.len();
            }
        }
        debug!(bundles, bundled, "bundled parallel arcs");
        Ok(())
    }

    /// Dissolves every bundle, live or shadowed, back into simple arcs.
    ///
    /// Member arcs keep their ids. Arcs of a shadowed bundle stay shadowed.
    pub fn unbundle_parallel_arcs(&mut self) -> Result<()> {
        let vertices: Vec<VertexId> = self.live.iter().chain(self.deactivated.iter()).copied().collect();
        let (mut bundles, mut arcs) = (0, 0);
        for v in vertices {
            let adj = self.vertex(v)?;
            let live: Vec<BundleId> = adj.outgoing().bundles().collect();
            let shadowed: Vec<BundleId> = adj.deactivated_outgoing().bundles().collect();
            let found = live
                .into_iter()
                .map(|b| (b, false))
                .chain(shadowed.into_iter().map(|b| (b, true)));
            for (b, was_shadowed) in found {
                let shell = self.resolve(b.into())?;
                let members = self.members_of(b.into());
                self.detach(&shell, &members)?;
                for m in members.iter() {
                    if let Some(e) = self.arcs.get_mut(m.to_raw(), m.generation()) {
                        e.bundle = None;
                    }
                }
                self.release_bundle(b);
                for m in members.iter() {
                    let arc = Arc {
                        id: (*m).into(),
                        tail: shell.tail,
                        head: shell.head,
                    };
                    self.attach(&arc, &[])?;
                    if was_shadowed {
                        self.deactivate_arc(arc.id)?;
                    }
                }
                bundles += 1;
                arcs += members.len();
            }
        }
        debug!(bundles, arcs, "unbundled parallel arcs");
        Ok(())
    }
}
