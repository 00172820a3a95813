use super::{ArcList, DiGraph, Slot};
use crate::{graph::*, Result};
use tracing::{debug, trace};

/// Whether `arc` owns a slot of `list`, as opposed to riding in a bundle.
fn owns_slot(list: &ArcList, arc: &ArcRef) -> bool {
    matches!(list.slot_of(arc), Some(Slot::SimpleAt(_)) | Some(Slot::MultiAt(_)))
}

impl DiGraph {
    /// Moves `v` into the deactivated sequence and every live incident arc
    /// into the shadow lists of both of its endpoints.
    ///
    /// Answers `false` if `v` is already deactivated.
    pub fn deactivate_vertex(&mut self, v: VertexId) -> Result<bool> {
        let adj = self.vertex(v)?;
        if !adj.is_active() {
            return Ok(false);
        }
        let outgoing: Vec<ArcRef> = adj.outgoing().iter().collect();
        for r in outgoing {
            let arc = self.resolve(r)?;
            let members = self.members_of(r);
            self.vertex_mut(v)?.deactivate_outgoing(r, &members);
            self.vertex_mut(arc.head)?.deactivate_incoming(r, &members);
        }
        let incoming: Vec<ArcRef> = self.vertex(v)?.incoming().iter().collect();
        for r in incoming {
            let arc = self.resolve(r)?;
            let members = self.members_of(r);
            self.vertex_mut(v)?.deactivate_incoming(r, &members);
            self.vertex_mut(arc.tail)?.deactivate_outgoing(r, &members);
        }
        self.unlink_vertex(v)?;
        self.link_vertex(v, false)?;
        trace!(vertex = v.to_raw(), "deactivate vertex");
        Ok(true)
    }

    /// Moves `v` back into the live sequence. With `activate_arcs`, each
    /// shadowed incident arc whose other endpoint is live is reactivated.
    ///
    /// Answers `false` if `v` is already active.
    pub fn activate_vertex(&mut self, v: VertexId, activate_arcs: bool) -> Result<bool> {
        if self.vertex(v)?.is_active() {
            return Ok(false);
        }
        self.unlink_vertex(v)?;
        self.link_vertex(v, true)?;
        if activate_arcs {
            let outgoing: Vec<ArcRef> = self.vertex(v)?.deactivated_outgoing().iter().collect();
            for r in outgoing {
                let arc = self.resolve(r)?;
                if self.is_active(arc.head) {
                    let members = self.members_of(r);
                    self.vertex_mut(v)?.activate_outgoing(r, &members);
                    self.vertex_mut(arc.head)?.activate_incoming(r, &members);
                }
            }
            let incoming: Vec<ArcRef> = self.vertex(v)?.deactivated_incoming().iter().collect();
            for r in incoming {
                let arc = self.resolve(r)?;
                if self.is_active(arc.tail) {
                    let members = self.members_of(r);
                    self.vertex_mut(v)?.activate_incoming(r, &members);
                    self.vertex_mut(arc.tail)?.activate_outgoing(r, &members);
                }
            }
        }
        trace!(vertex = v.to_raw(), activate_arcs, "activate vertex");
        Ok(true)
    }

    /// Reactivates every deactivated vertex and every shadowed arc.
    pub fn activate_all(&mut self) -> Result<()> {
        let vertices = self.deactivated.len();
        while let Some(v) = self.deactivated.last().copied() {
            self.activate_vertex(v, true)?;
        }
        let mut arcs = 0;
        for v in self.live.clone() {
            let shadowed: Vec<ArcRef> = self.vertex(v)?.deactivated_outgoing().iter().collect();
            for r in shadowed {
                if self.activate_arc(r)? {
                    arcs += 1;
                }
            }
        }
        debug!(vertices, arcs, "activated all");
        Ok(())
    }

    /// Moves a live arc or bundle into the shadow lists of both endpoints.
    ///
    /// Answers `false`, changing nothing, unless the arc owns a live slot at
    /// both ends. A bundled member never does: its bundle moves as a whole.
    pub fn deactivate_arc(&mut self, arc: ArcRef) -> Result<bool> {
        let a = self.resolve(arc)?;
        let live = owns_slot(self.vertex(a.tail)?.outgoing(), &arc)
            && owns_slot(self.vertex(a.head)?.incoming(), &arc);
        if !live {
            return Ok(false);
        }
        let members = self.members_of(arc);
        self.vertex_mut(a.tail)?.deactivate_outgoing(arc, &members);
        self.vertex_mut(a.head)?.deactivate_incoming(arc, &members);
        Ok(true)
    }

    /// Moves a shadowed arc or bundle back into the live lists.
    ///
    /// Answers `false`, changing nothing, unless both endpoints are live and
    /// the arc owns a shadow slot at both ends.
    pub fn activate_arc(&mut self, arc: ArcRef) -> Result<bool> {
        let a = self.resolve(arc)?;
        if !(self.is_active(a.tail) && self.is_active(a.head)) {
            return Ok(false);
        }
        let shadowed = owns_slot(self.vertex(a.tail)?.deactivated_outgoing(), &arc)
            && owns_slot(self.vertex(a.head)?.deactivated_incoming(), &arc);
        if !shadowed {
            return Ok(false);
        }
        let members = self.members_of(arc);
        self.vertex_mut(a.tail)?.activate_outgoing(arc, &members);
        self.vertex_mut(a.head)?.activate_incoming(arc, &members);
        Ok(true)
    }
}
