use crate::graph::*;

/// Dumps a [DiGraph] one vertex per line, followed by its outgoing arcs.
///
/// Live arcs print as `--a3--> v1` and bundles as `==b0[a1,a2]==> v1`.
/// Shadowed arcs and bundles print with `~~` instead. Deactivated vertices
/// are listed after the live ones.
pub struct GraphDebug<'a> {
    graph: &'a DiGraph,
    init_indent: usize,
    indent_step: usize,
}

impl<'a> GraphDebug<'a> {
    pub fn new(graph: &'a DiGraph) -> Self {
        Self {
            graph,
            init_indent: 0,
            indent_step: 2,
        }
    }

    pub fn indent(mut self, init: usize, step: usize) -> Self {
        self.init_indent = init;
        self.indent_step = step;
        self
    }

    fn display_indent(&self, f: &mut std::fmt::Formatter<'_>, level: usize) -> std::fmt::Result {
        let indention = self.init_indent + self.indent_step * level;
        write!(f, "{:indention$}", "")
    }

    fn display_arc(&self, f: &mut std::fmt::Formatter<'_>, arc: &Arc, shadowed: bool) -> std::fmt::Result {
        self.display_indent(f, 1)?;
        let line = if shadowed { "~~" } else { "--" };
        match arc.id {
            ArcRef::Simple(a) => writeln!(f, "{}a{}{}> v{}", line, a.to_raw(), line, arc.head.to_raw()),
            ArcRef::Bundle(b) => {
                let members: Vec<String> = self
                    .graph
                    .bundle_members(b)
                    .unwrap_or_default()
                    .iter()
                    .map(|m| format!("a{}", m.to_raw()))
                    .collect();
                let line = if shadowed { "~~" } else { "==" };
                writeln!(
                    f,
                    "{}b{}[{}]{}> v{}",
                    line,
                    b.to_raw(),
                    members.join(","),
                    line,
                    arc.head.to_raw()
                )
            }
        }
    }

    fn display_vertex(&self, f: &mut std::fmt::Formatter<'_>, v: VertexId) -> std::fmt::Result {
        self.display_indent(f, 0)?;
        write!(f, "v{}", v.to_raw())?;
        if !self.graph.is_active(v) {
            write!(f, " (deactivated)")?;
        }
        writeln!(f)?;
        let adj = match self.graph.adjacency(v) {
            Some(adj) => adj,
            None => return Ok(()),
        };
        for (list, shadowed) in [(adj.outgoing(), false), (adj.deactivated_outgoing(), true)] {
            for r in list.iter() {
                if let Some(arc) = self.graph.arc(r) {
                    self.display_arc(f, &arc, shadowed)?;
                }
            }
        }
        Ok(())
    }
}

impl<'a> std::fmt::Debug for GraphDebug<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for v in self.graph.iter_vertices() {
            self.display_vertex(f, v)?;
        }
        for v in self.graph.deactivated_vertices() {
            self.display_vertex(f, v)?;
        }
        Ok(())
    }
}
