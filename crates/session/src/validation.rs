//! Object diagnostics.
//!
//! `ObjectValidator` looks for shapes the importer accepts but that render
//! oddly: single-vertex faces (degenerate edges) and vertices no face uses.

use shared::Object3D;

/// Diagnostics over an imported wireframe object.
pub struct ObjectValidator<'a> {
    object: &'a Object3D,
}

impl<'a> ObjectValidator<'a> {
    /// Create a new validator for the given object.
    pub fn new(object: &'a Object3D) -> Self {
        Self { object }
    }

    pub fn vertex_count(&self) -> usize {
        self.object.vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.object.edge_count()
    }

    /// Number of edges whose endpoints coincide (single-vertex faces).
    pub fn degenerate_edge_count(&self) -> usize {
        self.object.edges.iter().filter(|[a, b]| a == b).count()
    }

    /// Number of vertices no edge references.
    pub fn unused_vertex_count(&self) -> usize {
        let mut used = vec![false; self.vertex_count()];
        for &[a, b] in &self.object.edges {
            for i in [a, b] {
                if let Some(slot) = used.get_mut(i) {
                    *slot = true;
                }
            }
        }
        used.iter().filter(|u| !**u).count()
    }

    /// Human-readable warnings (empty = nothing suspicious).
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let degenerate = self.degenerate_edge_count();
        if degenerate > 0 {
            warnings.push(format!("{degenerate} degenerate edge(s) from single-vertex faces"));
        }
        let unused = self.unused_vertex_count();
        if unused > 0 {
            warnings.push(format!("{unused} vertex(es) not referenced by any face"));
        }

        warnings
    }
}
