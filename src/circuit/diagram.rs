//! A connected circuit held in one graph.

use std::fmt;

use super::component::Branch;
use super::types::Junction;
use super::validate::validate_branch;
use crate::error::{KirchhoffError, Result};
use crate::graph::{ArcId, Multigraph, VertexId};
use crate::solver::{solve_branches, SolverConfig};

/// A circuit diagram: junctions joined by branches.
///
/// Junctions are created on demand when a branch names an endpoint that does
/// not exist yet. A diagram is solved as a whole, so it must be connected;
/// use [`Circuit`](super::Circuit) to solve a set of branches that may fall
/// apart into several pieces.
#[derive(Debug, Clone, Default)]
pub struct CircuitDiagram {
    graph: Multigraph<Junction, Branch>,
}

impl CircuitDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(junctions: usize, branches: usize) -> Self {
        Self {
            graph: Multigraph::with_capacity(junctions, branches),
        }
    }

    /// Add an unconnected junction.
    pub fn add_junction(&mut self, id: VertexId) -> Result<()> {
        self.graph.insert_vertex(id, Junction)
    }

    /// Add a branch under the lowest free branch id, creating missing
    /// endpoints.
    pub fn insert_branch(&mut self, tail: VertexId, head: VertexId, branch: Branch) -> Result<ArcId> {
        validate_branch(tail, head, &branch)?;
        self.ensure_junction(tail)?;
        self.ensure_junction(head)?;
        self.graph.insert_arc(tail, head, branch)
    }

    /// Add a branch under a caller-chosen id, creating missing endpoints.
    ///
    /// Nothing is added if the id is taken.
    pub fn insert_branch_with_id(
        &mut self,
        tail: VertexId,
        head: VertexId,
        branch: Branch,
        id: ArcId,
    ) -> Result<ArcId> {
        if self.graph.contains_arc(id) {
            return Err(KirchhoffError::DuplicateArc { id: id.0 });
        }
        validate_branch(tail, head, &branch)?;
        self.ensure_junction(tail)?;
        self.ensure_junction(head)?;
        self.graph.insert_arc_with_id(tail, head, branch, id)
    }

    /// Remove a branch. Its junctions stay in place.
    pub fn remove_branch(&mut self, tail: VertexId, head: VertexId, id: ArcId) -> Option<Branch> {
        self.graph.delete_arc(tail, head, id)
    }

    fn ensure_junction(&mut self, id: VertexId) -> Result<()> {
        if !self.graph.contains_vertex(id) {
            self.graph.insert_vertex(id, Junction)?;
        }
        Ok(())
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Multigraph<Junction, Branch> {
        &self.graph
    }

    pub fn branch(&self, id: ArcId) -> Result<&Branch> {
        Ok(self.graph.arc(id)?.payload())
    }

    /// Branches in storage order.
    pub fn branches(&self) -> impl Iterator<Item = (ArcId, &Branch)> + '_ {
        self.graph.arcs().map(|arc| (arc.id(), arc.payload()))
    }

    pub fn junction_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn branch_count(&self) -> usize {
        self.graph.arc_count()
    }

    /// Junction sets of the connected pieces of this diagram.
    pub fn connected_components(&self) -> Result<Vec<Vec<VertexId>>> {
        self.graph.connected_components()
    }

    /// Solve with the default configuration.
    pub fn solve(&mut self) -> Result<()> {
        self.solve_with(&SolverConfig::default())
    }

    /// Solve every branch current and voltage and store them on the branches.
    ///
    /// Branches are only updated when the whole solve succeeds.
    pub fn solve_with(&mut self, config: &SolverConfig) -> Result<()> {
        let solutions = solve_branches(&self.graph, config)?;
        for solution in solutions {
            let branch = self.graph.arc_payload_mut(solution.arc)?;
            branch.current = solution.current;
            branch.voltage = solution.voltage;
        }
        Ok(())
    }
}

impl fmt::Display for CircuitDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "circuit: {} junctions, {} branches",
            self.junction_count(),
            self.branch_count()
        )?;
        for arc in self.graph.arcs() {
            writeln!(f, "  {} {}->{}\t{}", arc.id(), arc.tail(), arc.head(), arc.payload())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(id: usize) -> VertexId {
        VertexId(id)
    }

    #[test]
    fn test_insert_creates_junctions() {
        let mut diagram = CircuitDiagram::new();
        let id = diagram.insert_branch(v(4), v(7), Branch::resistor(1.0)).unwrap();
        assert_eq!(id, ArcId(0));
        assert_eq!(diagram.junction_count(), 2);
        assert!(diagram.graph().contains_vertex(v(7)));
    }

    #[test]
    fn test_rejected_branch_leaves_diagram_untouched() {
        let mut diagram = CircuitDiagram::new();
        diagram
            .insert_branch_with_id(v(0), v(1), Branch::wire(), ArcId(3))
            .unwrap();

        let err = diagram
            .insert_branch_with_id(v(5), v(6), Branch::wire(), ArcId(3))
            .unwrap_err();
        assert_eq!(err, KirchhoffError::DuplicateArc { id: 3 });
        assert_eq!(diagram.junction_count(), 2);

        let err = diagram.insert_branch(v(9), v(9), Branch::wire()).unwrap_err();
        assert_eq!(err, KirchhoffError::SelfLoop { vertex: 9 });
        assert_eq!(diagram.junction_count(), 2);
        assert_eq!(diagram.branch_count(), 1);
    }

    #[test]
    fn test_isolated_junction_is_insufficient() {
        let mut diagram = CircuitDiagram::new();
        diagram.add_junction(v(0)).unwrap();
        assert!(matches!(
            diagram.solve(),
            Err(KirchhoffError::InsufficientTopology { .. })
        ));
    }

    #[test]
    fn test_solve_stores_results() {
        // 6 V cell across 3 ohm
        let mut diagram = CircuitDiagram::new();
        let cell = diagram.insert_branch(v(0), v(1), Branch::battery(6.0)).unwrap();
        let load = diagram.insert_branch(v(1), v(0), Branch::resistor(3.0)).unwrap();
        diagram.solve().unwrap();

        let load = diagram.branch(load).unwrap();
        assert_relative_eq!(load.current, 2.0, epsilon = 1e-12);
        assert_relative_eq!(load.voltage, 6.0, epsilon = 1e-12);
        let cell = diagram.branch(cell).unwrap();
        assert_relative_eq!(cell.current, 2.0, epsilon = 1e-12);
        assert_relative_eq!(cell.voltage, -6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_failed_solve_keeps_previous_values() {
        let mut diagram = CircuitDiagram::new();
        diagram.insert_branch(v(0), v(1), Branch::battery(6.0)).unwrap();
        diagram.insert_branch(v(1), v(0), Branch::resistor(3.0)).unwrap();
        diagram.insert_branch(v(2), v(3), Branch::resistor(3.0)).unwrap();
        assert!(diagram.solve().is_err());
        assert!(diagram.branches().all(|(_, b)| b.current == 0.0));
        assert_eq!(diagram.connected_components().unwrap().len(), 2);
    }

    #[test]
    fn test_display_lists_branches() {
        let mut diagram = CircuitDiagram::new();
        diagram.insert_branch(v(0), v(1), Branch::voltmeter()).unwrap();
        let text = diagram.to_string();
        assert!(text.starts_with("circuit: 2 junctions, 1 branches"));
        assert!(text.contains("#0 v0->v1\tvoltmeter"));
    }
}
