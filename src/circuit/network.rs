//! Circuit orchestration across connected components.

use std::collections::HashMap;
use std::fmt;

use super::component::{Branch, ComponentSpec};
use super::diagram::CircuitDiagram;
use super::types::{BranchHandle, Junction};
use super::validate::validate_branch;
use crate::error::{KirchhoffError, Result};
use crate::graph::{ArcId, Multigraph, VertexId};
use crate::solver::SolverConfig;

/// A branch of a [`Circuit`] together with its endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBranch {
    pub tail: VertexId,
    pub head: VertexId,
    pub branch: Branch,
}

impl fmt::Display for CircuitBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}\t{}", self.tail, self.head, self.branch)
    }
}

/// A flat list of branches, solved one connected piece at a time.
///
/// Branches are added without building a graph. [`solve`](Self::solve)
/// splits them into connected components and solves each component as its
/// own [`CircuitDiagram`], so every isolated sub-network gets exactly one
/// linear solve.
///
/// # Example
///
/// ```
/// use kirchhoff_core::Circuit;
///
/// let mut circuit = Circuit::new();
/// circuit.add_battery(0, 1, 12.0);
/// let load = circuit.add_resistor(1, 0, 4.0);
/// circuit.solve().unwrap();
/// assert!((circuit.current(load).unwrap() - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    branches: Vec<CircuitBranch>,
    config: SolverConfig,
    next_junction: usize,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty circuit solved with the given configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// A junction id no branch uses yet.
    pub fn new_junction(&mut self) -> VertexId {
        let id = VertexId(self.next_junction);
        self.next_junction = self.next_junction.saturating_add(1);
        id
    }

    /// Add a branch from `tail` to `head`.
    ///
    /// Values are checked when the circuit is solved.
    pub fn add_branch(
        &mut self,
        tail: impl Into<VertexId>,
        head: impl Into<VertexId>,
        branch: Branch,
    ) -> BranchHandle {
        let (tail, head) = (tail.into(), head.into());
        let past = tail.0.max(head.0).saturating_add(1);
        self.next_junction = self.next_junction.max(past);
        self.branches.push(CircuitBranch { tail, head, branch });
        BranchHandle(self.branches.len() - 1)
    }

    /// Add a parsed component.
    pub fn add_spec(&mut self, spec: ComponentSpec) -> BranchHandle {
        self.add_branch(spec.tail, spec.head, spec.branch)
    }

    pub fn add_wire(&mut self, tail: impl Into<VertexId>, head: impl Into<VertexId>) -> BranchHandle {
        self.add_branch(tail, head, Branch::wire())
    }

    pub fn add_resistor(
        &mut self,
        tail: impl Into<VertexId>,
        head: impl Into<VertexId>,
        resistance: f64,
    ) -> BranchHandle {
        self.add_branch(tail, head, Branch::resistor(resistance))
    }

    /// Add an ideal cell whose positive terminal is `head`.
    pub fn add_battery(
        &mut self,
        tail: impl Into<VertexId>,
        head: impl Into<VertexId>,
        emf: f64,
    ) -> BranchHandle {
        self.add_branch(tail, head, Branch::battery(emf))
    }

    pub fn add_battery_with_resistance(
        &mut self,
        tail: impl Into<VertexId>,
        head: impl Into<VertexId>,
        emf: f64,
        internal_resistance: f64,
    ) -> BranchHandle {
        self.add_branch(
            tail,
            head,
            Branch::battery_with_resistance(emf, internal_resistance),
        )
    }

    pub fn add_ammeter(&mut self, tail: impl Into<VertexId>, head: impl Into<VertexId>) -> BranchHandle {
        self.add_branch(tail, head, Branch::ammeter())
    }

    pub fn add_voltmeter(&mut self, tail: impl Into<VertexId>, head: impl Into<VertexId>) -> BranchHandle {
        self.add_branch(tail, head, Branch::voltmeter())
    }

    pub fn branch(&self, handle: BranchHandle) -> Option<&CircuitBranch> {
        self.branches.get(handle.0)
    }

    /// Solved current through a branch, tail to head.
    pub fn current(&self, handle: BranchHandle) -> Option<f64> {
        self.branch(handle).map(|b| b.branch.current)
    }

    /// Solved voltage drop across a branch, tail to head.
    pub fn voltage(&self, handle: BranchHandle) -> Option<f64> {
        self.branch(handle).map(|b| b.branch.voltage)
    }

    pub fn branches(&self) -> &[CircuitBranch] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Branch indices grouped by connected component, in order of each
    /// component's first branch.
    pub fn components(&self) -> Result<Vec<Vec<BranchHandle>>> {
        let mut scratch: Multigraph<Junction, ()> =
            Multigraph::with_capacity(self.branches.len() + 1, self.branches.len());
        for b in &self.branches {
            validate_branch(b.tail, b.head, &b.branch)?;
            for vertex in [b.tail, b.head] {
                if !scratch.contains_vertex(vertex) {
                    scratch.insert_vertex(vertex, Junction)?;
                }
            }
            scratch.insert_arc(b.tail, b.head, ())?;
        }

        let mut owner = HashMap::with_capacity(scratch.vertex_count());
        for (index, vertices) in scratch.connected_components()?.into_iter().enumerate() {
            for vertex in vertices {
                owner.insert(vertex, index);
            }
        }

        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<BranchHandle>> = Vec::new();
        for (i, b) in self.branches.iter().enumerate() {
            let component = *owner
                .get(&b.tail)
                .ok_or(KirchhoffError::UnknownVertex { id: b.tail.0 })?;
            let group = *slots.entry(component).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(BranchHandle(i));
        }
        Ok(groups)
    }

    /// Solve every branch current and voltage.
    ///
    /// Each connected component is solved on its own. Results are written
    /// back only once every component has solved; on error no branch changes.
    pub fn solve(&mut self) -> Result<()> {
        let span = tracing::info_span!("circuit_solve", branches = self.branches.len());
        let _enter = span.enter();

        if self.branches.is_empty() {
            return Err(KirchhoffError::insufficient(
                "circuit has no components to solve",
            ));
        }

        let groups = self.components()?;
        tracing::debug!(components = groups.len(), "partitioned circuit");

        let mut solved = Vec::with_capacity(self.branches.len());
        for (index, group) in groups.iter().enumerate() {
            let span = tracing::info_span!("component_solve", component = index, branches = group.len());
            let _enter = span.enter();

            let diagram = self.solve_component(group).map_err(|err| {
                tracing::warn!(component = index, error = %err, "component solve failed");
                err
            })?;
            for &handle in group {
                let branch = diagram.branch(ArcId(handle.0))?;
                solved.push((handle, branch.current, branch.voltage));
            }
        }

        for (handle, current, voltage) in solved {
            let branch = &mut self.branches[handle.0].branch;
            branch.current = current;
            branch.voltage = voltage;
        }
        Ok(())
    }

    fn solve_component(&self, group: &[BranchHandle]) -> Result<CircuitDiagram> {
        let mut diagram = CircuitDiagram::with_capacity(group.len() + 1, group.len());
        for &handle in group {
            let b = &self.branches[handle.0];
            diagram.insert_branch_with_id(b.tail, b.head, b.branch.clone(), ArcId(handle.0))?;
        }
        diagram.solve_with(&self.config)?;
        Ok(diagram)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.branches.iter().enumerate() {
            writeln!(f, "{}\t{}", BranchHandle(i), b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_handles_are_dense() {
        let mut circuit = Circuit::new();
        assert_eq!(circuit.add_wire(0, 1), BranchHandle(0));
        assert_eq!(circuit.add_resistor(1, 2, 1.0), BranchHandle(1));
        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.branch(BranchHandle(1)).unwrap().head, VertexId(2));
        assert!(circuit.branch(BranchHandle(2)).is_none());
    }

    #[test]
    fn test_new_junction_skips_used_ids() {
        let mut circuit = Circuit::new();
        circuit.add_wire(0, 5);
        assert_eq!(circuit.new_junction(), VertexId(6));
        assert_eq!(circuit.new_junction(), VertexId(7));
    }

    #[test]
    fn test_empty_circuit_is_insufficient() {
        let mut circuit = Circuit::new();
        assert!(circuit.is_empty());
        assert!(matches!(
            circuit.solve(),
            Err(KirchhoffError::InsufficientTopology { .. })
        ));
    }

    #[test]
    fn test_components_group_by_connectivity() {
        let mut circuit = Circuit::new();
        circuit.add_battery(0, 1, 1.0);
        circuit.add_battery(10, 11, 1.0);
        circuit.add_resistor(1, 0, 1.0);
        circuit.add_resistor(11, 10, 1.0);
        let groups = circuit.components().unwrap();
        assert_eq!(
            groups,
            vec![
                vec![BranchHandle(0), BranchHandle(2)],
                vec![BranchHandle(1), BranchHandle(3)],
            ]
        );
    }

    #[test]
    fn test_invalid_branch_reported_before_solving() {
        let mut circuit = Circuit::new();
        circuit.add_battery(0, 1, 1.0);
        circuit.add_resistor(1, 0, -2.0);
        assert!(matches!(
            circuit.solve(),
            Err(KirchhoffError::InvalidComponent { .. })
        ));

        let mut circuit = Circuit::new();
        circuit.add_wire(3, 3);
        assert_eq!(circuit.solve(), Err(KirchhoffError::SelfLoop { vertex: 3 }));
    }

    #[test]
    fn test_failed_component_leaves_results_untouched() {
        let mut circuit = Circuit::new();
        let load = circuit.add_resistor(1, 0, 2.0);
        circuit.add_battery(0, 1, 4.0);
        // shorted ideal cell in a separate piece
        circuit.add_battery(5, 6, 1.0);
        circuit.add_wire(6, 5);
        assert!(matches!(
            circuit.solve(),
            Err(KirchhoffError::SingularSystem { .. })
        ));
        assert_eq!(circuit.current(load), Some(0.0));
    }

    #[test]
    fn test_battery_voltage_after_solve() {
        let mut circuit = Circuit::new();
        let cell = circuit.add_battery_with_resistance(0, 1, 9.0, 1.0);
        assert_eq!(circuit.voltage(cell), Some(-9.0));
        circuit.add_resistor(1, 0, 2.0);
        circuit.solve().unwrap();
        assert_relative_eq!(circuit.current(cell).unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(circuit.voltage(cell).unwrap(), -6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parsed_specs() {
        let mut circuit = Circuit::with_config(SolverConfig::new().with_kcl_check(true));
        for spec in ["E:0:1:10", "R:1:0:5", "R:1:0:5"] {
            circuit.add_spec(spec.parse().unwrap());
        }
        circuit.solve().unwrap();
        assert_relative_eq!(circuit.current(BranchHandle(0)).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(circuit.current(BranchHandle(1)).unwrap(), 2.0, epsilon = 1e-12);
        assert!(circuit.to_string().starts_with("B0\tv0->v1\tbattery"));
    }
}
