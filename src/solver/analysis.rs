//! Branch-current solve for one connected graph.

use std::collections::{HashMap, VecDeque};

use super::assembly::{assemble, incidence_matrix, Element};
use super::config::SolverConfig;
use super::lu::LuDecomposition;
use crate::error::{KirchhoffError, Result};
use crate::graph::{ArcId, Multigraph, Strategy, VertexId};
use crate::topology::{fundamental_loops, spanning_tree};

/// Solved values for one branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchSolution {
    pub arc: ArcId,
    /// Current from tail to head, in amperes.
    pub current: f64,
    /// Voltage drop from tail to head, in volts.
    pub voltage: f64,
}

/// Finite values copied out of an arc so closed pieces can be rebuilt as
/// standalone graphs.
#[derive(Debug, Clone, Copy)]
struct Lumped {
    resistance: f64,
    emf: f64,
}

impl Element for Lumped {
    fn resistance(&self) -> f64 {
        self.resistance
    }

    fn electromotive_force(&self) -> f64 {
        self.emf
    }
}

/// Solve every branch current of a connected graph.
///
/// Open branches carry no current and are left out of the system. The
/// remaining arcs split into closed pieces that are solved one by one. A
/// source-free branch reports `I·R` and a source reports its terminal voltage
/// `I·R - E`. An open branch reports the potential difference between its
/// ends when both lie in the same closed piece, and 0 otherwise.
///
/// Solutions are returned in arena order of the arcs.
pub fn solve_branches<V, A: Element>(
    graph: &Multigraph<V, A>,
    config: &SolverConfig,
) -> Result<Vec<BranchSolution>> {
    if graph.arc_count() < 1 {
        return Err(KirchhoffError::insufficient(format!(
            "at least one branch is required, graph has {} vertices and no branches",
            graph.vertex_count()
        )));
    }
    if !spanning_tree(graph)?.is_spanning() {
        return Err(KirchhoffError::singular(
            "graph is not connected; solve each connected component on its own",
        ));
    }

    let mut closed: Multigraph<(), Lumped> =
        Multigraph::with_capacity(graph.vertex_count(), graph.arc_count());
    for vertex in graph.vertex_ids() {
        closed.insert_vertex(vertex, ())?;
    }
    for arc in graph.arcs() {
        let element = arc.payload();
        if element.is_open() {
            continue;
        }
        let lumped = Lumped {
            resistance: element.resistance(),
            emf: element.electromotive_force(),
        };
        closed.insert_arc_with_id(arc.tail(), arc.head(), lumped, arc.id())?;
    }

    let pieces = closed.connected_components()?;
    let mut owner = HashMap::with_capacity(graph.vertex_count());
    for (index, piece) in pieces.iter().enumerate() {
        for &vertex in piece {
            owner.insert(vertex, index);
        }
    }

    let mut solved = HashMap::with_capacity(closed.arc_count());
    let mut potential = HashMap::with_capacity(graph.vertex_count());
    for (index, piece) in pieces.iter().enumerate() {
        let mut sub: Multigraph<(), Lumped> = Multigraph::new();
        for &vertex in piece {
            sub.insert_vertex(vertex, ())?;
        }
        for arc in closed.arcs() {
            if owner.get(&arc.tail()) == Some(&index) {
                sub.insert_arc_with_id(arc.tail(), arc.head(), *arc.payload(), arc.id())?;
            }
        }
        if sub.arc_count() > 0 {
            for solution in solve_closed(&sub, config)? {
                solved.insert(solution.arc, solution);
            }
        }
        if let Some(&root) = piece.first() {
            potential.extend(node_potentials(&sub, root, &solved)?);
        }
    }

    let mut solutions = Vec::with_capacity(graph.arc_count());
    for arc in graph.arcs() {
        let solution = match solved.get(&arc.id()) {
            Some(solution) => *solution,
            None => {
                let same_piece = owner.get(&arc.tail()) == owner.get(&arc.head());
                let voltage = match (potential.get(&arc.tail()), potential.get(&arc.head())) {
                    (Some(tail), Some(head)) if same_piece => tail - head,
                    _ => 0.0,
                };
                BranchSolution {
                    arc: arc.id(),
                    current: 0.0,
                    voltage,
                }
            }
        };
        solutions.push(solution);
    }

    if config.verify_kcl {
        check_kcl(graph, &solutions, config.kcl_tolerance)?;
    }
    Ok(solutions)
}

/// Loop analysis of one connected graph with no open arcs.
fn solve_closed(graph: &Multigraph<(), Lumped>, config: &SolverConfig) -> Result<Vec<BranchSolution>> {
    let partition = spanning_tree(graph)?;
    let loops = fundamental_loops(graph, &partition)?;
    tracing::debug!(
        vertices = graph.vertex_count(),
        branches = graph.arc_count(),
        loops = loops.len(),
        "assembling loop system"
    );

    let system = assemble(graph, &loops)?;
    let lu = LuDecomposition::factor(&system.matrix, config.pivot_tolerance)?;
    let x = lu.solve(&system.rhs)?;

    let mut solutions = Vec::with_capacity(system.columns.len());
    for (&arc_id, &current) in system.columns.iter().zip(&x) {
        let element = graph.arc(arc_id)?.payload();
        let drop = current * element.resistance;
        solutions.push(BranchSolution {
            arc: arc_id,
            current,
            voltage: if element.emf == 0.0 { drop } else { drop - element.emf },
        });
    }
    Ok(solutions)
}

/// Potential of every vertex reachable from `root`, taking `root` as 0 V and
/// walking solved branch voltages.
fn node_potentials(
    graph: &Multigraph<(), Lumped>,
    root: VertexId,
    solved: &HashMap<ArcId, BranchSolution>,
) -> Result<HashMap<VertexId, f64>> {
    let mut potential = HashMap::with_capacity(graph.vertex_count());
    potential.insert(root, 0.0);
    let mut queue = VecDeque::from([root]);
    while let Some(vertex) = queue.pop_front() {
        let here = potential[&vertex];
        for step in graph.adjacent(vertex, Strategy::Edge)? {
            if potential.contains_key(&step.vertex()) {
                continue;
            }
            let voltage = solved.get(&step.arc()).map_or(0.0, |s| s.voltage);
            // voltage is the drop from tail to head
            let there = if step.is_outgoing() {
                here - voltage
            } else {
                here + voltage
            };
            potential.insert(step.vertex(), there);
            queue.push_back(step.vertex());
        }
    }
    Ok(potential)
}

/// Check that the currents balance at every vertex, including the one whose
/// KCL row was dropped from the system.
pub fn check_kcl<V, A>(
    graph: &Multigraph<V, A>,
    solutions: &[BranchSolution],
    tolerance: f64,
) -> Result<()> {
    let incidence = incidence_matrix(graph)?;
    let currents: Vec<f64> = solutions.iter().map(|s| s.current).collect();
    let scale = currents.iter().fold(1.0f64, |m, i| m.max(i.abs()));
    let residuals = incidence.mul_vec(&currents);
    for (vertex, residual) in graph.vertex_ids().zip(residuals) {
        if residual.abs() > tolerance * scale {
            tracing::warn!(%vertex, residual, "current does not balance");
            return Err(KirchhoffError::singular(format!(
                "currents at {vertex} do not balance (residual {residual:.3e})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VertexId;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy)]
    struct Ohm(f64, f64);

    impl Element for Ohm {
        fn resistance(&self) -> f64 {
            self.0
        }
        fn electromotive_force(&self) -> f64 {
            self.1
        }
    }

    fn graph_from(n: usize, arcs: &[(usize, usize, Ohm)]) -> Multigraph<(), Ohm> {
        let mut graph = Multigraph::new();
        for i in 0..n {
            graph.insert_vertex(VertexId(i), ()).unwrap();
        }
        for &(t, h, e) in arcs {
            graph.insert_arc(VertexId(t), VertexId(h), e).unwrap();
        }
        graph
    }

    fn current(solutions: &[BranchSolution], arc: usize) -> f64 {
        solutions
            .iter()
            .find(|s| s.arc == ArcId(arc))
            .map(|s| s.current)
            .unwrap()
    }

    #[test]
    fn test_series_loop() {
        // 12 V source driving 2 + 4 ohms in series
        let graph = graph_from(
            3,
            &[(0, 1, Ohm(0.0, 12.0)), (1, 2, Ohm(2.0, 0.0)), (2, 0, Ohm(4.0, 0.0))],
        );
        let solutions = solve_branches(&graph, &SolverConfig::default()).unwrap();
        for s in &solutions {
            assert_relative_eq!(s.current, 2.0, epsilon = 1e-12);
        }
        assert_relative_eq!(solutions[1].voltage, 4.0, epsilon = 1e-12);
        assert_relative_eq!(solutions[2].voltage, 8.0, epsilon = 1e-12);
        assert_relative_eq!(solutions[0].voltage, -12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_resistors_split_current() {
        // 10 V across 5 ohm and 10 ohm in parallel
        let graph = graph_from(
            2,
            &[(0, 1, Ohm(0.0, 10.0)), (1, 0, Ohm(5.0, 0.0)), (1, 0, Ohm(10.0, 0.0))],
        );
        let config = SolverConfig::new().with_kcl_check(true);
        let solutions = solve_branches(&graph, &config).unwrap();
        assert_relative_eq!(current(&solutions, 0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(current(&solutions, 1), 2.0, epsilon = 1e-12);
        assert_relative_eq!(current(&solutions, 2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_battery_internal_resistance() {
        // 9 V cell with 1 ohm inside, 2 ohm load
        let graph = graph_from(2, &[(0, 1, Ohm(1.0, 9.0)), (1, 0, Ohm(2.0, 0.0))]);
        let solutions = solve_branches(&graph, &SolverConfig::default()).unwrap();
        assert_relative_eq!(solutions[0].current, 3.0, epsilon = 1e-12);
        // terminal voltage: 3 A * 1 ohm - 9 V
        assert_relative_eq!(solutions[0].voltage, -6.0, epsilon = 1e-12);
        assert_relative_eq!(solutions[1].voltage, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_branch_reads_voltage() {
        let graph = graph_from(
            2,
            &[
                (0, 1, Ohm(0.0, 5.0)),
                (1, 0, Ohm(5.0, 0.0)),
                (1, 0, Ohm(f64::INFINITY, 0.0)),
            ],
        );
        let solutions = solve_branches(&graph, &SolverConfig::default()).unwrap();
        assert_eq!(current(&solutions, 2), 0.0);
        assert_relative_eq!(solutions[2].voltage, 5.0, epsilon = 1e-12);
        assert_relative_eq!(current(&solutions, 1), 1.0, epsilon = 1e-12);
    }

    const OPEN: Ohm = Ohm(f64::INFINITY, 0.0);

    #[test]
    fn test_open_bridge_between_loops() {
        // two sources with their loads, joined only by an open branch
        let graph = graph_from(
            4,
            &[
                (0, 1, Ohm(0.0, 10.0)),
                (1, 0, Ohm(5.0, 0.0)),
                (2, 3, Ohm(0.0, 4.0)),
                (3, 2, Ohm(2.0, 0.0)),
                (1, 2, OPEN),
            ],
        );
        let config = SolverConfig::new().with_kcl_check(true);
        let solutions = solve_branches(&graph, &config).unwrap();
        assert_relative_eq!(current(&solutions, 1), 2.0, epsilon = 1e-12);
        assert_relative_eq!(current(&solutions, 3), 2.0, epsilon = 1e-12);
        assert_eq!(solutions[4].current, 0.0);
        assert_eq!(solutions[4].voltage, 0.0);
    }

    #[test]
    fn test_dangling_open_branch() {
        let graph = graph_from(3, &[(0, 1, Ohm(0.0, 10.0)), (1, 0, Ohm(5.0, 0.0)), (1, 2, OPEN)]);
        let solutions = solve_branches(&graph, &SolverConfig::default()).unwrap();
        assert_relative_eq!(current(&solutions, 0), 2.0, epsilon = 1e-12);
        assert_eq!(solutions[2].current, 0.0);
        assert_eq!(solutions[2].voltage, 0.0);
    }

    #[test]
    fn test_open_branches_in_series() {
        // nothing closes the source, so no current flows anywhere
        let graph = graph_from(3, &[(0, 1, Ohm(0.0, 10.0)), (1, 2, OPEN), (2, 0, OPEN)]);
        let solutions = solve_branches(&graph, &SolverConfig::default()).unwrap();
        assert_relative_eq!(solutions[0].current, 0.0, epsilon = 1e-12);
        assert_relative_eq!(solutions[0].voltage, -10.0, epsilon = 1e-12);
        for s in &solutions[1..] {
            assert_eq!(s.current, 0.0);
            assert_eq!(s.voltage, 0.0);
        }
    }

    #[test]
    fn test_open_branch_behind_resistor_reads_source() {
        // no current, so the resistor drops nothing and the open branch sees E
        let graph = graph_from(3, &[(0, 1, Ohm(0.0, 10.0)), (1, 2, Ohm(5.0, 0.0)), (2, 0, OPEN)]);
        let solutions = solve_branches(&graph, &SolverConfig::default()).unwrap();
        assert_relative_eq!(solutions[1].current, 0.0, epsilon = 1e-12);
        assert_relative_eq!(solutions[1].voltage, 0.0, epsilon = 1e-12);
        assert_relative_eq!(solutions[2].voltage, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_branches_is_insufficient() {
        let graph = graph_from(1, &[]);
        assert!(matches!(
            solve_branches(&graph, &SolverConfig::default()),
            Err(KirchhoffError::InsufficientTopology { .. })
        ));
    }

    #[test]
    fn test_disconnected_graph_is_singular() {
        let graph = graph_from(4, &[(0, 1, Ohm(1.0, 1.0)), (2, 3, Ohm(1.0, 1.0))]);
        assert!(matches!(
            solve_branches(&graph, &SolverConfig::default()),
            Err(KirchhoffError::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_shorted_source_is_singular() {
        // ideal source across an ideal wire: no finite solution
        let graph = graph_from(2, &[(0, 1, Ohm(0.0, 5.0)), (1, 0, Ohm(0.0, 0.0))]);
        assert!(matches!(
            solve_branches(&graph, &SolverConfig::default()),
            Err(KirchhoffError::SingularSystem { .. })
        ));
    }
}
