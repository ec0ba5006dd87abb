//! Assembly of the loop-analysis system.
//!
//! For a connected graph with V vertices and E arcs the unknowns are the E
//! branch currents. V-1 rows come from the reduced incidence matrix (KCL) and
//! E-V+1 rows from the loop matrix weighted by branch resistances (KVL):
//!
//! ```text
//! [ A   ]       [ 0   ]
//! [ B Z ] I  =  [ B U ]
//! ```
//!
//! Open branches (infinite resistance) carry no current and have no finite
//! column; callers solve them out before assembly.

use std::collections::HashMap;

use super::lu::DenseMatrix;
use crate::error::{KirchhoffError, Result};
use crate::graph::{ArcId, Multigraph};
use crate::topology::BasicLoop;

/// Electrical values an arc payload must expose to be solved.
pub trait Element {
    /// Branch resistance in ohms; `f64::INFINITY` for an open branch.
    fn resistance(&self) -> f64;

    /// Electromotive force in volts, acting from tail to head.
    fn electromotive_force(&self) -> f64;

    /// Whether the branch is an open circuit.
    fn is_open(&self) -> bool {
        self.resistance().is_infinite()
    }
}

/// The assembled square system and the arc behind each column.
#[derive(Debug, Clone)]
pub struct LoopSystem {
    pub matrix: DenseMatrix,
    pub rhs: Vec<f64>,
    /// Arc for each column, in arena order
    pub columns: Vec<ArcId>,
}

/// Map from arc id to column, in arena order.
fn column_index<V, A>(graph: &Multigraph<V, A>) -> (Vec<ArcId>, HashMap<ArcId, usize>) {
    let columns: Vec<ArcId> = graph.arc_ids().collect();
    let index = columns.iter().enumerate().map(|(c, &a)| (a, c)).collect();
    (columns, index)
}

/// Full vertex-arc incidence matrix: one row per vertex in arena order,
/// +1 where the vertex is the arc tail, -1 where it is the head.
pub fn incidence_matrix<V, A>(graph: &Multigraph<V, A>) -> Result<DenseMatrix> {
    let (_, column) = column_index(graph);
    let rows: HashMap<_, _> = graph
        .vertex_ids()
        .enumerate()
        .map(|(r, v)| (v, r))
        .collect();
    let mut matrix = DenseMatrix::zeros(graph.vertex_count(), graph.arc_count());
    for arc in graph.arcs() {
        let c = column[&arc.id()];
        let tail = rows
            .get(&arc.tail())
            .ok_or(KirchhoffError::UnknownVertex { id: arc.tail().0 })?;
        let head = rows
            .get(&arc.head())
            .ok_or(KirchhoffError::UnknownVertex { id: arc.head().0 })?;
        matrix.set(*tail, c, 1.0);
        matrix.set(*head, c, -1.0);
    }
    Ok(matrix)
}

/// Loop matrix: one row per fundamental loop, one column per arc in arena order.
pub fn loop_matrix<V, A>(graph: &Multigraph<V, A>, loops: &[BasicLoop]) -> DenseMatrix {
    let (columns, _) = column_index(graph);
    let mut matrix = DenseMatrix::zeros(loops.len(), columns.len());
    for basic in loops {
        for (c, &arc) in columns.iter().enumerate() {
            matrix.set(basic.index(), c, f64::from(basic.related_value(arc)));
        }
    }
    matrix
}

/// Assemble the square system for a connected graph and its fundamental loops.
///
/// Every arc must have a finite resistance.
pub fn assemble<V, A: Element>(graph: &Multigraph<V, A>, loops: &[BasicLoop]) -> Result<LoopSystem> {
    let vertices = graph.vertex_count();
    let arcs = graph.arc_count();
    if arcs < 1 {
        return Err(KirchhoffError::insufficient("at least one branch is required"));
    }
    if vertices - 1 + loops.len() != arcs {
        return Err(KirchhoffError::singular(format!(
            "{} KCL rows and {} loops do not cover {arcs} branches",
            vertices - 1,
            loops.len()
        )));
    }

    let (columns, _) = column_index(graph);
    let mut resistance = Vec::with_capacity(arcs);
    let mut emf = Vec::with_capacity(arcs);
    for arc in graph.arcs() {
        let element = arc.payload();
        if element.is_open() {
            return Err(KirchhoffError::singular(format!(
                "branch {} is open and has no current unknown",
                arc.id()
            )));
        }
        resistance.push(element.resistance());
        emf.push(element.electromotive_force());
    }

    let mut matrix = DenseMatrix::zeros(arcs, arcs);
    let mut rhs = vec![0.0; arcs];

    // KCL: incidence rows, last vertex dropped
    let incidence = incidence_matrix(graph)?;
    for r in 0..vertices - 1 {
        for c in 0..arcs {
            matrix.set(r, c, incidence.get(r, c));
        }
    }

    // KVL: B Z I = B U
    let b = loop_matrix(graph, loops);
    for l in 0..loops.len() {
        let row = vertices - 1 + l;
        for c in 0..arcs {
            let coefficient = b.get(l, c);
            if coefficient == 0.0 {
                continue;
            }
            matrix.set(row, c, coefficient * resistance[c]);
            rhs[row] += coefficient * emf[c];
        }
    }

    Ok(LoopSystem { matrix, rhs, columns })
}
