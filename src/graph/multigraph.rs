//! Directed multigraph container.

use std::collections::HashMap;
use std::fmt;

use super::primitives::{ArcRecord, IdPool, VertexRecord};
use super::types::{ArcId, VertexId};
use crate::error::{KirchhoffError, Result};

/// A directed multigraph without self-loops.
///
/// Vertices and arcs are stored in arenas. A vertex keeps its arena slot for
/// as long as it lives, so per-vertex scratch state (visited flags, parent
/// pointers) can be kept in plain vectors indexed by slot. Removing a vertex
/// leaves a hole rather than shifting later vertices.
///
/// Parallel arcs between the same two vertices are allowed and are told
/// apart by [`ArcId`].
#[derive(Debug, Clone)]
pub struct Multigraph<V, A> {
    pub(crate) vertices: Vec<Option<VertexRecord<V>>>,
    pub(crate) arcs: Vec<Option<ArcRecord<A>>>,
    free_arc_slots: Vec<usize>,
    vertex_slots: HashMap<VertexId, usize>,
    arc_slots: HashMap<ArcId, usize>,
    vertex_ids: IdPool,
    arc_ids: IdPool,
}

impl<V, A> Default for Multigraph<V, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, A> Multigraph<V, A> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty graph with room for the given number of vertices and arcs.
    pub fn with_capacity(vertices: usize, arcs: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            arcs: Vec::with_capacity(arcs),
            free_arc_slots: Vec::new(),
            vertex_slots: HashMap::with_capacity(vertices),
            arc_slots: HashMap::with_capacity(arcs),
            vertex_ids: IdPool::monotonic(),
            arc_ids: IdPool::lowest_unused(),
        }
    }

    /// Number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_slots.len()
    }

    /// Number of live arcs.
    pub fn arc_count(&self) -> usize {
        self.arc_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_slots.is_empty()
    }

    /// Size of the vertex arena, including holes left by removed vertices.
    /// Scratch vectors indexed by slot must be at least this long.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Size of the arc arena, including free slots.
    pub fn arc_capacity(&self) -> usize {
        self.arcs.len()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex_slots.contains_key(&id)
    }

    pub fn contains_arc(&self, id: ArcId) -> bool {
        self.arc_slots.contains_key(&id)
    }

    // ============ Vertices ============

    /// Insert a vertex with a caller-chosen id.
    pub fn insert_vertex(&mut self, id: VertexId, payload: V) -> Result<()> {
        if self.vertex_slots.contains_key(&id) {
            return Err(KirchhoffError::DuplicateVertex { id: id.0 });
        }
        let slot = self.vertices.len();
        self.vertices.push(Some(VertexRecord::new(id, slot, payload)));
        self.vertex_slots.insert(id, slot);
        self.vertex_ids.claim(id.0);
        Ok(())
    }

    /// Insert a vertex under the next free id and return that id.
    pub fn add_vertex(&mut self, payload: V) -> Result<VertexId> {
        let slots = &self.vertex_slots;
        let id = VertexId(self.vertex_ids.next(|id| slots.contains_key(&VertexId(id)))?);
        self.insert_vertex(id, payload)?;
        Ok(id)
    }

    /// Id the next [`add_vertex`](Self::add_vertex) would use. Vertex ids
    /// only move forward.
    pub fn next_vertex_id(&self) -> Result<usize> {
        self.vertex_ids
            .peek(|id| self.vertex_slots.contains_key(&VertexId(id)))
    }

    /// Remove a vertex together with every arc incident to it.
    pub fn delete_vertex(&mut self, id: VertexId) -> Result<V> {
        let slot = self.vertex_slot(id)?;
        while let Some(arc_slot) = self.vertex_at(slot).first_out {
            let (tail, head, arc_id) = self.arc_endpoints(arc_slot);
            self.delete_arc(tail, head, arc_id);
        }
        while let Some(arc_slot) = self.vertex_at(slot).first_in {
            let (tail, head, arc_id) = self.arc_endpoints(arc_slot);
            self.delete_arc(tail, head, arc_id);
        }
        self.vertex_slots.remove(&id);
        self.vertex_ids.release(id.0);
        let record = self.vertices[slot]
            .take()
            .ok_or(KirchhoffError::UnknownVertex { id: id.0 })?;
        Ok(record.payload)
    }

    pub fn vertex(&self, id: VertexId) -> Result<&VertexRecord<V>> {
        let slot = self.vertex_slot(id)?;
        Ok(self.vertex_at(slot))
    }

    pub fn vertex_payload(&self, id: VertexId) -> Result<&V> {
        Ok(&self.vertex(id)?.payload)
    }

    pub fn vertex_payload_mut(&mut self, id: VertexId) -> Result<&mut V> {
        let slot = self.vertex_slot(id)?;
        match self.vertices[slot].as_mut() {
            Some(vertex) => Ok(&mut vertex.payload),
            None => Err(KirchhoffError::UnknownVertex { id: id.0 }),
        }
    }

    pub fn in_degree(&self, id: VertexId) -> Result<usize> {
        Ok(self.vertex(id)?.in_degree)
    }

    pub fn out_degree(&self, id: VertexId) -> Result<usize> {
        Ok(self.vertex(id)?.out_degree)
    }

    pub fn degree(&self, id: VertexId) -> Result<usize> {
        Ok(self.vertex(id)?.degree())
    }

    /// Live vertices in arena order.
    pub fn vertices(&self) -> impl Iterator<Item = &VertexRecord<V>> + '_ {
        self.vertices.iter().flatten()
    }

    /// Live vertex ids in arena order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices().map(|v| v.id)
    }

    // ============ Arcs ============

    /// Insert an arc under the lowest unused arc id and return that id.
    pub fn insert_arc(&mut self, tail: VertexId, head: VertexId, payload: A) -> Result<ArcId> {
        self.check_endpoints(tail, head)?;
        let arcs = &self.arc_slots;
        let id = ArcId(self.arc_ids.next(|id| arcs.contains_key(&ArcId(id)))?);
        self.link_arc(id, tail, head, payload)
    }

    /// Lowest arc id not currently in use.
    pub fn next_arc_id(&self) -> Result<usize> {
        self.arc_ids.peek(|id| self.arc_slots.contains_key(&ArcId(id)))
    }

    /// Insert an arc under a caller-chosen id.
    pub fn insert_arc_with_id(
        &mut self,
        tail: VertexId,
        head: VertexId,
        payload: A,
        id: ArcId,
    ) -> Result<ArcId> {
        if self.arc_slots.contains_key(&id) {
            return Err(KirchhoffError::DuplicateArc { id: id.0 });
        }
        self.check_endpoints(tail, head)?;
        self.arc_ids.claim(id.0);
        self.link_arc(id, tail, head, payload)
    }

    /// Remove the arc `id` running from `tail` to `head`.
    ///
    /// The arc is looked up on the outgoing list of `tail`. Returns the payload
    /// of the removed arc, or `None` if no such arc exists.
    pub fn delete_arc(&mut self, tail: VertexId, head: VertexId, id: ArcId) -> Option<A> {
        let tail_slot = *self.vertex_slots.get(&tail)?;
        let mut cursor = self.vertex_at(tail_slot).first_out;
        let mut found = None;
        while let Some(slot) = cursor {
            let arc = self.arc_at(slot);
            if arc.id == id {
                found = Some(slot);
                break;
            }
            cursor = arc.next_out;
        }
        let slot = found?;
        if self.arc_at(slot).head != head {
            return None;
        }

        self.unlink_arc(slot);
        self.arc_slots.remove(&id);
        self.arc_ids.release(id.0);
        self.free_arc_slots.push(slot);
        self.arcs[slot].take().map(ArcRecord::into_payload)
    }

    pub fn arc(&self, id: ArcId) -> Result<&ArcRecord<A>> {
        let slot = self.arc_slot(id)?;
        Ok(self.arc_at(slot))
    }

    pub fn arc_payload_mut(&mut self, id: ArcId) -> Result<&mut A> {
        let slot = self.arc_slot(id)?;
        match self.arcs[slot].as_mut() {
            Some(arc) => Ok(&mut arc.payload),
            None => Err(KirchhoffError::UnknownArc { id: id.0 }),
        }
    }

    /// Live arcs in arena order.
    pub fn arcs(&self) -> impl Iterator<Item = &ArcRecord<A>> + '_ {
        self.arcs.iter().flatten()
    }

    pub fn arc_ids(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs().map(|a| a.id)
    }

    /// Arcs incident to `id`: outgoing list first, then incoming list.
    pub fn incident_arcs(&self, id: VertexId) -> Result<IncidentArcs<'_, V, A>> {
        let slot = self.vertex_slot(id)?;
        let vertex = self.vertex_at(slot);
        Ok(IncidentArcs {
            graph: self,
            cursor: vertex.first_out,
            outgoing: true,
            first_in: vertex.first_in,
        })
    }

    // ============ Slot plumbing ============

    pub(crate) fn vertex_slot(&self, id: VertexId) -> Result<usize> {
        self.vertex_slots
            .get(&id)
            .copied()
            .ok_or(KirchhoffError::UnknownVertex { id: id.0 })
    }

    pub(crate) fn arc_slot(&self, id: ArcId) -> Result<usize> {
        self.arc_slots
            .get(&id)
            .copied()
            .ok_or(KirchhoffError::UnknownArc { id: id.0 })
    }

    /// Vertex at a live slot. Slots come from this graph's own links, so a
    /// hole here means the links are corrupt.
    pub(crate) fn vertex_at(&self, slot: usize) -> &VertexRecord<V> {
        match &self.vertices[slot] {
            Some(vertex) => vertex,
            None => unreachable!("vertex slot {slot} is linked but empty"),
        }
    }

    pub(crate) fn arc_at(&self, slot: usize) -> &ArcRecord<A> {
        match &self.arcs[slot] {
            Some(arc) => arc,
            None => unreachable!("arc slot {slot} is linked but empty"),
        }
    }

    fn vertex_at_mut(&mut self, slot: usize) -> &mut VertexRecord<V> {
        match &mut self.vertices[slot] {
            Some(vertex) => vertex,
            None => unreachable!("vertex slot {slot} is linked but empty"),
        }
    }

    fn arc_at_mut(&mut self, slot: usize) -> &mut ArcRecord<A> {
        match &mut self.arcs[slot] {
            Some(arc) => arc,
            None => unreachable!("arc slot {slot} is linked but empty"),
        }
    }

    fn arc_endpoints(&self, slot: usize) -> (VertexId, VertexId, ArcId) {
        let arc = self.arc_at(slot);
        (arc.tail, arc.head, arc.id)
    }

    fn check_endpoints(&self, tail: VertexId, head: VertexId) -> Result<()> {
        if tail == head {
            return Err(KirchhoffError::SelfLoop { vertex: tail.0 });
        }
        self.vertex_slot(tail)?;
        self.vertex_slot(head)?;
        Ok(())
    }

    /// Store a new arc and push it on the front of both adjacency lists.
    fn link_arc(&mut self, id: ArcId, tail: VertexId, head: VertexId, payload: A) -> Result<ArcId> {
        let tail_slot = self.vertex_slot(tail)?;
        let head_slot = self.vertex_slot(head)?;
        let mut record = ArcRecord::new(id, (tail, tail_slot), (head, head_slot), payload);

        let old_first_out = self.vertex_at(tail_slot).first_out;
        let old_first_in = self.vertex_at(head_slot).first_in;
        record.next_out = old_first_out;
        record.next_in = old_first_in;

        let slot = match self.free_arc_slots.pop() {
            Some(slot) => {
                self.arcs[slot] = Some(record);
                slot
            }
            None => {
                self.arcs.push(Some(record));
                self.arcs.len() - 1
            }
        };

        if let Some(next) = old_first_out {
            self.arc_at_mut(next).prev_out = Some(slot);
        }
        if let Some(next) = old_first_in {
            self.arc_at_mut(next).prev_in = Some(slot);
        }

        let tail_vertex = self.vertex_at_mut(tail_slot);
        tail_vertex.first_out = Some(slot);
        tail_vertex.out_degree += 1;
        let head_vertex = self.vertex_at_mut(head_slot);
        head_vertex.first_in = Some(slot);
        head_vertex.in_degree += 1;

        self.arc_slots.insert(id, slot);
        Ok(id)
    }

    /// Splice an arc out of both adjacency lists and fix up the degrees.
    fn unlink_arc(&mut self, slot: usize) {
        let arc = self.arc_at(slot);
        let (tail_slot, head_slot) = (arc.tail_slot, arc.head_slot);
        let (prev_out, next_out) = (arc.prev_out, arc.next_out);
        let (prev_in, next_in) = (arc.prev_in, arc.next_in);

        match prev_out {
            Some(prev) => self.arc_at_mut(prev).next_out = next_out,
            None => self.vertex_at_mut(tail_slot).first_out = next_out,
        }
        if let Some(next) = next_out {
            self.arc_at_mut(next).prev_out = prev_out;
        }

        match prev_in {
            Some(prev) => self.arc_at_mut(prev).next_in = next_in,
            None => self.vertex_at_mut(head_slot).first_in = next_in,
        }
        if let Some(next) = next_in {
            self.arc_at_mut(next).prev_in = prev_in;
        }

        self.vertex_at_mut(tail_slot).out_degree -= 1;
        self.vertex_at_mut(head_slot).in_degree -= 1;

        let arc = self.arc_at_mut(slot);
        arc.prev_out = None;
        arc.next_out = None;
        arc.prev_in = None;
        arc.next_in = None;
    }
}

/// Iterator over the arcs incident to one vertex.
pub struct IncidentArcs<'a, V, A> {
    graph: &'a Multigraph<V, A>,
    cursor: Option<usize>,
    outgoing: bool,
    first_in: Option<usize>,
}

impl<'a, V, A> Iterator for IncidentArcs<'a, V, A> {
    type Item = &'a ArcRecord<A>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.cursor {
                Some(slot) => {
                    let arc = self.graph.arc_at(slot);
                    self.cursor = if self.outgoing { arc.next_out } else { arc.next_in };
                    return Some(arc);
                }
                None if self.outgoing => {
                    self.outgoing = false;
                    self.cursor = self.first_in;
                }
                None => return None,
            }
        }
    }
}

impl<V: fmt::Debug, A: fmt::Display> fmt::Display for Multigraph<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vertices: {}", self.vertex_count())?;
        for vertex in self.vertices() {
            writeln!(
                f,
                "{} {:?} in:{} out:{}",
                vertex.id, vertex.payload, vertex.in_degree, vertex.out_degree
            )?;
        }
        writeln!(f, "arcs: {}", self.arc_count())?;
        for arc in self.arcs() {
            writeln!(f, "{} {}->{} {}", arc.id, arc.tail, arc.head, arc.payload)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> Multigraph<(), &'static str> {
        let mut graph = Multigraph::new();
        for i in 0..n {
            graph.insert_vertex(VertexId(i), ()).unwrap();
        }
        for i in 1..n {
            graph.insert_arc(VertexId(i - 1), VertexId(i), "w").unwrap();
        }
        graph
    }

    fn out_list(graph: &Multigraph<(), &'static str>, v: usize) -> Vec<ArcId> {
        graph
            .incident_arcs(VertexId(v))
            .unwrap()
            .filter(|a| a.tail() == VertexId(v))
            .map(|a| a.id())
            .collect()
    }

    #[test]
    fn test_duplicate_vertex_rejected() {
        let mut graph: Multigraph<u8, ()> = Multigraph::new();
        graph.insert_vertex(VertexId(1), 7).unwrap();
        let err = graph.insert_vertex(VertexId(1), 8).unwrap_err();
        assert_eq!(err, KirchhoffError::DuplicateVertex { id: 1 });
        assert_eq!(*graph.vertex_payload(VertexId(1)).unwrap(), 7);
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut graph = path_graph(2);
        let err = graph.insert_arc(VertexId(0), VertexId(5), "r").unwrap_err();
        assert_eq!(err, KirchhoffError::UnknownVertex { id: 5 });
        assert_eq!(graph.arc_count(), 1);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = path_graph(2);
        let err = graph.insert_arc(VertexId(1), VertexId(1), "r").unwrap_err();
        assert_eq!(err, KirchhoffError::SelfLoop { vertex: 1 });
    }

    #[test]
    fn test_duplicate_arc_id_rejected() {
        let mut graph = path_graph(3);
        let err = graph
            .insert_arc_with_id(VertexId(0), VertexId(2), "r", ArcId(1))
            .unwrap_err();
        assert_eq!(err, KirchhoffError::DuplicateArc { id: 1 });
    }

    #[test]
    fn test_insert_arc_is_head_insertion() {
        let mut graph = path_graph(2);
        let second = graph.insert_arc(VertexId(0), VertexId(1), "r").unwrap();
        let third = graph.insert_arc(VertexId(0), VertexId(1), "e").unwrap();
        assert_eq!(out_list(&graph, 0), vec![third, second, ArcId(0)]);
        assert_eq!(graph.out_degree(VertexId(0)).unwrap(), 3);
        assert_eq!(graph.in_degree(VertexId(1)).unwrap(), 3);
    }

    #[test]
    fn test_auto_arc_id_is_lowest_unused() {
        let mut graph = path_graph(4);
        assert_eq!(graph.arc_ids().collect::<Vec<_>>(), vec![ArcId(0), ArcId(1), ArcId(2)]);
        graph.delete_arc(VertexId(1), VertexId(2), ArcId(1)).unwrap();
        let id = graph.insert_arc(VertexId(3), VertexId(0), "w").unwrap();
        assert_eq!(id, ArcId(1));
        let id = graph.insert_arc(VertexId(3), VertexId(0), "w").unwrap();
        assert_eq!(id, ArcId(3));
    }

    #[test]
    fn test_delete_arc_covers_all_link_positions() {
        let mut graph = path_graph(2);
        let a1 = graph.insert_arc(VertexId(0), VertexId(1), "b").unwrap();
        let a2 = graph.insert_arc(VertexId(0), VertexId(1), "c").unwrap();
        let a3 = graph.insert_arc(VertexId(0), VertexId(1), "d").unwrap();
        // list is a3, a2, a1, a0
        assert_eq!(graph.delete_arc(VertexId(0), VertexId(1), a2), Some("c"));
        assert_eq!(out_list(&graph, 0), vec![a3, a1, ArcId(0)]);
        assert_eq!(graph.delete_arc(VertexId(0), VertexId(1), a3), Some("d"));
        assert_eq!(out_list(&graph, 0), vec![a1, ArcId(0)]);
        assert_eq!(graph.delete_arc(VertexId(0), VertexId(1), ArcId(0)), Some("w"));
        assert_eq!(out_list(&graph, 0), vec![a1]);
        assert_eq!(graph.delete_arc(VertexId(0), VertexId(1), a1), Some("b"));
        assert!(out_list(&graph, 0).is_empty());
        assert_eq!(graph.degree(VertexId(0)).unwrap(), 0);
        assert_eq!(graph.degree(VertexId(1)).unwrap(), 0);
        let incoming: Vec<_> = graph.incident_arcs(VertexId(1)).unwrap().collect();
        assert!(incoming.is_empty());
    }

    #[test]
    fn test_delete_missing_arc_is_noop() {
        let mut graph = path_graph(3);
        assert_eq!(graph.delete_arc(VertexId(0), VertexId(1), ArcId(1)), None);
        assert_eq!(graph.delete_arc(VertexId(1), VertexId(0), ArcId(0)), None);
        assert_eq!(graph.delete_arc(VertexId(9), VertexId(0), ArcId(0)), None);
        assert_eq!(graph.arc_count(), 2);
    }

    #[test]
    fn test_delete_vertex_removes_incident_arcs() {
        let mut graph = path_graph(3);
        graph.insert_arc(VertexId(2), VertexId(1), "x").unwrap();
        graph.delete_vertex(VertexId(1)).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.arc_count(), 0);
        assert_eq!(graph.degree(VertexId(0)).unwrap(), 0);
        assert_eq!(graph.degree(VertexId(2)).unwrap(), 0);
        assert!(graph.delete_vertex(VertexId(1)).is_err());
    }

    #[test]
    fn test_vertex_slots_stay_stable_after_removal() {
        let mut graph = path_graph(3);
        let slot = graph.vertex(VertexId(2)).unwrap().slot();
        graph.delete_vertex(VertexId(0)).unwrap();
        assert_eq!(graph.vertex(VertexId(2)).unwrap().slot(), slot);
        assert_eq!(graph.vertex_capacity(), 3);
    }

    #[test]
    fn test_add_vertex_skips_ids_in_use() {
        let mut graph: Multigraph<(), ()> = Multigraph::new();
        graph.insert_vertex(VertexId(0), ()).unwrap();
        graph.insert_vertex(VertexId(1), ()).unwrap();
        assert_eq!(graph.add_vertex(()).unwrap(), VertexId(2));
        graph.insert_vertex(VertexId(3), ()).unwrap();
        assert_eq!(graph.add_vertex(()).unwrap(), VertexId(4));
    }

    #[test]
    fn test_next_ids_do_not_consume() {
        let mut graph = path_graph(3);
        assert_eq!(graph.next_vertex_id().unwrap(), 3);
        assert_eq!(graph.next_arc_id().unwrap(), 2);
        graph.delete_arc(VertexId(0), VertexId(1), ArcId(0)).unwrap();
        assert_eq!(graph.next_arc_id().unwrap(), 0);
        assert_eq!(graph.next_arc_id().unwrap(), 0);
        assert_eq!(graph.insert_arc(VertexId(0), VertexId(1), "w").unwrap(), ArcId(0));
        assert_eq!(graph.add_vertex(()).unwrap(), VertexId(3));
    }

    #[test]
    fn test_incident_arcs_out_then_in() {
        let mut graph = path_graph(3);
        let back = graph.insert_arc(VertexId(2), VertexId(1), "x").unwrap();
        let ids: Vec<_> = graph.incident_arcs(VertexId(1)).unwrap().map(|a| a.id()).collect();
        assert_eq!(ids, vec![ArcId(1), back, ArcId(0)]);
    }

    #[test]
    fn test_payload_mutation() {
        let mut graph = path_graph(2);
        *graph.arc_payload_mut(ArcId(0)).unwrap() = "r";
        assert_eq!(*graph.arc(ArcId(0)).unwrap().payload(), "r");
        assert!(graph.arc_payload_mut(ArcId(5)).is_err());
    }
}
