//! Vertex and arc records.
//!
//! Both records live in arenas owned by [`Multigraph`](super::Multigraph) and
//! refer to each other by arena slot. Every arc sits on two intrusive
//! doubly-linked lists at once: the outgoing list of its tail vertex and the
//! incoming list of its head vertex. A vertex only stores the slot of the
//! first arc on each list.

use std::collections::BTreeSet;

use super::types::{ArcId, VertexId};
use crate::error::{KirchhoffError, Result};

/// A vertex in the arena.
#[derive(Debug, Clone)]
pub struct VertexRecord<V> {
    pub(crate) id: VertexId,
    /// Dense arena slot, fixed for the lifetime of the vertex
    pub(crate) slot: usize,
    pub(crate) payload: V,
    pub(crate) in_degree: usize,
    pub(crate) out_degree: usize,
    pub(crate) first_out: Option<usize>,
    pub(crate) first_in: Option<usize>,
}

impl<V> VertexRecord<V> {
    pub(crate) fn new(id: VertexId, slot: usize, payload: V) -> Self {
        Self {
            id,
            slot,
            payload,
            in_degree: 0,
            out_degree: 0,
            first_out: None,
            first_in: None,
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn payload(&self) -> &V {
        &self.payload
    }

    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Total number of incident arcs.
    pub fn degree(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// A directed arc in the arena.
#[derive(Debug, Clone)]
pub struct ArcRecord<A> {
    pub(crate) id: ArcId,
    pub(crate) tail: VertexId,
    pub(crate) head: VertexId,
    pub(crate) tail_slot: usize,
    pub(crate) head_slot: usize,
    pub(crate) payload: A,
    /// Links on the tail vertex's outgoing list
    pub(crate) prev_out: Option<usize>,
    pub(crate) next_out: Option<usize>,
    /// Links on the head vertex's incoming list
    pub(crate) prev_in: Option<usize>,
    pub(crate) next_in: Option<usize>,
}

impl<A> ArcRecord<A> {
    pub(crate) fn new(
        id: ArcId,
        tail: (VertexId, usize),
        head: (VertexId, usize),
        payload: A,
    ) -> Self {
        Self {
            id,
            tail: tail.0,
            head: head.0,
            tail_slot: tail.1,
            head_slot: head.1,
            payload,
            prev_out: None,
            next_out: None,
            prev_in: None,
            next_in: None,
        }
    }

    pub fn id(&self) -> ArcId {
        self.id
    }

    pub fn tail(&self) -> VertexId {
        self.tail
    }

    pub fn head(&self) -> VertexId {
        self.head
    }

    pub fn payload(&self) -> &A {
        &self.payload
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not an endpoint.
    pub fn opposite(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.tail {
            Some(self.head)
        } else if vertex == self.head {
            Some(self.tail)
        } else {
            None
        }
    }

    pub(crate) fn into_payload(self) -> A {
        self.payload
    }
}

/// Free-id generator.
///
/// Hands out ids from a cursor that only moves forward, skipping ids already
/// claimed. With `reuse` set, released ids below the cursor are handed out
/// again first, lowest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdPool {
    cursor: usize,
    reuse: bool,
    released: BTreeSet<usize>,
}

impl IdPool {
    /// Monotonic pool that never hands out an id twice.
    pub(crate) fn monotonic() -> Self {
        Self::default()
    }

    /// Pool that always hands out the lowest unused id.
    pub(crate) fn lowest_unused() -> Self {
        Self {
            reuse: true,
            ..Self::default()
        }
    }

    /// Next id for which `in_use` is false.
    pub(crate) fn next(&mut self, in_use: impl Fn(usize) -> bool) -> Result<usize> {
        while let Some(id) = self.released.pop_first() {
            if !in_use(id) {
                return Ok(id);
            }
        }
        while in_use(self.cursor) {
            self.cursor = self
                .cursor
                .checked_add(1)
                .ok_or(KirchhoffError::IdSpaceExhausted)?;
        }
        let id = self.cursor;
        self.cursor = self.cursor.checked_add(1).unwrap_or(usize::MAX);
        Ok(id)
    }

    /// The id [`next`](Self::next) would return, without taking it.
    pub(crate) fn peek(&self, in_use: impl Fn(usize) -> bool) -> Result<usize> {
        if let Some(&id) = self.released.iter().find(|&&id| !in_use(id)) {
            return Ok(id);
        }
        let mut id = self.cursor;
        while in_use(id) {
            id = id.checked_add(1).ok_or(KirchhoffError::IdSpaceExhausted)?;
        }
        Ok(id)
    }

    /// Record that `id` is no longer in use.
    pub(crate) fn release(&mut self, id: usize) {
        if self.reuse && id < self.cursor {
            self.released.insert(id);
        }
    }

    /// Record that `id` was taken explicitly by a caller.
    pub(crate) fn claim(&mut self, id: usize) {
        self.released.remove(&id);
    }
}
