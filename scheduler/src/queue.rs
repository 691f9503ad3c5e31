use crate::event::Event;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("event queue is empty")]
    Empty,
}

/// A min-heap of events ordered by `(time, seq)`. `std::collections::BinaryHeap`
/// is a max-heap, so entries are stored behind `Reverse` to turn it into a
/// min-heap without hand-rolling heap mechanics.
#[derive(Debug)]
pub struct EventQueue<P> {
    heap: BinaryHeap<Reverse<Event<P>>>,
    next_seq: u64,
}

impl<P> Default for EventQueue<P> {
    fn default() -> Self {
        EventQueue { heap: BinaryHeap::new(), next_seq: 0 }
    }
}

impl<P> EventQueue<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the next insertion sequence number without consuming it.
    /// Callers that build an `Event` themselves (rather than going through
    /// `push_new`) use this to stamp it before calling `push`.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn push(&mut self, event: Event<P>) {
        self.heap.push(Reverse(event));
    }

    pub fn pop(&mut self) -> Result<Event<P>, QueueError> {
        self.heap.pop().map(|Reverse(e)| e).ok_or(QueueError::Empty)
    }

    pub fn peek_time(&self) -> Option<common::VirtualTime> {
        self.heap.peek().map(|Reverse(e)| e.time)
    }
}
