use crate::params::NodeParams;
use crate::payload::{EventPayload, EventQueue};
use common::{DelayModel, NodeId, VirtualTime};
use rand::rngs::StdRng;
use scheduler::{Event, EventKind};

/// Everything a node handler needs besides its own state, bundled per-call
/// instead of being reached through a back-reference to the simulator
/// (spec Design Notes §9). `queue` and `rng` are `&mut` so a handler can
/// push new events and draw randomness; everything else is read-only for
/// the duration of the call.
pub struct Ctx<'a> {
    pub now: VirtualTime,
    pub neighbors: &'a [NodeId],
    pub is_slow: &'a [bool],
    pub params: &'a NodeParams,
    pub delay_model: &'a DelayModel,
    pub queue: &'a mut EventQueue,
    pub rng: &'a mut StdRng,
}

impl<'a> Ctx<'a> {
    pub fn delay_to(&mut self, size_bytes: usize, sender_is_slow: bool, receiver: NodeId) -> f64 {
        let receiver_is_slow = self.is_slow[receiver.index()];
        self.delay_model.delay(self.rng, size_bytes, sender_is_slow, receiver_is_slow)
    }

    pub fn schedule(
        &mut self,
        time: VirtualTime,
        sender: NodeId,
        receiver: NodeId,
        kind: EventKind,
        payload: Option<EventPayload>,
    ) {
        let seq = self.queue.next_seq();
        self.queue.push(Event::new(time, seq, sender, receiver, kind, payload));
    }
}
