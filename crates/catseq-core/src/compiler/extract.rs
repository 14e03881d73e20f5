//! Pass 1: flatten a morphism's lanes into a flat, per-board event list.
//!
//! Identity ops carry no semantic content beyond time and are dropped here;
//! everything downstream only ever sees ops with observable effect.

use crate::ids::{BoardId, Channel};
use crate::morphism::Morphism;
use crate::op::{OpCode, Payload};
use crate::time::Cycles;

/// A single timestamped, board-scoped occurrence of an [`crate::op::AtomicOp`].
#[derive(Debug, Clone)]
pub(crate) struct Event {
    pub board: BoardId,
    pub channel: Channel,
    pub op_code: OpCode,
    pub payload: Option<Payload>,
    /// Scheduled start time; mutated by Pass 3 for flexible ops.
    pub timestamp: Cycles,
    /// Start time as extracted from the morphism, before any rescheduling.
    pub original_timestamp: Cycles,
    /// Epoch index, assigned by Pass 2.
    pub epoch: u32,
    /// Cycle cost, assigned by Pass 2 from the supplied oracle.
    pub cost: Cycles,
}

impl Event {
    pub fn end(&self) -> Cycles {
        self.timestamp + self.cost
    }
}

pub(crate) fn extract(morphism: &Morphism) -> Vec<Event> {
    let mut events = Vec::new();
    for (channel, lane) in morphism.lanes() {
        let mut cursor = Cycles::ZERO;
        for op in lane.ops() {
            if !op.is_identity() {
                events.push(Event {
                    board: channel.board,
                    channel: *channel,
                    op_code: op.op_code,
                    payload: op.payload.clone(),
                    timestamp: cursor,
                    original_timestamp: cursor,
                    epoch: 0,
                    cost: Cycles::ZERO,
                });
            }
            cursor = cursor + op.duration_cycles;
        }
    }
    let boards: std::collections::BTreeSet<_> = events.iter().map(|e| e.board).collect();
    log::debug!("pass 1: extracted {} event(s) across {} board(s)", events.len(), boards.len());
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::ids::ChannelKind;

    #[test]
    fn identity_holds_are_dropped_but_advance_the_cursor() {
        let ch = Channel::new(BoardId::named("extract-test-board"), ChannelKind::Digital, 0);
        let pulse = factory::digital_pulse(ch, Cycles(100)).unwrap();
        let events = extract(&pulse);
        // rise at 0, fall at 100; the 100-cycle hold in between is an identity.
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, Cycles::ZERO);
        assert_eq!(events[1].timestamp, Cycles(100));
    }
}
