//! Thin constructors for common morphisms, so callers rarely need to build
//! [`AtomicOp`]s by hand.

use crate::error::CompositionError;
use crate::ids::Channel;
use crate::lane::Lane;
use crate::morphism::Morphism;
use crate::op::{AtomicOp, OpCode, Payload, UserBlockHandle};
use crate::state::{ChannelState, DigitalState, Tone, ToneParams, WaveformState};
use crate::time::Cycles;

/// Bring a digital channel from uninitialised to a known-low baseline.
pub fn digital_init(channel: Channel) -> Morphism {
    let op = AtomicOp::new(
        channel,
        ChannelState::Digital(DigitalState::Uninitialised),
        ChannelState::Digital(DigitalState::Low),
        Cycles::ZERO,
        OpCode::TtlInit,
        None,
    );
    Morphism::single(channel, Lane::single(op))
}

/// Hold a digital channel at `level` for `duration`, with no transition.
pub fn digital_hold(channel: Channel, level: DigitalState, duration: Cycles) -> Morphism {
    let op_code = match level {
        DigitalState::High => OpCode::TtlOn,
        DigitalState::Low => OpCode::TtlOff,
        DigitalState::Uninitialised => OpCode::Identity,
    };
    let op = AtomicOp::new(
        channel,
        ChannelState::Digital(level),
        ChannelState::Digital(level),
        duration,
        op_code,
        None,
    );
    Morphism::single(channel, Lane::single(op))
}

/// Drive a digital channel high for `duration`, assuming it starts low.
pub fn digital_pulse(channel: Channel, duration: Cycles) -> Result<Morphism, CompositionError> {
    let rise = AtomicOp::new(
        channel,
        ChannelState::Digital(DigitalState::Low),
        ChannelState::Digital(DigitalState::High),
        Cycles::ZERO,
        OpCode::TtlOn,
        None,
    );
    let hold = AtomicOp::new(
        channel,
        ChannelState::Digital(DigitalState::High),
        ChannelState::Digital(DigitalState::High),
        duration,
        OpCode::Identity,
        None,
    );
    let fall = AtomicOp::new(
        channel,
        ChannelState::Digital(DigitalState::High),
        ChannelState::Digital(DigitalState::Low),
        Cycles::ZERO,
        OpCode::TtlOff,
        None,
    );
    let mut lane = Lane::single(rise);
    lane.push(hold);
    lane.push(fall);
    Ok(Morphism::single(channel, lane))
}

/// Initialise a waveform channel to a carrier, from uninitialised.
pub fn wf_init(channel: Channel, carrier_hz: f64) -> Morphism {
    let op = AtomicOp::new(
        channel,
        ChannelState::Waveform(WaveformState::Uninitialised),
        ChannelState::Waveform(WaveformState::Ready { carrier_hz }),
        Cycles::ZERO,
        OpCode::WfInit,
        Some(Payload::Carrier { hz: carrier_hz }),
    );
    Morphism::single(channel, Lane::single(op))
}

/// Change a ready (not yet playing) channel's carrier frequency.
pub fn wf_set_carrier(channel: Channel, from_hz: f64, to_hz: f64) -> Morphism {
    let op = AtomicOp::new(
        channel,
        ChannelState::Waveform(WaveformState::Ready { carrier_hz: from_hz }),
        ChannelState::Waveform(WaveformState::Ready { carrier_hz: to_hz }),
        Cycles::ZERO,
        OpCode::WfSetCarrier,
        Some(Payload::Carrier { hz: to_hz }),
    );
    Morphism::single(channel, Lane::single(op))
}

/// Load tone parameters onto a channel's synthesisers ahead of the update
/// that makes them audible. Does not change `rf_on` or the current
/// snapshot; `from` is whatever waveform state the channel is actually in
/// (ready, or already active from a previous load/play cycle), so repeated
/// load/play pairs on the same channel compose without re-deriving state.
pub fn wf_load(channel: Channel, from: WaveformState, params: Vec<ToneParams>) -> Morphism {
    let (carrier_hz, rf_on, snapshot) = match &from {
        WaveformState::Ready { carrier_hz } => (*carrier_hz, false, Vec::new()),
        WaveformState::Active { carrier_hz, rf_on, snapshot, .. } => (*carrier_hz, *rf_on, snapshot.clone()),
        WaveformState::Uninitialised => (0.0, false, Vec::new()),
    };
    let to = ChannelState::Waveform(WaveformState::Active {
        carrier_hz,
        rf_on,
        snapshot,
        pending: params.clone(),
    });
    let op = AtomicOp::new(
        channel,
        ChannelState::Waveform(from),
        to,
        Cycles::ZERO,
        OpCode::WfLoadCoeffs,
        Some(Payload::ToneParamsSet(params)),
    );
    Morphism::single(channel, Lane::single(op))
}

/// Commit previously loaded tone parameters, making them audible. `from`
/// must be the `Active` state left behind by [`wf_load`]; its `pending`
/// tones become the new `snapshot` and `rf_on` is set.
pub fn wf_play(channel: Channel, from: WaveformState, tones: Vec<Tone>) -> Morphism {
    let carrier_hz = match &from {
        WaveformState::Ready { carrier_hz } => *carrier_hz,
        WaveformState::Active { carrier_hz, .. } => *carrier_hz,
        WaveformState::Uninitialised => 0.0,
    };
    let to = ChannelState::Waveform(WaveformState::Active {
        carrier_hz,
        rf_on: true,
        snapshot: tones.clone(),
        pending: Vec::new(),
    });
    let op = AtomicOp::new(
        channel,
        ChannelState::Waveform(from),
        to,
        Cycles::ZERO,
        OpCode::WfUpdateParams,
        Some(Payload::Tones(tones)),
    );
    Morphism::single(channel, Lane::single(op))
}

/// Hold any channel's current state for `duration` with no transition,
/// digital or waveform alike.
pub fn wf_hold(channel: Channel, state: ChannelState, duration: Cycles) -> Morphism {
    let op = AtomicOp::new(channel, state.clone(), state, duration, OpCode::Identity, None);
    Morphism::single(channel, Lane::single(op))
}

/// Gate RF output on or off without changing loaded tones. `from` must be
/// `Active`.
pub fn wf_rf_switch(channel: Channel, from: WaveformState, on: bool) -> Morphism {
    let (carrier_hz, snapshot, pending) = match &from {
        WaveformState::Active { carrier_hz, snapshot, pending, .. } => {
            (*carrier_hz, snapshot.clone(), pending.clone())
        }
        WaveformState::Ready { carrier_hz } => (*carrier_hz, Vec::new(), Vec::new()),
        WaveformState::Uninitialised => (0.0, Vec::new(), Vec::new()),
    };
    let to = ChannelState::Waveform(WaveformState::Active {
        carrier_hz,
        rf_on: on,
        snapshot: snapshot.clone(),
        pending,
    });
    let op = AtomicOp::new(channel, ChannelState::Waveform(from), to, Cycles::ZERO, OpCode::WfRfSwitch, None);
    Morphism::single(channel, Lane::single(op))
}

/// A global synchronisation barrier: `master` emits `SYNC_MASTER`, every
/// channel in `slaves` emits `SYNC_SLAVE` with the same `sync_code`. All
/// participating channels must share one state before and after, since a
/// sync barrier has no semantic effect beyond ordering.
pub fn sync_barrier(
    master: Channel,
    master_state: ChannelState,
    slaves: &[(Channel, ChannelState)],
    sync_code: u32,
) -> Morphism {
    let master_op = AtomicOp::new(
        master,
        master_state.clone(),
        master_state,
        Cycles::ZERO,
        OpCode::SyncMaster,
        Some(Payload::SyncCode(sync_code)),
    );
    let mut lanes = std::collections::BTreeMap::new();
    lanes.insert(master, Lane::single(master_op));
    for (channel, state) in slaves {
        let op = AtomicOp::new(
            *channel,
            state.clone(),
            state.clone(),
            Cycles::ZERO,
            OpCode::SyncSlave,
            Some(Payload::SyncCode(sync_code)),
        );
        lanes.insert(*channel, Lane::single(op));
    }
    Morphism::from_lanes(lanes)
}

/// An opaque, caller-defined block of work the scheduler must not move or
/// split: a black box with a declared duration, dispatched by `name` at
/// emission time.
pub fn user_block(channel: Channel, state: ChannelState, duration: Cycles, name: &str, args: Vec<crate::isa::Value>) -> Morphism {
    let op = AtomicOp::new(
        channel,
        state.clone(),
        state,
        duration,
        OpCode::UserBlock,
        Some(Payload::UserBlock(UserBlockHandle { name: name.to_string(), args })),
    );
    Morphism::single(channel, Lane::single(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BoardId, ChannelKind};

    fn ch() -> Channel {
        Channel::new(BoardId::named("factory-test-board"), ChannelKind::Digital, 0)
    }

    #[test]
    fn digital_pulse_returns_low_to_low_with_a_high_plateau() {
        let m = digital_pulse(ch(), Cycles(100)).unwrap();
        assert_eq!(m.domain().get(&ch()), Some(&ChannelState::Digital(DigitalState::Low)));
        assert_eq!(m.codomain().get(&ch()), Some(&ChannelState::Digital(DigitalState::Low)));
        assert_eq!(m.duration(), Cycles(100));
    }

    #[test]
    fn wf_init_produces_a_ready_state() {
        let wch = Channel::new(BoardId::named("factory-test-board"), ChannelKind::Waveform, 0);
        let m = wf_init(wch, 80e6);
        assert_eq!(
            m.codomain().get(&wch),
            Some(&ChannelState::Waveform(WaveformState::Ready { carrier_hz: 80e6 }))
        );
    }

    #[test]
    fn sync_barrier_spans_master_and_all_slaves() {
        let master = ch();
        let slave = Channel::new(BoardId::named("factory-test-slave"), ChannelKind::Digital, 0);
        let state = ChannelState::Digital(DigitalState::Low);
        let m = sync_barrier(master, state.clone(), &[(slave, state)], 7);
        assert_eq!(m.channels().count(), 2);
        assert_eq!(m.duration(), Cycles::ZERO);
    }
}
