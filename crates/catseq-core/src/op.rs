//! Atomic operation records — the smallest indivisible unit of hardware
//! intent, one per lane entry.

use crate::ids::Channel;
use crate::state::{ChannelState, Tone, ToneParams};
use crate::time::Cycles;

/// The 16-bit, hardware-ABI-stable operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OpCode {
    Identity = 0x00,
    TtlInit = 0x10,
    TtlOn = 0x11,
    TtlOff = 0x12,
    WfInit = 0x20,
    WfSetCarrier = 0x21,
    WfLoadCoeffs = 0x22,
    WfUpdateParams = 0x23,
    WfRfSwitch = 0x24,
    SyncMaster = 0x30,
    SyncSlave = 0x31,
    UserBlock = 0x40,
}

/// Whether the scheduler is allowed to move an operation off its declared
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingClass {
    /// Must execute exactly at its timestamp.
    Critical,
    /// May be rescheduled into an idle window ahead of its deadline.
    Flexible,
}

impl OpCode {
    /// Closed classification, known to the scheduler. Identity, digital
    /// on/off, parameter updates, RF switches, syncs, and opaque user
    /// blocks are timing-critical; init/carrier/load operations are
    /// timing-flexible (candidates for pipelining).
    pub const fn timing_class(self) -> TimingClass {
        match self {
            OpCode::Identity
            | OpCode::TtlOn
            | OpCode::TtlOff
            | OpCode::WfUpdateParams
            | OpCode::WfRfSwitch
            | OpCode::SyncMaster
            | OpCode::SyncSlave
            | OpCode::UserBlock => TimingClass::Critical,
            OpCode::TtlInit | OpCode::WfInit | OpCode::WfSetCarrier | OpCode::WfLoadCoeffs => {
                TimingClass::Flexible
            }
        }
    }

    pub const fn is_flexible(self) -> bool {
        matches!(self.timing_class(), TimingClass::Flexible)
    }
}

/// A handle into a caller-supplied dispatch table for an opaque user block,
/// plus its captured arguments. Represents a closure over the assembler in
/// a language with no first-class closures at this boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct UserBlockHandle {
    pub name: String,
    pub args: Vec<crate::isa::Value>,
}

/// Operation-specific payload data, carried alongside the state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Carrier { hz: f64 },
    Tones(Vec<Tone>),
    ToneParamsSet(Vec<ToneParams>),
    SyncCode(u32),
    UserBlock(UserBlockHandle),
}

/// An immutable, minimal unit of hardware intent on one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicOp {
    pub channel: Channel,
    pub start_state: ChannelState,
    pub end_state: ChannelState,
    pub duration_cycles: Cycles,
    pub op_code: OpCode,
    pub payload: Option<Payload>,
}

impl AtomicOp {
    pub fn new(
        channel: Channel,
        start_state: ChannelState,
        end_state: ChannelState,
        duration_cycles: Cycles,
        op_code: OpCode,
        payload: Option<Payload>,
    ) -> AtomicOp {
        AtomicOp {
            channel,
            start_state,
            end_state,
            duration_cycles,
            op_code,
            payload,
        }
    }

    /// An identity op: zero semantic effect, carries only time, preserving
    /// `state` as both its start and end.
    pub fn identity(channel: Channel, state: ChannelState, duration_cycles: Cycles) -> AtomicOp {
        AtomicOp::new(
            channel,
            state.clone(),
            state,
            duration_cycles,
            OpCode::Identity,
            None,
        )
    }

    pub fn is_identity(&self) -> bool {
        self.op_code == OpCode::Identity
    }
}
