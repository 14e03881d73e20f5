//! Per-channel sequences of atomic operations.

use crate::op::AtomicOp;
use crate::state::ChannelState;
use crate::time::Cycles;

/// A chronologically ordered run of [`AtomicOp`]s on a single channel.
///
/// Lanes are the unit the composition operators splice: `@`/`>>` append one
/// lane's ops after another's on the same channel, `|` unions lanes across
/// disjoint channels. A lane's `cod` is always the `end_state` of its last
/// op (or its `dom` if empty).
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    ops: Vec<AtomicOp>,
    dom: ChannelState,
}

impl Lane {
    /// An empty lane starting (and, until extended, ending) in `dom`.
    pub fn empty(dom: ChannelState) -> Lane {
        Lane { ops: Vec::new(), dom }
    }

    pub fn single(op: AtomicOp) -> Lane {
        Lane {
            dom: op.start_state.clone(),
            ops: vec![op],
        }
    }

    pub fn ops(&self) -> &[AtomicOp] {
        &self.ops
    }

    pub fn dom(&self) -> &ChannelState {
        &self.dom
    }

    pub fn cod(&self) -> &ChannelState {
        self.ops.last().map(|op| &op.end_state).unwrap_or(&self.dom)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total duration across all ops, in cycles.
    pub fn duration(&self) -> Cycles {
        self.ops
            .iter()
            .fold(Cycles::ZERO, |acc, op| acc + op.duration_cycles)
    }

    /// Append `op` to the end of the lane. Caller is responsible for
    /// checking `op.start_state == self.cod()`; the composition layer
    /// (`crate::compose`) does this before calling in, so it is not
    /// re-checked here.
    pub fn push(&mut self, op: AtomicOp) {
        self.ops.push(op);
    }

    /// Append another lane's ops in place, consuming it.
    pub fn extend(&mut self, other: Lane) {
        self.ops.extend(other.ops);
    }
}
