//! The emitted instruction set and the cost-oracle abstraction the
//! scheduler uses to reason about how long each instruction takes on real
//! hardware.
//!
//! The compiler itself never hardcodes a cycle cost: every cost comes from
//! a [`CostOracle`] supplied by the caller, so the same pipeline runs in an
//! offline/zero-cost mode ([`NullOracle`]) for plan inspection and in a
//! calibrated mode ([`TableOracle`]) for real scheduling.

use std::collections::HashMap;

use crate::ids::BoardId;
use crate::op::OpCode;
use crate::time::Cycles;

/// A function code in the emitted assembler-level instruction stream. These
/// are board-firmware entry points, distinct from [`OpCode`] (which tags an
/// atomic op in the algebra, before merging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    TtlConfig,
    TtlSet,
    RwgInit,
    RwgSetCarrier,
    RwgLoadWaveform,
    RwgPlay,
    RwgRfSwitch,
    WaitMaster,
    TrigSlave,
    UserBlock,
}

/// A wire-level instruction argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Mask(u32),
    Str(String),
    Bytes(Vec<u8>),
}

/// One emitted instruction for one board.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub board: BoardId,
    pub timestamp: Cycles,
    pub function: FunctionCode,
    pub args: Vec<Value>,
}

impl Instruction {
    pub fn new(board: BoardId, timestamp: Cycles, function: FunctionCode, args: Vec<Value>) -> Instruction {
        Instruction { board, timestamp, function, args }
    }

    /// A serializable view for the CLI/server wire boundary. `catseq-core`
    /// itself stays free of a wire schema; this is the one place it leaks
    /// out, matching how far downstream a plan ever needs to travel as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "board": self.board.name(),
            "timestamp_cycles": self.timestamp.0,
            "function": format!("{:?}", self.function),
            "args": self.args.iter().map(Value::to_json).collect::<Vec<_>>(),
        })
    }
}

impl Value {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(i) => serde_json::json!(i),
            Value::Float(f) => serde_json::json!(f),
            Value::Mask(m) => serde_json::json!(format!("{m:#06x}")),
            Value::Str(s) => serde_json::json!(s),
            Value::Bytes(b) => serde_json::json!(b),
        }
    }
}

/// Supplies the per-opcode cycle cost the scheduler needs to place loads
/// ahead of their deadlines and detect serial/pipelining conflicts.
pub trait CostOracle {
    /// Cost, in cycles, of executing `op` (merged-op granularity, keyed by
    /// the atomic [`OpCode`] it came from).
    fn cost(&self, op_code: OpCode) -> Cycles;
}

/// An oracle that reports every operation as free. Used for offline plan
/// inspection where wall-clock accuracy does not matter, and in tests that
/// only care about ordering, not duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl CostOracle for NullOracle {
    fn cost(&self, _op_code: OpCode) -> Cycles {
        Cycles::ZERO
    }
}

/// A fixed per-opcode cost table, calibrated against real hardware timing.
#[derive(Debug, Clone)]
pub struct CostTable {
    costs: HashMap<OpCode, Cycles>,
    default: Cycles,
}

impl CostTable {
    /// An empty table; every opcode falls back to `default`.
    pub fn with_default(default: Cycles) -> CostTable {
        CostTable { costs: HashMap::new(), default }
    }

    pub fn set(&mut self, op_code: OpCode, cost: Cycles) -> &mut Self {
        self.costs.insert(op_code, cost);
        self
    }
}

/// A [`CostOracle`] backed by a [`CostTable`].
#[derive(Debug, Clone)]
pub struct TableOracle {
    table: CostTable,
}

impl TableOracle {
    pub fn new(table: CostTable) -> TableOracle {
        TableOracle { table }
    }
}

impl CostOracle for TableOracle {
    fn cost(&self, op_code: OpCode) -> Cycles {
        self.table.costs.get(&op_code).copied().unwrap_or(self.table.default)
    }
}
