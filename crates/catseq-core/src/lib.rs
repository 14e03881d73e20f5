//! # catseq-core
//!
//! **An algebraic compiler for real-time waveform-generation hardware.**
//!
//! `catseq-core` turns a composed *morphism* — a typed, time-bounded
//! transformation over a set of named hardware channels — into a
//! deterministic, cycle-accurate stream of low-level instructions for a
//! multi-board real-time waveform generation (RWG) platform.
//!
//! ## Quick Start
//!
//! ```no_run
//! use catseq_core::prelude::*;
//!
//! let ch = Channel::new(BoardId::main(), ChannelKind::Digital, 0);
//! let pulse = factory::digital_pulse(ch, Cycles(2_500)).unwrap();
//! let plan = compile(&pulse, &NullOracle, &CompileOptions::default()).unwrap();
//! assert!(plan.contains_key(&BoardId::main()));
//! ```
//!
//! ## Architecture
//!
//! Composition algebra (`|`, `@`, `>>`) → Pass 1 event extraction → Pass 2
//! cost & epoch analysis → Pass 3 scheduling (pipelining) → Pass 4
//! validation → Pass 5 emission.
//!
//! Every morphism is immutable once built; composition produces a new
//! morphism that structurally shares its inputs. The compile pipeline itself
//! is synchronous and single-threaded (see the [`compiler`] module): the
//! user-level "parallel composition" of channels is an algebraic statement
//! about simultaneous intent, not a runtime concurrency mechanism.

pub mod compiler;
pub mod compose;
pub mod demo;
pub mod error;
pub mod factory;
pub mod ids;
pub mod isa;
pub mod lane;
pub mod morphism;
pub mod op;
pub mod state;
pub mod time;

pub use compiler::{CompileOptions, compile};
pub use error::{CompileError, CompositionError};
pub use ids::{BoardId, Channel, ChannelKind};
pub use isa::{CostOracle, CostTable, FunctionCode, Instruction, NullOracle, TableOracle, Value};
pub use morphism::Morphism;
pub use op::{AtomicOp, OpCode, Payload, TimingClass};
pub use state::{ChannelState, DigitalState, Tone, ToneParams, WaveformState};
pub use time::{CLOCK_HZ, Cycles, Seconds};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for building and compiling morphisms.
pub mod prelude {
    pub use crate::compiler::{CompileOptions, compile};
    pub use crate::error::{CompileError, CompositionError};
    pub use crate::factory;
    pub use crate::ids::{BoardId, Channel, ChannelKind};
    pub use crate::isa::{CostOracle, NullOracle, TableOracle};
    pub use crate::morphism::Morphism;
    pub use crate::state::{ChannelState, DigitalState, ToneParams};
    pub use crate::time::{Cycles, Seconds};
}
