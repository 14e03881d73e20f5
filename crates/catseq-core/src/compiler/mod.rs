//! The five-pass compile pipeline: event extraction, epoch analysis,
//! pipelining scheduling, validation, and instruction emission.

mod emit;
mod epoch;
mod extract;
mod scheduler;
mod validate;

use std::collections::BTreeMap;

use crate::error::CompileError;
use crate::ids::BoardId;
use crate::isa::{CostOracle, Instruction};
use crate::morphism::Morphism;
use crate::time::Cycles;

pub(crate) use extract::Event;

/// Tunables for a single compile run. Defaults match a conservative,
/// fully-validated run; `CompileOptions::fast()` skips the scheduler for
/// quick plan inspection.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Run Pass 3 (pipelining). Disabling it emits every flexible op at its
    /// original timestamp, which is always correct but leaves LOAD/PLAY
    /// gaps on the table.
    pub enable_pipelining: bool,
    /// Safety margin added to the computed master wait time in Pass 5, in
    /// cycles.
    pub sync_margin_cycles: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            enable_pipelining: true,
            sync_margin_cycles: 100,
        }
    }
}

impl CompileOptions {
    /// Skip pipelining; useful for `catseq-cli inspect` and tests that only
    /// care about correctness, not schedule density.
    pub fn fast() -> Self {
        CompileOptions {
            enable_pipelining: false,
            ..Default::default()
        }
    }
}

/// Run the full pipeline over `morphism`, producing one instruction stream
/// per board.
pub fn compile(
    morphism: &Morphism,
    oracle: &dyn CostOracle,
    options: &CompileOptions,
) -> Result<BTreeMap<BoardId, Vec<Instruction>>, CompileError> {
    let mut events = extract::extract(morphism);
    epoch::assign_epochs(&mut events);
    epoch::assign_costs(&mut events, oracle);

    if options.enable_pipelining {
        let pairs = scheduler::identify_pairs(&events);
        scheduler::schedule_pipelining(&mut events, &pairs);
    }

    validate::validate(&events)?;

    let margin = Cycles(options.sync_margin_cycles);
    Ok(emit::emit(&events, margin))
}
