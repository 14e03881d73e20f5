//! The compiler's error taxonomy.
//!
//! Errors are surfaced as structured values, not exceptions-for-flow.
//! Construction-time errors ([`CompositionError`]) are rejected immediately
//! from the operator that caused them. Compile-time errors
//! ([`CompileError`]) are produced by the pass that detected them and
//! carry board/event context; the compiler returns the first one it
//! encounters rather than attempting repair.

use crate::ids::{BoardId, Channel};
use crate::state::ChannelState;

/// Errors raised by the composition operators (`@`, `>>`, `|`).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CompositionError {
    #[error("channel overlap in parallel composition: {channels:?}")]
    ChannelOverlap { channels: Vec<Channel> },

    #[error("state mismatch on channel {channel}: expected {expected}, found {found}")]
    StateMismatch {
        channel: Channel,
        expected: ChannelState,
        found: ChannelState,
    },

    #[error("unknown channel in dict-form composition: {channel}")]
    UnknownChannel { channel: Channel },
}

/// Errors raised while running the five-pass compile pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("cross-epoch arithmetic between epoch {epoch_a} and epoch {epoch_b}")]
    CrossEpochError { epoch_a: u32, epoch_b: u32 },

    #[error(
        "serial LOAD violation on board {board}: events overlap between {event_a} and {event_b}"
    )]
    SerialViolation {
        board: BoardId,
        event_a: String,
        event_b: String,
    },

    #[error(
        "deadline violation on board {board}: LOAD ends at {load_end}c, PLAY starts at {play_start}c"
    )]
    DeadlineViolation {
        board: BoardId,
        load_end: u64,
        play_start: u64,
    },

    #[error("timing inconsistency on board {board}: {details}")]
    TimingInconsistency { board: BoardId, details: String },

    #[error(
        "cross-epoch pipelining on board {board}: LOAD at offset {offset}c in epoch following a PLAY in epoch {preceding_epoch}"
    )]
    CrossEpochPipelining {
        board: BoardId,
        offset: u64,
        preceding_epoch: u32,
    },

    #[error(
        "black-box conflict on board {board}: opaque user block [{block_start}, {block_end}) overlaps event at {conflicting_start}"
    )]
    BlackBoxConflict {
        board: BoardId,
        block_start: u64,
        block_end: u64,
        conflicting_start: u64,
    },
}
