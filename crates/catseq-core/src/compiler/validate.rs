//! Pass 4: reject schedules that violate hardware-serial or cross-epoch
//! invariants before anything is emitted.

use std::collections::HashMap;

use super::extract::Event;
use crate::error::CompileError;
use crate::ids::BoardId;
use crate::op::{OpCode, TimingClass};
use crate::time::Cycles;

pub(crate) fn validate(events: &[Event]) -> Result<(), CompileError> {
    if let Err(err) = check_serial_loads(events)
        .and_then(|_| check_deadlines(events))
        .and_then(|_| check_cross_epoch_pipelining(events))
        .and_then(|_| check_black_box_conflicts(events))
    {
        log::debug!("pass 4: validation failed: {err}");
        return Err(err);
    }
    log::debug!("pass 4: validator passed 4 checks over {} event(s)", events.len());
    Ok(())
}

fn by_board(events: &[Event]) -> HashMap<BoardId, Vec<&Event>> {
    let mut map: HashMap<BoardId, Vec<&Event>> = HashMap::new();
    for event in events {
        map.entry(event.board).or_default().push(event);
    }
    map
}

fn overlaps(a_start: Cycles, a_end: Cycles, b_start: Cycles, b_end: Cycles) -> bool {
    a_start < b_end && b_start < a_end
}

fn check_serial_loads(events: &[Event]) -> Result<(), CompileError> {
    for (board, board_events) in by_board(events) {
        let loads: Vec<&&Event> = board_events
            .iter()
            .filter(|e| e.op_code.timing_class() == TimingClass::Flexible)
            .collect();
        for i in 0..loads.len() {
            for j in (i + 1)..loads.len() {
                let a = loads[i];
                let b = loads[j];
                if a.epoch == b.epoch && overlaps(a.timestamp, a.end(), b.timestamp, b.end()) {
                    return Err(CompileError::SerialViolation {
                        board,
                        event_a: format!("{:?}@{}", a.op_code, a.timestamp),
                        event_b: format!("{:?}@{}", b.op_code, b.timestamp),
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_deadlines(events: &[Event]) -> Result<(), CompileError> {
    let mut by_channel: HashMap<_, Vec<&Event>> = HashMap::new();
    for event in events {
        by_channel.entry(event.channel).or_default().push(event);
    }
    for channel_events in by_channel.values() {
        let mut sorted = channel_events.clone();
        sorted.sort_by_key(|e| e.original_timestamp);
        for window in sorted.windows(2) {
            let (load, play) = (window[0], window[1]);
            if load.op_code.timing_class() == TimingClass::Flexible
                && play.op_code.timing_class() == TimingClass::Critical
                && load.epoch == play.epoch
                && load.end() > play.timestamp
            {
                return Err(CompileError::DeadlineViolation {
                    board: load.board,
                    load_end: load.end().0,
                    play_start: play.timestamp.0,
                });
            }
        }
    }
    Ok(())
}

fn check_cross_epoch_pipelining(events: &[Event]) -> Result<(), CompileError> {
    let mut by_channel: HashMap<_, Vec<&Event>> = HashMap::new();
    for event in events {
        by_channel.entry(event.channel).or_default().push(event);
    }
    for channel_events in by_channel.values() {
        let mut sorted = channel_events.clone();
        sorted.sort_by_key(|e| e.original_timestamp);
        for window in sorted.windows(2) {
            let (load, play) = (window[0], window[1]);
            if load.op_code.timing_class() == TimingClass::Flexible
                && play.op_code.timing_class() == TimingClass::Critical
                && load.epoch != play.epoch
            {
                return Err(CompileError::CrossEpochPipelining {
                    board: load.board,
                    offset: load.timestamp.0,
                    preceding_epoch: load.epoch,
                });
            }
        }
    }
    Ok(())
}

fn check_black_box_conflicts(events: &[Event]) -> Result<(), CompileError> {
    for (board, board_events) in by_board(events) {
        for (i, block) in board_events.iter().enumerate() {
            if block.op_code != OpCode::UserBlock {
                continue;
            }
            for (j, other) in board_events.iter().enumerate() {
                if i == j {
                    continue;
                }
                if other.epoch == block.epoch
                    && overlaps(block.timestamp, block.end(), other.timestamp, other.end())
                {
                    return Err(CompileError::BlackBoxConflict {
                        board,
                        block_start: block.timestamp.0,
                        block_end: block.end().0,
                        conflicting_start: other.timestamp.0,
                    });
                }
            }
        }
    }
    Ok(())
}
