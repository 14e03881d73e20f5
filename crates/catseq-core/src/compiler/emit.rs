//! Pass 5: merge same-timestamp, same-board events into wire instructions
//! and resolve the `WAIT_TIME_PLACEHOLDER` used by `SYNC_SLAVE`'s
//! `TRIG_SLAVE` emission.
//!
//! A master's wait time cannot be known until every board's full schedule
//! is known, so Pass 1-4 leave it as a placeholder and this pass fills it
//! in once from the global picture: the latest point any board is still
//! busy, plus a fixed safety margin.

use std::collections::BTreeMap;

use super::extract::Event;
use crate::ids::BoardId;
use crate::isa::{FunctionCode, Instruction, Value};
use crate::op::{OpCode, Payload};
use crate::time::Cycles;

pub(crate) fn emit(events: &[Event], margin: Cycles) -> BTreeMap<BoardId, Vec<Instruction>> {
    let master_wait_time = compute_master_wait_time(events, margin);

    let mut grouped: BTreeMap<(BoardId, Cycles), Vec<&Event>> = BTreeMap::new();
    for event in events {
        grouped.entry((event.board, event.timestamp)).or_default().push(event);
    }

    let mut plan: BTreeMap<BoardId, Vec<Instruction>> = BTreeMap::new();
    for ((board, timestamp), bucket) in grouped {
        for instruction in lower_bucket(board, timestamp, &bucket, master_wait_time) {
            plan.entry(board).or_default().push(instruction);
        }
    }

    for (board, instructions) in &plan {
        log::debug!("pass 5: board {board} emitted {} instruction(s)", instructions.len());
    }
    log::debug!("pass 5: master wait time {}c", master_wait_time.0);
    plan
}

fn compute_master_wait_time(events: &[Event], margin: Cycles) -> Cycles {
    events
        .iter()
        .map(Event::end)
        .max()
        .unwrap_or(Cycles::ZERO)
        + margin
}

fn lower_bucket(
    board: BoardId,
    timestamp: Cycles,
    bucket: &[&Event],
    master_wait_time: Cycles,
) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut ttl_init_mask = 0u32;
    let mut ttl_on_mask = 0u32;
    let mut ttl_off_mask = 0u32;
    let mut wf_init_seen = false;

    for event in bucket {
        match event.op_code {
            OpCode::TtlInit => ttl_init_mask |= 1 << event.channel.local_id,
            OpCode::TtlOn => ttl_on_mask |= 1 << event.channel.local_id,
            OpCode::TtlOff => ttl_off_mask |= 1 << event.channel.local_id,
            OpCode::WfInit => wf_init_seen = true,
            OpCode::WfSetCarrier => {
                if let Some(Payload::Carrier { hz }) = &event.payload {
                    instructions.push(Instruction::new(
                        board,
                        timestamp,
                        FunctionCode::RwgSetCarrier,
                        vec![Value::Int(event.channel.local_id as i64), Value::Float(*hz)],
                    ));
                }
            }
            OpCode::WfLoadCoeffs => {
                if let Some(Payload::ToneParamsSet(params)) = &event.payload {
                    instructions.push(Instruction::new(
                        board,
                        timestamp,
                        FunctionCode::RwgLoadWaveform,
                        vec![
                            Value::Int(event.channel.local_id as i64),
                            Value::Int(params.len() as i64),
                        ],
                    ));
                }
            }
            OpCode::WfUpdateParams => instructions.push(Instruction::new(
                board,
                timestamp,
                FunctionCode::RwgPlay,
                vec![Value::Mask(1 << event.channel.local_id)],
            )),
            OpCode::WfRfSwitch => instructions.push(Instruction::new(
                board,
                timestamp,
                FunctionCode::RwgRfSwitch,
                vec![Value::Int(event.channel.local_id as i64)],
            )),
            OpCode::SyncMaster => {
                if let Some(Payload::SyncCode(code)) = &event.payload {
                    instructions.push(Instruction::new(
                        board,
                        timestamp,
                        FunctionCode::TrigSlave,
                        vec![Value::Int(*code as i64), Value::Int(master_wait_time.0 as i64)],
                    ));
                }
            }
            OpCode::SyncSlave => {
                if let Some(Payload::SyncCode(code)) = &event.payload {
                    instructions.push(Instruction::new(
                        board,
                        timestamp,
                        FunctionCode::WaitMaster,
                        vec![Value::Int(*code as i64)],
                    ));
                }
            }
            OpCode::UserBlock => {
                if let Some(Payload::UserBlock(handle)) = &event.payload {
                    let mut args = vec![Value::Str(handle.name.clone())];
                    args.extend(handle.args.iter().cloned());
                    instructions.push(Instruction::new(board, timestamp, FunctionCode::UserBlock, args));
                }
            }
            OpCode::Identity => {}
        }
    }

    if wf_init_seen {
        instructions.push(Instruction::new(board, timestamp, FunctionCode::RwgInit, vec![]));
    }
    if ttl_init_mask != 0 {
        instructions.push(Instruction::new(
            board,
            timestamp,
            FunctionCode::TtlConfig,
            vec![Value::Mask(ttl_init_mask)],
        ));
    }
    if ttl_on_mask != 0 || ttl_off_mask != 0 {
        instructions.push(Instruction::new(
            board,
            timestamp,
            FunctionCode::TtlSet,
            vec![Value::Mask(ttl_on_mask), Value::Mask(ttl_off_mask)],
        ));
    }

    instructions
}
