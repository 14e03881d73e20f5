//! Pass 2: epoch boundary detection and cost assignment.
//!
//! A sync barrier (co-occurring `SYNC_MASTER` and `SYNC_SLAVE` events at the
//! same timestamp) closes an epoch: cross-epoch timing relationships are
//! nonsensical, since each board's clock is only jointly meaningful within
//! one epoch. Events are relabelled with a logical timestamp relative to
//! their own epoch's start so Pass 3/4 never need to special-case offsets.

use std::collections::BTreeSet;

use super::extract::Event;
use crate::isa::CostOracle;
use crate::op::OpCode;
use crate::time::Cycles;

pub(crate) fn assign_epochs(events: &mut [Event]) {
    let mut distinct_ts: Vec<Cycles> = events.iter().map(|e| e.original_timestamp).collect();
    distinct_ts.sort();
    distinct_ts.dedup();

    let boundaries: BTreeSet<Cycles> = distinct_ts
        .iter()
        .copied()
        .filter(|&ts| {
            let has_master = events
                .iter()
                .any(|e| e.original_timestamp == ts && e.op_code == OpCode::SyncMaster);
            let has_slave = events
                .iter()
                .any(|e| e.original_timestamp == ts && e.op_code == OpCode::SyncSlave);
            has_master && has_slave
        })
        .collect();

    let mut epoch_of_ts = std::collections::HashMap::new();
    let mut epoch_start_of_ts = std::collections::HashMap::new();
    let mut current_epoch = 0u32;
    let mut epoch_start = Cycles::ZERO;
    for ts in distinct_ts {
        epoch_of_ts.insert(ts, current_epoch);
        epoch_start_of_ts.insert(ts, epoch_start);
        if boundaries.contains(&ts) {
            current_epoch += 1;
            epoch_start = ts;
        }
    }

    for event in events.iter_mut() {
        let epoch = epoch_of_ts[&event.original_timestamp];
        let start = epoch_start_of_ts[&event.original_timestamp];
        event.epoch = epoch;
        event.timestamp = event.original_timestamp.saturating_sub(start);
    }

    log::debug!("pass 2: {} epoch(s) after boundary detection", current_epoch + 1);
}

pub(crate) fn assign_costs(events: &mut [Event], oracle: &dyn CostOracle) {
    for event in events.iter_mut() {
        event.cost = oracle.cost(event.op_code);
    }
    let total: u64 = events.iter().map(|e| e.cost.0).sum();
    log::debug!("pass 2: assigned cost to {} event(s), {total} total cycle(s)", events.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BoardId, Channel, ChannelKind};
    use crate::op::Payload;

    fn event(channel: Channel, op_code: OpCode, ts: u64) -> Event {
        Event {
            board: channel.board,
            channel,
            op_code,
            payload: Some(Payload::SyncCode(0)),
            timestamp: Cycles(ts),
            original_timestamp: Cycles(ts),
            epoch: 0,
            cost: Cycles::ZERO,
        }
    }

    #[test]
    fn a_sync_pair_closes_an_epoch_and_resets_logical_time() {
        let master_board = BoardId::named("epoch-test-main");
        let slave_board = BoardId::named("epoch-test-slave");
        let master_ch = Channel::new(master_board, ChannelKind::Digital, 0);
        let slave_ch = Channel::new(slave_board, ChannelKind::Digital, 0);

        let mut events = vec![
            event(master_ch, OpCode::TtlOn, 0),
            event(master_ch, OpCode::SyncMaster, 100),
            event(slave_ch, OpCode::SyncSlave, 100),
            event(slave_ch, OpCode::TtlOn, 150),
        ];
        assign_epochs(&mut events);

        assert_eq!(events[0].epoch, 0);
        assert_eq!(events[1].epoch, 0);
        assert_eq!(events[2].epoch, 0);
        assert_eq!(events[3].epoch, 1);
        assert_eq!(events[3].timestamp, Cycles(50));
    }

    #[test]
    fn no_sync_pair_means_a_single_epoch() {
        let board = BoardId::named("epoch-test-single");
        let ch = Channel::new(board, ChannelKind::Digital, 0);
        let mut events = vec![event(ch, OpCode::TtlOn, 0), event(ch, OpCode::TtlOff, 500)];
        assign_epochs(&mut events);
        assert_eq!(events[0].epoch, 0);
        assert_eq!(events[1].epoch, 0);
        assert_eq!(events[1].timestamp, Cycles(500));
    }
}
