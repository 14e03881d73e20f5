//! Pass 3: late-as-possible pipelining of flexible LOAD ops ahead of the
//! PLAY op that depends on them, so a board's idle time between events is
//! filled rather than padded.

use std::collections::HashMap;

use super::extract::Event;
use crate::ids::BoardId;
use crate::op::{OpCode, TimingClass};
use crate::time::Cycles;

/// Pair each flexible (LOAD-class) event with the next chronological
/// critical event on the same channel that it feeds — the PLAY it must
/// finish before.
pub(crate) fn identify_pairs(events: &[Event]) -> Vec<(usize, usize)> {
    let mut by_channel: HashMap<_, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        by_channel.entry(event.channel).or_default().push(idx);
    }

    let mut pairs = Vec::new();
    for indices in by_channel.values() {
        let mut sorted = indices.clone();
        sorted.sort_by_key(|&i| events[i].original_timestamp);
        for window in sorted.windows(2) {
            let (a, b) = (window[0], window[1]);
            if events[a].op_code.timing_class() == TimingClass::Flexible
                && events[b].op_code.timing_class() == TimingClass::Critical
            {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Reschedule each paired LOAD as late as possible without overlapping
/// another flexible event already committed on the same board, processing
/// pairs in descending order of their PLAY's start time so the
/// latest-deadline work claims its slot first.
pub(crate) fn schedule_pipelining(events: &mut [Event], pairs: &[(usize, usize)]) {
    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.sort_by(|&a, &b| {
        let play_a = pairs[a].1;
        let play_b = pairs[b].1;
        events[play_b]
            .timestamp
            .cmp(&events[play_a].timestamp)
            .then(events[play_b].channel.cmp(&events[play_a].channel))
    });

    let mut next_load_available: HashMap<BoardId, Cycles> = HashMap::new();

    for idx in order {
        let (load_idx, play_idx) = pairs[idx];
        let board = events[load_idx].board;
        let play_start = events[play_idx].timestamp;
        let load_cost = events[load_idx].cost;
        let next_avail = *next_load_available.get(&board).unwrap_or(&Cycles(u64::MAX));
        let latest_finish_by = play_start.min(next_avail);
        let mut proposed_start = latest_finish_by.saturating_sub(load_cost);

        loop {
            let conflict = events.iter().enumerate().find(|(i, e)| {
                *i != load_idx
                    && e.board == board
                    && e.epoch == events[play_idx].epoch
                    && e.op_code.timing_class() == TimingClass::Flexible
                    && overlaps(e.timestamp, e.timestamp + e.cost, proposed_start, latest_finish_by)
            });
            match conflict {
                Some((_, conflicting)) => {
                    proposed_start = conflicting.timestamp.saturating_sub(load_cost);
                }
                None => break,
            }
        }

        let old_start = events[load_idx].original_timestamp;
        log::trace!(
            "pass 3: rescheduled LOAD on {board} from {}c to {}c",
            old_start.0,
            proposed_start.0
        );
        events[load_idx].timestamp = proposed_start;
        next_load_available.insert(board, proposed_start);
    }
}

fn overlaps(a_start: Cycles, a_end: Cycles, b_start: Cycles, b_end: Cycles) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BoardId, Channel, ChannelKind};

    fn event(channel: Channel, op_code: OpCode, ts: u64, cost: u64) -> Event {
        Event {
            board: channel.board,
            channel,
            op_code,
            payload: None,
            timestamp: Cycles(ts),
            original_timestamp: Cycles(ts),
            epoch: 0,
            cost: Cycles(cost),
        }
    }

    #[test]
    fn a_load_is_pulled_back_to_meet_its_play_deadline() {
        let board = BoardId::named("scheduler-test-board");
        let ch = Channel::new(board, ChannelKind::Waveform, 0);
        let mut events = vec![
            event(ch, OpCode::WfLoadCoeffs, 0, 200),
            event(ch, OpCode::WfUpdateParams, 1_000, 0),
        ];
        let pairs = identify_pairs(&events);
        assert_eq!(pairs, vec![(0, 1)]);
        schedule_pipelining(&mut events, &pairs);
        assert_eq!(events[0].timestamp, Cycles(800));
    }

    #[test]
    fn two_loads_on_one_board_do_not_overlap_after_scheduling() {
        let board = BoardId::named("scheduler-test-board-2");
        let ch_a = Channel::new(board, ChannelKind::Waveform, 0);
        let ch_b = Channel::new(board, ChannelKind::Waveform, 1);
        let mut events = vec![
            event(ch_a, OpCode::WfLoadCoeffs, 0, 300),
            event(ch_a, OpCode::WfUpdateParams, 1_000, 0),
            event(ch_b, OpCode::WfLoadCoeffs, 0, 300),
            event(ch_b, OpCode::WfUpdateParams, 900, 0),
        ];
        let pairs = identify_pairs(&events);
        schedule_pipelining(&mut events, &pairs);
        let load_a_start = events[0].timestamp;
        let load_a_end = load_a_start + events[0].cost;
        let load_b_start = events[2].timestamp;
        let load_b_end = load_b_start + events[2].cost;
        assert!(!overlaps(load_a_start, load_a_end, load_b_start, load_b_end));
    }
}
