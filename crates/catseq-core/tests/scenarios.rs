//! End-to-end scenarios, one per named case.

use catseq_core::isa::FunctionCode;
use catseq_core::prelude::*;
use catseq_core::{CostTable, TableOracle, compose, factory};

/// S1 — single digital pulse, one board.
#[test]
fn s1_single_digital_pulse() {
    let ch = Channel::new(BoardId::main(), ChannelKind::Digital, 0);
    let pulse = factory::digital_pulse(ch, Cycles(2_500)).unwrap();
    assert_eq!(pulse.duration(), Cycles(2_500));

    let plan = compile(&pulse, &NullOracle, &CompileOptions::default()).unwrap();
    let instructions = &plan[&BoardId::main()];

    let configs: Vec<_> = instructions.iter().filter(|i| i.function == FunctionCode::TtlConfig).collect();
    assert_eq!(configs.len(), 0, "digital_pulse doesn't emit TTL_INIT; only TtlOn/TtlOff");

    let sets: Vec<_> = instructions.iter().filter(|i| i.function == FunctionCode::TtlSet).collect();
    assert_eq!(sets.len(), 2, "one TtlSet at rise, one at fall");
    assert_eq!(sets[0].timestamp, Cycles::ZERO);
    assert_eq!(sets[1].timestamp, Cycles(2_500));
}

/// S2 — parallel digital pulse on the same board; both channels merge into
/// one instruction per timestamp.
#[test]
fn s2_parallel_digital_pulse_merges_into_shared_masks() {
    let board = BoardId::main();
    let ch0 = Channel::new(board, ChannelKind::Digital, 0);
    let ch1 = Channel::new(board, ChannelKind::Digital, 1);
    let p0 = factory::digital_pulse(ch0, Cycles(2_500)).unwrap();
    let p1 = factory::digital_pulse(ch1, Cycles(2_500)).unwrap();
    let both = compose::parallel(&p0, &p1).unwrap();

    let plan = compile(&both, &NullOracle, &CompileOptions::default()).unwrap();
    let instructions = &plan[&board];
    let rise = instructions
        .iter()
        .find(|i| i.function == FunctionCode::TtlSet && i.timestamp == Cycles::ZERO)
        .unwrap();
    assert_eq!(rise.args[0], catseq_core::Value::Mask(0b11));

    let fall = instructions
        .iter()
        .find(|i| i.function == FunctionCode::TtlSet && i.timestamp == Cycles(2_500))
        .unwrap();
    assert_eq!(fall.args[1], catseq_core::Value::Mask(0b11));
}

/// S3 — a pipelined LOAD is pulled back to meet its PLAY deadline, and the
/// validator accepts the result.
#[test]
fn s3_pipelined_load_meets_its_deadline() {
    let wf = Channel::new(BoardId::named("rwg0"), ChannelKind::Waveform, 0);
    let carrier = 100e6;
    let tone_a = vec![ToneParams {
        sbg_id: 0,
        freq_coeffs: [carrier, 0.0, 0.0, 0.0],
        amp_coeffs: [1.0, 0.0, 0.0, 0.0],
        initial_phase: Some(0.0),
        phase_reset: true,
    }];
    let tone_b = vec![ToneParams {
        sbg_id: 0,
        freq_coeffs: [carrier * 2.0, 0.0, 0.0, 0.0],
        amp_coeffs: [1.0, 0.0, 0.0, 0.0],
        initial_phase: Some(0.0),
        phase_reset: true,
    }];

    let waveform_state_of = |m: &catseq_core::Morphism| -> catseq_core::WaveformState {
        match m.codomain().get(&wf).unwrap() {
            catseq_core::ChannelState::Waveform(s) => s.clone(),
            _ => unreachable!("wf is a waveform channel"),
        }
    };

    let init = factory::wf_init(wf, carrier);
    let settle = factory::wf_hold(wf, init.codomain().get(&wf).unwrap().clone(), Cycles(50_000 / 4));
    let seq = compose::serial_strict(&init, &settle).unwrap();

    let load_a = factory::wf_load(wf, waveform_state_of(&seq), tone_a);
    let seq = compose::serial_strict(&seq, &load_a).unwrap();

    let play_a = factory::wf_play(wf, waveform_state_of(&seq), vec![]);
    let seq = compose::serial_strict(&seq, &play_a).unwrap();

    let load_b = factory::wf_load(wf, waveform_state_of(&seq), tone_b);
    let seq = compose::serial_strict(&seq, &load_b).unwrap();

    let play_b = factory::wf_play(wf, waveform_state_of(&seq), vec![]);
    let seq = compose::serial_strict(&seq, &play_b).unwrap();

    let mut table = CostTable::with_default(Cycles(0));
    table.set(catseq_core::OpCode::WfLoadCoeffs, Cycles(14));
    let oracle = TableOracle::new(table);

    let plan = compile(&seq, &oracle, &CompileOptions::default()).unwrap();
    assert!(plan.contains_key(&BoardId::named("rwg0")));
}

/// S4 — multi-board sync barrier isolates an epoch boundary and emits the
/// master trigger and slave wait exactly once.
#[test]
fn s4_multi_board_sync_emits_trigger_and_wait_once() {
    let master_board = BoardId::main();
    let slave_board = BoardId::named("rwg0");
    let master_ch = Channel::new(master_board, ChannelKind::Digital, 0);
    let slave_ch = Channel::new(slave_board, ChannelKind::Digital, 0);

    let master_pre = factory::digital_hold(master_ch, DigitalState::Low, Cycles(1_000));
    let slave_pre = factory::digital_hold(slave_ch, DigitalState::Low, Cycles(1_000));
    let pre = compose::parallel(&master_pre, &slave_pre).unwrap();

    let barrier = factory::sync_barrier(
        master_ch,
        ChannelState::Digital(DigitalState::Low),
        &[(slave_ch, ChannelState::Digital(DigitalState::Low))],
        7,
    );
    let synced = compose::serial_auto(&pre, &barrier).unwrap();

    let master_post = factory::digital_hold(master_ch, DigitalState::Low, Cycles(50_000));
    let slave_post = factory::digital_hold(slave_ch, DigitalState::Low, Cycles(50_000));
    let post = compose::parallel(&master_post, &slave_post).unwrap();
    let full = compose::serial_auto(&synced, &post).unwrap();

    let plan = compile(&full, &NullOracle, &CompileOptions::default()).unwrap();

    let master_trigs: Vec<_> = plan[&master_board]
        .iter()
        .filter(|i| i.function == FunctionCode::TrigSlave)
        .collect();
    assert_eq!(master_trigs.len(), 1);

    let slave_waits: Vec<_> = plan[&slave_board]
        .iter()
        .filter(|i| i.function == FunctionCode::WaitMaster)
        .collect();
    assert_eq!(slave_waits.len(), 1);
}

/// S5 — a state mismatch in strict serial composition is rejected.
#[test]
fn s5_state_mismatch_is_rejected() {
    let ch = Channel::new(BoardId::named("s5-board"), ChannelKind::Digital, 0);
    let on = factory::digital_hold(ch, DigitalState::High, Cycles(10));
    let on_again = factory::digital_hold(ch, DigitalState::High, Cycles(10));
    let err = compose::serial_strict(&on, &on_again).unwrap_err();
    assert!(matches!(err, catseq_core::CompositionError::StateMismatch { .. }));
}

/// S6 — parallel composition over the same channel is rejected as an
/// overlap.
#[test]
fn s6_channel_overlap_is_rejected() {
    let ch = Channel::new(BoardId::named("s6-board"), ChannelKind::Digital, 0);
    let on = factory::digital_hold(ch, DigitalState::High, Cycles(10));
    let off = factory::digital_hold(ch, DigitalState::Low, Cycles(10));
    let err = compose::parallel(&on, &off).unwrap_err();
    assert!(matches!(err, catseq_core::CompositionError::ChannelOverlap { .. }));
}
