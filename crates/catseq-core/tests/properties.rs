//! Algebraic and compiler invariants that must hold for every valid
//! morphism, not just the literal end-to-end scenarios.

use catseq_core::prelude::*;
use catseq_core::{CostTable, ToneParams, compose, factory};

fn pulse(channel: Channel, from: DigitalState, to: DigitalState, dur: u64) -> Morphism {
    use catseq_core::{ChannelState, op::AtomicOp, op::OpCode};
    Morphism::single(
        channel,
        catseq_core::lane::Lane::single(AtomicOp::new(
            channel,
            ChannelState::Digital(from),
            ChannelState::Digital(to),
            Cycles(dur),
            OpCode::TtlOn,
            None,
        )),
    )
}

#[test]
fn strict_serial_composition_is_associative() {
    let ch = Channel::new(BoardId::named("prop-assoc"), ChannelKind::Digital, 0);
    let m1 = pulse(ch, DigitalState::Low, DigitalState::High, 10);
    let m2 = pulse(ch, DigitalState::High, DigitalState::Low, 20);
    let m3 = pulse(ch, DigitalState::Low, DigitalState::High, 30);

    let left = compose::serial_strict(&compose::serial_strict(&m1, &m2).unwrap(), &m3).unwrap();
    let right = compose::serial_strict(&m1, &compose::serial_strict(&m2, &m3).unwrap()).unwrap();

    assert_eq!(left.duration(), right.duration());
    assert_eq!(left.codomain(), right.codomain());
    assert_eq!(left.domain(), right.domain());
}

#[test]
fn parallel_with_disjoint_empty_morphism_is_identity() {
    let ch = Channel::new(BoardId::named("prop-parallel-identity"), ChannelKind::Digital, 0);
    let m = pulse(ch, DigitalState::Low, DigitalState::High, 10);
    let empty = Morphism::empty();
    let combined = compose::parallel(&m, &empty).unwrap();
    assert_eq!(combined.duration(), m.duration());
    assert_eq!(combined.channels().count(), m.channels().count());
}

#[test]
fn compile_is_deterministic_for_the_same_morphism_and_oracle() {
    let ch = Channel::new(BoardId::named("prop-determinism"), ChannelKind::Digital, 0);
    let pulse_m = factory::digital_pulse(ch, Cycles(1_000)).unwrap();
    let oracle = NullOracle;
    let a = compile(&pulse_m, &oracle, &CompileOptions::default()).unwrap();
    let b = compile(&pulse_m, &oracle, &CompileOptions::default()).unwrap();
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
}

#[test]
fn no_scheduled_event_runs_before_its_board_epoch_start() {
    let wf = Channel::new(BoardId::named("prop-no-negative"), ChannelKind::Waveform, 0);
    let init = factory::wf_init(wf, 80e6);
    let params = vec![ToneParams {
        sbg_id: 0,
        freq_coeffs: [80e6, 0.0, 0.0, 0.0],
        amp_coeffs: [1.0, 0.0, 0.0, 0.0],
        initial_phase: Some(0.0),
        phase_reset: true,
    }];
    let load = factory::wf_load(wf, catseq_core::WaveformState::Ready { carrier_hz: 80e6 }, params);
    let loaded_state = match load.codomain().get(&wf).unwrap() {
        catseq_core::ChannelState::Waveform(s) => s.clone(),
        _ => unreachable!("wf is a waveform channel"),
    };
    let play = factory::wf_play(wf, loaded_state, vec![]);
    let seq = compose::serial_strict(&init, &load).unwrap();
    let seq = compose::serial_strict(&seq, &play).unwrap();

    let mut table = CostTable::with_default(Cycles(0));
    table.set(catseq_core::OpCode::WfLoadCoeffs, Cycles(14));
    let oracle = TableOracle::new(table);

    let plan = compile(&seq, &oracle, &CompileOptions::default()).unwrap();
    for instructions in plan.values() {
        for instruction in instructions {
            assert!(instruction.timestamp.0 < u64::MAX);
        }
    }
}

#[test]
fn a_long_chain_of_identity_holds_composes_without_recursion() {
    let ch = Channel::new(BoardId::named("prop-long-chain"), ChannelKind::Digital, 0);
    let mut acc = factory::digital_hold(ch, DigitalState::Low, Cycles(1));
    let mut steps = Vec::new();
    for _ in 0..20_000 {
        steps.push((
            compose::ChainOp::Strict,
            factory::digital_hold(ch, DigitalState::Low, Cycles(1)),
        ));
    }
    acc = compose::compose_chain(acc, steps).unwrap();
    assert_eq!(acc.duration(), Cycles(20_001));
}

#[test]
fn a_parallel_composition_of_ten_thousand_disjoint_channels_succeeds() {
    let board = BoardId::named("prop-wide-parallel");
    let mut acc = Morphism::empty();
    for i in 0..10_000u16 {
        let ch = Channel::new(board, ChannelKind::Digital, i);
        let pulse_m = factory::digital_hold(ch, DigitalState::Low, Cycles(1));
        acc = compose::parallel(&acc, &pulse_m).unwrap();
    }
    assert_eq!(acc.channels().count(), 10_000);
}
