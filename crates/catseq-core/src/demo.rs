//! Built-in demonstration scenarios, assembled purely from [`crate::factory`]
//! and [`crate::compose`].
//!
//! There is no textual front-end in this crate: a scenario is simply a
//! named recipe of factory calls and composition operators, the same
//! vocabulary a library caller would use directly. `catseq-cli` and
//! `catseq-server` both use this catalog so neither front-end needs its own
//! copy of example-sequence construction.

use crate::ids::{BoardId, Channel, ChannelKind};
use crate::morphism::Morphism;
use crate::state::{ChannelState, DigitalState, Tone, ToneParams};
use crate::time::Cycles;
use crate::{compose, factory};

pub fn names() -> &'static [&'static str] {
    &["digital-pulse-train", "waveform-handoff", "synced-pair"]
}

pub fn build(name: &str) -> Result<Morphism, String> {
    match name {
        "digital-pulse-train" => Ok(digital_pulse_train()),
        "waveform-handoff" => Ok(waveform_handoff()),
        "synced-pair" => Ok(synced_pair()),
        other => Err(format!(
            "unknown scenario '{other}', expected one of: {}",
            names().join(", ")
        )),
    }
}

fn digital_pulse_train() -> Morphism {
    let ch = Channel::new(BoardId::main(), ChannelKind::Digital, 0);
    let mut acc = factory::digital_pulse(ch, Cycles(500)).expect("pulse is well-formed");
    for _ in 0..3 {
        let next = factory::digital_pulse(ch, Cycles(500)).expect("pulse is well-formed");
        acc = compose::serial_strict(&acc, &next).expect("pulses are state-continuous");
    }
    acc
}

fn waveform_handoff() -> Morphism {
    let wf = Channel::new(BoardId::named("rwg0"), ChannelKind::Waveform, 0);
    let carrier = 80e6;
    let init = factory::wf_init(wf, carrier);
    let params = vec![ToneParams {
        sbg_id: 0,
        freq_coeffs: [carrier, 0.0, 0.0, 0.0],
        amp_coeffs: [1.0, 0.0, 0.0, 0.0],
        initial_phase: Some(0.0),
        phase_reset: true,
    }];
    let load = factory::wf_load(wf, crate::state::WaveformState::Ready { carrier_hz: carrier }, params);
    let tone = Tone {
        sbg_id: 0,
        frequency_hz: carrier,
        amplitude: 1.0,
        phase_rad: 0.0,
    };
    let loaded_state = match load.codomain().get(&wf).expect("load touches wf") {
        ChannelState::Waveform(s) => s.clone(),
        _ => unreachable!("wf is a waveform channel"),
    };
    let play = factory::wf_play(wf, loaded_state, vec![tone.clone()]);
    let active_state = play.codomain().get(&wf).expect("play touches wf").clone();
    let hold = factory::wf_hold(wf, active_state, Cycles(10_000));

    let seq = compose::serial_strict(&init, &load).expect("ready -> loaded is continuous");
    let seq = compose::serial_strict(&seq, &play).expect("loaded -> active is continuous");
    compose::serial_strict(&seq, &hold).expect("active -> held is continuous")
}

fn synced_pair() -> Morphism {
    let master_board = BoardId::main();
    let slave_board = BoardId::named("rwg0");
    let master_ch = Channel::new(master_board, ChannelKind::Digital, 0);
    let slave_ch = Channel::new(slave_board, ChannelKind::Digital, 0);

    let master_pre = factory::digital_hold(master_ch, DigitalState::Low, Cycles(1_000));
    let slave_pre = factory::digital_hold(slave_ch, DigitalState::Low, Cycles(1_000));
    let pre = compose::parallel(&master_pre, &slave_pre).expect("disjoint channels");

    let barrier = factory::sync_barrier(
        master_ch,
        ChannelState::Digital(DigitalState::Low),
        &[(slave_ch, ChannelState::Digital(DigitalState::Low))],
        42,
    );

    compose::serial_auto(&pre, &barrier).expect("barrier is state-continuous on both channels")
}
