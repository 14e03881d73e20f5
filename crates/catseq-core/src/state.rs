//! Channel state model.
//!
//! `State` is a closed tagged variant (sum type), not a class hierarchy: one
//! variant family per [`crate::ids::ChannelKind`]. The match over variant
//! kind is exhaustive wherever Pass 1/2 inspect state (see
//! `crate::compiler::extract`); exhaustiveness here is a correctness
//! property, not a style preference.

/// State of a digital (TTL) channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitalState {
    Uninitialised,
    Low,
    High,
}

/// A single frequency/amplitude/phase oscillator within a waveform channel
/// (a sub-band generator, SBG).
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    pub sbg_id: u8,
    pub frequency_hz: f64,
    pub amplitude: f64,
    pub phase_rad: f64,
}

/// Taylor-coefficient parameters for loading a tone onto an SBG ahead of
/// the update that makes it audible.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneParams {
    pub sbg_id: u8,
    pub freq_coeffs: [f64; 4],
    pub amp_coeffs: [f64; 4],
    pub initial_phase: Option<f64>,
    pub phase_reset: bool,
}

/// State of a waveform-synthesiser channel.
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformState {
    Uninitialised,
    Ready {
        carrier_hz: f64,
    },
    Active {
        carrier_hz: f64,
        rf_on: bool,
        snapshot: Vec<Tone>,
        pending: Vec<ToneParams>,
    },
}

/// The state of a channel, tagged by its kind.
///
/// Structural equality includes carrier frequencies and tone snapshots, as
/// required by the composition engine's state-continuity check
/// (`crate::compose`).
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelState {
    Digital(DigitalState),
    Waveform(WaveformState),
}

impl ChannelState {
    pub fn is_digital(&self) -> bool {
        matches!(self, ChannelState::Digital(_))
    }

    pub fn is_waveform(&self) -> bool {
        matches!(self, ChannelState::Waveform(_))
    }

    /// The variant name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChannelState::Digital(_) => "digital",
            ChannelState::Waveform(_) => "waveform",
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelState::Digital(DigitalState::Uninitialised) => write!(f, "digital(uninit)"),
            ChannelState::Digital(DigitalState::Low) => write!(f, "digital(low)"),
            ChannelState::Digital(DigitalState::High) => write!(f, "digital(high)"),
            ChannelState::Waveform(WaveformState::Uninitialised) => write!(f, "waveform(uninit)"),
            ChannelState::Waveform(WaveformState::Ready { carrier_hz }) => {
                write!(f, "waveform(ready @ {carrier_hz} Hz)")
            }
            ChannelState::Waveform(WaveformState::Active { carrier_hz, rf_on, snapshot, .. }) => {
                write!(
                    f,
                    "waveform(active @ {carrier_hz} Hz, rf={rf_on}, {} tones)",
                    snapshot.len()
                )
            }
        }
    }
}
