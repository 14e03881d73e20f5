//! Composition algebra: `@` (serial strict), `>>` (serial auto-infer), and
//! `|` (parallel).
//!
//! All three operators are implemented as ordinary functions rather than
//! operator-trait overloads, so that [`compose_chain`] can fold a Vec of
//! thousands of morphisms with a single loop instead of recursing once per
//! link — plan graphs in this domain commonly run 10^4-10^5 links deep, well
//! past any comfortable native stack.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CompositionError;
use crate::ids::Channel;
use crate::lane::Lane;
use crate::morphism::Morphism;
use crate::op::AtomicOp;
use crate::state::ChannelState;
use crate::time::Cycles;

/// Serial strict composition (`@`): for channels present in both operands,
/// `a`'s codomain must equal `b`'s domain structurally. A channel present
/// in only one operand is never a conflict — the other side is padded with
/// an identity holding that channel's active state there, sized to the
/// other morphism's total duration. Fails only on a genuine `StateMismatch`.
pub fn serial_strict(a: &Morphism, b: &Morphism) -> Result<Morphism, CompositionError> {
    log::trace!("serial_strict: {} channels @ {} channels", a.channels().count(), b.channels().count());
    check_state_continuity(a, b)?;
    Ok(splice(a, b))
}

/// Serial auto-infer composition (`>>`): like `@` — a channel present in
/// only one operand is padded with an identity on the other side, sized to
/// its total duration; channels present in both must be state-continuous.
pub fn serial_auto(a: &Morphism, b: &Morphism) -> Result<Morphism, CompositionError> {
    log::trace!("serial_auto: {} channels >> {} channels", a.channels().count(), b.channels().count());
    check_state_continuity(a, b)?;
    Ok(splice(a, b))
}

/// Parallel composition (`|`): `a` and `b` must run over disjoint channel
/// sets. The result's duration is the max of the two; the shorter side is
/// padded with a trailing identity so every lane in the result shares one
/// duration.
pub fn parallel(a: &Morphism, b: &Morphism) -> Result<Morphism, CompositionError> {
    log::trace!("parallel: {} channels | {} channels", a.channels().count(), b.channels().count());
    let overlap: Vec<Channel> = a
        .channels()
        .filter(|c| b.lane(c).is_some())
        .copied()
        .collect();
    if !overlap.is_empty() {
        return Err(CompositionError::ChannelOverlap { channels: overlap });
    }
    let target = a.duration().max(b.duration());
    let mut lanes = BTreeMap::new();
    for (channel, lane) in a.lanes().iter().chain(b.lanes().iter()) {
        lanes.insert(*channel, pad_to(lane.clone(), target));
    }
    Ok(Morphism::from_lanes(lanes))
}

/// Compose `a` against a single named channel's dict entry (dict-form
/// `>>`): `b` supplies an explicit per-channel override morphism. Every
/// channel named in `overrides` must already exist in `a`.
pub fn serial_dict(
    a: &Morphism,
    overrides: &BTreeMap<Channel, Morphism>,
) -> Result<Morphism, CompositionError> {
    let mut result = a.clone();
    for (channel, sub) in overrides {
        if a.lane(channel).is_none() {
            return Err(CompositionError::UnknownChannel { channel: *channel });
        }
        result = serial_auto(&result, sub)?;
    }
    Ok(result)
}

/// A single step in a composition chain, built with [`compose_chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    Strict,
    Auto,
    Parallel,
}

/// Fold a sequence of `(operator, morphism)` pairs left-to-right with an
/// explicit accumulator loop, avoiding one stack frame per link.
pub fn compose_chain(
    start: Morphism,
    steps: impl IntoIterator<Item = (ChainOp, Morphism)>,
) -> Result<Morphism, CompositionError> {
    let mut acc = start;
    for (op, next) in steps {
        acc = match op {
            ChainOp::Strict => serial_strict(&acc, &next)?,
            ChainOp::Auto => serial_auto(&acc, &next)?,
            ChainOp::Parallel => parallel(&acc, &next)?,
        };
    }
    Ok(acc)
}

fn check_state_continuity(a: &Morphism, b: &Morphism) -> Result<(), CompositionError> {
    let a_cod = a.codomain();
    let b_dom = b.domain();
    for (channel, expected) in &a_cod {
        if let Some(found) = b_dom.get(channel) {
            if found != expected {
                return Err(CompositionError::StateMismatch {
                    channel: *channel,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Concatenate `a` then `b` channel-by-channel. A channel present on only
/// one side is padded on the other with an identity holding that channel's
/// active state there, sized to the other morphism's total duration, so
/// every lane in the result spans `a.duration() + b.duration()`.
fn splice(a: &Morphism, b: &Morphism) -> Morphism {
    let mut lanes = BTreeMap::new();
    let channels: BTreeSet<Channel> = a.channels().chain(b.channels()).copied().collect();
    for channel in channels {
        let lane = match (a.lane(&channel), b.lane(&channel)) {
            (Some(la), Some(lb)) => {
                let mut lane = la.clone();
                lane.extend(lb.clone());
                lane
            }
            (Some(la), None) => pad_trailing(la.clone(), b.duration()),
            (None, Some(lb)) => pad_leading(lb.clone(), a.duration()),
            (None, None) => unreachable!("channel came from a or b's channel set"),
        };
        lanes.insert(channel, lane);
    }
    Morphism::from_lanes(lanes)
}

/// Append a trailing identity holding `lane`'s end state, so its absence
/// from the other operand doesn't shorten it relative to the shared result.
fn pad_trailing(mut lane: Lane, duration: Cycles) -> Lane {
    if duration != Cycles::ZERO {
        let state = lane.cod().clone();
        lane.push(AtomicOp::identity(channel_for(&lane), state, duration));
    }
    lane
}

/// Prepend a leading identity holding `lane`'s start state, so a channel
/// that only appears in the right-hand operand still starts at the left
/// operand's beginning.
fn pad_leading(lane: Lane, duration: Cycles) -> Lane {
    if duration == Cycles::ZERO {
        return lane;
    }
    let channel = channel_for(&lane);
    let state = lane.dom().clone();
    let mut padded = Lane::empty(state.clone());
    padded.push(AtomicOp::identity(channel, state, duration));
    padded.extend(lane);
    padded
}

fn pad_to(mut lane: Lane, target: Cycles) -> Lane {
    let gap = target.saturating_sub(lane.duration());
    if gap != Cycles::ZERO {
        let end_state: ChannelState = lane.cod().clone();
        lane.push(AtomicOp::identity(channel_for(&lane), end_state, gap));
    }
    lane
}

/// A [`Lane`] carries no channel of its own; recover it from an existing
/// op, since every lane padding is applied to is non-empty — it came from a
/// morphism with at least one op on that channel.
fn channel_for(lane: &Lane) -> Channel {
    lane.ops()
        .first()
        .map(|op| op.channel)
        .expect("padding helpers are only called on non-empty lanes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BoardId, ChannelKind};
    use crate::op::OpCode;
    use crate::state::DigitalState;
    use crate::time::Cycles;

    fn ch(local: u16) -> Channel {
        Channel::new(BoardId::named("compose-test-board"), ChannelKind::Digital, local)
    }

    fn pulse(channel: Channel, from: DigitalState, to: DigitalState, dur: u64) -> Morphism {
        let op = AtomicOp::new(
            channel,
            ChannelState::Digital(from),
            ChannelState::Digital(to),
            Cycles(dur),
            OpCode::TtlOn,
            None,
        );
        Morphism::single(channel, Lane::single(op))
    }

    #[test]
    fn strict_composition_pads_channels_present_on_only_one_side() {
        let a = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        let b = pulse(ch(1), DigitalState::Low, DigitalState::High, 4);
        let composed = serial_strict(&a, &b).unwrap();
        assert_eq!(composed.duration(), Cycles(14));

        let lane0 = composed.lane(&ch(0)).unwrap();
        assert_eq!(lane0.duration(), Cycles(14));
        assert_eq!(lane0.cod(), &ChannelState::Digital(DigitalState::High));

        let lane1 = composed.lane(&ch(1)).unwrap();
        assert_eq!(lane1.duration(), Cycles(14));
        assert_eq!(lane1.dom(), &ChannelState::Digital(DigitalState::Low));
    }

    #[test]
    fn strict_composition_checks_state_continuity() {
        let a = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        let b = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        assert!(matches!(
            serial_strict(&a, &b),
            Err(CompositionError::StateMismatch { .. })
        ));
    }

    #[test]
    fn strict_composition_splices_continuous_lanes() {
        let a = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        let b = pulse(ch(0), DigitalState::High, DigitalState::Low, 5);
        let composed = serial_strict(&a, &b).unwrap();
        assert_eq!(composed.duration(), Cycles(15));
        assert_eq!(composed.codomain().get(&ch(0)), Some(&ChannelState::Digital(DigitalState::Low)));
    }

    #[test]
    fn auto_composition_pads_untouched_channels_to_the_shared_duration() {
        let a_ch0 = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        let a_ch1 = pulse(ch(1), DigitalState::Low, DigitalState::High, 10);
        let a = parallel(&a_ch0, &a_ch1).unwrap();
        let b = pulse(ch(0), DigitalState::High, DigitalState::Low, 5);
        let composed = serial_auto(&a, &b).unwrap();
        assert_eq!(composed.duration(), Cycles(15));
        let lane1 = composed.lane(&ch(1)).unwrap();
        assert_eq!(lane1.duration(), Cycles(15));
        assert_eq!(lane1.cod(), &ChannelState::Digital(DigitalState::High));
    }

    #[test]
    fn parallel_rejects_overlapping_channels() {
        let a = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        let b = pulse(ch(0), DigitalState::Low, DigitalState::High, 5);
        assert!(matches!(parallel(&a, &b), Err(CompositionError::ChannelOverlap { .. })));
    }

    #[test]
    fn parallel_pads_shorter_side() {
        let a = pulse(ch(0), DigitalState::Low, DigitalState::High, 10);
        let b = pulse(ch(1), DigitalState::Low, DigitalState::High, 30);
        let composed = parallel(&a, &b).unwrap();
        assert_eq!(composed.duration(), Cycles(30));
        assert_eq!(composed.lane(&ch(0)).unwrap().duration(), Cycles(30));
    }

    #[test]
    fn compose_chain_folds_a_long_sequence_without_recursion() {
        let mut acc = pulse(ch(0), DigitalState::Low, DigitalState::High, 1);
        let mut steps = Vec::new();
        let mut state = DigitalState::High;
        for _ in 0..5_000 {
            let next = if state == DigitalState::High { DigitalState::Low } else { DigitalState::High };
            steps.push((ChainOp::Strict, pulse(ch(0), state, next, 1)));
            state = next;
        }
        let result = compose_chain(std::mem::replace(&mut acc, Morphism::empty()), steps).unwrap();
        assert_eq!(result.duration(), Cycles(5_001));
    }
}
