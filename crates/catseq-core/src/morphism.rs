//! Morphisms: the composable, typed unit of a control sequence.

use std::collections::BTreeMap;

use crate::ids::Channel;
use crate::lane::Lane;
use crate::state::ChannelState;
use crate::time::Cycles;

/// A time-bounded transformation over a fixed set of named channels.
///
/// A morphism's domain and codomain are the per-channel states at its start
/// and end; its duration is the max over lanes (shorter lanes are padded
/// with an implicit identity by the composition layer before they are
/// stored here, so all lanes in a well-formed morphism share one duration).
///
/// Channels are keyed in a [`BTreeMap`] so that domain/codomain comparisons
/// and channel-set operations (union, intersection) in `crate::compose` are
/// order-independent and support plain structural equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Morphism {
    lanes: BTreeMap<Channel, Lane>,
    duration: Cycles,
}

impl Morphism {
    /// The identity morphism on an empty channel set, zero duration. The
    /// unit for `@`/`>>`/`|`.
    pub fn empty() -> Morphism {
        Morphism {
            lanes: BTreeMap::new(),
            duration: Cycles::ZERO,
        }
    }

    /// Build a morphism from one lane per channel. All lanes must already
    /// agree on duration; this is an invariant enforced by the only
    /// producers of this constructor (`crate::factory` and
    /// `crate::compose`), not re-validated here.
    pub fn from_lanes(lanes: BTreeMap<Channel, Lane>) -> Morphism {
        let duration = lanes.values().map(Lane::duration).max().unwrap_or(Cycles::ZERO);
        Morphism { lanes, duration }
    }

    pub fn single(channel: Channel, lane: Lane) -> Morphism {
        let duration = lane.duration();
        let mut lanes = BTreeMap::new();
        lanes.insert(channel, lane);
        Morphism { lanes, duration }
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.lanes.keys()
    }

    pub fn lane(&self, channel: &Channel) -> Option<&Lane> {
        self.lanes.get(channel)
    }

    pub fn lanes(&self) -> &BTreeMap<Channel, Lane> {
        &self.lanes
    }

    pub fn duration(&self) -> Cycles {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// The domain: state of every channel at the start of this morphism.
    pub fn domain(&self) -> BTreeMap<Channel, ChannelState> {
        self.lanes
            .iter()
            .map(|(ch, lane)| (*ch, lane.dom().clone()))
            .collect()
    }

    /// The codomain: state of every channel at the end of this morphism.
    pub fn codomain(&self) -> BTreeMap<Channel, ChannelState> {
        self.lanes
            .iter()
            .map(|(ch, lane)| (*ch, lane.cod().clone()))
            .collect()
    }
}
