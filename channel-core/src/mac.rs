//! MacModel (C8): produces per-interferer activity probabilities from
//! geometry and static schedule. Pure function of its inputs; no internal
//! state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{node::NodeId, position::Position, units::Length};

pub const DEFAULT_CARRIER_SENSE_MULTIPLIER: f64 = 2.5;
pub const DEFAULT_TRAFFIC_LOAD: f64 = 0.3;

/// Every interferer transmits with probability 1.0: the worst case, with no
/// MAC-aware spatial reuse modelled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NoMac;

impl NoMac {
    pub fn activity_probability(
        &self,
        _tx: &NodeId,
        _rx: &NodeId,
        _interferer: &NodeId,
        _positions: &HashMap<NodeId, Position>,
        _comm_range: Length,
    ) -> f64 {
        1.0
    }
}

/// Statistical carrier-sense model: an interferer within carrier-sense
/// range of the transmitter defers (probability 0); a hidden interferer
/// beyond that range transmits at the configured duty cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Csma {
    pub carrier_sense_multiplier: f64,
    pub traffic_load: f64,
}

impl Default for Csma {
    fn default() -> Self {
        Self {
            carrier_sense_multiplier: DEFAULT_CARRIER_SENSE_MULTIPLIER,
            traffic_load: DEFAULT_TRAFFIC_LOAD,
        }
    }
}

impl Csma {
    pub fn carrier_sense_range(&self, comm_range: Length) -> Length {
        comm_range * self.carrier_sense_multiplier
    }

    pub fn activity_probability(
        &self,
        tx: &NodeId,
        _rx: &NodeId,
        interferer: &NodeId,
        positions: &HashMap<NodeId, Position>,
        comm_range: Length,
    ) -> f64 {
        let tx_pos = positions[tx];
        let interferer_pos = positions[interferer];
        let dist_to_tx = interferer_pos.distance_to(tx_pos);

        if dist_to_tx.metres() < self.carrier_sense_range(comm_range).metres() {
            0.0
        } else {
            self.traffic_load
        }
    }
}

/// Per-node slot assignment consulted by [`Tdma::activity_probability`].
pub type SlotAssignment = HashMap<NodeId, u32>;

/// Slotted access: an interferer transmits with probability 1.0 exactly
/// when its slot overlaps the transmitter's, else 0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tdma {
    pub slots: SlotAssignment,
}

impl Tdma {
    pub fn new(slots: SlotAssignment) -> Self {
        Self { slots }
    }

    pub fn activity_probability(
        &self,
        tx: &NodeId,
        _rx: &NodeId,
        interferer: &NodeId,
        _positions: &HashMap<NodeId, Position>,
        _comm_range: Length,
    ) -> f64 {
        match (self.slots.get(tx), self.slots.get(interferer)) {
            (Some(tx_slot), Some(interferer_slot)) if tx_slot == interferer_slot => 1.0,
            _ => 0.0,
        }
    }
}

macro_rules! mac_model {
    ($($variant:ident),+) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub enum MacModel {
            $($variant($variant)),*
        }

        impl MacModel {
            pub fn activity_probability(
                &self,
                tx: &NodeId,
                rx: &NodeId,
                interferer: &NodeId,
                positions: &HashMap<NodeId, Position>,
                comm_range: Length,
            ) -> f64 {
                match self {
                    $(MacModel::$variant(inner) => inner.activity_probability(tx, rx, interferer, positions, comm_range)),*
                }
            }
        }

        $(
        impl From<$variant> for MacModel {
            fn from(value: $variant) -> Self {
                MacModel::$variant(value)
            }
        }
        )*
    };
}

mac_model!(NoMac, Csma, Tdma);

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> HashMap<NodeId, Position> {
        HashMap::from([
            (NodeId::new("tx"), Position::new(0.0, 0.0, 0.0)),
            (NodeId::new("rx"), Position::new(50.0, 0.0, 0.0)),
            (NodeId::new("near"), Position::new(20.0, 0.0, 0.0)),
            (NodeId::new("far"), Position::new(500.0, 0.0, 0.0)),
        ])
    }

    #[test]
    fn no_mac_is_always_worst_case() {
        let model: MacModel = NoMac.into();
        let pos = positions();
        let p = model.activity_probability(
            &NodeId::new("tx"),
            &NodeId::new("rx"),
            &NodeId::new("far"),
            &pos,
            Length::from_metres(100.0),
        );
        assert_eq!(p, 1.0);
    }

    #[test]
    fn csma_defers_within_carrier_sense_range() {
        let model: MacModel = Csma::default().into();
        let pos = positions();
        let p = model.activity_probability(
            &NodeId::new("tx"),
            &NodeId::new("rx"),
            &NodeId::new("near"),
            &pos,
            Length::from_metres(100.0),
        );
        assert_eq!(p, 0.0);
    }

    #[test]
    fn csma_hidden_node_uses_traffic_load() {
        let model: MacModel = Csma::default().into();
        let pos = positions();
        let p = model.activity_probability(
            &NodeId::new("tx"),
            &NodeId::new("rx"),
            &NodeId::new("far"),
            &pos,
            Length::from_metres(100.0),
        );
        assert_eq!(p, DEFAULT_TRAFFIC_LOAD);
    }

    #[test]
    fn tdma_only_fires_on_matching_slot() {
        let mut slots = SlotAssignment::new();
        slots.insert(NodeId::new("tx"), 0);
        slots.insert(NodeId::new("near"), 0);
        slots.insert(NodeId::new("far"), 1);
        let model: MacModel = Tdma::new(slots).into();
        let pos = positions();

        let same_slot = model.activity_probability(
            &NodeId::new("tx"),
            &NodeId::new("rx"),
            &NodeId::new("near"),
            &pos,
            Length::from_metres(100.0),
        );
        let other_slot = model.activity_probability(
            &NodeId::new("tx"),
            &NodeId::new("rx"),
            &NodeId::new("far"),
            &pos,
            Length::from_metres(100.0),
        );

        assert_eq!(same_slot, 1.0);
        assert_eq!(other_slot, 0.0);
    }
}
