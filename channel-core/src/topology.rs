//! Structured topology configuration: the types the core validates against
//! the data-model invariants. Raw YAML parsing is an external collaborator
//! (the CLI's topology loader); this module owns the validated shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    node::{AntennaGain, AntennaPattern, Fec, Modulation, NodeId, Polarization, RadioParams},
    position::Position,
    units::{Dbi, Dbm, Frequency},
};

/// Per-node wireless radio configuration as it appears in a topology file,
/// before being lowered to [`RadioParams`] + [`Position`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirelessParams {
    #[serde(default = "default_tx_power_dbm")]
    pub rf_power_dbm: f64,
    pub antenna_pattern: Option<AntennaPattern>,
    pub antenna_gain_dbi: Option<f64>,
    #[serde(default)]
    pub polarization: Polarization,
    pub frequency_ghz: f64,
    pub bandwidth_mhz: f64,
    pub modulation: Modulation,
    pub fec_type: Fec,
    pub fec_code_rate: f64,
    #[serde(default)]
    pub noise_figure_db: Option<f64>,
    pub position: Position,
}

fn default_tx_power_dbm() -> f64 {
    20.0
}

impl Default for Polarization {
    fn default() -> Self {
        Polarization::V
    }
}

impl WirelessParams {
    /// Lowers the file-facing shape into the radio-params + position the
    /// rest of the core operates on, enforcing the "exactly one antenna
    /// specification" invariant along the way.
    pub fn into_radio_params(self, node_id: &NodeId) -> Result<(RadioParams, Position), ValidationError> {
        let antenna_gain = match (self.antenna_gain_dbi, self.antenna_pattern) {
            (Some(gain), None) => AntennaGain::Explicit(Dbi::from_db_value(gain)),
            (None, Some(pattern)) => AntennaGain::Pattern(pattern),
            (None, None) => return Err(ValidationError::MissingAntennaSpec(node_id.clone())),
            (Some(_), Some(_)) => {
                return Err(ValidationError::OutOfRange {
                    field: "antenna_gain_dbi/antenna_pattern",
                    value: 1.0,
                    expected: "exactly one of antenna_gain_dbi, antenna_pattern",
                });
            }
        };

        let params = RadioParams {
            tx_power: Dbm::from_dbm(self.rf_power_dbm),
            antenna_gain,
            polarization: self.polarization,
            carrier_frequency: Frequency::from_GHz(self.frequency_ghz),
            bandwidth: Frequency::from_MHz(self.bandwidth_mhz),
            modulation: self.modulation,
            fec: self.fec_type,
            code_rate: self.fec_code_rate,
            noise_figure_db: self.noise_figure_db.unwrap_or(RadioParams::DEFAULT_NOISE_FIGURE_DB),
        };
        params.validate()?;

        Ok((params, self.position))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub binds: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub wireless: Option<WirelessParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirelessLink {
    pub endpoints: (NodeId, NodeId),
    pub bandwidth_override_mbps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDefinition {
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    pub nodes: HashMap<NodeId, NodeConfig>,
    #[serde(default)]
    pub wireless_links: Vec<WirelessLink>,
    pub scene: Option<SceneConfig>,
    #[serde(default = "default_channel_server")]
    pub channel_server: String,
    #[serde(default = "default_mobility_poll_ms")]
    pub mobility_poll_ms: u32,
}

fn default_channel_server() -> String {
    "http://localhost:8000".to_string()
}

fn default_mobility_poll_ms() -> u32 {
    100
}

impl TopologyDefinition {
    pub fn container_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("clab")
    }

    /// Validates the invariants the data model requires at load time:
    /// every link endpoint exists, no duplicate node ids (guaranteed by the
    /// map itself), and the poll interval is in the documented range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(10..=10_000).contains(&self.mobility_poll_ms) {
            return Err(ValidationError::InvalidPollInterval(self.mobility_poll_ms));
        }

        for link in &self.wireless_links {
            let (a, b) = &link.endpoints;
            if !self.nodes.contains_key(a) {
                return Err(ValidationError::UnknownLinkEndpoint(a.clone()));
            }
            if !self.nodes.contains_key(b) {
                return Err(ValidationError::UnknownLinkEndpoint(b.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wireless(freq_ghz: f64) -> WirelessParams {
        WirelessParams {
            rf_power_dbm: 20.0,
            antenna_pattern: Some(AntennaPattern::Dipole),
            antenna_gain_dbi: None,
            polarization: Polarization::V,
            frequency_ghz: freq_ghz,
            bandwidth_mhz: 20.0,
            modulation: Modulation::Qam64,
            fec_type: Fec::Ldpc,
            fec_code_rate: 0.75,
            noise_figure_db: None,
            position: Position::new(0.0, 0.0, 1.5),
        }
    }

    #[test]
    fn lowers_pattern_antenna_to_radio_params() {
        let id = NodeId::new("n0");
        let (params, pos) = sample_wireless(5.18).into_radio_params(&id).unwrap();
        assert_eq!(params.antenna_gain.gain_dbi().db_value(), 1.76);
        assert_eq!(pos, Position::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn both_gain_and_pattern_set_is_rejected() {
        let id = NodeId::new("n0");
        let mut wireless = sample_wireless(5.18);
        wireless.antenna_gain_dbi = Some(3.0);
        assert!(wireless.into_radio_params(&id).is_err());
    }

    #[test]
    fn missing_gain_and_pattern_is_a_validation_error() {
        let id = NodeId::new("n0");
        let mut wireless = sample_wireless(5.18);
        wireless.antenna_pattern = None;
        assert!(matches!(
            wireless.into_radio_params(&id),
            Err(ValidationError::MissingAntennaSpec(_))
        ));
    }

    #[test]
    fn link_to_unknown_endpoint_is_rejected() {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::new("a"), NodeConfig::default());

        let topology = TopologyDefinition {
            name: "test".into(),
            prefix: None,
            nodes,
            wireless_links: vec![WirelessLink {
                endpoints: (NodeId::new("a"), NodeId::new("missing")),
                bandwidth_override_mbps: None,
            }],
            scene: None,
            channel_server: default_channel_server(),
            mobility_poll_ms: 100,
        };

        assert!(topology.validate().is_err());
    }

    #[test]
    fn poll_interval_out_of_range_is_rejected() {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::new("a"), NodeConfig::default());

        let topology = TopologyDefinition {
            name: "test".into(),
            prefix: None,
            nodes,
            wireless_links: vec![],
            scene: None,
            channel_server: default_channel_server(),
            mobility_poll_ms: 5,
        };

        assert!(matches!(
            topology.validate(),
            Err(ValidationError::InvalidPollInterval(5))
        ));
    }
}
