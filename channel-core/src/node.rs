//! Node identity and per-node radio parameters.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{error::ValidationError, units::{Dbi, Dbm, Frequency}};

/// Opaque short textual identifier, unique within a single computation.
/// Cheap to clone: short ids (container/interface names) are stored inline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(CompactString);

impl NodeId {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(CompactString::new(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(CompactString::new(value))
    }
}

/// Symbolic antenna radiation patterns with table-constant gains (dBi).
/// Lookup is total on this closed set; an unrecognised name is a
/// [`ValidationError::UnknownAntennaPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntennaPattern {
    Iso,
    Dipole,
    HwDipole,
    Tr38901,
}

impl AntennaPattern {
    /// Gains as measured for the reference ray-tracer's built-in patterns;
    /// see the antenna pattern table in the external interface contract.
    pub fn gain_dbi(self) -> Dbi {
        let value = match self {
            AntennaPattern::Iso => 0.00,
            AntennaPattern::Dipole => 1.76,
            AntennaPattern::HwDipole => 2.16,
            AntennaPattern::Tr38901 => 8.00,
        };
        Dbi::from_db_value(value)
    }

    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "iso" => AntennaPattern::Iso,
            "dipole" => AntennaPattern::Dipole,
            "hw_dipole" => AntennaPattern::HwDipole,
            "tr38901" => AntennaPattern::Tr38901,
            other => return Err(ValidationError::UnknownAntennaPattern(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarization {
    V,
    H,
    Vh,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modulation {
    Bpsk,
    Qpsk,
    Qam16,
    Qam64,
    Qam256,
    Qam1024,
}

impl Modulation {
    /// Bits per symbol, per the fixed modulation table.
    pub fn bits_per_symbol(self) -> u32 {
        match self {
            Modulation::Bpsk => 1,
            Modulation::Qpsk => 2,
            Modulation::Qam16 => 4,
            Modulation::Qam64 => 6,
            Modulation::Qam256 => 8,
            Modulation::Qam1024 => 10,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "bpsk" => Modulation::Bpsk,
            "qpsk" => Modulation::Qpsk,
            "16qam" => Modulation::Qam16,
            "64qam" => Modulation::Qam64,
            "256qam" => Modulation::Qam256,
            "1024qam" => Modulation::Qam1024,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fec {
    None,
    Ldpc,
    Polar,
    Turbo,
}

impl Fec {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "none" => Fec::None,
            "ldpc" => Fec::Ldpc,
            "polar" => Fec::Polar,
            "turbo" => Fec::Turbo,
            _ => return None,
        })
    }

    pub fn is_coded(self) -> bool {
        !matches!(self, Fec::None)
    }
}

/// Either an explicit antenna gain or a symbolic pattern; exactly one must
/// be set per the data model invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AntennaGain {
    Explicit(Dbi),
    Pattern(AntennaPattern),
}

impl AntennaGain {
    pub fn gain_dbi(self) -> Dbi {
        match self {
            AntennaGain::Explicit(gain) => gain,
            AntennaGain::Pattern(pattern) => pattern.gain_dbi(),
        }
    }
}

/// Per-node radio parameters that feed the link budget and MCS selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadioParams {
    pub tx_power: Dbm,
    pub antenna_gain: AntennaGain,
    pub polarization: Polarization,
    pub carrier_frequency: Frequency,
    pub bandwidth: Frequency,
    pub modulation: Modulation,
    pub fec: Fec,
    pub code_rate: f64,
    /// Receiver noise figure in dB. Defaults to 7 dB per the link budget spec.
    pub noise_figure_db: f64,
}

impl RadioParams {
    pub const DEFAULT_NOISE_FIGURE_DB: f64 = 7.0;

    pub fn validate(&self) -> Result<(), ValidationError> {
        let tx_dbm = self.tx_power.dbm();
        if !(-30.0..=40.0).contains(&tx_dbm) {
            return Err(ValidationError::OutOfRange {
                field: "tx_power_dbm",
                value: tx_dbm,
                expected: "-30..=40",
            });
        }

        if self.carrier_frequency.hz() <= 0.0 || !self.carrier_frequency.hz().is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "carrier_frequency_hz",
                value: self.carrier_frequency.hz(),
                expected: "(0, inf)",
            });
        }

        if self.bandwidth.hz() <= 0.0 || !self.bandwidth.hz().is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "bandwidth_hz",
                value: self.bandwidth.hz(),
                expected: "(0, inf)",
            });
        }

        if !(0.0..=1.0).contains(&self.code_rate) || self.code_rate <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "code_rate",
                value: self.code_rate,
                expected: "(0, 1]",
            });
        }

        Ok(())
    }
}
