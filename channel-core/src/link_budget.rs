//! LinkBudget (C5): received power, noise floor, and SNR from a path sample
//! and the two endpoints' radio parameters.

use std::{collections::HashMap, sync::Mutex};

use crate::{
    error::InvariantViolation,
    node::NodeId,
    units::{Dbf, Dbi, Dbm, Frequency},
};

/// Thermal noise floor at bandwidth B, noise figure NF:
/// N = -174 + 10*log10(B/Hz) + NF dBm.
pub fn noise_floor(bandwidth: Frequency, noise_figure_db: f64) -> Dbm {
    let value = -174.0 + 10.0 * bandwidth.hz().log10() + noise_figure_db;
    Dbm::from_dbm(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NoiseKey {
    bandwidth_bits: u64,
    noise_figure_bits: u64,
}

impl NoiseKey {
    fn new(bandwidth: Frequency, noise_figure_db: f64) -> Self {
        Self {
            bandwidth_bits: bandwidth.hz().to_bits(),
            noise_figure_bits: noise_figure_db.to_bits(),
        }
    }
}

/// Memoizes [`noise_floor`] on (bandwidth, noise_figure): in a topology with
/// a handful of distinct receiver bandwidths this avoids recomputing the
/// same log10 on every link in every recomputation pass.
#[derive(Debug, Default)]
pub struct NoiseFloorCache {
    entries: Mutex<HashMap<u64, Dbm>>,
}

impl NoiseFloorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bandwidth: Frequency, noise_figure_db: f64) -> Dbm {
        let key = NoiseKey::new(bandwidth, noise_figure_db);
        let hash = key.bandwidth_bits ^ key.noise_figure_bits.rotate_left(32);
        let mut entries = self.entries.lock().expect("noise floor cache poisoned");
        *entries
            .entry(hash)
            .or_insert_with(|| noise_floor(bandwidth, noise_figure_db))
    }
}

/// The received-power and SNR computation for one directed link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBudget {
    pub rx_power: Dbm,
    pub noise_floor: Dbm,
    pub snr: Dbf,
}

impl LinkBudget {
    /// `gains_already_applied` comes from the path sample: when true, the
    /// provider has already folded tx/rx antenna gains into `path_loss_db`
    /// and this computation must not re-apply them.
    pub fn compute(
        tx_power: Dbm,
        tx_gain: Dbi,
        rx_gain: Dbi,
        path_loss_db: Dbf,
        gains_already_applied: bool,
        noise_floor: Dbm,
    ) -> Self {
        let rx_power = if gains_already_applied {
            tx_power - path_loss_db
        } else {
            tx_power + tx_gain + rx_gain - path_loss_db
        };

        let snr = rx_power - noise_floor;

        Self { rx_power, noise_floor, snr }
    }

    pub fn check_finite(&self, tx: &NodeId, rx: &NodeId) -> Result<(), InvariantViolation> {
        if !self.snr.is_finite() {
            return Err(InvariantViolation::NonFiniteSnr(tx.clone(), rx.clone()));
        }
        Ok(())
    }
}
