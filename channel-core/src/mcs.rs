//! McsTable & Selector (C11): an SNR-threshold table with per-link
//! hysteresis to prevent rapid MCS flapping near a boundary.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::node::{Fec, Modulation};

pub const DEFAULT_HYSTERESIS_DB: f64 = 2.0;

/// One row of the MCS table, sorted into the table ascending by
/// `min_snr_db` on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McsEntry {
    pub mcs_index: u32,
    pub modulation: Modulation,
    pub code_rate: f64,
    pub min_snr_db: f64,
    pub fec: Fec,
    pub bandwidth_mhz: Option<f64>,
    pub spreading_factor: Option<u32>,
    pub processing_gain_db: Option<f64>,
}

impl McsEntry {
    pub fn bits_per_symbol(&self) -> u32 {
        self.modulation.bits_per_symbol()
    }

    pub fn spectral_efficiency(&self) -> f64 {
        self.bits_per_symbol() as f64 * self.code_rate
    }
}

/// Raw CSV row shape: modulation/fec are columns of strings, parsed against
/// the fixed modulation/FEC tables before becoming an [`McsEntry`].
#[derive(Debug, Deserialize)]
struct McsCsvRow {
    mcs_index: u32,
    modulation: String,
    code_rate: f64,
    min_snr_db: f64,
    fec_type: String,
    bandwidth_mhz: Option<f64>,
    spreading_factor: Option<u32>,
    processing_gain_db: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum McsLoadError {
    #[error("failed to read MCS table: {0}")]
    Io(#[from] csv::Error),

    #[error("unknown modulation '{0}' in MCS table")]
    UnknownModulation(String),

    #[error("unknown FEC type '{0}' in MCS table")]
    UnknownFec(String),

    #[error("MCS table must have at least one entry")]
    Empty,
}

impl TryFrom<McsCsvRow> for McsEntry {
    type Error = McsLoadError;

    fn try_from(row: McsCsvRow) -> Result<Self, Self::Error> {
        let modulation = Modulation::parse(&row.modulation)
            .ok_or_else(|| McsLoadError::UnknownModulation(row.modulation.clone()))?;
        let fec = Fec::parse(&row.fec_type)
            .ok_or_else(|| McsLoadError::UnknownFec(row.fec_type.clone()))?;

        Ok(McsEntry {
            mcs_index: row.mcs_index,
            modulation,
            code_rate: row.code_rate,
            min_snr_db: row.min_snr_db,
            fec,
            bandwidth_mhz: row.bandwidth_mhz,
            spreading_factor: row.spreading_factor,
            processing_gain_db: row.processing_gain_db,
        })
    }
}

/// A link's identity for hysteresis bookkeeping. Any `Eq + Hash` key works;
/// the orchestrator uses (tx, rx) node id pairs.
pub trait LinkKey: std::hash::Hash + Eq + Clone {}
impl<T: std::hash::Hash + Eq + Clone> LinkKey for T {}

/// Sorted-ascending-by-`min_snr_db` MCS table with per-link hysteresis
/// state. Selection never fails: on missing history it simply seeds with
/// the unhysteresised candidate.
#[derive(Debug, Clone)]
pub struct McsTable<K: LinkKey> {
    entries: Vec<McsEntry>,
    hysteresis_db: f64,
    current: HashMap<K, u32>,
}

impl<K: LinkKey> McsTable<K> {
    pub fn new(mut entries: Vec<McsEntry>, hysteresis_db: f64) -> Result<Self, McsLoadError> {
        if entries.is_empty() {
            return Err(McsLoadError::Empty);
        }
        entries.sort_by(|a, b| a.min_snr_db.total_cmp(&b.min_snr_db));
        Ok(Self { entries, hysteresis_db, current: HashMap::new() })
    }

    pub fn from_csv(path: impl AsRef<Path>, hysteresis_db: f64) -> Result<Self, McsLoadError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut entries = Vec::new();
        for row in reader.deserialize::<McsCsvRow>() {
            entries.push(McsEntry::try_from(row?)?);
        }
        Self::new(entries, hysteresis_db)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn min_mcs(&self) -> &McsEntry {
        &self.entries[0]
    }

    pub fn max_mcs(&self) -> &McsEntry {
        &self.entries[self.entries.len() - 1]
    }

    pub fn get_by_index(&self, mcs_index: u32) -> Option<&McsEntry> {
        self.entries.iter().find(|e| e.mcs_index == mcs_index)
    }

    fn highest_satisfied(&self, snr_db: f64) -> &McsEntry {
        let mut selected = &self.entries[0];
        for entry in &self.entries {
            if snr_db >= entry.min_snr_db {
                selected = entry;
            } else {
                break;
            }
        }
        selected
    }

    /// Selects the MCS for `snr_db` on `link`, applying hysteresis against
    /// the link's previous selection (if any). Updates the hysteresis map.
    pub fn select(&mut self, snr_db: f64, link: K) -> McsEntry {
        let candidate = *self.highest_satisfied(snr_db);

        let selected = match self.current.get(&link).copied() {
            None => candidate,
            Some(current_idx) => {
                let current_entry = self
                    .get_by_index(current_idx)
                    .copied()
                    .unwrap_or(candidate);

                if candidate.mcs_index > current_idx {
                    if snr_db >= candidate.min_snr_db + self.hysteresis_db {
                        candidate
                    } else {
                        current_entry
                    }
                } else if candidate.mcs_index < current_idx {
                    if snr_db >= current_entry.min_snr_db - self.hysteresis_db {
                        current_entry
                    } else {
                        candidate
                    }
                } else {
                    current_entry
                }
            }
        };

        self.current.insert(link, selected.mcs_index);
        selected
    }

    pub fn reset_link(&mut self, link: &K) {
        self.current.remove(link);
    }

    pub fn reset_all(&mut self) {
        self.current.clear();
    }
}
