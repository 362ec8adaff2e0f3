//! SinrCalculator (C9): folds signal, noise floor, and probability-weighted
//! interference into a single SINR figure.

use crate::{interference::InterferenceTerm, units::{Dbf, Dbm}};

/// Result of one SINR computation, including the diagnostics the output
/// tuple and operator tooling need beyond the bare SINR figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinrResult {
    pub sinr: Dbf,
    /// 10*log10(sum of probability-weighted interference), dBm.
    pub expected_interference: Dbm,
    /// Count of interferers with nonzero activity probability.
    pub hidden_source_count: usize,
}

fn to_linear_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

fn from_linear_mw(value_mw: f64) -> f64 {
    10.0 * value_mw.log10()
}

/// `probability_of` maps an interference term's source to its activity
/// probability (from [`crate::mac::MacModel::activity_probability`]).
/// Terms with probability 0 are omitted from the sum, per the documented
/// fix for the bug where probabilities were computed but never applied.
pub fn compute_sinr(
    signal: Dbm,
    noise_floor: Dbm,
    terms: &[InterferenceTerm],
    probability_of: impl Fn(&InterferenceTerm) -> f64,
) -> SinrResult {
    let noise_linear = to_linear_mw(noise_floor.dbm());

    let mut weighted_sum_mw = 0.0;
    let mut hidden_source_count = 0;

    for term in terms {
        let probability = probability_of(term);
        if probability <= 0.0 {
            continue;
        }
        hidden_source_count += 1;
        weighted_sum_mw += probability * to_linear_mw(term.power_at_receiver.dbm());
    }

    let sinr = Dbf::from_db_value(signal.dbm() - from_linear_mw(noise_linear + weighted_sum_mw));

    let expected_interference = if weighted_sum_mw > 0.0 {
        Dbm::from_dbm(from_linear_mw(weighted_sum_mw))
    } else {
        Dbm::from_dbm(f64::NEG_INFINITY)
    };

    SinrResult { sinr, expected_interference, hidden_source_count }
}
