//! InterferenceAggregator (C7): sums per-interferer received power at a
//! receiver, producing the raw total and the individual per-source terms
//! that [`crate::sinr::SinrCalculator`] later weights by activity
//! probability.

use crate::{node::NodeId, units::Dbm};

/// One candidate interferer's contribution at a receiver. Ephemeral:
/// produced and consumed within a single link computation.
#[derive(Debug, Clone, PartialEq)]
pub struct InterferenceTerm {
    pub source: NodeId,
    pub power_at_receiver: Dbm,
    pub source_frequency_hz: f64,
}

/// Converts a dBm value to linear milliwatts for summation.
fn to_linear_mw(power: Dbm) -> f64 {
    10f64.powf(power.dbm() / 10.0)
}

fn from_linear_mw(value_mw: f64) -> Dbm {
    Dbm::from_dbm(10.0 * value_mw.log10())
}

/// The logarithmic sum of every term's received power, with no activity
/// weighting applied. Activity probabilities are folded in later by
/// [`crate::sinr::SinrCalculator`].
pub fn total_raw_interference(terms: &[InterferenceTerm]) -> Dbm {
    if terms.is_empty() {
        return Dbm::from_dbm(f64::NEG_INFINITY);
    }
    let total_mw: f64 = terms.iter().map(|t| to_linear_mw(t.power_at_receiver)).sum();
    from_linear_mw(total_mw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(name: &str, dbm: f64) -> InterferenceTerm {
        InterferenceTerm {
            source: NodeId::new(name),
            power_at_receiver: Dbm::from_dbm(dbm),
            source_frequency_hz: 5.18e9,
        }
    }

    #[test]
    fn empty_interference_is_negative_infinity() {
        assert_eq!(total_raw_interference(&[]).dbm(), f64::NEG_INFINITY);
    }

    #[test]
    fn two_equal_sources_add_three_db() {
        let terms = [term("a", -80.0), term("b", -80.0)];
        let total = total_raw_interference(&terms);
        assert!((total.dbm() - (-80.0 + 10.0 * 2f64.log10())).abs() < 1e-9);
    }

    #[test]
    fn dominant_source_dominates_the_sum() {
        let terms = [term("loud", -50.0), term("quiet", -110.0)];
        let total = total_raw_interference(&terms);
        assert!((total.dbm() - (-50.0)).abs() < 0.01);
    }
}
