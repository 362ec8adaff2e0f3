//! PerMapper (C10): SNR/SINR -> BER/BLER -> PER, plus the effective-rate and
//! netem-mapping helpers that turn a PER into the output tuple's loss/rate
//! fields.

use crate::node::{Fec, Modulation};

pub const DEFAULT_PACKET_BYTES: u32 = 1500;
pub const DEFAULT_PACKET_BITS: u32 = DEFAULT_PACKET_BYTES * 8;
pub const OFDM_EFFICIENCY: f64 = 0.8;
const MIN_RATE_MBPS: f64 = 0.1;

fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Closed-form exponential approximations to the AWGN BER curve for each
/// uncoded modulation, asymptoting to 0.5 at 0 dB and to a modulation-
/// specific floor at high SNR.
pub fn bit_error_rate(modulation: Modulation, snr_db: f64) -> f64 {
    let snr_linear = db_to_linear(snr_db);

    let (prefactor, divisor, floor, ceiling_snr_db) = match modulation {
        Modulation::Bpsk => (0.5, 1.0, 1e-10, 20.0),
        Modulation::Qpsk => (0.5, 1.0, 1e-10, 20.0),
        Modulation::Qam16 => (0.375, 5.0, 1e-9, 20.0),
        Modulation::Qam64 => (0.29, 21.0, 1e-8, 25.0),
        Modulation::Qam256 => (0.22, 85.0, 1e-8, 30.0),
        Modulation::Qam1024 => (0.18, 341.0, 1e-7, 35.0),
    };

    if snr_db > ceiling_snr_db {
        floor
    } else if snr_db < -10.0 {
        0.5
    } else {
        (prefactor * (-(snr_linear / divisor)).exp()).clamp(floor, 0.5)
    }
}

/// Closed-form waterfall approximation to the BLER curve of a coded system:
/// a logistic function centred on the FEC's nominal decoding threshold,
/// steepened by the code's typical coding gain.
pub fn block_error_rate(fec: Fec, snr_db: f64) -> f64 {
    let (threshold_db, steepness) = match fec {
        Fec::None => return 1.0,
        Fec::Ldpc => (2.0, 1.6),
        Fec::Polar => (2.5, 1.4),
        Fec::Turbo => (3.0, 1.2),
    };

    1.0 / (1.0 + (steepness * (snr_db - threshold_db)).exp())
}

/// PER from an uncoded BER over a `packet_bits`-bit packet.
/// PER = 1 - (1 - BER)^packet_bits, with a linear approximation for very
/// small BER to avoid cancellation, and a clamp to 1 for BER > 0.5.
pub fn per_from_ber(ber: f64, packet_bits: u32) -> f64 {
    if ber > 0.5 {
        1.0
    } else if ber < 1e-12 {
        (packet_bits as f64 * ber).clamp(0.0, 1.0)
    } else {
        (1.0 - (1.0 - ber).powi(packet_bits as i32)).clamp(0.0, 1.0)
    }
}

/// PER from a coded BLER over `num_code_blocks` blocks per packet.
/// PER = 1 - (1 - BLER)^num_code_blocks.
pub fn per_from_bler(bler: f64, num_code_blocks: u32) -> f64 {
    if num_code_blocks <= 1 {
        bler.clamp(0.0, 1.0)
    } else {
        (1.0 - (1.0 - bler).powi(num_code_blocks as i32)).clamp(0.0, 1.0)
    }
}

/// Selects the uncoded or coded path based on the FEC tag and returns PER.
pub fn packet_error_rate(
    modulation: Modulation,
    fec: Fec,
    snr_db: f64,
    packet_bits: u32,
    num_code_blocks: u32,
) -> f64 {
    if fec.is_coded() {
        per_from_bler(block_error_rate(fec, snr_db), num_code_blocks)
    } else {
        per_from_ber(bit_error_rate(modulation, snr_db), packet_bits)
    }
}

/// rate_Mbps = BW_MHz * bits_per_symbol * code_rate * ofdm_efficiency *
/// (1 - PER), floored at 0.1 Mbps.
pub fn effective_rate_mbps(bandwidth_mhz: f64, bits_per_symbol: u32, code_rate: f64, per: f64) -> f64 {
    let raw = bandwidth_mhz * bits_per_symbol as f64 * OFDM_EFFICIENCY;
    let coded = raw * code_rate;
    let effective = coded * (1.0 - per);
    effective.max(MIN_RATE_MBPS)
}

pub fn per_to_loss_percent(per: f64) -> f64 {
    per * 100.0
}

pub fn delay_ms(propagation_delay_s: f64) -> f64 {
    propagation_delay_s * 1000.0
}

pub fn jitter_ms(rms_delay_spread_s: f64) -> f64 {
    rms_delay_spread_s * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ber_decreases_with_snr() {
        let low = bit_error_rate(Modulation::Qam64, 0.0);
        let high = bit_error_rate(Modulation::Qam64, 20.0);
        assert!(high < low);
    }

    #[test]
    fn ber_approaches_half_at_zero_snr() {
        let ber = bit_error_rate(Modulation::Bpsk, -10.0);
        assert!(ber > 0.4);
    }

    #[test]
    fn per_from_ber_matches_exact_formula_for_moderate_ber() {
        let per = per_from_ber(0.001, 1000);
        assert!(per > 0.6 && per < 0.7);
    }

    #[test]
    fn per_from_ber_uses_linear_approximation_for_tiny_ber() {
        let per = per_from_ber(1e-13, 1000);
        assert!((per - 1000.0 * 1e-13).abs() < 1e-14);
    }

    #[test]
    fn per_is_clamped_to_unit_interval() {
        assert_eq!(per_from_ber(0.9, 1000), 1.0);
        assert!(per_from_bler(1.5, 1) <= 1.0);
    }

    #[test]
    fn bler_waterfalls_around_threshold() {
        let below = block_error_rate(Fec::Ldpc, -5.0);
        let above = block_error_rate(Fec::Ldpc, 15.0);
        assert!(below > 0.9);
        assert!(above < 0.1);
    }

    #[test]
    fn effective_rate_is_floored() {
        let rate = effective_rate_mbps(20.0, 1, 0.1, 0.999);
        assert_eq!(rate, MIN_RATE_MBPS);
    }

    #[test]
    fn effective_rate_matches_formula() {
        let rate = effective_rate_mbps(20.0, 6, 0.75, 0.1);
        let expected = 20.0 * 6.0 * OFDM_EFFICIENCY * 0.75 * 0.9;
        assert!((rate - expected).abs() < 1e-9);
    }

    #[test]
    fn netem_mapping_matches_formula() {
        assert_eq!(delay_ms(0.001), 1.0);
        assert_eq!(jitter_ms(0.0005), 0.5);
        assert_eq!(per_to_loss_percent(0.05), 5.0);
    }
}
