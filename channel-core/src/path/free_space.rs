//! Closed-form free-space path loss provider (C2).
//!
//! FSPL_dB = 20*log10(d) + 20*log10(f) - 147.55, with FSPL = 0 at d = 0.

use crate::{
    error::ProviderError,
    position::Position,
    units::{Dbf, SPEED_OF_LIGHT, Time},
};

use super::{Deadline, PathSample, validate_query};

#[derive(Debug, Clone, Copy, Default)]
pub struct FreeSpaceProvider;

impl FreeSpaceProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn path(
        &self,
        tx_pos: Position,
        rx_pos: Position,
        frequency: crate::units::Frequency,
        _deadline: Deadline,
    ) -> Result<PathSample, ProviderError> {
        validate_query(tx_pos, rx_pos, frequency)?;

        let distance_m = tx_pos.distance_to(rx_pos).metres();

        let path_loss_db = if distance_m <= 0.0 {
            0.0
        } else {
            20.0 * distance_m.log10() + 20.0 * frequency.hz().log10() - 147.55
        };

        Ok(PathSample {
            path_loss_db: Dbf::from_db_value(path_loss_db.max(0.0)),
            propagation_delay: Time::from_seconds(distance_m / SPEED_OF_LIGHT),
            rms_delay_spread: Time::from_seconds(0.0),
            is_los: true,
            multipath: Vec::new(),
            gains_already_applied: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Frequency;

    #[test]
    fn path_loss_is_nonnegative_and_zero_at_origin() {
        let provider = FreeSpaceProvider::new();
        let sample = provider
            .path(
                Position::ORIGIN,
                Position::ORIGIN,
                Frequency::from_GHz(5.18),
                Deadline::none(),
            )
            .unwrap();
        assert_eq!(sample.path_loss_db.db_value(), 0.0);
    }

    #[test]
    fn path_loss_is_monotone_with_distance() {
        let provider = FreeSpaceProvider::new();
        let f = Frequency::from_GHz(5.18);
        let near = provider
            .path(Position::ORIGIN, Position::new(10.0, 0.0, 0.0), f, Deadline::none())
            .unwrap();
        let far = provider
            .path(Position::ORIGIN, Position::new(100.0, 0.0, 0.0), f, Deadline::none())
            .unwrap();
        assert!(far.path_loss_db.db_value() > near.path_loss_db.db_value());
    }

    #[test]
    fn delay_matches_distance_over_speed_of_light() {
        let provider = FreeSpaceProvider::new();
        let sample = provider
            .path(
                Position::ORIGIN,
                Position::new(300.0, 0.0, 0.0),
                Frequency::from_GHz(2.4),
                Deadline::none(),
            )
            .unwrap();
        let expected = 300.0 / SPEED_OF_LIGHT;
        assert!((sample.propagation_delay.seconds() - expected).abs() < 1e-9);
    }

    #[test]
    fn equilateral_triangle_matches_worked_example() {
        // Scenario 1 from the test plan: 100 m separation at 5.18 GHz.
        let provider = FreeSpaceProvider::new();
        let sample = provider
            .path(
                Position::new(0.0, 0.0, 1.5),
                Position::new(100.0, 0.0, 1.5),
                Frequency::from_GHz(5.18),
                Deadline::none(),
            )
            .unwrap();
        assert!((sample.path_loss_db.db_value() - 86.77).abs() < 0.05);
    }
}
