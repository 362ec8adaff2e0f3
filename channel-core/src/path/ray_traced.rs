//! Wraps an external ray-tracing solver (C3), translating its native output
//! into [`super::PathSample`] regardless of the solver's internal
//! conventions.

use std::{collections::HashSet, fmt, sync::Arc, time::Duration};

use crate::{
    error::ProviderError,
    position::Position,
    units::{Dbf, Frequency, Time},
    utility::n_min,
};

use super::{MultipathComponent, PathSample, validate_query};

/// Solvers can return far more multipath components than the netem layer
/// ever uses; keep only the strongest ones so a dense scene doesn't balloon
/// every cached [`PathSample`].
const MAX_MULTIPATH_COMPONENTS: usize = 20;

fn truncate_to_strongest(mut multipath: Vec<MultipathComponent>) -> Vec<MultipathComponent> {
    if multipath.len() <= MAX_MULTIPATH_COMPONENTS {
        return multipath;
    }

    let negated_power: Vec<f64> = multipath.iter().map(|c| -c.power_db.db_value()).collect();
    let keep: HashSet<usize> = n_min(&negated_power, MAX_MULTIPATH_COMPONENTS).into_iter().collect();

    multipath
        .drain(..)
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, component)| component)
        .collect()
}

/// A caller-supplied budget for one path query. `None` means no deadline.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Duration>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(budget: Duration) -> Self {
        Self(Some(budget))
    }

    pub fn budget(self) -> Option<Duration> {
        self.0
    }

    pub fn is_expired(self, elapsed: Duration) -> bool {
        self.0.is_some_and(|budget| elapsed > budget)
    }
}

/// The solver's raw answer, in whatever convention it natively uses. The
/// provider is responsible for checking `gains_already_applied` against its
/// own knowledge of the solver before handing this to the orchestrator.
#[derive(Debug, Clone)]
pub struct RawPathResult {
    pub path_loss_db: f64,
    pub propagation_delay_s: f64,
    pub rms_delay_spread_s: f64,
    pub is_los: bool,
    pub multipath: Vec<MultipathComponent>,
    pub gains_already_applied: bool,
}

/// The external solver contract. Implementations may block or suspend; this
/// is the only suspension point in the channel core.
pub trait RayTracer: fmt::Debug + Send + Sync {
    fn query(
        &self,
        tx_pos: Position,
        rx_pos: Position,
        frequency: Frequency,
        deadline: Deadline,
    ) -> Result<RawPathResult, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct RayTracedProvider {
    tracer: Arc<dyn RayTracer>,
}

impl RayTracedProvider {
    pub fn new(tracer: Arc<dyn RayTracer>) -> Self {
        Self { tracer }
    }

    pub fn path(
        &self,
        tx_pos: Position,
        rx_pos: Position,
        frequency: Frequency,
        deadline: Deadline,
    ) -> Result<PathSample, ProviderError> {
        validate_query(tx_pos, rx_pos, frequency)?;

        let raw = self.tracer.query(tx_pos, rx_pos, frequency, deadline)?;

        if !raw.path_loss_db.is_finite()
            || !raw.propagation_delay_s.is_finite()
            || !raw.rms_delay_spread_s.is_finite()
        {
            return Err(ProviderError::NonFiniteResult);
        }

        Ok(PathSample {
            path_loss_db: Dbf::from_db_value(raw.path_loss_db),
            propagation_delay: Time::from_seconds(raw.propagation_delay_s),
            rms_delay_spread: Time::from_seconds(raw.rms_delay_spread_s),
            is_los: raw.is_los,
            multipath: truncate_to_strongest(raw.multipath),
            gains_already_applied: raw.gains_already_applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubTracer {
        result: RawPathResult,
    }

    impl RayTracer for StubTracer {
        fn query(
            &self,
            _tx_pos: Position,
            _rx_pos: Position,
            _frequency: Frequency,
            _deadline: Deadline,
        ) -> Result<RawPathResult, ProviderError> {
            Ok(self.result.clone())
        }
    }

    fn stub(result: RawPathResult) -> RayTracedProvider {
        RayTracedProvider::new(Arc::new(StubTracer { result }))
    }

    #[test]
    fn translates_raw_result_into_sample() {
        let provider = stub(RawPathResult {
            path_loss_db: 95.4,
            propagation_delay_s: 3.3e-7,
            rms_delay_spread_s: 1.2e-8,
            is_los: false,
            multipath: vec![],
            gains_already_applied: true,
        });

        let sample = provider
            .path(
                Position::ORIGIN,
                Position::new(100.0, 0.0, 0.0),
                Frequency::from_GHz(5.18),
                Deadline::none(),
            )
            .unwrap();

        assert_eq!(sample.path_loss_db.db_value(), 95.4);
        assert!(!sample.is_los);
        assert!(sample.gains_already_applied);
    }

    #[test]
    fn non_finite_result_is_rejected() {
        let provider = stub(RawPathResult {
            path_loss_db: f64::NAN,
            propagation_delay_s: 0.0,
            rms_delay_spread_s: 0.0,
            is_los: true,
            multipath: vec![],
            gains_already_applied: false,
        });

        let err = provider
            .path(
                Position::ORIGIN,
                Position::new(1.0, 0.0, 0.0),
                Frequency::from_GHz(2.4),
                Deadline::none(),
            )
            .unwrap_err();

        assert!(matches!(err, ProviderError::NonFiniteResult));
    }

    #[test]
    fn multipath_is_truncated_to_the_strongest_components() {
        let multipath: Vec<MultipathComponent> = (0..30)
            .map(|i| MultipathComponent {
                power_db: Dbf::from_db_value(-(i as f64)),
                delay: crate::units::Time::from_seconds(0.0),
                vertices: vec![],
                interaction_tags: vec![],
            })
            .collect();

        let provider = stub(RawPathResult {
            path_loss_db: 80.0,
            propagation_delay_s: 1e-7,
            rms_delay_spread_s: 1e-8,
            is_los: false,
            multipath,
            gains_already_applied: false,
        });

        let sample = provider
            .path(
                Position::ORIGIN,
                Position::new(100.0, 0.0, 0.0),
                Frequency::from_GHz(5.18),
                Deadline::none(),
            )
            .unwrap();

        assert_eq!(sample.multipath.len(), MAX_MULTIPATH_COMPONENTS);
        // The strongest (least negative) powers are 0.0..-19.0.
        assert!(sample.multipath.iter().all(|c| c.power_db.db_value() > -20.0));
    }

    #[test]
    fn deadline_tracks_expiry() {
        let deadline = Deadline::after(Duration::from_millis(50));
        assert!(!deadline.is_expired(Duration::from_millis(10)));
        assert!(deadline.is_expired(Duration::from_millis(60)));
        assert!(!Deadline::none().is_expired(Duration::from_secs(1000)));
    }
}
