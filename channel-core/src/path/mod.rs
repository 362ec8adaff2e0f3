//! PathProvider and its variants (C1-C3): the contract for computing path
//! loss and multipath statistics between two points at a frequency.

mod free_space;
mod ray_traced;

pub use free_space::FreeSpaceProvider;
pub use ray_traced::{Deadline, RawPathResult, RayTracedProvider, RayTracer};

use serde::{Deserialize, Serialize};

use crate::{
    error::ProviderError,
    position::Position,
    units::{Dbf, Frequency, Time},
};

/// One ranked multipath component of a ray-traced path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipathComponent {
    pub power_db: Dbf,
    pub delay: Time,
    pub vertices: Vec<Position>,
    pub interaction_tags: Vec<String>,
}

/// Result of one path query. Owned by [`crate::path_cache::PathCache`] once
/// cached; read-only thereafter until invalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSample {
    pub path_loss_db: Dbf,
    pub propagation_delay: Time,
    pub rms_delay_spread: Time,
    pub is_los: bool,
    pub multipath: Vec<MultipathComponent>,
    /// Whether the antenna gains of this link are already folded into
    /// `path_loss_db`. When `true`, [`crate::link_budget::LinkBudget`] must
    /// not re-apply tx/rx gains.
    pub gains_already_applied: bool,
}

impl PathSample {
    pub fn is_valid(&self) -> bool {
        self.path_loss_db.is_finite()
            && self.path_loss_db.db_value() >= 0.0
            && self.propagation_delay.seconds() >= 0.0
            && self.rms_delay_spread.seconds() >= 0.0
    }
}

/// `path(tx_pos, rx_pos, frequency_hz, deadline) -> PathSample`, total on
/// valid inputs, may fail transiently.
macro_rules! path_provider {
    ($($variant:ident),+) => {
        #[derive(Debug, Clone)]
        pub enum PathProvider {
            $($variant($variant)),*
        }

        impl PathProvider {
            pub fn path(
                &self,
                tx_pos: Position,
                rx_pos: Position,
                frequency: Frequency,
                deadline: Deadline,
            ) -> Result<PathSample, ProviderError> {
                match self {
                    $(PathProvider::$variant(inner) => inner.path(tx_pos, rx_pos, frequency, deadline)),*
                }
            }
        }

        $(
        impl From<$variant> for PathProvider {
            fn from(value: $variant) -> Self {
                PathProvider::$variant(value)
            }
        }
        )*
    };
}

path_provider!(FreeSpaceProvider, RayTracedProvider);

pub(crate) fn validate_query(
    tx_pos: Position,
    rx_pos: Position,
    frequency: Frequency,
) -> Result<(), ProviderError> {
    if !tx_pos.is_finite() || !rx_pos.is_finite() {
        return Err(ProviderError::InvalidInput(
            "transmitter/receiver position is not finite".into(),
        ));
    }
    if !frequency.hz().is_finite() || frequency.hz() <= 0.0 {
        return Err(ProviderError::InvalidInput(format!(
            "frequency {}Hz is not a positive finite value",
            frequency.hz()
        )));
    }
    Ok(())
}
