//! EngineRegistry: an explicit, orchestrator-owned replacement for the
//! mutable-global engine/fallback-engine/force-fallback-flag trio. Threaded
//! through the orchestrator at construction; no process-wide mutable state
//! is required.

use crate::{
    error::ProviderError,
    path::{Deadline, FreeSpaceProvider, PathProvider, PathSample},
    position::Position,
    units::Frequency,
};

/// Owns the primary path provider and an optional fallback used when the
/// primary fails transiently. `force_fallback` short-circuits straight to
/// the fallback, e.g. when an operator knows the ray-tracing backend is
/// down and wants to avoid paying its timeout on every link.
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    primary: PathProvider,
    fallback: Option<FreeSpaceProvider>,
    force_fallback: bool,
}

impl EngineRegistry {
    pub fn new(primary: PathProvider) -> Self {
        Self { primary, fallback: None, force_fallback: false }
    }

    pub fn with_fallback(mut self, fallback: FreeSpaceProvider) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn set_force_fallback(&mut self, force_fallback: bool) {
        self.force_fallback = force_fallback;
    }

    pub fn force_fallback(&self) -> bool {
        self.force_fallback
    }

    /// Queries the primary provider unless force-fallback is set; on a
    /// transient primary failure, retries against the fallback when one is
    /// configured. Returns the primary's error when no fallback is
    /// available or the fallback path is itself force-selected.
    pub fn query(
        &self,
        tx_pos: Position,
        rx_pos: Position,
        frequency: Frequency,
        deadline: Deadline,
    ) -> Result<PathSample, ProviderError> {
        if self.force_fallback {
            return self.query_fallback(tx_pos, rx_pos, frequency, deadline);
        }

        match self.primary.path(tx_pos, rx_pos, frequency, deadline) {
            Ok(sample) => Ok(sample),
            Err(primary_err) => match &self.fallback {
                Some(fallback) => fallback.path(tx_pos, rx_pos, frequency, deadline),
                None => Err(primary_err),
            },
        }
    }

    fn query_fallback(
        &self,
        tx_pos: Position,
        rx_pos: Position,
        frequency: Frequency,
        deadline: Deadline,
    ) -> Result<PathSample, ProviderError> {
        match &self.fallback {
            Some(fallback) => fallback.path(tx_pos, rx_pos, frequency, deadline),
            None => self.primary.path(tx_pos, rx_pos, frequency, deadline),
        }
    }
}
