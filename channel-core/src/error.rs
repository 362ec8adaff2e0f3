//! Error kinds for the channel core, per the propagation policy: validation
//! failures are fatal at load, transient provider failures recover locally
//! where possible, invariant violations abort the offending computation, and
//! not-found errors are surfaced to the caller without affecting other links.

use std::time::Duration;

use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("antenna pattern '{0}' is not a recognised symbolic pattern")]
    UnknownAntennaPattern(String),

    #[error("radio parameter '{field}' out of range: {value} not in {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("node '{0}' declares neither antenna gain nor a symbolic antenna pattern")]
    MissingAntennaSpec(NodeId),

    #[error("link endpoint '{0}' is not a configured node")]
    UnknownLinkEndpoint(NodeId),

    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(NodeId),

    #[error("mobility poll interval {0}ms is out of the 10..10000 range")]
    InvalidPollInterval(u32),

    #[error("position update for '{0}' is not a finite (x, y, z)")]
    NonFinitePosition(NodeId),
}

/// Raised when a ray-traced path query fails or times out. Recoverable by
/// falling back to [`crate::path::FreeSpaceProvider`] when a fallback mode is
/// configured; otherwise surfaced per-link with the last-known-good sample
/// retained.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("path provider unreachable: {0}")]
    Unreachable(String),

    #[error("path query exceeded its deadline ({0:?})")]
    Timeout(Duration),

    #[error("path provider returned a non-finite or invalid value")]
    NonFiniteResult,

    #[error("query inputs were invalid: {0}")]
    InvalidInput(String),
}

/// A computed quantity fell outside its contractual range. Fatal: the
/// computation aborts and the link is marked `Stale`.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("PER {0} for link {1}->{2} is outside [0, 1]")]
    PerOutOfRange(f64, NodeId, NodeId),

    #[error("SNR for link {0}->{1} is NaN")]
    NonFiniteSnr(NodeId, NodeId),

    #[error("noise floor for bandwidth {bandwidth_hz}Hz, NF {noise_figure_db}dB is non-finite")]
    NonFiniteNoiseFloor {
        bandwidth_hz: f64,
        noise_figure_db: f64,
    },
}

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("unknown node '{0}'")]
    UnknownNode(NodeId),

    #[error("no configured link between '{0}' and '{1}'")]
    UnknownLink(NodeId, NodeId),
}

/// Error surfaced at the boundary of `compute_link`/`update_position`, with
/// enough context for the external API layer to report meaningfully.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("path provider failed for {link} during {phase}: {source}")]
    Provider {
        link: String,
        phase: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("invariant violated for {link} during {phase}: {source}")]
    Invariant {
        link: String,
        phase: &'static str,
        #[source]
        source: InvariantViolation,
    },

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}
