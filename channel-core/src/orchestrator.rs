//! ChannelOrchestrator (C12): the top-level pipeline. Owns the node/position
//! tables, the path cache, the MAC model, and the per-link MCS hysteresis
//! state, and sequences cache -> link budget -> interference -> MAC -> SINR
//! -> PER -> MCS -> output for each link.

use std::{collections::HashMap, sync::Mutex};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    engine_registry::EngineRegistry,
    error::{ChannelError, InvariantViolation, NotFoundError, ValidationError},
    frequency_group::{self, group_nodes_by_frequency},
    interference::InterferenceTerm,
    link_budget::{LinkBudget, NoiseFloorCache},
    mac::MacModel,
    mcs::McsTable,
    node::{NodeId, RadioParams},
    path::Deadline,
    path_cache::PathCache,
    per,
    position::Position,
    sinr::compute_sinr,
    units::{Frequency, Length},
};

/// A node is moved only when the change exceeds this threshold; smaller
/// jitter is treated as noise and does not invalidate the path cache.
pub const POSITION_EPSILON_M: f64 = 1e-6;

type LinkKey = (NodeId, NodeId);

/// {delay_ms, jitter_ms, loss%, rate_Mbps, mcs_index, snr_db, sinr_db,
/// path_loss_db, rx_power_dbm, per}, the contract's emitted output tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputTuple {
    pub delay_ms: f64,
    pub jitter_ms: f64,
    pub loss_percent: f64,
    pub rate_mbps: f64,
    pub mcs_index: u32,
    pub snr_db: f64,
    pub sinr_db: f64,
    pub path_loss_db: f64,
    pub rx_power_dbm: f64,
    pub per: f64,
}

/// Per-link lifecycle: Unknown until first computed, Active while the last
/// computation succeeded, Stale after an endpoint moves (awaiting the next
/// `compute_link`), Deleted once the link is explicitly torn down.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LinkState {
    Unknown,
    Active(OutputTuple),
    Stale,
    Deleted,
}

/// One computed link plus the MAC model tag and MCS table size, as returned
/// by [`ChannelOrchestrator::summary`].
#[derive(Debug, Clone)]
pub struct Summary {
    pub links: Vec<(LinkKey, OutputTuple)>,
    pub mac_model: &'static str,
    pub mcs_table_entries: usize,
}

/// Owns every piece of mutable state the pipeline touches. Positions and the
/// per-link MCS history are behind their own mutexes so that `compute_link`
/// calls for distinct links never block on each other beyond the path
/// cache's own per-key serialization.
#[derive(Debug)]
pub struct ChannelOrchestrator {
    nodes: HashMap<NodeId, RadioParams>,
    positions: Mutex<HashMap<NodeId, Position>>,
    links: Vec<LinkKey>,
    link_states: Mutex<HashMap<LinkKey, LinkState>>,
    engines: EngineRegistry,
    cache: PathCache,
    noise_cache: NoiseFloorCache,
    mac_model: MacModel,
    mcs_table: Mutex<McsTable<LinkKey>>,
    comm_range: Length,
    adjacent_threshold: Frequency,
    orthogonal_threshold: Frequency,
}

impl ChannelOrchestrator {
    pub fn new(
        nodes: HashMap<NodeId, RadioParams>,
        positions: HashMap<NodeId, Position>,
        links: Vec<LinkKey>,
        engines: EngineRegistry,
        mac_model: MacModel,
        mcs_table: McsTable<LinkKey>,
        comm_range: Length,
    ) -> Self {
        Self {
            nodes,
            positions: Mutex::new(positions),
            links,
            link_states: Mutex::new(HashMap::new()),
            engines,
            cache: PathCache::new(),
            noise_cache: NoiseFloorCache::new(),
            mac_model,
            mcs_table: Mutex::new(mcs_table),
            comm_range,
            adjacent_threshold: frequency_group::DEFAULT_ADJACENT_THRESHOLD,
            orthogonal_threshold: frequency_group::DEFAULT_ORTHOGONAL_THRESHOLD,
        }
    }

    pub fn with_frequency_thresholds(mut self, adjacent: Frequency, orthogonal: Frequency) -> Self {
        self.adjacent_threshold = adjacent;
        self.orthogonal_threshold = orthogonal;
        self
    }

    pub fn mac_model_name(&self) -> &'static str {
        match &self.mac_model {
            MacModel::NoMac(_) => "none",
            MacModel::Csma(_) => "csma",
            MacModel::Tdma(_) => "tdma",
        }
    }

    fn node_params(&self, id: &NodeId) -> Result<RadioParams, ChannelError> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| NotFoundError::UnknownNode(id.clone()).into())
    }

    fn node_position(
        &self,
        positions: &HashMap<NodeId, Position>,
        id: &NodeId,
    ) -> Result<Position, ChannelError> {
        positions
            .get(id)
            .copied()
            .ok_or_else(|| NotFoundError::UnknownNode(id.clone()).into())
    }

    fn positions_snapshot(&self) -> HashMap<NodeId, Position> {
        self.positions.lock().expect("positions mutex poisoned").clone()
    }

    /// Candidate interferers at `rx`: every other node in the same frequency
    /// group as `rx`, excluding `tx` and `rx` themselves. Groups are rebuilt
    /// per call: the node count is small (N <= ~100, see module design
    /// notes) and only positions, not carrier frequencies, typically change
    /// between calls.
    fn interferers_for(&self, tx: &NodeId, rx: &NodeId) -> Vec<NodeId> {
        let node_frequencies: Vec<(NodeId, Frequency)> = self
            .nodes
            .iter()
            .map(|(id, params)| (id.clone(), params.carrier_frequency))
            .collect();

        let groups = group_nodes_by_frequency(&node_frequencies, self.adjacent_threshold);

        groups
            .into_iter()
            .find(|g| g.contains(rx))
            .map(|g| {
                g.members
                    .into_iter()
                    .map(|(id, _)| id)
                    .filter(|id| id != tx && id != rx)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Queries the path cache for one interferer's contribution at `rx`,
    /// folding it into an [`InterferenceTerm`] via the link-budget formula
    /// with `interferer` standing in as the transmitter. Returns `None`
    /// (degrading the interference estimate rather than aborting the link)
    /// when the path query itself fails: the primary/fallback recovery
    /// already lives in [`EngineRegistry::query`], so a further failure here
    /// means even the fallback provider rejected the query.
    fn interference_term(
        &self,
        interferer: &NodeId,
        positions: &HashMap<NodeId, Position>,
        rx: &NodeId,
        rx_params: &RadioParams,
    ) -> Option<InterferenceTerm> {
        let interferer_params = self.nodes.get(interferer)?;
        let interferer_pos = *positions.get(interferer)?;
        let rx_pos = *positions.get(rx)?;
        let frequency = interferer_params.carrier_frequency;

        let sample = self
            .cache
            .get_or_compute(interferer, rx, frequency, || {
                self.engines.query(interferer_pos, rx_pos, frequency, Deadline::none())
            })
            .map_err(|err| warn!(%interferer, %rx, error = %err, "interference path query failed"))
            .ok()?;

        let noise_floor = self.noise_cache.get(rx_params.bandwidth, rx_params.noise_figure_db);
        let budget = LinkBudget::compute(
            interferer_params.tx_power,
            interferer_params.antenna_gain.gain_dbi(),
            rx_params.antenna_gain.gain_dbi(),
            sample.path_loss_db,
            sample.gains_already_applied,
            noise_floor,
        );

        Some(InterferenceTerm {
            source: interferer.clone(),
            power_at_receiver: budget.rx_power,
            source_frequency_hz: frequency.hz(),
        })
    }

    /// Runs the full pipeline for one directed link: cache -> link budget ->
    /// interference -> MAC -> SINR -> PER -> MCS -> output, per the ordering
    /// guarantee for a single `compute_link` call.
    pub fn compute_link(&self, tx: &NodeId, rx: &NodeId) -> Result<OutputTuple, ChannelError> {
        let tx_params = self.node_params(tx)?;
        let rx_params = self.node_params(rx)?;

        let positions = self.positions_snapshot();
        let tx_pos = self.node_position(&positions, tx)?;
        let rx_pos = self.node_position(&positions, rx)?;

        let frequency = tx_params.carrier_frequency;

        let sample = self
            .cache
            .get_or_compute(tx, rx, frequency, || {
                self.engines.query(tx_pos, rx_pos, frequency, Deadline::none())
            })
            .map_err(|source| ChannelError::Provider {
                link: format!("{tx}->{rx}"),
                phase: "path",
                source,
            })?;

        let noise_floor = self.noise_cache.get(rx_params.bandwidth, rx_params.noise_figure_db);
        if !noise_floor.is_finite() {
            return Err(ChannelError::Invariant {
                link: format!("{tx}->{rx}"),
                phase: "noise_floor",
                source: InvariantViolation::NonFiniteNoiseFloor {
                    bandwidth_hz: rx_params.bandwidth.hz(),
                    noise_figure_db: rx_params.noise_figure_db,
                },
            });
        }

        let budget = LinkBudget::compute(
            tx_params.tx_power,
            tx_params.antenna_gain.gain_dbi(),
            rx_params.antenna_gain.gain_dbi(),
            sample.path_loss_db,
            sample.gains_already_applied,
            noise_floor,
        );
        budget.check_finite(tx, rx).map_err(|source| ChannelError::Invariant {
            link: format!("{tx}->{rx}"),
            phase: "link_budget",
            source,
        })?;

        let interferers = self.interferers_for(tx, rx);
        let terms: Vec<InterferenceTerm> = interferers
            .par_iter()
            .filter_map(|interferer| self.interference_term(interferer, &positions, rx, &rx_params))
            .collect();

        let sinr = compute_sinr(budget.rx_power, budget.noise_floor, &terms, |term| {
            self.mac_model.activity_probability(tx, rx, &term.source, &positions, self.comm_range)
        });

        let snr_db = budget.snr.db_value();
        let sinr_db = sinr.sinr.db_value();
        if sinr_db.is_nan() {
            return Err(ChannelError::Invariant {
                link: format!("{tx}->{rx}"),
                phase: "sinr",
                source: InvariantViolation::NonFiniteSnr(tx.clone(), rx.clone()),
            });
        }

        let link_key = (tx.clone(), rx.clone());
        let mcs_entry = {
            let mut table = self.mcs_table.lock().expect("mcs table mutex poisoned");
            table.select(sinr_db, link_key.clone())
        };

        let packet_error_rate = per::packet_error_rate(
            rx_params.modulation,
            rx_params.fec,
            sinr_db,
            per::DEFAULT_PACKET_BITS,
            1,
        );
        if !(0.0..=1.0).contains(&packet_error_rate) {
            return Err(ChannelError::Invariant {
                link: format!("{tx}->{rx}"),
                phase: "per",
                source: InvariantViolation::PerOutOfRange(packet_error_rate, tx.clone(), rx.clone()),
            });
        }

        // The MCS row's own bandwidth, when present, overrides the
        // receiver's configured channel bandwidth for the rate computation
        // (e.g. a spreading-factor entry valid only at a narrower bandwidth
        // than the interface's usual setting).
        let bandwidth_mhz = mcs_entry.bandwidth_mhz.unwrap_or_else(|| rx_params.bandwidth.MHz());
        let rate_mbps = per::effective_rate_mbps(
            bandwidth_mhz,
            mcs_entry.bits_per_symbol(),
            mcs_entry.code_rate,
            packet_error_rate,
        );

        let output = OutputTuple {
            delay_ms: per::delay_ms(sample.propagation_delay.seconds()),
            jitter_ms: per::jitter_ms(sample.rms_delay_spread.seconds()),
            loss_percent: per::per_to_loss_percent(packet_error_rate),
            rate_mbps,
            mcs_index: mcs_entry.mcs_index,
            snr_db,
            sinr_db,
            path_loss_db: sample.path_loss_db.db_value(),
            rx_power_dbm: budget.rx_power.dbm(),
            per: packet_error_rate,
        };

        self.link_states
            .lock()
            .expect("link state mutex poisoned")
            .insert(link_key, LinkState::Active(output));

        Ok(output)
    }

    /// Validates the new position; if the change exceeds
    /// [`POSITION_EPSILON_M`], updates state and invalidates every cache
    /// entry (and marks every link) touching `node_id`.
    pub fn update_position(&self, node_id: &NodeId, new_position: Position) -> Result<(), ChannelError> {
        if !self.nodes.contains_key(node_id) {
            return Err(NotFoundError::UnknownNode(node_id.clone()).into());
        }
        if !new_position.is_finite() {
            return Err(ValidationError::NonFinitePosition(node_id.clone()).into());
        }

        let moved = {
            let mut positions = self.positions.lock().expect("positions mutex poisoned");
            let previous = positions.get(node_id).copied();
            let changed = previous
                .map(|prev| prev.distance_to(new_position).metres() > POSITION_EPSILON_M)
                .unwrap_or(true);
            if changed {
                positions.insert(node_id.clone(), new_position);
            }
            changed
        };

        if moved {
            self.cache.invalidate_node(node_id);

            let mut states = self.link_states.lock().expect("link state mutex poisoned");
            for link in &self.links {
                if &link.0 == node_id || &link.1 == node_id {
                    states.insert(link.clone(), LinkState::Stale);
                }
            }
        }

        Ok(())
    }

    /// Removes a node entirely: every cache entry touching it is purged and
    /// every link mentioning it is marked `Deleted`. The node itself is left
    /// in the radio-params/position tables (queries against a deleted
    /// node's links surface `Deleted` via `get_link`, not a panic), since
    /// removing it outright would shift the frequency grouping of every
    /// other link mid-computation.
    pub fn remove_node(&self, node_id: &NodeId) {
        self.cache.invalidate_node(node_id);
        let mut states = self.link_states.lock().expect("link state mutex poisoned");
        for link in &self.links {
            if &link.0 == node_id || &link.1 == node_id {
                states.insert(link.clone(), LinkState::Deleted);
            }
        }
    }

    /// Iterates every configured link, recomputing each independently; per
    /// the concurrency model, this is safe to parallelize because every
    /// per-link computation is a pure function of the position snapshot
    /// taken at entry. Links that fail to compute are logged and omitted
    /// rather than aborting the whole pass.
    pub fn recompute_all(&self) -> HashMap<LinkKey, OutputTuple> {
        self.links
            .par_iter()
            .filter_map(|(tx, rx)| match self.compute_link(tx, rx) {
                Ok(output) => Some(((tx.clone(), rx.clone()), output)),
                Err(err) => {
                    warn!(%tx, %rx, error = %err, "link recompute failed");
                    None
                }
            })
            .collect()
    }

    /// Returns the configured link's last computed output, recomputing it
    /// fresh. Distinct from reading `LinkState` directly: callers always see
    /// a consistent, just-computed tuple rather than a possibly-Stale one.
    pub fn get_link(&self, tx: &NodeId, rx: &NodeId) -> Result<OutputTuple, ChannelError> {
        if !self.links.iter().any(|(a, b)| a == tx && b == rx) {
            return Err(NotFoundError::UnknownLink(tx.clone(), rx.clone()).into());
        }
        self.compute_link(tx, rx)
    }

    /// All configured links' last-known outputs (as currently held in
    /// `link_states`; links never computed are omitted), plus the MAC model
    /// tag and MCS table size.
    pub fn summary(&self) -> Summary {
        let states = self.link_states.lock().expect("link state mutex poisoned");
        let links = self
            .links
            .iter()
            .filter_map(|key| match states.get(key) {
                Some(LinkState::Active(output)) => Some((key.clone(), *output)),
                _ => None,
            })
            .collect();

        Summary {
            links,
            mac_model: self.mac_model_name(),
            mcs_table_entries: self.mcs_table.lock().expect("mcs table mutex poisoned").len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine_registry::EngineRegistry,
        mac::{Csma, NoMac},
        mcs::McsEntry,
        node::{AntennaGain, AntennaPattern, Fec, Modulation, Polarization},
        path::FreeSpaceProvider,
        units::Dbm,
    };

    fn radio(freq_ghz: f64) -> RadioParams {
        RadioParams {
            tx_power: Dbm::from_dbm(20.0),
            antenna_gain: AntennaGain::Pattern(AntennaPattern::Dipole),
            polarization: Polarization::V,
            carrier_frequency: Frequency::from_GHz(freq_ghz),
            bandwidth: Frequency::from_MHz(80.0),
            modulation: Modulation::Qam64,
            fec: Fec::Ldpc,
            code_rate: 0.75,
            noise_figure_db: 7.0,
        }
    }

    fn sample_mcs_table() -> McsTable<LinkKey> {
        McsTable::new(
            vec![
                McsEntry {
                    mcs_index: 0,
                    modulation: Modulation::Bpsk,
                    code_rate: 0.5,
                    min_snr_db: -5.0,
                    fec: Fec::None,
                    bandwidth_mhz: None,
                    spreading_factor: None,
                    processing_gain_db: None,
                },
                McsEntry {
                    mcs_index: 5,
                    modulation: Modulation::Qam64,
                    code_rate: 0.75,
                    min_snr_db: 18.0,
                    fec: Fec::Ldpc,
                    bandwidth_mhz: None,
                    spreading_factor: None,
                    processing_gain_db: None,
                },
            ],
            2.0,
        )
        .unwrap()
    }

    fn triangle_orchestrator() -> ChannelOrchestrator {
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        let c = NodeId::new("c");

        let mut nodes = HashMap::new();
        nodes.insert(a.clone(), radio(5.18));
        nodes.insert(b.clone(), radio(5.18));
        nodes.insert(c.clone(), radio(5.18));

        let mut positions = HashMap::new();
        positions.insert(a.clone(), Position::new(0.0, 0.0, 1.5));
        positions.insert(b.clone(), Position::new(100.0, 0.0, 1.5));
        positions.insert(c.clone(), Position::new(50.0, 86.6, 1.5));

        let links = vec![(a.clone(), b.clone()), (b.clone(), a.clone())];

        let engines = EngineRegistry::new(FreeSpaceProvider::new().into());

        ChannelOrchestrator::new(
            nodes,
            positions,
            links,
            engines,
            NoMac.into(),
            sample_mcs_table(),
            Length::from_metres(100.0),
        )
    }

    #[test]
    fn compute_link_matches_the_equilateral_triangle_worked_example() {
        let orchestrator = triangle_orchestrator();
        let output = orchestrator.compute_link(&NodeId::new("a"), &NodeId::new("b")).unwrap();

        assert!((output.path_loss_db - 86.77).abs() < 0.05);
        assert!((output.snr_db - 25.53).abs() < 0.5);
    }

    #[test]
    fn zero_bandwidth_noise_floor_is_an_invariant_violation() {
        let a = NodeId::new("a");
        let b = NodeId::new("b");

        let mut broken_rx = radio(5.18);
        broken_rx.bandwidth = Frequency::from_hz(0.0);

        let mut nodes = HashMap::new();
        nodes.insert(a.clone(), radio(5.18));
        nodes.insert(b.clone(), broken_rx);

        let mut positions = HashMap::new();
        positions.insert(a.clone(), Position::new(0.0, 0.0, 0.0));
        positions.insert(b.clone(), Position::new(10.0, 0.0, 0.0));

        let orchestrator = ChannelOrchestrator::new(
            nodes,
            positions,
            vec![(a.clone(), b.clone())],
            EngineRegistry::new(FreeSpaceProvider::new().into()),
            NoMac.into(),
            sample_mcs_table(),
            Length::from_metres(100.0),
        );

        let result = orchestrator.compute_link(&a, &b);
        assert!(matches!(
            result,
            Err(ChannelError::Invariant { source: InvariantViolation::NonFiniteNoiseFloor { .. }, .. })
        ));
    }

    #[test]
    fn unknown_node_is_not_found() {
        let orchestrator = triangle_orchestrator();
        let result = orchestrator.compute_link(&NodeId::new("a"), &NodeId::new("ghost"));
        assert!(matches!(result, Err(ChannelError::NotFound(_))));
    }

    #[test]
    fn update_position_invalidates_cache_and_changes_path_loss() {
        let orchestrator = triangle_orchestrator();
        let a = NodeId::new("a");
        let b = NodeId::new("b");

        let before = orchestrator.compute_link(&a, &b).unwrap();
        orchestrator.update_position(&a, Position::new(10.0, 0.0, 1.5)).unwrap();
        let after = orchestrator.compute_link(&a, &b).unwrap();

        assert!(after.path_loss_db > before.path_loss_db);
    }

    #[test]
    fn sub_epsilon_move_does_not_mark_link_stale() {
        let orchestrator = triangle_orchestrator();
        let a = NodeId::new("a");
        let b = NodeId::new("b");

        orchestrator.compute_link(&a, &b).unwrap();
        orchestrator
            .update_position(&a, Position::new(1e-9, 0.0, 1.5))
            .unwrap();

        let states = orchestrator.link_states.lock().unwrap();
        assert!(matches!(states.get(&(a.clone(), b.clone())), Some(LinkState::Active(_))));
    }

    #[test]
    fn get_link_rejects_unconfigured_pairs() {
        let orchestrator = triangle_orchestrator();
        let result = orchestrator.get_link(&NodeId::new("a"), &NodeId::new("c"));
        assert!(matches!(result, Err(ChannelError::NotFound(_))));
    }

    #[test]
    fn recompute_all_covers_every_configured_link() {
        let orchestrator = triangle_orchestrator();
        let results = orchestrator.recompute_all();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn summary_reports_mac_model_and_table_size() {
        let orchestrator = triangle_orchestrator();
        orchestrator.recompute_all();
        let summary = orchestrator.summary();
        assert_eq!(summary.mac_model, "none");
        assert_eq!(summary.mcs_table_entries, 2);
        assert_eq!(summary.links.len(), 2);
    }

    #[test]
    fn csma_interference_term_sees_the_third_node() {
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        let c = NodeId::new("c");

        let mut nodes = HashMap::new();
        nodes.insert(a.clone(), radio(5.18));
        nodes.insert(b.clone(), radio(5.18));
        nodes.insert(c.clone(), radio(5.18));

        let mut positions = HashMap::new();
        positions.insert(a.clone(), Position::new(0.0, 0.0, 0.0));
        positions.insert(b.clone(), Position::new(50.0, 0.0, 0.0));
        positions.insert(c.clone(), Position::new(500.0, 0.0, 0.0));

        let links = vec![(a.clone(), b.clone())];
        let engines = EngineRegistry::new(FreeSpaceProvider::new().into());

        let orchestrator = ChannelOrchestrator::new(
            nodes,
            positions,
            links,
            engines,
            Csma::default().into(),
            sample_mcs_table(),
            Length::from_metres(50.0),
        );

        let output = orchestrator.compute_link(&a, &b).unwrap();
        assert!(output.snr_db.is_finite());
    }

    #[test]
    fn mcs_bandwidth_override_feeds_effective_rate() {
        // An MCS entry carrying its own bandwidth should be used for the
        // rate computation in place of the receiver's configured channel
        // bandwidth.
        let narrow_table = McsTable::new(
            vec![McsEntry {
                mcs_index: 0,
                modulation: Modulation::Qpsk,
                code_rate: 0.5,
                min_snr_db: -10.0,
                fec: Fec::None,
                bandwidth_mhz: Some(10.0),
                spreading_factor: None,
                processing_gain_db: None,
            }],
            2.0,
        )
        .unwrap();

        let a = NodeId::new("a");
        let b = NodeId::new("b");
        let mut nodes = HashMap::new();
        nodes.insert(a.clone(), radio(5.18));
        nodes.insert(b.clone(), radio(5.18));
        let mut positions = HashMap::new();
        positions.insert(a.clone(), Position::new(0.0, 0.0, 0.0));
        positions.insert(b.clone(), Position::new(10.0, 0.0, 0.0));

        let orchestrator = ChannelOrchestrator::new(
            nodes,
            positions,
            vec![(a.clone(), b.clone())],
            EngineRegistry::new(FreeSpaceProvider::new().into()),
            NoMac.into(),
            narrow_table,
            Length::from_metres(100.0),
        );

        let output = orchestrator.compute_link(&a, &b).unwrap();
        // radio() configures an 80 MHz interface; the override caps the rate
        // to what 10 MHz would support, which is well under what 80 MHz
        // would have produced at the same PER/bits-per-symbol/code-rate.
        let unbounded = per::effective_rate_mbps(80.0, 2, 0.5, output.per);
        assert!(output.rate_mbps < unbounded);
    }
}
