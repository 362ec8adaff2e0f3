//! Flattens one or more topology files into a CSV table of per-link output
//! tuples, one row per configured link.

use std::{
    collections::HashMap,
    fs::{read_dir, read_to_string, File},
    io::{self, Write},
    path::PathBuf,
};

use channel_core::{
    engine_registry::EngineRegistry,
    mac::{Csma, MacModel, NoMac, Tdma},
    mcs::{McsEntry, McsTable},
    node::{Fec, Modulation, NodeId, RadioParams},
    orchestrator::ChannelOrchestrator,
    path::FreeSpaceProvider,
    position::Position,
    topology::TopologyDefinition,
    units::Length,
};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Topology file (YAML) or a directory containing several.
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "none")]
    mac: String,

    #[arg(long)]
    mcs_csv: Option<PathBuf>,

    #[arg(long, default_value_t = 500.0)]
    comm_range_m: f64,
}

#[derive(Debug, Clone, Serialize)]
struct Row {
    topology: String,
    tx: String,
    rx: String,
    mac_model: &'static str,
    delay_ms: f64,
    jitter_ms: f64,
    loss_percent: f64,
    rate_mbps: f64,
    mcs_index: u32,
    snr_db: f64,
    sinr_db: f64,
    path_loss_db: f64,
    rx_power_dbm: f64,
    per: f64,
}

fn default_mcs_table() -> McsTable<(NodeId, NodeId)> {
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
            McsEntry {
                mcs_index: 6,
                modulation: Modulation::Qam256,
                code_rate: 0.83,
                min_snr_db: 23.0,
                fec: Fec::Ldpc,
                bandwidth_mhz: None,
                spreading_factor: None,
                processing_gain_db: None,
            },
        ],
        channel_core::mcs::DEFAULT_HYSTERESIS_DB,
    )
    .unwrap()
}

fn parse_mac(name: &str) -> MacModel {
    match name.to_ascii_lowercase().as_str() {
        "csma" => Csma::default().into(),
        "tdma" => Tdma::default().into(),
        _ => NoMac.into(),
    }
}

fn load_orchestrator(args: &Args, path: &PathBuf) -> (String, ChannelOrchestrator) {
    let raw = read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"));
    let topology: TopologyDefinition = serde_yaml::from_str(&raw).expect("failed to parse topology YAML");
    topology.validate().expect("topology failed validation");

    let mut nodes: HashMap<NodeId, RadioParams> = HashMap::new();
    let mut positions: HashMap<NodeId, Position> = HashMap::new();

    for (id, config) in &topology.nodes {
        let Some(wireless) = config.wireless.clone() else {
            continue;
        };
        let (params, position) = wireless.into_radio_params(id).expect("invalid wireless params");
        nodes.insert(id.clone(), params);
        positions.insert(id.clone(), position);
    }

    let links: Vec<(NodeId, NodeId)> = topology
        .wireless_links
        .iter()
        .filter(|link| {
            nodes.contains_key(&link.endpoints.0) && nodes.contains_key(&link.endpoints.1)
        })
        .map(|link| link.endpoints.clone())
        .collect();

    let mcs_table = match &args.mcs_csv {
        Some(mcs_path) => McsTable::from_csv(mcs_path, channel_core::mcs::DEFAULT_HYSTERESIS_DB)
            .expect("failed to load MCS table"),
        None => default_mcs_table(),
    };

    let engines = EngineRegistry::new(FreeSpaceProvider::new().into());
    let orchestrator = ChannelOrchestrator::new(
        nodes,
        positions,
        links,
        engines,
        parse_mac(&args.mac),
        mcs_table,
        Length::from_metres(args.comm_range_m),
    );

    (topology.name, orchestrator)
}

fn collect_rows(args: &Args, path: &PathBuf, rows: &mut Vec<Row>) {
    let (name, orchestrator) = load_orchestrator(args, path);
    let summary = {
        orchestrator.recompute_all();
        orchestrator.summary()
    };

    for ((tx, rx), output) in summary.links {
        rows.push(Row {
            topology: name.clone(),
            tx: tx.to_string(),
            rx: rx.to_string(),
            mac_model: summary.mac_model,
            delay_ms: output.delay_ms,
            jitter_ms: output.jitter_ms,
            loss_percent: output.loss_percent,
            rate_mbps: output.rate_mbps,
            mcs_index: output.mcs_index,
            snr_db: output.snr_db,
            sinr_db: output.sinr_db,
            path_loss_db: output.path_loss_db,
            rx_power_dbm: output.rx_power_dbm,
            per: output.per,
        });
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut rows = Vec::new();

    if args.input.is_dir() {
        for entry in read_dir(&args.input).expect("failed to read input directory") {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    eprintln!("<Warning> {e}");
                    continue;
                }
            };
            collect_rows(&args, &path, &mut rows);
        }
    } else {
        collect_rows(&args, &args.input, &mut rows);
    }

    let write: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).unwrap_or_else(|e| panic!("failed to create {path:?}: {e}"))),
        None => Box::new(io::stdout()),
    };

    let mut writer = csv::Writer::from_writer(write);
    for row in &rows {
        writer.serialize(row).expect("failed to write CSV row");
    }
    writer.flush().expect("failed to flush CSV writer");
}
