//! Computes netem output tuples for every configured link in a topology,
//! or a single link when `--tx`/`--rx` are given.

use std::{
    collections::HashMap,
    fs::{create_dir_all, read_dir, read_to_string, File},
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use channel_core::{
    engine_registry::EngineRegistry,
    mac::{Csma, MacModel, NoMac, Tdma},
    mcs::{McsEntry, McsTable},
    node::{Fec, Modulation, NodeId, RadioParams},
    path::FreeSpaceProvider,
    position::Position,
    topology::TopologyDefinition,
    units::Length,
};
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Topology file (YAML) or a directory containing several.
    #[arg(short, long)]
    input: PathBuf,

    /// Output file, or a directory when `--input` is a directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// MAC model: "none", "csma", or "tdma".
    #[arg(long, default_value = "none")]
    mac: String,

    /// Optional MCS table CSV; falls back to a small built-in table.
    #[arg(long)]
    mcs_csv: Option<PathBuf>,

    #[arg(long, default_value_t = channel_core::mcs::DEFAULT_HYSTERESIS_DB)]
    hysteresis_db: f64,

    /// Carrier-sense / interference grouping range in metres.
    #[arg(long, default_value_t = 500.0)]
    comm_range_m: f64,

    /// Compute only one link instead of every configured link.
    #[arg(long, requires = "rx")]
    tx: Option<String>,
    #[arg(long, requires = "tx")]
    rx: Option<String>,

    #[arg(short, long)]
    quiet: bool,
}

fn default_mcs_table() -> McsTable<(NodeId, NodeId)> {
    let entries = vec![
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
            mcs_index: 2,
            modulation: Modulation::Qpsk,
            code_rate: 0.75,
            min_snr_db: 5.0,
            fec: Fec::Ldpc,
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
    ];
    McsTable::new(entries, channel_core::mcs::DEFAULT_HYSTERESIS_DB).unwrap()
}

fn parse_mac(name: &str) -> MacModel {
    match name.to_ascii_lowercase().as_str() {
        "csma" => Csma::default().into(),
        "tdma" => Tdma::default().into(),
        _ => NoMac.into(),
    }
}

fn build_orchestrator(args: &Args, topology: &TopologyDefinition) -> channel_core::orchestrator::ChannelOrchestrator {
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
        Some(path) => McsTable::from_csv(path, args.hysteresis_db).expect("failed to load MCS table"),
        None => default_mcs_table(),
    };

    let engines = EngineRegistry::new(FreeSpaceProvider::new().into());

    channel_core::orchestrator::ChannelOrchestrator::new(
        nodes,
        positions,
        links,
        engines,
        parse_mac(&args.mac),
        mcs_table,
        Length::from_metres(args.comm_range_m),
    )
}

fn run_one(args: &Args, input: &PathBuf) -> serde_json::Value {
    let raw = read_to_string(input).unwrap_or_else(|e| panic!("failed to read {input:?}: {e}"));
    let topology: TopologyDefinition = serde_yaml::from_str(&raw).expect("failed to parse topology YAML");
    topology.validate().expect("topology failed validation");

    let orchestrator = build_orchestrator(args, &topology);

    let links: HashMap<String, channel_core::orchestrator::OutputTuple> =
        match (&args.tx, &args.rx) {
            (Some(tx), Some(rx)) => {
                let tx = NodeId::new(tx);
                let rx = NodeId::new(rx);
                let output = orchestrator.get_link(&tx, &rx).unwrap_or_else(|e| panic!("{e}"));
                HashMap::from([(format!("{tx}->{rx}"), output)])
            }
            _ => orchestrator
                .recompute_all()
                .into_iter()
                .map(|((tx, rx), output)| (format!("{tx}->{rx}"), output))
                .collect(),
        };

    serde_json::json!({
        "topology": topology.name,
        "mac_model": orchestrator.mac_model_name(),
        "links": links,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    if !args.input.is_dir() {
        let value = run_one(&args, &args.input);
        let write: Box<dyn Write> = match &args.output {
            Some(path) => Box::new(File::create(path).unwrap_or_else(|e| panic!("failed to create {path:?}: {e}"))),
            None => Box::new(io::stdout()),
        };
        serde_json::to_writer_pretty(write, &value).expect("failed to write output");
        return ExitCode::SUCCESS;
    }

    let output_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("outputs"));
    create_dir_all(&output_dir).expect("failed to create output directory");

    let entries: Vec<PathBuf> = read_dir(&args.input)
        .expect("failed to read input directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();

    entries.par_iter().for_each(|path| {
        if !args.quiet {
            println!("computing {path:?}");
        }
        let value = run_one(&args, path);
        let file_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("topology");
        let out_path = output_dir.join(format!("{file_name}.json"));
        let file = File::create(&out_path).unwrap_or_else(|e| panic!("failed to create {out_path:?}: {e}"));
        serde_json::to_writer_pretty(file, &value).expect("failed to write output");
    });

    ExitCode::SUCCESS
}
