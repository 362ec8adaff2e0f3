//! Generates a synthetic topology file for exercising the channel core
//! without hand-writing YAML: a grid of evenly-spaced nodes by default, or
//! a random scatter within a square when `--random` is given.

use std::{collections::HashMap, fs::File, io::Write, path::PathBuf};

use channel_core::{
    node::{AntennaPattern, Fec, Modulation, NodeId, Polarization},
    position::Position,
    topology::{NodeConfig, TopologyDefinition, WirelessLink, WirelessParams},
};
use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "topology.yaml")]
    output: PathBuf,

    /// Number of wireless nodes to generate.
    #[arg(short, long, default_value_t = 20)]
    nodes: usize,

    /// Scatter nodes randomly in a square instead of laying out a grid.
    #[arg(long)]
    random: bool,

    /// Grid spacing in metres (grid layout only).
    #[arg(long, default_value_t = 20.0)]
    spacing_m: f64,

    /// Side length of the placement square in metres (random layout only).
    #[arg(long, default_value_t = 200.0)]
    side_len_m: f64,

    /// Only link nodes within this distance of each other.
    #[arg(long, default_value_t = 60.0)]
    link_range_m: f64,

    #[arg(long)]
    seed: Option<u64>,
}

fn sample_wireless(position: Position) -> WirelessParams {
    WirelessParams {
        rf_power_dbm: 20.0,
        antenna_pattern: Some(AntennaPattern::Dipole),
        antenna_gain_dbi: None,
        polarization: Polarization::V,
        frequency_ghz: 5.18,
        bandwidth_mhz: 20.0,
        modulation: Modulation::Qam64,
        fec_type: Fec::Ldpc,
        fec_code_rate: 0.75,
        noise_figure_db: None,
        position,
    }
}

fn grid_positions(count: usize, spacing_m: f64) -> Vec<Position> {
    let side = (count as f64).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let x = (i % side) as f64 * spacing_m;
            let y = (i / side) as f64 * spacing_m;
            Position::new(x, y, 1.5)
        })
        .collect()
}

fn random_positions(count: usize, side_len_m: f64, rng: &mut StdRng) -> Vec<Position> {
    (0..count)
        .map(|_| {
            let x = rng.random_range(0.0..side_len_m);
            let y = rng.random_range(0.0..side_len_m);
            Position::new(x, y, 1.5)
        })
        .collect()
}

fn main() {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed.unwrap_or_else(|| rand::rng().random()));

    let positions = if args.random {
        random_positions(args.nodes, args.side_len_m, &mut rng)
    } else {
        grid_positions(args.nodes, args.spacing_m)
    };

    let ids: Vec<NodeId> = (0..args.nodes).map(|i| NodeId::new(format!("node{i}"))).collect();

    let mut nodes = HashMap::new();
    for (id, position) in ids.iter().zip(&positions) {
        nodes.insert(
            id.clone(),
            NodeConfig {
                image: "alpine:latest".to_string(),
                command: None,
                binds: Vec::new(),
                env: HashMap::new(),
                wireless: Some(sample_wireless(*position)),
            },
        );
    }

    let mut wireless_links = Vec::new();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            if positions[i].distance_to(positions[j]).metres() <= args.link_range_m {
                wireless_links.push(WirelessLink {
                    endpoints: (ids[i].clone(), ids[j].clone()),
                    bandwidth_override_mbps: None,
                });
            }
        }
    }

    let topology = TopologyDefinition {
        name: "generated".to_string(),
        prefix: None,
        nodes,
        wireless_links,
        scene: None,
        channel_server: "http://localhost:8000".to_string(),
        mobility_poll_ms: 100,
    };

    topology.validate().expect("generated topology failed validation");

    let yaml = serde_yaml::to_string(&topology).expect("failed to serialize topology");
    let mut file = File::create(&args.output).unwrap_or_else(|e| panic!("failed to create {:?}: {e}", args.output));
    file.write_all(yaml.as_bytes()).expect("failed to write topology file");

    println!(
        "wrote {} nodes, {} links to {:?}",
        args.nodes,
        topology.wireless_links.len(),
        args.output
    );
}
