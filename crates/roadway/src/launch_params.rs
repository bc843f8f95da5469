//! Launch parameter parsing for the simulation.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;

use crate::constants::{DEFAULT_ROCK_COUNT, DEFAULT_TRAFFIC_COUNT, DEFAULT_TREE_COUNT};

/// Launch parameters for the simulation.
#[derive(Resource, Debug, Clone)]
pub struct SimulationConfig {
    /// Number of traffic agents to load.
    pub traffic_count: usize,
    /// Number of trees scattered around the road.
    pub tree_count: usize,
    /// Number of rocks scattered around the road.
    pub rock_count: usize,
    /// Seed for scenery scatter and traffic placement. Random when absent.
    pub seed: Option<u64>,
    /// Whether engine and ambient sounds are played.
    pub audio: bool,
    /// Whether the collider debug overlay starts enabled.
    pub physics_debug: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            traffic_count: DEFAULT_TRAFFIC_COUNT,
            tree_count: DEFAULT_TREE_COUNT,
            rock_count: DEFAULT_ROCK_COUNT,
            seed: None,
            audio: true,
            physics_debug: false,
        }
    }
}

impl SimulationConfig {
    /// Resolve the seed, drawing a fresh one if none was configured.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Drive a car down a procedurally dressed road")]
    struct CliArgs {
        /// Number of traffic vehicles.
        #[arg(long, default_value_t = DEFAULT_TRAFFIC_COUNT)]
        traffic: usize,

        /// Number of trees to scatter.
        #[arg(long, default_value_t = DEFAULT_TREE_COUNT)]
        trees: usize,

        /// Number of rocks to scatter.
        #[arg(long, default_value_t = DEFAULT_ROCK_COUNT)]
        rocks: usize,

        /// Seed for scenery and traffic placement.
        #[arg(long)]
        seed: Option<u64>,

        /// Disable engine and ambient sounds.
        #[arg(long)]
        mute: bool,

        /// Start with the collider debug overlay enabled.
        #[arg(long)]
        physics_debug: bool,
    }

    pub fn parse() -> SimulationConfig {
        let args = CliArgs::parse();
        SimulationConfig {
            traffic_count: args.traffic,
            tree_count: args.trees,
            rock_count: args.rocks,
            seed: args.seed,
            audio: !args.mute,
            physics_debug: args.physics_debug,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> SimulationConfig {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        SimulationConfig::default()
    }
}
