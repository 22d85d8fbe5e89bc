use crate::types::{Coords, WorkoutType};
use crate::utils::parse_coords;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "pinlog.sqlite3";

#[derive(Parser, Debug)]
#[command(
    name = "pinlog",
    about = "Log runs and rides by pinning them to a map location"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,

    /// SQLite file holding the saved workouts.
    #[arg(long, env = "PINLOG_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: PathBuf,

    /// Keep workouts in memory only; nothing is saved.
    #[arg(long, global = true)]
    pub memory: bool,

    /// Current position reported to the map, as LAT,LNG. Without it the map is unavailable.
    #[arg(long, env = "PINLOG_POSITION", value_parser = parse_coords, global = true)]
    pub position: Option<Coords>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print all saved workouts (the default).
    List,

    /// Add one workout at a map position.
    Add {
        #[arg(long = "type", value_name = "TYPE")]
        workout_type: WorkoutType,

        /// Where on the map, as LAT,LNG.
        #[arg(long, value_parser = parse_coords, allow_hyphen_values = true)]
        at: Coords,

        /// Kilometres.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,

        /// Minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running).
        #[arg(long, allow_hyphen_values = true, default_value = "")]
        cadence: String,

        /// Metres climbed (cycling).
        #[arg(long, allow_hyphen_values = true, default_value = "")]
        elevation: String,
    },

    /// Pan to a workout and count the selection.
    Select { id: String },

    /// Delete all saved workouts.
    Reset,

    /// Write all workouts as GPX waypoints.
    ExportGpx { path: PathBuf },

    /// Interactive session reading commands from stdin.
    Shell,
}
