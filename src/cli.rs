use crate::config::ElevationRule;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_STORE: &str = "mapty.sqlite3";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts pinned to map coordinates"
)]
pub struct Cli {
    /// SQLite file holding the stored workouts.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_STORE, global = true)]
    pub store: PathBuf,

    /// Your latitude. Without a position the map stays off.
    #[arg(long, allow_hyphen_values = true, requires = "lng", global = true)]
    pub lat: Option<f64>,

    /// Your longitude.
    #[arg(long, allow_hyphen_values = true, requires = "lat", global = true)]
    pub lng: Option<f64>,

    /// Map zoom level used when centering.
    #[arg(long, default_value_t = crate::config::DEFAULT_MAP_ZOOM, global = true)]
    pub zoom: u8,

    /// How cycling elevation is validated.
    #[arg(long, value_enum, default_value_t = ElevationRule::AnyFinite, global = true)]
    pub elevation_rule: ElevationRule,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Click the map at a position and submit the workout form.
    #[command(subcommand)]
    Add(AddCmd),

    /// Print the workout list.
    List {
        /// Print the list markup instead of one line per workout.
        #[arg(long)]
        html: bool,
    },

    /// Center the map on a workout.
    Focus {
        /// Workout id as shown by `list`.
        id: String,
    },

    /// Delete every stored workout.
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum AddCmd {
    Running {
        #[command(flatten)]
        base: BaseArgs,

        /// Steps per minute.
        #[arg(long, allow_hyphen_values = true)]
        cadence: String,
    },
    Cycling {
        #[command(flatten)]
        base: BaseArgs,

        /// Elevation gain in meters.
        #[arg(long, allow_hyphen_values = true)]
        elevation: String,
    },
}

/// Fields shared by both workout types. Numbers are taken as typed and
/// validated by the form.
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Map position as LAT,LNG.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: String,

    /// Distance in km.
    #[arg(long, allow_hyphen_values = true)]
    pub distance: String,

    /// Duration in minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_cycling_with_negative_values() {
        let cli = Cli::try_parse_from([
            "mapty", "--lat", "40", "--lng", "-73", "add", "cycling", "--at", "40.1,-73.2",
            "--distance", "3", "--duration", "20", "--elevation", "-5",
        ])
        .unwrap();

        assert_eq!(cli.lng, Some(-73.0));
        let Cmd::Add(AddCmd::Cycling { base, elevation }) = cli.cmd else {
            panic!("expected add cycling");
        };
        assert_eq!(base.at, "40.1,-73.2");
        assert_eq!(elevation, "-5");
    }

    #[test]
    fn lat_requires_lng() {
        assert!(Cli::try_parse_from(["mapty", "--lat", "40", "list"]).is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["mapty", "list"]).unwrap();
        assert_eq!(cli.store, PathBuf::from(DEFAULT_STORE));
        assert_eq!(cli.zoom, 13);
        assert_eq!(cli.elevation_rule, ElevationRule::AnyFinite);
        assert!(matches!(cli.cmd, Cmd::List { html: false }));
    }
}
