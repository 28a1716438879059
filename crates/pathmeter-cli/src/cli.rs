use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pathmeter_core::Vector3;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the index of the path node closest to the agent.
    #[clap(name = "closest")]
    Closest {
        #[clap(short, long)]
        snapshot: PathBuf,
    },

    /// Print the total length of the path.
    #[clap(name = "total")]
    Total {
        #[clap(short, long)]
        snapshot: PathBuf,
    },

    /// Print the distance left to travel along the path.
    #[clap(name = "remaining")]
    Remaining {
        #[clap(short, long)]
        snapshot: PathBuf,
        /// Match the next waypoint within this distance instead of the configured mode.
        #[clap(long)]
        tolerance: Option<f64>,
    },

    /// Print the fraction of the path already travelled.
    #[clap(name = "progress")]
    Progress {
        #[clap(short, long)]
        snapshot: PathBuf,
        #[clap(long)]
        tolerance: Option<f64>,
    },

    /// Print how far a point is from the path, eg. to check whether an enemy is in the way.
    #[clap(name = "near")]
    Near {
        #[clap(short, long)]
        snapshot: PathBuf,
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Vector3,
        #[clap(long)]
        radius: Option<f64>,
    },

    /// Print the distance from a point to a line segment.
    #[clap(name = "segment")]
    Segment {
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: Vector3,
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        end: Vector3,
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Vector3,
    },

    /// Update the settings file. Options that are not given keep their current value.
    #[clap(name = "settings")]
    Settings {
        /// Match waypoints within this distance. Pass 0 to go back to exact matching.
        #[clap(long)]
        tolerance: Option<f64>,
        #[clap(long)]
        radius: Option<f64>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "pathmeter")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    #[clap(long, short = 'f', default_value = "pathmeter-settings.json")]
    pub settings_file: PathBuf,

    #[clap(long, default_value = "info")]
    pub log_level: String,

    /// Path of the JSON log file, "auto" for the local data directory or "none".
    #[clap(long, default_value = "none")]
    pub log_file: String,
}

/// Parse a point given as `x,y,z`.
pub fn parse_point(s: &str) -> Result<Vector3, String> {
    let coords = s
        .split(',')
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid coordinate '{}': {}", c.trim(), err))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match coords.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 coordinates, got {}", coords.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(
            parse_point("1,-2.5, 3").unwrap(),
            Vector3::new(1.0, -2.5, 3.0)
        );
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,3,4").is_err());
        assert!(parse_point("1,b,3").is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "pathmeter",
            "segment",
            "--start",
            "0,0,0",
            "--end",
            "10,0,0",
            "--point",
            "-5,5,0",
        ])
        .unwrap();

        match cli.command {
            Command::Segment { start, end, point } => {
                assert_eq!(start, Vector3::zeros());
                assert_eq!(end, Vector3::new(10.0, 0.0, 0.0));
                assert_eq!(point, Vector3::new(-5.0, 5.0, 0.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.settings_file, PathBuf::from("pathmeter-settings.json"));
        assert_eq!(cli.log_file, "none");
    }
}
