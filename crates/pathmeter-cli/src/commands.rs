use anyhow::{bail, Result};
use pathmeter_core::{
    closest_point_to_agent, current_path_progress, current_path_remaining_distance,
    current_path_total_distance, path_distance_to_point, point_segment_distance,
    MovementSnapshot, MovementSource, PathSettings, WaypointMatch,
};

use crate::cli::{Cli, Command};

/// Pick the waypoint matching mode: an explicit tolerance on the command line wins over
/// the settings file.
fn match_mode(settings: &PathSettings, tolerance: Option<f64>) -> Result<WaypointMatch> {
    match tolerance {
        Some(t) if !t.is_finite() || t < 0.0 => {
            bail!("Tolerance must be finite and not negative, got {}", t)
        }
        Some(t) => Ok(WaypointMatch::Within { tolerance: t }),
        None => Ok(settings.waypoint_match),
    }
}

fn check_radius(radius: f64) -> Result<f64> {
    if !radius.is_finite() || radius < 0.0 {
        bail!("Radius must be finite and not negative, got {}", radius);
    }
    Ok(radius)
}

fn load_snapshot(path: &std::path::Path) -> Result<MovementSnapshot> {
    let snapshot = MovementSnapshot::load(path)?;
    tracing::debug!(
        "Loaded snapshot with {} nodes, next waypoint: {:?}",
        snapshot.current_path().len(),
        snapshot.current_move_to().map(|p| (p.x, p.y, p.z))
    );
    Ok(snapshot)
}

pub async fn run(args: Cli) -> Result<()> {
    if let Some(output) = execute(args).await? {
        println!("{}", output);
    }
    Ok(())
}

/// Run a command and return the line to print, if any.
async fn execute(args: Cli) -> Result<Option<String>> {
    if let Command::Settings { tolerance, radius } = args.command {
        // A file that does not parse is never overwritten with defaults
        let mut settings = PathSettings::load_or_insert_strict(&args.settings_file)?;
        if let Some(t) = tolerance {
            settings.waypoint_match = if t == 0.0 {
                WaypointMatch::Exact
            } else {
                match_mode(&settings, Some(t))?
            };
        }
        if let Some(r) = radius {
            settings.proximity_radius = check_radius(r)?;
        }
        settings.validate()?;
        settings.store(&args.settings_file).await;
        tracing::info!(
            "Saved settings to {}: {:?}",
            args.settings_file.display(),
            settings
        );
        return Ok(None);
    }

    let settings = PathSettings::load_or_insert(&args.settings_file)?;

    let output = match args.command {
        Command::Closest { snapshot } => {
            let snapshot = load_snapshot(&snapshot)?;
            let index = closest_point_to_agent(&snapshot);
            match snapshot.path.get(index) {
                Some(p) => format!("{} ({}, {}, {})", index, p.x, p.y, p.z),
                None => {
                    tracing::warn!("Path is empty");
                    format!("{}", index)
                }
            }
        }
        Command::Total { snapshot } => {
            let snapshot = load_snapshot(&snapshot)?;
            format!("{}", current_path_total_distance(&snapshot))
        }
        Command::Remaining {
            snapshot,
            tolerance,
        } => {
            let mode = match_mode(&settings, tolerance)?;
            let snapshot = load_snapshot(&snapshot)?;
            format!("{}", current_path_remaining_distance(&snapshot, mode))
        }
        Command::Progress {
            snapshot,
            tolerance,
        } => {
            let mode = match_mode(&settings, tolerance)?;
            let snapshot = load_snapshot(&snapshot)?;
            match current_path_progress(&snapshot, mode) {
                Some(progress) => format!("{}", progress),
                None => bail!("Path has no length"),
            }
        }
        Command::Near {
            snapshot,
            point,
            radius,
        } => {
            let radius = check_radius(radius.unwrap_or(settings.proximity_radius))?;
            let snapshot = load_snapshot(&snapshot)?;
            match path_distance_to_point(&snapshot.path, &point) {
                Some(distance) => format!("{} {}", distance, distance <= radius),
                None => bail!("Path is empty"),
            }
        }
        Command::Segment { start, end, point } => {
            format!("{}", point_segment_distance(&start, &end, &point))
        }
        Command::Settings { .. } => unreachable!("handled above"),
    };

    Ok(Some(output))
}
