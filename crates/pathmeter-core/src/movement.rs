use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    closest_point_index, path_remaining_distance, path_total_distance, Vector3, WaypointMatch,
};

/// Read access to the state of a movement system: the path being followed, the node
/// the agent is currently heading to and where the agent is.
pub trait MovementSource {
    /// The active path, in traversal order.
    fn current_path(&self) -> &[Vector3];

    /// The waypoint the agent is currently moving to, if any.
    fn current_move_to(&self) -> Option<Vector3>;

    /// The current position of the controlled agent.
    fn agent_position(&self) -> Vector3;
}

/// A captured state of the movement system.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MovementSnapshot {
    /// The active path, as `[x, y, z]` triples
    pub path: Vec<Vector3>,
    /// The node the agent is heading to
    #[serde(default)]
    pub next_waypoint: Option<Vector3>,
    /// The agent's position
    pub agent: Vector3,
}

impl MovementSnapshot {
    pub fn new(path: Vec<Vector3>, next_waypoint: Option<Vector3>, agent: Vector3) -> Self {
        Self {
            path,
            next_waypoint,
            agent,
        }
    }

    /// Capture the current state of any movement source.
    pub fn capture(src: &impl MovementSource) -> Self {
        Self {
            path: src.current_path().to_vec(),
            next_waypoint: src.current_move_to(),
            agent: src.agent_position(),
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }
}

impl MovementSource for MovementSnapshot {
    fn current_path(&self) -> &[Vector3] {
        &self.path
    }

    fn current_move_to(&self) -> Option<Vector3> {
        self.next_waypoint
    }

    fn agent_position(&self) -> Vector3 {
        self.agent
    }
}

/// Index of the path node closest to the agent, 0 if there is no path.
pub fn closest_point_to_agent(src: &impl MovementSource) -> usize {
    closest_point_index(src.current_path(), &src.agent_position())
}

/// Total length of the active path.
pub fn current_path_total_distance(src: &impl MovementSource) -> f64 {
    path_total_distance(src.current_path())
}

/// Distance the agent still has to travel along the active path.
///
/// Without a move target, the agent is assumed to rejoin the path at the closest node.
pub fn current_path_remaining_distance(src: &impl MovementSource, mode: WaypointMatch) -> f64 {
    let path = src.current_path();
    let agent = src.agent_position();
    let next = match src.current_move_to() {
        Some(next) => next,
        None => {
            let Some(closest) = path.get(closest_point_index(path, &agent)) else {
                return 0.0;
            };
            log::debug!("No move target, measuring from the closest path node");
            // The closest node is taken from the path itself so it always matches exactly
            return path_remaining_distance(path, closest, &agent, WaypointMatch::Exact);
        }
    };
    path_remaining_distance(path, &next, &agent, mode)
}

/// Fraction of the active path already travelled, in `[0, 1]`.
///
/// Returns `None` for paths without length.
pub fn current_path_progress(src: &impl MovementSource, mode: WaypointMatch) -> Option<f64> {
    let total = current_path_total_distance(src);
    if total <= 0.0 {
        return None;
    }
    let remaining = current_path_remaining_distance(src, mode);
    Some((1.0 - remaining / total).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn straight_line() -> Vec<Vector3> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_snapshot_queries() {
        let snapshot = MovementSnapshot::new(
            straight_line(),
            Some(Vector3::new(5.0, 0.0, 0.0)),
            Vector3::new(2.0, 0.0, 0.0),
        );

        assert_eq!(closest_point_to_agent(&snapshot), 0);
        assert_relative_eq!(current_path_total_distance(&snapshot), 10.0);
        assert_relative_eq!(
            current_path_remaining_distance(&snapshot, WaypointMatch::Exact),
            8.0
        );
        assert_relative_eq!(
            current_path_progress(&snapshot, WaypointMatch::Exact).unwrap(),
            0.2
        );
    }

    #[test]
    fn test_remaining_without_target() {
        let snapshot = MovementSnapshot::new(straight_line(), None, Vector3::new(6.0, 3.0, 0.0));

        // Rejoins at (5, 0, 0): sqrt(1 + 9) + 5
        assert_relative_eq!(
            current_path_remaining_distance(&snapshot, WaypointMatch::Exact),
            10.0f64.sqrt() + 5.0
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = MovementSnapshot::default();

        assert_eq!(closest_point_to_agent(&snapshot), 0);
        assert_eq!(current_path_total_distance(&snapshot), 0.0);
        assert_eq!(
            current_path_remaining_distance(&snapshot, WaypointMatch::Exact),
            0.0
        );
        assert!(current_path_progress(&snapshot, WaypointMatch::Exact).is_none());
    }

    #[test]
    fn test_progress_is_clamped() {
        // Agent far off the path, so remaining exceeds the total
        let snapshot = MovementSnapshot::new(
            straight_line(),
            Some(Vector3::new(0.0, 0.0, 0.0)),
            Vector3::new(0.0, 100.0, 0.0),
        );

        assert_eq!(
            current_path_progress(&snapshot, WaypointMatch::Exact),
            Some(0.0)
        );
    }

    #[test]
    fn test_load_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"path": [[0, 0, 0], [3, 4, 0]], "next_waypoint": [3, 4, 0], "agent": [0, 0, 0]}}"#
        )
        .unwrap();

        let snapshot = MovementSnapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.path.len(), 2);
        assert_eq!(snapshot.next_waypoint, Some(Vector3::new(3.0, 4.0, 0.0)));
        assert_relative_eq!(
            current_path_remaining_distance(&snapshot, WaypointMatch::Exact),
            5.0
        );
    }

    #[test]
    fn test_load_snapshot_without_target() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"path": [], "agent": [1, 2, 3]}}"#).unwrap();

        let snapshot = MovementSnapshot::load(file.path()).unwrap();
        assert!(snapshot.next_waypoint.is_none());
        assert_eq!(snapshot.agent, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_load_snapshot_errors() {
        let err = MovementSnapshot::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = MovementSnapshot::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse snapshot"));
    }
}
