use serde::{Deserialize, Serialize};

use crate::Vector3;

/// How the "next waypoint" target is located inside a path.
///
/// The movement system hands out the next waypoint as a copy of one of the path's
/// points, so the default is exact floating-point equality. If the coordinates pass
/// through any transformation on the way, use [`WaypointMatch::Within`] instead.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(tag = "type")]
pub enum WaypointMatch {
    /// All three coordinates must be exactly equal.
    #[default]
    Exact,
    /// The waypoint must be at most `tolerance` away from the target.
    Within { tolerance: f64 },
}

impl WaypointMatch {
    /// Check whether `waypoint` is the `target` under this matching rule.
    pub fn matches(&self, waypoint: &Vector3, target: &Vector3) -> bool {
        match self {
            WaypointMatch::Exact => waypoint == target,
            WaypointMatch::Within { tolerance } => (waypoint - target).norm() <= *tolerance,
        }
    }
}

/// Iterate over the consecutive `(from, to)` pairs of a path.
pub fn segments(path: &[Vector3]) -> impl Iterator<Item = (&Vector3, &Vector3)> + '_ {
    path.windows(2).map(|w| (&w[0], &w[1]))
}

/// Returns the index of the path node closest to `agent`.
///
/// On ties the first node wins. An empty path returns 0.
pub fn closest_point_index(path: &[Vector3], agent: &Vector3) -> usize {
    let mut cur_index = 0;
    let mut cur_distance = f64::MAX;

    for (i, point) in path.iter().enumerate() {
        let distance = (agent - point).norm();
        if distance < cur_distance {
            cur_distance = distance;
            cur_index = i;
        }
    }

    cur_index
}

/// Returns the distance from `point` to the segment between `start` and `end`.
///
/// Unlike the distance to the infinite line, the projection is clamped to the segment,
/// so points beyond either end measure to that endpoint. This can be used to check
/// whether something lies along a stretch of the current path.
pub fn point_segment_distance(start: &Vector3, end: &Vector3, point: &Vector3) -> f64 {
    let seg = end - start;
    let len_squared = seg.norm_squared();
    if len_squared == 0.0 {
        return (point - start).norm();
    }

    let t = ((point - start).dot(&seg) / len_squared).min(1.0).max(0.0);
    let projection = start + seg * t;
    (point - projection).norm()
}

/// Returns the total length of a path: the sum of the distances between consecutive
/// nodes. Empty and single-node paths have length 0.
pub fn path_total_distance(path: &[Vector3]) -> f64 {
    segments(path).map(|(a, b)| (b - a).norm()).sum()
}

/// Returns the distance still to travel from `agent` along `path`.
///
/// This is the distance from the agent to `next_waypoint`, plus the length of the path
/// from the first node matching `next_waypoint` to the end.
///
/// If no node matches, only the distance from the agent to `next_waypoint` is
/// returned and the rest of the path is not counted.
pub fn path_remaining_distance(
    path: &[Vector3],
    next_waypoint: &Vector3,
    agent: &Vector3,
    mode: WaypointMatch,
) -> f64 {
    let to_next = (agent - next_waypoint).norm();
    let start = path.iter().position(|p| mode.matches(p, next_waypoint));

    match start {
        Some(index) => to_next + path_total_distance(&path[index..]),
        None => {
            log::trace!(
                "Next waypoint ({}, {}, {}) is not part of the path",
                next_waypoint.x,
                next_waypoint.y,
                next_waypoint.z
            );
            to_next
        }
    }
}

/// Same as [`path_remaining_distance`] with [`WaypointMatch::Exact`].
pub fn path_remaining_distance_exact(
    path: &[Vector3],
    next_waypoint: &Vector3,
    agent: &Vector3,
) -> f64 {
    path_remaining_distance(path, next_waypoint, agent, WaypointMatch::Exact)
}

/// Returns the smallest distance from `point` to any segment of the path.
///
/// A single-node path measures to that node, an empty path has no distance.
pub fn path_distance_to_point(path: &[Vector3], point: &Vector3) -> Option<f64> {
    match path {
        [] => None,
        [only] => Some((point - only).norm()),
        _ => segments(path)
            .map(|(a, b)| point_segment_distance(a, b, point))
            .reduce(f64::min),
    }
}

/// Check whether `point` is within `radius` of the path.
pub fn is_point_near_path(path: &[Vector3], point: &Vector3, radius: f64) -> bool {
    path_distance_to_point(path, point).map_or(false, |d| d <= radius)
}
