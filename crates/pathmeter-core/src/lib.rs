mod geom;
mod movement;
mod settings;

pub use geom::*;
pub use movement::*;
pub use settings::*;

/// A point in 3D space. Waypoints and agent positions are both represented as
/// plain vectors, in world units (yards in the game client).
pub type Vector3 = nalgebra::Vector3<f64>;
