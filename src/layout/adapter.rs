use tracing::debug;

use super::serialized::{deserialize_scene, serialize_scene};
use super::{LayoutEngine, LayoutError};
use crate::scene::Scene;

/// Run `engine` over the scene and return a new, positioned scene.
pub fn distribute<L: LayoutEngine + ?Sized>(
    scene: &Scene,
    engine: &L,
) -> Result<Scene, LayoutError> {
    let serialized = serialize_scene(scene);
    debug!(
        nodes = serialized.nodes.len(),
        links = serialized.links.len(),
        "running layout engine"
    );
    let distributed = engine.layout(serialized)?;
    deserialize_scene(&distributed, scene)
}
