//! Layout adapter and engines.
//!
//! The scene is handed to a [`LayoutEngine`] in a generic serialized form
//! ([`SerializedDiagram`]) and rebuilt from whatever the engine returns.
//! Any engine that keeps node and link identities intact can be plugged in:
//! - [`LayeredLayout`]: hierarchical layout with channel routing (default)
//! - [`Passthrough`]: keeps the builder's positions
//! - any `Fn(SerializedDiagram) -> Result<SerializedDiagram, LayoutError>`

mod adapter;
mod analysis;
mod layered;
mod placement;
mod routing;
mod serialized;
mod types;

pub use adapter::distribute;
pub use layered::LayeredLayout;
pub use serialized::{
    SerializedDiagram, SerializedLink, SerializedNode, SerializedPoint, SerializedPort,
    deserialize_scene, serialize_scene,
};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Layout dropped node {0}")]
    MissingNode(String),
    #[error("Layout returned unknown node {0}")]
    UnknownNode(String),
    #[error("Layout returned node {0} more than once")]
    DuplicateNode(String),
    #[error("Layout renamed node {id}: expected '{expected}', got '{actual}'")]
    NodeRenamed {
        id: String,
        expected: String,
        actual: String,
    },
    #[error("Layout produced a non-finite position for node {0}")]
    InvalidPosition(String),
    #[error("Layout dropped link {0}")]
    MissingLink(String),
    #[error("Layout returned unknown link {0}")]
    UnknownLink(String),
    #[error("Layout returned link {0} more than once")]
    DuplicateLink(String),
    #[error("Layout changed the endpoints of link {0}")]
    EndpointMismatch(String),
    #[error("Layout engine failed: {0}")]
    Engine(String),
    #[error("Invalid serialized diagram: {0}")]
    Json(#[from] serde_json::Error),
}

/// Computes positions and link routes for a serialized graph.
pub trait LayoutEngine {
    fn layout(&self, diagram: SerializedDiagram) -> Result<SerializedDiagram, LayoutError>;
}

impl<F> LayoutEngine for F
where
    F: Fn(SerializedDiagram) -> Result<SerializedDiagram, LayoutError>,
{
    fn layout(&self, diagram: SerializedDiagram) -> Result<SerializedDiagram, LayoutError> {
        self(diagram)
    }
}

/// Returns the diagram unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl LayoutEngine for Passthrough {
    fn layout(&self, diagram: SerializedDiagram) -> Result<SerializedDiagram, LayoutError> {
        Ok(diagram)
    }
}
