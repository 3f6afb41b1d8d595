use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::scene::SceneError;
use crate::schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Failed to write diagram markup")]
    Render(#[from] std::fmt::Error),
}
