pub mod config;
pub mod error;
pub mod layout;
pub mod measure;
pub mod render;
pub mod scene;
pub mod schema;

use tracing::debug;
use wasm_bindgen::prelude::*;

use config::DiagramConfig;
use error::DiagramError;
use layout::{LayeredLayout, LayoutEngine, distribute, serialize_scene};
use render::{MountedView, RenderSurface, SvgSurface};
use scene::{Scene, SceneBuilder};
use schema::{TableDescriptor, parse_schema};

/// Schema to mounted view: build the scene, lay it out, hand it to the surface.
#[derive(Debug, Clone)]
pub struct Diagram<L = LayeredLayout, S = SvgSurface> {
    pub builder: SceneBuilder,
    pub engine: L,
    pub surface: S,
    pub config: DiagramConfig,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::with_config(DiagramConfig::default())
    }
}

impl Diagram {
    /// Default engine and SVG surface; layout spacing and text metrics come
    /// from the config.
    pub fn with_config(config: DiagramConfig) -> Self {
        Self {
            builder: SceneBuilder::new(config.metrics.clone()),
            engine: config.layout.clone(),
            surface: SvgSurface::new(config.metrics.clone()),
            config,
        }
    }
}

impl<L: LayoutEngine, S: RenderSurface> Diagram<L, S> {
    /// Nodes are sized with `config.metrics`; `surface` should draw with the same.
    pub fn new(engine: L, surface: S, config: DiagramConfig) -> Self {
        Self {
            builder: SceneBuilder::new(config.metrics.clone()),
            engine,
            surface,
            config,
        }
    }

    /// Build and lay out the scene for `schema`.
    pub fn layout(&self, schema: &[TableDescriptor]) -> Result<Scene, DiagramError> {
        let scene = self.builder.build(schema)?;
        Ok(distribute(&scene, &self.engine)?)
    }

    /// Render `schema`; an empty schema gives the placeholder without
    /// running layout.
    pub fn render(&self, schema: &[TableDescriptor]) -> Result<MountedView, DiagramError> {
        if schema.is_empty() {
            debug!("empty schema, rendering placeholder");
            return Ok(MountedView::placeholder());
        }
        let scene = self.layout(schema)?;
        Ok(MountedView::Canvas(self.surface.mount(&scene, &self.config)?))
    }

    /// Like [`Diagram::render`], with the placeholder drawn by the surface.
    pub fn render_markup(&self, schema: &[TableDescriptor]) -> Result<String, DiagramError> {
        Ok(match self.render(schema)? {
            MountedView::Canvas(markup) => markup,
            MountedView::Placeholder(message) => self.surface.placeholder(&message, &self.config),
        })
    }
}

/// Initialize panic hook and logging for WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }
}

fn config_from(config: Option<&str>) -> Result<DiagramConfig, DiagramError> {
    match config {
        Some(json) if !json.trim().is_empty() => Ok(DiagramConfig::from_json(json)?),
        _ => Ok(DiagramConfig::default()),
    }
}

fn render_json(schema: &str, config: Option<&str>) -> Result<String, DiagramError> {
    let tables = parse_schema(schema)?;
    let diagram = Diagram::with_config(config_from(config)?);
    diagram.render_markup(&tables)
}

fn layout_json(schema: &str, config: Option<&str>) -> Result<String, DiagramError> {
    let tables = parse_schema(schema)?;
    let diagram = Diagram::with_config(config_from(config)?);
    let scene = diagram.layout(&tables)?;
    Ok(serialize_scene(&scene).to_json()?)
}

/// Render a JSON schema to SVG markup, or the placeholder markup when empty
#[wasm_bindgen(js_name = "renderDatabaseDiagram")]
pub fn render_database_diagram(schema: &str, config: Option<String>) -> Result<String, String> {
    render_json(schema, config.as_deref()).map_err(|e| e.to_string())
}

/// Lay out a JSON schema and return the positioned graph as JSON
#[wasm_bindgen(js_name = "layoutDatabaseDiagram")]
pub fn layout_database_diagram(schema: &str, config: Option<String>) -> Result<String, String> {
    layout_json(schema, config.as_deref()).map_err(|e| e.to_string())
}
