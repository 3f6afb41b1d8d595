//! Rendering surfaces for a positioned scene.

mod html;
mod svg;

pub use html::HtmlSurface;
pub use svg::SvgSurface;

use std::fmt;

use crate::config::DiagramConfig;
use crate::scene::{Scene, SceneLink};

/// Shown instead of a canvas when the schema has no tables.
pub const EMPTY_SCHEMA_MESSAGE: &str = "Schema has no tables";

/// Turns a positioned scene into a mounted view.
pub trait RenderSurface {
    fn mount(&self, scene: &Scene, config: &DiagramConfig) -> Result<String, fmt::Error>;

    /// Markup shown instead of a canvas.
    fn placeholder(&self, message: &str, _config: &DiagramConfig) -> String {
        placeholder_markup(message)
    }
}

pub fn placeholder_markup(message: &str) -> String {
    format!(r#"<div class="database-diagram-empty">{}</div>"#, escape_xml(message))
}

/// What a render pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountedView {
    Canvas(String),
    Placeholder(String),
}

impl MountedView {
    pub fn placeholder() -> Self {
        Self::Placeholder(EMPTY_SCHEMA_MESSAGE.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn into_markup(self) -> String {
        match self {
            Self::Canvas(markup) => markup,
            Self::Placeholder(message) => placeholder_markup(&message),
        }
    }
}

/// Points to draw for a link under the given options.
///
/// Unrouted links and `smartRouting: false` draw straight between the
/// source's bottom port and the target's top port.
pub fn link_points(scene: &Scene, link: &SceneLink, config: &DiagramConfig) -> Vec<(f64, f64)> {
    if config.smart_routing && link.points.len() >= 2 {
        return cap_points(&link.points, config.max_number_points_per_link);
    }

    match (scene.node(link.source.node), scene.node(link.target.node)) {
        (Some(from), Some(to)) => vec![
            (from.x + from.width / 2.0, from.y + from.height),
            (to.x + to.width / 2.0, to.y),
        ],
        _ => Vec::new(),
    }
}

/// Keep at most `max` points, endpoints always included. 0 means no cap.
pub fn cap_points(points: &[(f64, f64)], max: usize) -> Vec<(f64, f64)> {
    if max == 0 || points.len() <= max.max(2) {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let interior = max.saturating_sub(2);
    let mut kept = vec![points[0]];
    for i in 1..=interior {
        let idx = i * last / (interior + 1);
        kept.push(points[idx]);
    }
    kept.push(points[last]);
    kept
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
