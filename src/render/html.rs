//! Standalone HTML page with the SVG diagram and pan/zoom.

use std::fmt;

use crate::config::DiagramConfig;
use crate::scene::Scene;

use super::{RenderSurface, SvgSurface, escape_xml, placeholder_markup};

/// Interactive page: pan and zoom per config, fitted to the viewport on load.
#[derive(Debug, Clone)]
pub struct HtmlSurface {
    pub title: String,
    svg: SvgSurface,
}

impl Default for HtmlSurface {
    fn default() -> Self {
        Self::new("Database diagram")
    }
}

impl HtmlSurface {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            svg: SvgSurface::default(),
        }
    }

    /// Embed `svg` instead of a default SVG surface.
    pub fn with_svg(mut self, svg: SvgSurface) -> Self {
        self.svg = svg;
        self
    }

    fn page(&self, content: &str, stats: &str, config: &DiagramConfig) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/panzoom@9/dist/panzoom.min.js"></script>
  <style>
    * {{ box-sizing: border-box; margin: 0; padding: 0; }}
    html, body {{ height: 100%; overflow: hidden; }}
    body {{ font-family: -apple-system, BlinkMacSystemFont, sans-serif; background: #fafafa; color: #1f2328; }}
    .diagram-container {{ position: absolute; top: 0; left: 0; right: 0; bottom: 36px; overflow: hidden; }}
    .diagram-container.pannable {{ cursor: grab; }}
    .diagram-container.pannable:active {{ cursor: grabbing; }}
    #diagram {{ display: inline-block; transform-origin: 0 0; }}
    .bottom-bar {{ position: absolute; left: 0; right: 0; bottom: 0; height: 36px; display: flex; align-items: center; justify-content: space-between; padding: 0 12px; border-top: 1px solid #d0d7de; font-size: 13px; }}
    .stats {{ color: #656d76; }}
  </style>
</head>
<body>
  <div class="diagram-container{pannable}">
    <div id="diagram">
{content}
    </div>
  </div>

  <div class="bottom-bar">
    <span class="title">{title}</span>
    <span class="stats">{stats}</span>
  </div>

  <script>
    const allowTranslation = {allow_translation};
    const allowZoom = {allow_zoom};

    function zoomToFit(instance) {{
      const container = document.querySelector('.diagram-container');
      const svg = document.querySelector('#diagram svg');
      if (!svg) return;
      const width = svg.width.baseVal.value;
      const height = svg.height.baseVal.value;
      if (!width || !height) return;
      const scale = Math.min(container.clientWidth / width, container.clientHeight / height, 1) * 0.95;
      const x = (container.clientWidth - width * scale) / 2;
      const y = (container.clientHeight - height * scale) / 2;
      instance.zoomAbs(0, 0, scale);
      instance.moveTo(x, y);
    }}

    document.addEventListener('DOMContentLoaded', () => {{
      const instance = panzoom(document.getElementById('diagram'), {{
        maxZoom: 5,
        minZoom: 0.1,
        bounds: false,
        zoomDoubleClickSpeed: allowZoom ? 1.75 : 1,
        beforeWheel: () => !allowZoom,
        beforeMouseDown: () => !allowTranslation
      }});
      zoomToFit(instance);
    }});
  </script>
</body>
</html>
"##,
            title = escape_xml(&self.title),
            pannable = if config.allow_canvas_translation { " pannable" } else { "" },
            content = indent(content),
            stats = escape_xml(stats),
            allow_translation = config.allow_canvas_translation,
            allow_zoom = config.allow_canvas_zoom,
        )
    }
}

impl RenderSurface for HtmlSurface {
    fn mount(&self, scene: &Scene, config: &DiagramConfig) -> Result<String, fmt::Error> {
        let svg = self.svg.mount(scene, config)?;
        let stats = format!("{} tables · {} links", scene.nodes.len(), scene.links.len());
        Ok(self.page(&svg, &stats, config))
    }

    fn placeholder(&self, message: &str, config: &DiagramConfig) -> String {
        self.page(&placeholder_markup(message), "0 tables", config)
    }
}

fn indent(markup: &str) -> String {
    markup
        .lines()
        .map(|line| format!("      {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::TextMetrics;
    use crate::scene::{SceneBuilder, build_scene};
    use crate::schema::TableDescriptor;

    fn scene() -> Scene {
        build_scene(&[
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("public", "orders").references("users"),
        ])
        .unwrap()
    }

    #[test]
    fn test_html_embeds_svg() {
        let html = HtmlSurface::new("Shop")
            .mount(&scene(), &DiagramConfig::default())
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("<title>Shop</title>"));
        assert!(html.contains("2 tables · 1 links"));
    }

    #[test]
    fn test_html_fits_on_load() {
        let html = HtmlSurface::default()
            .mount(&scene(), &DiagramConfig::default())
            .unwrap();
        assert!(html.contains("panzoom"));
        assert!(html.contains("zoomToFit(instance)"));
    }

    #[test]
    fn test_html_honors_pan_and_zoom_flags() {
        let config = DiagramConfig {
            allow_canvas_translation: false,
            allow_canvas_zoom: false,
            ..DiagramConfig::default()
        };
        let html = HtmlSurface::default().mount(&scene(), &config).unwrap();
        assert!(html.contains("const allowTranslation = false;"));
        assert!(html.contains("const allowZoom = false;"));
        assert!(!html.contains("diagram-container pannable"));

        let html = HtmlSurface::default()
            .mount(&scene(), &DiagramConfig::default())
            .unwrap();
        assert!(html.contains("const allowTranslation = true;"));
        assert!(html.contains("diagram-container pannable"));
    }

    #[test]
    fn test_html_escapes_title() {
        let html = HtmlSurface::new("<script>")
            .mount(&scene(), &DiagramConfig::default())
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_placeholder_is_a_full_page() {
        let html =
            HtmlSurface::new("Shop").placeholder("Schema has no tables", &DiagramConfig::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Shop</title>"));
        assert!(html.contains(r#"<div class="database-diagram-empty">Schema has no tables</div>"#));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_embedded_svg_uses_given_metrics() {
        let metrics = TextMetrics {
            line_height: 60.0,
            ..TextMetrics::default()
        };
        let scene = SceneBuilder::new(metrics.clone())
            .build(&[TableDescriptor::new("public", "users").column("id", "int")])
            .unwrap();
        let html = HtmlSurface::default()
            .with_svg(SvgSurface::new(metrics.clone()))
            .mount(&scene, &DiagramConfig::default())
            .unwrap();
        assert!(html.contains(&format!(r#"y1="{}""#, metrics.header_height())));
    }
}
