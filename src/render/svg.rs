use crate::config::DiagramConfig;
use crate::measure::TextMetrics;
use crate::scene::{Scene, SceneNode};
use std::fmt::{self, Write};
use tracing::debug;

use super::{RenderSurface, escape_xml, link_points};

/// Static SVG; the viewBox is fitted to the scene content.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    metrics: TextMetrics,
    padding: f64,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
            padding: 20.0,
        }
    }
}

impl SvgSurface {
    pub fn new(metrics: TextMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    fn render(&self, scene: &Scene, config: &DiagramConfig) -> Result<String, fmt::Error> {
        let mut svg = String::new();

        let (min_x, min_y, max_x, max_y) = scene.bounds().unwrap_or((0.0, 0.0, 0.0, 0.0));
        let x0 = min_x - self.padding;
        let y0 = min_y - self.padding;
        let width = max_x - min_x + self.padding * 2.0;
        let height = max_y - min_y + self.padding * 2.0;

        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="{}" width="{}" height="{}" viewBox="{} {} {} {}" data-allow-loose-links="{}" data-allow-canvas-translation="{}" data-allow-canvas-zoom="{}">"#,
            escape_xml(&config.class_name),
            width,
            height,
            x0,
            y0,
            width,
            height,
            config.allow_loose_links,
            config.allow_canvas_translation,
            config.allow_canvas_zoom,
        )?;

        writeln!(
            svg,
            r#"<style>
  .table-bg {{ fill: #fff; }}
  .table-header {{ fill: #e0e0e0; }}
  .table-border {{ fill: none; stroke: #333; stroke-width: 1.5; }}
  .table-name {{ font-family: monospace; font-size: 14px; font-weight: bold; }}
  .column-text {{ font-family: monospace; font-size: 12px; }}
  .pk {{ font-weight: bold; }}
  .fk {{ font-style: italic; }}
  .link {{ stroke: #666; stroke-width: 1.5; fill: none; }}
</style>"#
        )?;

        writeln!(
            svg,
            r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="#666" /></marker></defs>"##
        )?;

        // Links first (behind nodes)
        for link in &scene.links {
            let points = link_points(scene, link, config);
            if points.len() < 2 {
                continue;
            }
            let path = points
                .iter()
                .map(|(x, y)| format!("{},{}", x, y))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(
                svg,
                r#"<polyline class="link" data-link="link-{}" points="{}" marker-end="url(#arrow)" />"#,
                link.id.0, path
            )?;
        }

        for node in &scene.nodes {
            self.render_node(&mut svg, node)?;
        }

        writeln!(svg, "</svg>")?;
        Ok(svg)
    }

    fn render_node(&self, svg: &mut String, node: &SceneNode) -> fmt::Result {
        let x = node.x;
        let y = node.y;
        let w = node.width;
        let h = node.height;
        let header_h = self.metrics.header_height();

        writeln!(
            svg,
            r#"<g class="table" data-node="node-{}"><title>{}</title>"#,
            node.id.0,
            escape_xml(&node.key.to_string())
        )?;

        writeln!(
            svg,
            r#"<rect class="table-bg" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )?;

        if node.columns.is_empty() {
            writeln!(
                svg,
                r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
                x, y, w, h
            )?;
        } else {
            // Header with square bottom corners
            writeln!(
                svg,
                r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
                x, y, w, header_h
            )?;
            writeln!(
                svg,
                r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" />"#,
                x,
                y + header_h - 4.0,
                w,
                4.0
            )?;
        }

        let text_y = if node.columns.is_empty() {
            y + h / 2.0 + 5.0
        } else {
            y + header_h / 2.0 + 5.0
        };
        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            x + w / 2.0,
            text_y,
            escape_xml(node.label())
        )?;

        if !node.columns.is_empty() {
            writeln!(
                svg,
                r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#333" stroke-width="1" />"##,
                x,
                y + header_h,
                x + w,
                y + header_h
            )?;

            let mut col_y = y + header_h + self.metrics.padding_y + self.metrics.line_height * 0.7;
            for col in &node.columns {
                let mut class = "column-text".to_string();
                if col.is_pk {
                    class.push_str(" pk");
                }
                if col.is_fk {
                    class.push_str(" fk");
                }

                let prefix = if col.is_pk { "◆ " } else { "  " };
                let text = if col.typ.is_empty() {
                    format!("{}{}", prefix, col.name)
                } else {
                    format!("{}{}: {}", prefix, col.name, col.typ)
                };

                writeln!(
                    svg,
                    r#"<text class="{}" x="{}" y="{}">{}</text>"#,
                    class,
                    x + self.metrics.padding_x,
                    col_y,
                    escape_xml(&text)
                )?;

                col_y += self.metrics.line_height;
            }
        }

        // Border last so it sits on top
        writeln!(
            svg,
            r#"<rect class="table-border" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )?;
        writeln!(svg, "</g>")
    }
}

impl RenderSurface for SvgSurface {
    fn mount(&self, scene: &Scene, config: &DiagramConfig) -> Result<String, fmt::Error> {
        debug!(nodes = scene.nodes.len(), links = scene.links.len(), "rendering svg");
        self.render(scene, config)
    }
}
