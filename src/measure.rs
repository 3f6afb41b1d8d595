use crate::schema::ColumnDescriptor;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Text and box metrics shared by the scene builder and the SVG surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextMetrics {
    #[serde(alias = "char_width")]
    pub char_width: f64,
    #[serde(alias = "line_height")]
    pub line_height: f64,
    #[serde(alias = "padding_x")]
    pub padding_x: f64,
    #[serde(alias = "padding_y")]
    pub padding_y: f64,
    #[serde(alias = "header_padding")]
    pub header_padding: f64,
    #[serde(alias = "min_node_width")]
    pub min_node_width: f64,
    #[serde(alias = "min_node_height")]
    pub min_node_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 12.0,
            padding_y: 8.0,
            header_padding: 4.0,
            min_node_width: 160.0,
            min_node_height: 36.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    pub fn header_height(&self) -> f64 {
        self.line_height + self.header_padding * 2.0
    }

    /// Box size for a table node: header with the label, one row per column.
    pub fn node_size(&self, label: &str, columns: &[ColumnDescriptor]) -> (f64, f64) {
        let header_width = self.text_width(label);

        let max_col_width = columns
            .iter()
            .map(|c| self.text_width(&c.name) + self.text_width(&c.typ) + self.char_width * 4.0)
            .fold(0.0, f64::max);

        let content_width = header_width.max(max_col_width) + self.padding_x * 2.0;
        let width = content_width.max(self.min_node_width);

        let body_height = if columns.is_empty() {
            0.0
        } else {
            columns.len() as f64 * self.line_height + self.padding_y * 2.0
        };

        let height = (self.header_height() + body_height).max(self.min_node_height);

        (width, height)
    }
}
