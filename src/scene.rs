//! Scene builder: one node per table, one link per foreign key.

use crate::measure::TextMetrics;
use crate::schema::{TableDescriptor, TableKey};
use std::collections::HashMap;
use tracing::debug;

/// Horizontal distance between nodes placed by the builder.
pub const COLUMN_WIDTH: f64 = 230.0;
/// Row of a table first seen as the FK holder.
pub const PARENT_ROW_Y: f64 = 0.0;
/// Row of a table first seen as the referenced end of a foreign key.
pub const CHILD_ROW_Y: f64 = 250.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unresolved foreign key: {table} references unknown table '{target}'")]
    UnresolvedForeignKey { table: String, target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    /// Inbound: referenced tables are entered from the top.
    Top,
    /// Outbound: FK holders leave from the bottom.
    Bottom,
}

impl PortSide {
    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn is_inbound(self) -> bool {
        matches!(self, Self::Top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub side: PortSide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub side: PortSide,
    pub links: Vec<LinkId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub typ: String,
    pub is_pk: bool,
    pub is_fk: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub key: TableKey,
    pub columns: Vec<ColumnView>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub ports: Vec<Port>,
}

impl SceneNode {
    pub fn label(&self) -> &str {
        &self.key.name
    }

    pub fn port(&self, side: PortSide) -> PortRef {
        PortRef {
            node: self.id,
            side,
        }
    }

    pub fn port_links(&self, side: PortSide) -> &[LinkId] {
        self.ports
            .iter()
            .find(|p| p.side == side)
            .map(|p| p.links.as_slice())
            .unwrap_or(&[])
    }
}

/// Directed edge from an outbound port to an inbound port.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLink {
    pub id: LinkId,
    pub source: PortRef,
    pub target: PortRef,
    /// Route assigned by layout; empty until then.
    pub points: Vec<(f64, f64)>,
}

/// All nodes and links for one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).filter(|n| n.id == id)
    }

    pub fn node_by_key(&self, key: &TableKey) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| &n.key == key)
    }

    pub fn link(&self, id: LinkId) -> Option<&SceneLink> {
        self.links.get(id.0).filter(|l| l.id == id)
    }

    /// Node identity to table key, in node order.
    pub fn keys(&self) -> Vec<(NodeId, TableKey)> {
        self.nodes.iter().map(|n| (n.id, n.key.clone())).collect()
    }

    /// Bounding box of nodes and routed link points: (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut corners = self
            .nodes
            .iter()
            .flat_map(|n| [(n.x, n.y), (n.x + n.width, n.y + n.height)])
            .chain(self.links.iter().flat_map(|l| l.points.iter().copied()));

        let first = corners.next()?;
        Some(corners.fold(
            (first.0, first.1, first.0, first.1),
            |(min_x, min_y, max_x, max_y), (x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        ))
    }

    fn add_node(&mut self, key: TableKey, columns: Vec<ColumnView>, size: (f64, f64)) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            key,
            columns,
            x: 0.0,
            y: PARENT_ROW_Y,
            width: size.0,
            height: size.1,
            ports: vec![
                Port {
                    side: PortSide::Top,
                    links: Vec::new(),
                },
                Port {
                    side: PortSide::Bottom,
                    links: Vec::new(),
                },
            ],
        });
        id
    }

    fn attach(&mut self, port: PortRef, link: LinkId) {
        if let Some(p) = self.nodes[port.node.0]
            .ports
            .iter_mut()
            .find(|p| p.side == port.side)
        {
            p.links.push(link);
        }
    }

    fn connect(&mut self, source: PortRef, target: PortRef) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(SceneLink {
            id,
            source,
            target,
            points: Vec::new(),
        });
        self.attach(source, id);
        self.attach(target, id);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Parent,
    Child,
}

#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    metrics: TextMetrics,
}

impl SceneBuilder {
    pub fn new(metrics: TextMetrics) -> Self {
        Self { metrics }
    }

    /// Build a scene from the ordered schema.
    ///
    /// Each table gets a node the first time it is visited, whether as a
    /// declared table or as the target of a foreign key. Later visits of the
    /// same (namespace, name) reuse that node.
    pub fn build(&self, schema: &[TableDescriptor]) -> Result<Scene, SceneError> {
        let mut targets: HashMap<&str, usize> = HashMap::new();
        for (idx, table) in schema.iter().enumerate() {
            targets.entry(table.name.as_str()).or_insert(idx);
        }

        let mut registry: HashMap<TableKey, NodeId> = HashMap::new();
        let mut scene = Scene::default();

        for (index, table) in schema.iter().enumerate() {
            let parent = self.add_to_scene(&mut scene, &mut registry, table, index, Row::Parent);

            for (fk_index, fk) in table.foreign_keys.iter().enumerate() {
                let target_idx = *targets.get(fk.to_table.as_str()).ok_or_else(|| {
                    SceneError::UnresolvedForeignKey {
                        table: table.key().to_string(),
                        target: fk.to_table.clone(),
                    }
                })?;

                let child = self.add_to_scene(
                    &mut scene,
                    &mut registry,
                    &schema[target_idx],
                    fk_index,
                    Row::Child,
                );

                scene.connect(
                    PortRef {
                        node: parent,
                        side: PortSide::Bottom,
                    },
                    PortRef {
                        node: child,
                        side: PortSide::Top,
                    },
                );
            }
        }

        debug!(
            tables = schema.len(),
            nodes = scene.nodes.len(),
            links = scene.links.len(),
            "built scene"
        );

        Ok(scene)
    }

    fn add_to_scene(
        &self,
        scene: &mut Scene,
        registry: &mut HashMap<TableKey, NodeId>,
        table: &TableDescriptor,
        index: usize,
        row: Row,
    ) -> NodeId {
        let key = table.key();
        if let Some(&id) = registry.get(&key) {
            return id;
        }

        let columns: Vec<ColumnView> = table
            .columns
            .iter()
            .map(|c| ColumnView {
                name: c.name.clone(),
                typ: c.typ.clone(),
                is_pk: c.primary_key,
                is_fk: table.is_fk_column(&c.name),
            })
            .collect();
        let size = self.metrics.node_size(&table.name, &table.columns);

        let id = scene.add_node(key.clone(), columns, size);
        let node = &mut scene.nodes[id.0];
        node.x = index as f64 * COLUMN_WIDTH;
        if row == Row::Child {
            node.y = CHILD_ROW_Y;
        }

        registry.insert(key, id);
        id
    }
}

/// Build a scene with default text metrics.
pub fn build_scene(schema: &[TableDescriptor]) -> Result<Scene, SceneError> {
    SceneBuilder::default().build(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn users_orders() -> Vec<TableDescriptor> {
        vec![
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("public", "orders").references("users"),
        ]
    }

    #[test]
    fn test_users_orders_one_link() {
        let scene = build_scene(&users_orders()).unwrap();

        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.links.len(), 1);

        let link = &scene.links[0];
        let source = scene.node(link.source.node).unwrap();
        let target = scene.node(link.target.node).unwrap();
        assert_eq!(source.label(), "orders");
        assert_eq!(target.label(), "users");
        assert_eq!(link.source.side, PortSide::Bottom);
        assert_eq!(link.target.side, PortSide::Top);
    }

    #[test]
    fn test_ports_record_links() {
        let scene = build_scene(&users_orders()).unwrap();
        let users = &scene.nodes[0];
        let orders = &scene.nodes[1];

        assert_eq!(orders.port_links(PortSide::Bottom), &[LinkId(0)]);
        assert_eq!(users.port_links(PortSide::Top), &[LinkId(0)]);
        assert!(users.port_links(PortSide::Bottom).is_empty());
    }

    #[test]
    fn test_declared_first_stays_in_parent_row() {
        let scene = build_scene(&users_orders()).unwrap();
        let users = &scene.nodes[0];
        assert_eq!(users.y, PARENT_ROW_Y);
        assert_eq!(users.x, 0.0);
        assert_eq!(scene.nodes[1].x, COLUMN_WIDTH);
    }

    #[test]
    fn test_target_before_declaration_is_child_row() {
        let schema = vec![
            TableDescriptor::new("public", "orders")
                .references("products")
                .references("users"),
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("public", "products"),
        ];
        let scene = build_scene(&schema).unwrap();

        let products = scene.node_by_key(&schema[2].key()).unwrap();
        let users = scene.node_by_key(&schema[1].key()).unwrap();

        assert_eq!(products.y, CHILD_ROW_Y);
        assert_eq!(products.x, 0.0);
        assert_eq!(users.y, CHILD_ROW_Y);
        assert_eq!(users.x, COLUMN_WIDTH);
        assert_eq!(scene.nodes.len(), 3);
    }

    #[test]
    fn test_node_count_matches_distinct_tables() {
        let schema = vec![
            TableDescriptor::new("public", "order_items")
                .references("orders")
                .references("products"),
            TableDescriptor::new("public", "orders").references("users"),
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("public", "products").references("categories"),
            TableDescriptor::new("public", "categories").references("categories"),
        ];
        let scene = build_scene(&schema).unwrap();

        let distinct: HashSet<TableKey> = schema.iter().map(|t| t.key()).collect();
        assert_eq!(scene.nodes.len(), distinct.len());
        assert_eq!(scene.links.len(), 5);
    }

    #[test]
    fn test_duplicate_key_reuses_node() {
        let schema = vec![
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("public", "users"),
        ];
        let scene = build_scene(&schema).unwrap();
        assert_eq!(scene.nodes.len(), 1);
    }

    #[test]
    fn test_same_name_other_namespace_is_distinct() {
        let schema = vec![
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("audit", "users"),
        ];
        let scene = build_scene(&schema).unwrap();
        assert_eq!(scene.nodes.len(), 2);
    }

    #[test]
    fn test_fk_target_first_match_wins() {
        let schema = vec![
            TableDescriptor::new("public", "users"),
            TableDescriptor::new("audit", "users"),
            TableDescriptor::new("audit", "logins").references("users"),
        ];
        let scene = build_scene(&schema).unwrap();
        let target = scene.node(scene.links[0].target.node).unwrap();
        assert_eq!(target.key.namespace, "public");
    }

    #[test]
    fn test_self_reference_links_node_to_itself() {
        let schema = vec![TableDescriptor::new("public", "categories").references("categories")];
        let scene = build_scene(&schema).unwrap();

        assert_eq!(scene.nodes.len(), 1);
        assert_eq!(scene.links[0].source.node, scene.links[0].target.node);
    }

    #[test]
    fn test_unresolved_fk_is_error() {
        let schema = vec![TableDescriptor::new("public", "orders").references("missing")];
        let err = build_scene(&schema).unwrap_err();
        assert_eq!(
            err,
            SceneError::UnresolvedForeignKey {
                table: "public-orders".to_string(),
                target: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let schema = vec![
            TableDescriptor::new("public", "b").references("a"),
            TableDescriptor::new("public", "c").references("a").references("b"),
            TableDescriptor::new("public", "a"),
        ];
        let first = build_scene(&schema).unwrap();
        let second = build_scene(&schema).unwrap();
        assert_eq!(first.keys(), second.keys());
        assert_eq!(first, second);
    }

    #[test]
    fn test_fk_columns_flagged() {
        let mut orders = TableDescriptor::new("public", "orders")
            .column("id", "int")
            .column("user_id", "int");
        orders.columns[0].primary_key = true;
        orders.foreign_keys.push(crate::schema::ForeignKeyRef {
            to_table: "users".to_string(),
            column: Some("user_id".to_string()),
        });
        let schema = vec![TableDescriptor::new("public", "users"), orders];
        let scene = build_scene(&schema).unwrap();

        let orders = &scene.nodes[1];
        assert!(orders.columns[0].is_pk);
        assert!(!orders.columns[0].is_fk);
        assert!(orders.columns[1].is_fk);
    }

    #[test]
    fn test_empty_schema_empty_scene() {
        let scene = build_scene(&[]).unwrap();
        assert!(scene.is_empty());
        assert!(scene.bounds().is_none());
    }
}
