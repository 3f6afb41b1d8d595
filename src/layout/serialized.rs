//! Generic attributed-graph form exchanged with layout engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::LayoutError;
use crate::scene::{LinkId, NodeId, PortRef, Scene, SceneLink, SceneNode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedDiagram {
    pub nodes: Vec<SerializedNode>,
    pub links: Vec<SerializedLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub id: String,
    /// Table key, `namespace-name`
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub ports: Vec<SerializedPort>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPort {
    pub id: String,
    pub name: String,
    #[serde(rename = "in")]
    pub inbound: bool,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedLink {
    pub id: String,
    pub source: String,
    pub source_port: String,
    pub target: String,
    pub target_port: String,
    #[serde(default)]
    pub points: Vec<SerializedPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedPoint {
    pub x: f64,
    pub y: f64,
}

pub fn node_id(id: NodeId) -> String {
    format!("node-{}", id.0)
}

pub fn link_id(id: LinkId) -> String {
    format!("link-{}", id.0)
}

pub fn port_id(port: PortRef) -> String {
    format!("node-{}:{}", port.node.0, port.side.name())
}

impl SerializedDiagram {
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Serialize a scene into the generic graph form.
pub fn serialize_scene(scene: &Scene) -> SerializedDiagram {
    let nodes = scene
        .nodes
        .iter()
        .map(|n| SerializedNode {
            id: node_id(n.id),
            name: n.key.to_string(),
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
            ports: n
                .ports
                .iter()
                .map(|p| SerializedPort {
                    id: port_id(n.port(p.side)),
                    name: p.side.name().to_string(),
                    inbound: p.side.is_inbound(),
                    links: p.links.iter().map(|&l| link_id(l)).collect(),
                })
                .collect(),
        })
        .collect();

    let links = scene
        .links
        .iter()
        .map(|l| SerializedLink {
            id: link_id(l.id),
            source: node_id(l.source.node),
            source_port: port_id(l.source),
            target: node_id(l.target.node),
            target_port: port_id(l.target),
            points: l
                .points
                .iter()
                .map(|&(x, y)| SerializedPoint { x, y })
                .collect(),
        })
        .collect();

    SerializedDiagram { nodes, links }
}

/// Rebuild a scene from a laid-out diagram.
///
/// `original` is the scene that was serialized. Every node and link must
/// come back exactly once with the same name and endpoints; positions and
/// link points are taken from `diagram`.
pub fn deserialize_scene(
    diagram: &SerializedDiagram,
    original: &Scene,
) -> Result<Scene, LayoutError> {
    let mut nodes_by_id: HashMap<&str, &SerializedNode> = HashMap::new();
    for n in &diagram.nodes {
        if nodes_by_id.insert(n.id.as_str(), n).is_some() {
            return Err(LayoutError::DuplicateNode(n.id.clone()));
        }
    }
    let mut links_by_id: HashMap<&str, &SerializedLink> = HashMap::new();
    for l in &diagram.links {
        if links_by_id.insert(l.id.as_str(), l).is_some() {
            return Err(LayoutError::DuplicateLink(l.id.clone()));
        }
    }

    let nodes = original
        .nodes
        .iter()
        .map(|node| {
            let id = node_id(node.id);
            let laid = nodes_by_id
                .remove(id.as_str())
                .ok_or_else(|| LayoutError::MissingNode(id.clone()))?;

            let expected = node.key.to_string();
            if laid.name != expected {
                return Err(LayoutError::NodeRenamed {
                    id,
                    expected,
                    actual: laid.name.clone(),
                });
            }
            if !laid.x.is_finite() || !laid.y.is_finite() {
                return Err(LayoutError::InvalidPosition(id));
            }

            Ok(SceneNode {
                x: laid.x,
                y: laid.y,
                ..node.clone()
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    if let Some(extra) = nodes_by_id.keys().min() {
        return Err(LayoutError::UnknownNode(extra.to_string()));
    }

    let links = original
        .links
        .iter()
        .map(|link| {
            let id = link_id(link.id);
            let laid = links_by_id
                .remove(id.as_str())
                .ok_or_else(|| LayoutError::MissingLink(id.clone()))?;

            let same_endpoints = laid.source == node_id(link.source.node)
                && laid.source_port == port_id(link.source)
                && laid.target == node_id(link.target.node)
                && laid.target_port == port_id(link.target);
            if !same_endpoints {
                return Err(LayoutError::EndpointMismatch(id));
            }

            Ok(SceneLink {
                points: laid.points.iter().map(|p| (p.x, p.y)).collect(),
                ..link.clone()
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    if let Some(extra) = links_by_id.keys().min() {
        return Err(LayoutError::UnknownLink(extra.to_string()));
    }

    Ok(Scene { nodes, links })
}
