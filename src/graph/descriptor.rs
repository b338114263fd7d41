//! # Resource Descriptors
//!
//! Two JSON shapes describe a resource graph:
//!
//! - **Graph form**, as emitted by `terraform graph | dot -Tjson`:
//!   `{"objects": [{"_gvid": 0, "name": "..."}], "edges": [{"tail": 0, "head": 1}]}`
//! - **Coordinate form**, a name-keyed map carrying a 2D layout:
//!   `{"name": {"x": 1.0, "y": 2.0, "next": ["other"]}}`
//!
//! Both are parsed into [`ResourceDescriptor`] and normalized once into a
//! [`ResourceLayout`], which is all the graph builder ever sees.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::GraphError;

/// Normalized name of the synthetic container node in Terraform graphs
pub const ROOT_SENTINEL: &str = "root";

/// A resource graph in either accepted input shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDescriptor {
    Graph(GraphForm),
    Coordinates(CoordinateForm),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphForm {
    pub objects: Vec<GraphObject>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphObject {
    #[serde(rename = "_gvid")]
    pub gvid: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GraphEdge {
    pub tail: u64,
    pub head: u64,
}

/// Name-keyed entries, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateForm(pub Vec<(String, CoordinateEntry)>);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateEntry {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub next: Vec<String>,
}

/// How a node's initial position is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Sampled uniformly inside the scatter cube
    Scattered,
    /// Derived from supplied layout coordinates
    Planar { x: f64, y: f64 },
}

/// Lookup key used by edges before nodes exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Id(u64),
    Name(String),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "_gvid {}", id),
            ResourceKey::Name(name) => write!(f, "'{}'", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub id: u64,
    pub name: String,
    pub placement: Placement,
}

/// Shape-independent view of a descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceLayout {
    pub entries: Vec<ResourceEntry>,
    pub edges: Vec<(ResourceKey, ResourceKey)>,
}

/// Strips the `[root]` module marker Terraform prefixes names with.
pub fn normalize_name(name: &str) -> String {
    name.replace("[root]", "").trim().to_string()
}

impl ResourceDescriptor {
    /// Parses descriptor JSON, picking the shape from the top-level keys.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        match value {
            Value::Object(map) if map.contains_key("objects") => {
                let form: GraphForm = serde_json::from_value(Value::Object(map))?;
                Ok(ResourceDescriptor::Graph(form))
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (name, entry) in map {
                    let entry: CoordinateEntry =
                        serde_json::from_value(entry).map_err(|err| {
                            GraphError::DataIntegrity(format!("resource '{}': {}", name, err))
                        })?;
                    entries.push((name, entry));
                }
                Ok(ResourceDescriptor::Coordinates(CoordinateForm(entries)))
            }
            other => Err(GraphError::DataIntegrity(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Converts either shape into a [`ResourceLayout`].
    ///
    /// The Terraform root sentinel is dropped together with every edge that
    /// touches it. Duplicate ids or names are rejected.
    pub fn normalize(&self) -> Result<ResourceLayout, GraphError> {
        match self {
            ResourceDescriptor::Graph(form) => normalize_graph(form),
            ResourceDescriptor::Coordinates(form) => normalize_coordinates(form),
        }
    }
}

fn normalize_graph(form: &GraphForm) -> Result<ResourceLayout, GraphError> {
    let mut layout = ResourceLayout::default();
    let mut seen = HashSet::new();
    let mut sentinels = HashSet::new();

    for object in &form.objects {
        if !seen.insert(object.gvid) {
            return Err(GraphError::DataIntegrity(format!(
                "duplicate _gvid {}",
                object.gvid
            )));
        }

        let name = normalize_name(&object.name);
        if name == ROOT_SENTINEL {
            sentinels.insert(object.gvid);
            continue;
        }

        layout.entries.push(ResourceEntry {
            id: object.gvid,
            name,
            placement: Placement::Scattered,
        });
    }

    layout.edges = form
        .edges
        .iter()
        .filter(|edge| !sentinels.contains(&edge.tail) && !sentinels.contains(&edge.head))
        .map(|edge| (ResourceKey::Id(edge.tail), ResourceKey::Id(edge.head)))
        .collect();

    Ok(layout)
}

fn normalize_coordinates(form: &CoordinateForm) -> Result<ResourceLayout, GraphError> {
    let mut layout = ResourceLayout::default();
    let mut seen = HashSet::new();

    for (id, (raw_name, entry)) in form.0.iter().enumerate() {
        let name = normalize_name(raw_name);
        if name == ROOT_SENTINEL {
            continue;
        }
        if !seen.insert(name.clone()) {
            return Err(GraphError::DataIntegrity(format!(
                "duplicate resource name '{}'",
                name
            )));
        }
        if !entry.x.is_finite() || !entry.y.is_finite() {
            return Err(GraphError::DataIntegrity(format!(
                "resource '{}' has non-finite coordinates",
                name
            )));
        }

        for next in &entry.next {
            let head = normalize_name(next);
            if head == ROOT_SENTINEL {
                continue;
            }
            layout
                .edges
                .push((ResourceKey::Name(name.clone()), ResourceKey::Name(head)));
        }

        layout.entries.push(ResourceEntry {
            id: id as u64,
            name,
            placement: Placement::Planar {
                x: entry.x,
                y: entry.y,
            },
        });
    }

    Ok(layout)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
