//! Table descriptors: the schema description a diagram is built from.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One database table and the tables it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    #[serde(rename = "table_schema", alias = "schema")]
    pub namespace: String,
    #[serde(rename = "table_name", alias = "name")]
    pub name: String,
    #[serde(default, alias = "fks")]
    pub foreign_keys: Vec<ForeignKeyRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDescriptor>,
}

/// Outgoing reference to another table, resolved by table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ForeignKeyRepr")]
pub struct ForeignKeyRef {
    #[serde(rename = "toTable")]
    pub to_table: String,
    /// Referencing column in the owning table, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ForeignKeyRepr {
    Name(String),
    Full {
        #[serde(rename = "toTable", alias = "to_table")]
        to_table: String,
        #[serde(default)]
        column: Option<String>,
    },
}

impl From<ForeignKeyRepr> for ForeignKeyRef {
    fn from(repr: ForeignKeyRepr) -> Self {
        match repr {
            ForeignKeyRepr::Name(to_table) => Self {
                to_table,
                column: None,
            },
            ForeignKeyRepr::Full { to_table, column } => Self { to_table, column },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type", alias = "data_type", default)]
    pub typ: String,
    #[serde(default, alias = "is_primary_key")]
    pub primary_key: bool,
}

/// Composite table identity. Nodes are unique per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace, self.name)
    }
}

impl TableDescriptor {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            foreign_keys: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn references(mut self, to_table: &str) -> Self {
        self.foreign_keys.push(ForeignKeyRef {
            to_table: to_table.to_string(),
            column: None,
        });
        self
    }

    pub fn column(mut self, name: &str, typ: &str) -> Self {
        self.columns.push(ColumnDescriptor {
            name: name.to_string(),
            typ: typ.to_string(),
            primary_key: false,
        });
        self
    }

    pub fn key(&self) -> TableKey {
        TableKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// True when one of this table's foreign keys names `column`.
    pub fn is_fk_column(&self, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.column.as_deref() == Some(column))
    }
}

/// Parse a JSON array of table descriptors.
pub fn parse_schema(json: &str) -> Result<Vec<TableDescriptor>, SchemaError> {
    Ok(serde_json::from_str(json)?)
}
