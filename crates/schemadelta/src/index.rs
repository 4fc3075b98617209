//! Index model, functional equivalence, and KEY definition rendering.

use serde::{Deserialize, Serialize};

use crate::escape::{escape_identifier, escape_value_for_create_table};

/// One indexed column, optionally limited to a prefix of the column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    /// Prefix length for partial indexing of string/blob columns.
    pub sub_part: Option<u16>,
}

impl IndexColumn {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), sub_part: None }
    }

    #[must_use]
    pub fn with_sub_part(name: impl Into<String>, sub_part: u16) -> Self {
        Self { name: name.into(), sub_part: Some(sub_part) }
    }

    fn definition(&self) -> String {
        match self.sub_part {
            Some(len) => format!("{}({})", escape_identifier(&self.name), len),
            None => escape_identifier(&self.name),
        }
    }
}

/// A table index. The primary key is modeled as an index with
/// `primary_key = true`, stored first in the table's index sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<IndexColumn>,
    pub unique: bool,
    pub primary_key: bool,
    /// Index type as reported by the server: `BTREE`, `HASH`, `FULLTEXT`, ...
    /// BTREE is the server default and is omitted from rendered DDL.
    pub index_type: String,
    pub comment: String,
}

impl Index {
    /// Creates a non-unique BTREE index over the named columns.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<IndexColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            primary_key: false,
            index_type: "BTREE".to_string(),
            comment: String::new(),
        }
    }

    /// Creates the primary key index over the named columns.
    #[must_use]
    pub fn primary(columns: Vec<IndexColumn>) -> Self {
        Self {
            name: "PRIMARY".to_string(),
            columns,
            unique: true,
            primary_key: true,
            index_type: "BTREE".to_string(),
            comment: String::new(),
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the index type.
    #[must_use]
    pub fn index_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = index_type.into();
        self
    }

    /// Sets the index comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Returns true if the two indexes are interchangeable for query planning:
    /// same uniqueness, same type, and the same ordered (column, sub-part)
    /// sequence. Names and physical position are ignored.
    #[must_use]
    pub fn functionally_equals(&self, other: &Index) -> bool {
        self.unique == other.unique
            && self.index_type == other.index_type
            && self.columns == other.columns
    }

    /// Renders the index definition fragment as it appears inside a CREATE
    /// TABLE statement.
    #[must_use]
    pub fn definition(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(IndexColumn::definition)
            .collect::<Vec<_>>()
            .join(",");
        let mut def = if self.primary_key {
            format!("PRIMARY KEY ({cols})")
        } else if self.unique {
            format!("UNIQUE KEY {} ({})", escape_identifier(&self.name), cols)
        } else if self.index_type == "FULLTEXT" || self.index_type == "SPATIAL" {
            format!("{} KEY {} ({})", self.index_type, escape_identifier(&self.name), cols)
        } else {
            format!("KEY {} ({})", escape_identifier(&self.name), cols)
        };
        let structural = self.index_type != "FULLTEXT" && self.index_type != "SPATIAL";
        if structural && !self.index_type.is_empty() && self.index_type != "BTREE" {
            def.push_str(&format!(" USING {}", self.index_type));
        }
        if !self.comment.is_empty() {
            def.push_str(&format!(" COMMENT '{}'", escape_value_for_create_table(&self.comment)));
        }
        def
    }
}
