//! Column model and column-definition DDL rendering.

use serde::{Deserialize, Serialize};

use crate::escape::{escape_identifier, escape_value_for_create_table};
use crate::flavor::Flavor;

/// A column's DEFAULT clause value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDefault {
    /// An explicit `DEFAULT NULL`.
    Null,
    /// A literal default, stored unquoted and unescaped.
    Value(String),
    /// An expression default such as `CURRENT_TIMESTAMP`, emitted verbatim
    /// (subject to flavor casing rules).
    Expression(String),
}

impl ColumnDefault {
    /// Renders the value portion of a DEFAULT clause.
    #[must_use]
    pub fn definition(&self, flavor: Flavor) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Value(v) => {
                if flavor.unquotes_numeric_defaults() && v.parse::<i64>().is_ok() {
                    v.clone()
                } else {
                    format!("'{}'", escape_value_for_create_table(v))
                }
            }
            Self::Expression(expr) => {
                if flavor.lowercases_default_expressions() {
                    expr.to_lowercase()
                } else {
                    expr.clone()
                }
            }
        }
    }
}

/// A single table column, carrying everything needed to reproduce its
/// definition line in SHOW CREATE TABLE output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Raw MySQL type string as reported by the server, e.g. `varchar(40)`
    /// or `int(10) unsigned`.
    pub type_in_db: String,
    /// Whether the column permits NULL.
    pub nullable: bool,
    /// Whether the column is AUTO_INCREMENT.
    pub auto_increment: bool,
    /// DEFAULT clause, if any.
    pub default: Option<ColumnDefault>,
    /// ON UPDATE expression, if any (timestamp columns).
    pub on_update: Option<String>,
    /// Column-level character set; empty means the table default.
    pub char_set: String,
    /// Column-level collation; empty means the charset default.
    pub collation: String,
    /// Column comment.
    pub comment: String,
    /// Generation expression for generated columns.
    pub generated_expr: Option<String>,
    /// True for VIRTUAL generated columns, false for STORED.
    pub virtual_generated: bool,
}

impl Column {
    /// Creates a nullable column of the given raw type with no other
    /// attributes set.
    #[must_use]
    pub fn new(name: impl Into<String>, type_in_db: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_in_db: type_in_db.into(),
            nullable: true,
            auto_increment: false,
            default: None,
            on_update: None,
            char_set: String::new(),
            collation: String::new(),
            comment: String::new(),
            generated_expr: None,
            virtual_generated: false,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column AUTO_INCREMENT.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the DEFAULT clause.
    #[must_use]
    pub fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets an ON UPDATE expression.
    #[must_use]
    pub fn on_update(mut self, expr: impl Into<String>) -> Self {
        self.on_update = Some(expr.into());
        self
    }

    /// Sets a column-level character set.
    #[must_use]
    pub fn char_set(mut self, char_set: impl Into<String>) -> Self {
        self.char_set = char_set.into();
        self
    }

    /// Sets a column-level collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Makes this a generated column with the given expression.
    #[must_use]
    pub fn generated(mut self, expr: impl Into<String>, virtual_generated: bool) -> Self {
        self.generated_expr = Some(expr.into());
        self.virtual_generated = virtual_generated;
        self
    }

    /// Returns true if every attribute other than the name matches.
    #[must_use]
    pub fn equals_ignoring_name(&self, other: &Column) -> bool {
        self.type_in_db == other.type_in_db
            && self.nullable == other.nullable
            && self.auto_increment == other.auto_increment
            && self.default == other.default
            && self.on_update == other.on_update
            && self.char_set == other.char_set
            && self.collation == other.collation
            && self.comment == other.comment
            && self.generated_expr == other.generated_expr
            && self.virtual_generated == other.virtual_generated
    }

    /// Renders the column definition fragment exactly as it appears inside a
    /// CREATE TABLE statement, without leading whitespace or trailing comma.
    #[must_use]
    pub fn definition(&self, flavor: Flavor) -> String {
        let mut parts = vec![escape_identifier(&self.name), self.type_in_db.clone()];
        if !self.char_set.is_empty() {
            parts.push(format!("CHARACTER SET {}", self.char_set));
        }
        if !self.collation.is_empty() {
            parts.push(format!("COLLATE {}", self.collation));
        }
        if let Some(expr) = &self.generated_expr {
            let kind = if self.virtual_generated { "VIRTUAL" } else { "STORED" };
            parts.push(format!("GENERATED ALWAYS AS ({expr}) {kind}"));
        }
        if !self.nullable {
            parts.push("NOT NULL".to_string());
        }
        if self.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {}", default.definition(flavor)));
        }
        if let Some(on_update) = &self.on_update {
            parts.push(format!("ON UPDATE {on_update}"));
        }
        if !self.comment.is_empty() {
            parts.push(format!("COMMENT '{}'", escape_value_for_create_table(&self.comment)));
        }
        parts.join(" ")
    }
}
