//! Foreign key model and CONSTRAINT definition rendering.

use serde::{Deserialize, Serialize};

use crate::escape::escape_identifier;

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    /// The server default; omitted from rendered DDL.
    #[default]
    Restrict,
    /// Equivalent to RESTRICT in MySQL; also omitted from rendered DDL.
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL keyword sequence for this action.
    #[must_use]
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// MySQL omits RESTRICT and NO ACTION from SHOW CREATE output.
    fn rendered(&self) -> bool {
        !matches!(self, Self::Restrict | Self::NoAction)
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    /// Columns in the referencing table, in constraint order.
    pub columns: Vec<String>,
    /// Referenced schema; `None` means the same schema as the table.
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub update_rule: ForeignKeyAction,
    pub delete_rule: ForeignKeyAction,
}

impl ForeignKey {
    /// Creates a foreign key with RESTRICT rules.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        referenced_table: impl Into<String>,
        referenced_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            referenced_schema: None,
            referenced_table: referenced_table.into(),
            referenced_columns,
            update_rule: ForeignKeyAction::default(),
            delete_rule: ForeignKeyAction::default(),
        }
    }

    /// Points the constraint at a table in another schema.
    #[must_use]
    pub fn referenced_schema(mut self, schema: impl Into<String>) -> Self {
        self.referenced_schema = Some(schema.into());
        self
    }

    /// Sets the ON DELETE rule.
    #[must_use]
    pub fn on_delete(mut self, rule: ForeignKeyAction) -> Self {
        self.delete_rule = rule;
        self
    }

    /// Sets the ON UPDATE rule.
    #[must_use]
    pub fn on_update(mut self, rule: ForeignKeyAction) -> Self {
        self.update_rule = rule;
        self
    }

    /// Returns true if every attribute other than the constraint name matches.
    #[must_use]
    pub fn functionally_equals(&self, other: &ForeignKey) -> bool {
        self.columns == other.columns
            && self.referenced_schema == other.referenced_schema
            && self.referenced_table == other.referenced_table
            && self.referenced_columns == other.referenced_columns
            && self.update_rule == other.update_rule
            && self.delete_rule == other.delete_rule
    }

    /// Renders the constraint definition fragment as it appears inside a
    /// CREATE TABLE statement.
    #[must_use]
    pub fn definition(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| escape_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let ref_cols = self
            .referenced_columns
            .iter()
            .map(|c| escape_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let ref_table = match &self.referenced_schema {
            Some(schema) => {
                format!("{}.{}", escape_identifier(schema), escape_identifier(&self.referenced_table))
            }
            None => escape_identifier(&self.referenced_table),
        };
        let mut def = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            escape_identifier(&self.name),
            cols,
            ref_table,
            ref_cols
        );
        if self.delete_rule.rendered() {
            def.push_str(&format!(" ON DELETE {}", self.delete_rule.to_sql()));
        }
        if self.update_rule.rendered() {
            def.push_str(&format!(" ON UPDATE {}", self.update_rule.to_sql()));
        }
        def
    }
}
