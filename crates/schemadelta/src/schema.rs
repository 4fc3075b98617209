//! Schema model: the named container for tables and routines, plus
//! database-level DDL rendering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diff::SchemaDiff;
use crate::escape::escape_identifier;
use crate::routine::{Routine, RoutineType};
use crate::table::Table;

/// A database schema: tables and routines plus schema-level defaults.
///
/// Invariants maintained by the populating layer: table names are unique
/// within a schema, routine names are unique within each routine type, and
/// names are case-sensitive as stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    /// Default character set for objects that do not override it.
    pub char_set: String,
    /// Default collation for objects that do not override it.
    pub collation: String,
    pub tables: Vec<Table>,
    pub routines: Vec<Routine>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Sets the default character set.
    #[must_use]
    pub fn char_set(mut self, char_set: impl Into<String>) -> Self {
        self.char_set = char_set.into();
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    /// Appends a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Appends a routine.
    #[must_use]
    pub fn routine(mut self, routine: Routine) -> Self {
        self.routines.push(routine);
        self
    }

    /// Returns a name-keyed view of all tables. The view is for pairing and
    /// lookup only; emission order always derives from the ordered `tables`
    /// sequence.
    #[must_use]
    pub fn tables_by_name(&self) -> HashMap<&str, &Table> {
        self.tables.iter().map(|t| (t.name.as_str(), t)).collect()
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns true if a table with the given name exists.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.table_by_name(name).is_some()
    }

    /// Returns a name-keyed view of all stored procedures.
    #[must_use]
    pub fn procedures_by_name(&self) -> HashMap<&str, &Routine> {
        self.routines_by_name_and_type(RoutineType::Procedure)
    }

    /// Returns a name-keyed view of all stored functions.
    #[must_use]
    pub fn functions_by_name(&self) -> HashMap<&str, &Routine> {
        self.routines_by_name_and_type(RoutineType::Function)
    }

    pub(crate) fn routines_by_name_and_type(
        &self,
        routine_type: RoutineType,
    ) -> HashMap<&str, &Routine> {
        self.routines
            .iter()
            .filter(|r| r.routine_type == routine_type)
            .map(|r| (r.name.as_str(), r))
            .collect()
    }

    /// Returns the set of differences between this schema and another.
    #[must_use]
    pub fn diff<'a>(&'a self, other: &'a Schema) -> SchemaDiff<'a> {
        SchemaDiff::new(Some(self), Some(other))
    }

    /// Returns a statement that would create this schema.
    #[must_use]
    pub fn create_statement(&self) -> String {
        let mut statement = format!("CREATE DATABASE {}", escape_identifier(&self.name));
        if !self.char_set.is_empty() {
            statement.push_str(&format!(" CHARACTER SET {}", self.char_set));
        }
        if !self.collation.is_empty() {
            statement.push_str(&format!(" COLLATE {}", self.collation));
        }
        statement
    }

    /// Returns a statement that would drop this schema.
    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP DATABASE {}", escape_identifier(&self.name))
    }

    /// Returns a statement altering this schema's defaults to the supplied
    /// values, emitting only clauses that actually change something. Returns
    /// an empty string when nothing changes.
    #[must_use]
    pub fn alter_statement(&self, char_set: &str, collation: &str) -> String {
        let mut clauses = String::new();
        if self.char_set != char_set && !char_set.is_empty() {
            clauses.push_str(&format!(" CHARACTER SET {char_set}"));
        }
        if self.collation != collation && !collation.is_empty() {
            clauses.push_str(&format!(" COLLATE {collation}"));
        }
        if clauses.is_empty() {
            return String::new();
        }
        format!("ALTER DATABASE {}{}", escape_identifier(&self.name), clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;

    fn schema() -> Schema {
        Schema::new("app")
            .char_set("utf8mb4")
            .collation("utf8mb4_unicode_ci")
            .table(Table::new("users").column(Column::new("id", "int")))
            .table(Table::new("posts").column(Column::new("id", "int")))
    }

    #[test]
    fn test_lookups() {
        let schema = schema();
        assert!(schema.has_table("users"));
        assert!(!schema.has_table("Users")); // names are case-sensitive
        assert_eq!(schema.tables_by_name().len(), 2);
        assert_eq!(schema.table_by_name("posts").map(|t| t.name.as_str()), Some("posts"));
    }

    #[test]
    fn test_routine_views_split_by_type() {
        use crate::routine::{Routine, RoutineType};
        let schema = Schema::new("app")
            .routine(Routine::new("do_stuff", RoutineType::Procedure, "BEGIN END"))
            .routine(Routine::new("do_stuff", RoutineType::Function, "RETURN 1"));
        assert_eq!(schema.procedures_by_name().len(), 1);
        assert_eq!(schema.functions_by_name().len(), 1);
    }

    #[test]
    fn test_create_statement() {
        assert_eq!(
            schema().create_statement(),
            "CREATE DATABASE `app` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );
        assert_eq!(Schema::new("bare").create_statement(), "CREATE DATABASE `bare`");
    }

    #[test]
    fn test_drop_statement() {
        assert_eq!(schema().drop_statement(), "DROP DATABASE `app`");
    }

    #[test]
    fn test_alter_statement_emits_only_changes() {
        let schema = schema();
        assert_eq!(schema.alter_statement("utf8mb4", "utf8mb4_unicode_ci"), "");
        assert_eq!(
            schema.alter_statement("utf8mb4", "utf8mb4_bin"),
            "ALTER DATABASE `app` COLLATE utf8mb4_bin"
        );
        assert_eq!(
            schema.alter_statement("latin1", "latin1_swedish_ci"),
            "ALTER DATABASE `app` CHARACTER SET latin1 COLLATE latin1_swedish_ci"
        );
        assert_eq!(schema.alter_statement("", ""), "");
    }
}
