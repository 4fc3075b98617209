//! MySQL-compatible schema automation: model schemas, tables, and routines
//! as in-memory objects and compute the DDL that migrates one schema into
//! another.
//!
//! Consumers supply two fully-populated [`Schema`] snapshots (from an
//! introspection layer or fixtures); the crate emits an ordered list of
//! object diffs, each able to render a vendor-correct `CREATE`, `ALTER`, or
//! `DROP` statement under caller-supplied [`StatementModifiers`]. The crate
//! never talks to a server: it neither introspects nor executes SQL.
//!
//! # Architecture
//!
//! - **Object model** - [`Schema`], [`Table`], [`Column`], [`Index`],
//!   [`ForeignKey`], [`Routine`]: passive data with derived-DDL methods,
//!   faithful enough to reconstruct each table's exact CREATE TABLE.
//! - **Table diff** - [`Table::diff`] emits typed [`TableAlterClause`]s,
//!   each rendering its own DDL fragment and classifying its safety.
//! - **Schema diff** - [`SchemaDiff::new`] pairs entities by name and orders
//!   the resulting diffs so they are legal to execute sequentially.
//! - **Statement rendering** - [`ObjectDiff::statement`] applies safety
//!   gates, flavor adjustments, ignore filters, and lock/algorithm clauses.
//! - **Errors** - [`DiffError`]: a forbidden statement carries the DDL that
//!   would have run; an unsupported object carries both CREATEs for display.
//!
//! # Example
//!
//! ```rust
//! use schemadelta::prelude::*;
//!
//! let from = Schema::new("app").table(
//!     Table::new("users")
//!         .column(Column::new("id", "int").not_null())
//!         .index(Index::primary(vec![IndexColumn::new("id")]))
//!         .with_reconstructed_create(Flavor::default()),
//! );
//! let to = Schema::new("app").table(
//!     Table::new("users")
//!         .column(Column::new("id", "int").not_null())
//!         .column(Column::new("email", "varchar(255)"))
//!         .index(Index::primary(vec![IndexColumn::new("id")]))
//!         .with_reconstructed_create(Flavor::default()),
//! );
//!
//! let diff = from.diff(&to);
//! let mods = StatementModifiers::default();
//! for object_diff in diff.object_diffs() {
//!     let ddl = object_diff.statement(&mods).unwrap();
//!     assert_eq!(ddl, "ALTER TABLE `users` ADD COLUMN `email` varchar(255) AFTER `id`");
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod alter_clause;
pub mod column;
pub mod diff;
pub mod error;
pub mod escape;
pub mod flavor;
pub mod foreign_key;
pub mod index;
pub mod modifiers;
pub mod routine;
pub mod schema;
pub mod table;

pub use alter_clause::{ColumnPosition, PartitioningClause, TableAlterClause};
pub use column::{Column, ColumnDefault};
pub use diff::{DatabaseDiff, DiffType, ObjectDiff, RoutineDiff, SchemaDiff, TableDiff};
pub use error::{DiffError, Result};
pub use escape::{escape_identifier, escape_value_for_create_table};
pub use flavor::{Flavor, Vendor};
pub use foreign_key::{ForeignKey, ForeignKeyAction};
pub use index::{Index, IndexColumn};
pub use modifiers::{NextAutoIncMode, StatementModifiers};
pub use routine::{Routine, RoutineType};
pub use schema::Schema;
pub use table::{parse_create_auto_inc, Table};

/// A class of object in a relational database system.
///
/// Sub-objects such as columns, indexes, and foreign keys are handled within
/// the table logic and do not get their own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Database,
    Table,
    Proc,
    Func,
}

impl ObjectType {
    /// Returns the lowercase keyword for this object type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Table => "table",
            Self::Proc => "procedure",
            Self::Func => "function",
        }
    }

    /// Returns the uppercase keyword for this object type.
    #[must_use]
    pub fn caps(&self) -> &'static str {
        match self {
            Self::Database => "DATABASE",
            Self::Table => "TABLE",
            Self::Proc => "PROCEDURE",
            Self::Func => "FUNCTION",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of one schema-level object: its type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub object_type: ObjectType,
    pub name: String,
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.object_type, self.name)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::alter_clause::{ColumnPosition, PartitioningClause, TableAlterClause};
    pub use crate::column::{Column, ColumnDefault};
    pub use crate::diff::{DatabaseDiff, DiffType, ObjectDiff, RoutineDiff, SchemaDiff, TableDiff};
    pub use crate::error::{DiffError, Result};
    pub use crate::flavor::{Flavor, Vendor};
    pub use crate::foreign_key::{ForeignKey, ForeignKeyAction};
    pub use crate::index::{Index, IndexColumn};
    pub use crate::modifiers::{NextAutoIncMode, StatementModifiers};
    pub use crate::routine::{Routine, RoutineType};
    pub use crate::schema::Schema;
    pub use crate::table::{parse_create_auto_inc, Table};
    pub use crate::{ObjectKey, ObjectType};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_keywords() {
        assert_eq!(ObjectType::Table.name(), "table");
        assert_eq!(ObjectType::Proc.caps(), "PROCEDURE");
        assert_eq!(ObjectType::Func.to_string(), "function");
    }

    #[test]
    fn test_object_key_display() {
        let key = ObjectKey { object_type: ObjectType::Table, name: "users".to_string() };
        assert_eq!(key.to_string(), "table users");
    }
}
