//! Table model: CREATE TABLE reconstruction and the table-level diff.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alter_clause::{ColumnPosition, PartitioningClause, TableAlterClause};
use crate::column::Column;
use crate::escape::{escape_identifier, escape_value_for_create_table};
use crate::flavor::Flavor;
use crate::foreign_key::ForeignKey;
use crate::index::Index;

/// A table, carrying every attribute required to reconstruct its exact
/// CREATE TABLE statement.
///
/// Values are populated by an introspection layer or test fixtures and are
/// treated as immutable snapshots: the diff engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub engine: String,
    /// Table default character set; empty means the schema default.
    pub char_set: String,
    /// Table default collation; empty means the charset default.
    pub collation: String,
    /// Raw option tail fragment, e.g. `ROW_FORMAT=DYNAMIC KEY_BLOCK_SIZE=8`.
    pub create_options: String,
    pub comment: String,
    /// Next AUTO_INCREMENT value; 0 or 1 when the table has none pending.
    pub next_auto_increment: u64,
    /// Columns in ordinal order.
    pub columns: Vec<Column>,
    /// Indexes in physical order; the primary key, when present, is first.
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Raw partitioning clause tail from SHOW CREATE, if the table is
    /// partitioned.
    pub partitioning: Option<String>,
    /// The authoritative DDL as returned by the server (trailing whitespace
    /// trimmed), or regenerated identically from the model.
    pub create_statement: String,
    /// True iff `create_statement` cannot be round-tripped by this model.
    /// Diffs involving such a table are rejected as unsupported.
    pub unsupported_ddl: bool,
}

impl Table {
    /// Creates an empty InnoDB table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: "InnoDB".to_string(),
            ..Self::default()
        }
    }

    /// Sets the storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Sets the table default character set.
    #[must_use]
    pub fn char_set(mut self, char_set: impl Into<String>) -> Self {
        self.char_set = char_set.into();
        self
    }

    /// Sets the table default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    /// Sets the raw create-option tail.
    #[must_use]
    pub fn create_options(mut self, options: impl Into<String>) -> Self {
        self.create_options = options.into();
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the next auto-increment value.
    #[must_use]
    pub fn next_auto_increment(mut self, value: u64) -> Self {
        self.next_auto_increment = value;
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends an index. The primary key, when present, must be appended
    /// before any secondary index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Appends a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Sets the raw partitioning clause.
    #[must_use]
    pub fn partitioning(mut self, clause: impl Into<String>) -> Self {
        self.partitioning = Some(clause.into());
        self
    }

    /// Stamps `create_statement` with the model's own regenerated DDL.
    /// Introspection layers overwrite this with the server's SHOW CREATE
    /// output instead.
    #[must_use]
    pub fn with_reconstructed_create(mut self, flavor: Flavor) -> Self {
        self.create_statement = self.generated_create_statement(flavor);
        self.unsupported_ddl = false;
        self
    }

    /// Records the server's SHOW CREATE output as the authoritative DDL.
    /// The statement is trimmed of trailing whitespace and compared against
    /// the model's regenerated DDL; any divergence marks the table as
    /// carrying unsupported features.
    #[must_use]
    pub fn with_server_create(mut self, statement: impl Into<String>, flavor: Flavor) -> Self {
        let statement = statement.into().trim_end().to_string();
        self.unsupported_ddl = statement != self.generated_create_statement(flavor);
        self.create_statement = statement;
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the primary key index, if the table has one.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|idx| idx.primary_key)
    }

    /// Returns all non-primary indexes in physical order.
    pub fn secondary_indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(|idx| !idx.primary_key)
    }

    /// Returns true if any column is AUTO_INCREMENT.
    #[must_use]
    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(|c| c.auto_increment)
    }

    /// Returns the index InnoDB uses to physically order rows: the primary
    /// key if any, else the first unique index whose columns are all
    /// non-nullable, else none. Non-InnoDB tables have no clustered key.
    #[must_use]
    pub fn clustered_index_key(&self) -> Option<&Index> {
        if !self.engine.eq_ignore_ascii_case("innodb") {
            return None;
        }
        if let Some(pk) = self.primary_key() {
            return Some(pk);
        }
        self.secondary_indexes().find(|idx| {
            idx.unique
                && idx
                    .columns
                    .iter()
                    .all(|ic| self.column_by_name(&ic.name).map_or(false, |c| !c.nullable))
        })
    }

    /// Reconstructs the CREATE TABLE statement from the model's field values.
    #[must_use]
    pub fn generated_create_statement(&self, flavor: Flavor) -> String {
        let mut defs: Vec<String> = self.columns.iter().map(|c| c.definition(flavor)).collect();
        defs.extend(self.indexes.iter().map(Index::definition));
        defs.extend(self.foreign_keys.iter().map(ForeignKey::definition));

        let mut tail = String::new();
        if !self.engine.is_empty() {
            tail.push_str(&format!(" ENGINE={}", self.engine));
        }
        if self.next_auto_increment > 1 {
            tail.push_str(&format!(" AUTO_INCREMENT={}", self.next_auto_increment));
        }
        if !self.char_set.is_empty() {
            tail.push_str(&format!(" DEFAULT CHARSET={}", self.char_set));
        }
        if !self.collation.is_empty() {
            tail.push_str(&format!(" COLLATE={}", self.collation));
        }
        if !self.create_options.is_empty() {
            tail.push_str(&format!(" {}", self.create_options));
        }
        if !self.comment.is_empty() {
            tail.push_str(&format!(
                " COMMENT='{}'",
                escape_value_for_create_table(&self.comment)
            ));
        }

        let mut statement = format!(
            "CREATE TABLE {} (\n  {}\n){}",
            escape_identifier(&self.name),
            defs.join(",\n  "),
            tail
        );
        if let Some(partitioning) = &self.partitioning {
            statement.push_str(&format!("\n{partitioning}"));
        }
        statement
    }

    /// Returns the fixed prefix of any ALTER TABLE statement for this table.
    #[must_use]
    pub fn alter_statement(&self) -> String {
        format!("ALTER TABLE {}", escape_identifier(&self.name))
    }

    /// Returns a statement that would drop this table.
    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE {}", escape_identifier(&self.name))
    }

    /// Computes the ordered alter clauses that would convert `self` into
    /// `other`, and whether the diff is fully expressible by this model.
    ///
    /// When the returned flag is false the clauses must not be executed;
    /// either side used DDL features the model cannot round-trip.
    ///
    /// Clause order is the contract consumed by statement rendering: column
    /// drops, column modifies/adds, index drops, index adds, foreign key
    /// drops, table option changes, foreign key adds. Foreign key adds come
    /// last so the schema-level diff can defer them past table creation.
    #[must_use]
    pub fn diff<'a>(&'a self, other: &'a Table) -> (Vec<TableAlterClause<'a>>, bool) {
        if self.unsupported_ddl || other.unsupported_ddl {
            debug!(table = %self.name, "table DDL not representable; diff unsupported");
            return (Vec::new(), false);
        }

        let (mut clauses, columns_supported) = self.diff_columns(other);
        let (index_drops, index_adds) = self.diff_indexes(other);
        clauses.extend(index_drops);
        clauses.extend(index_adds);
        let (fk_drops, fk_adds) = self.diff_foreign_keys(other);
        clauses.extend(fk_drops);
        clauses.extend(self.diff_options(other));
        clauses.extend(fk_adds);
        (clauses, columns_supported)
    }

    /// Pairs columns by name: drops, then adds and modifies following the
    /// target's ordinal order. A column whose relative position changed is
    /// re-emitted with an explicit FIRST/AFTER even when its attributes are
    /// unchanged.
    ///
    /// The returned flag is false when a dropped column exactly matches an
    /// added column apart from its name: a rename cannot be distinguished
    /// from a drop+add, and emitting the latter would discard data, so the
    /// diff is reported as unsupported instead.
    fn diff_columns<'a>(&'a self, other: &'a Table) -> (Vec<TableAlterClause<'a>>, bool) {
        let mut clauses = Vec::new();
        let to_names: HashSet<&str> = other.columns.iter().map(|c| c.name.as_str()).collect();
        let from_by_name: HashMap<&str, &Column> =
            self.columns.iter().map(|c| (c.name.as_str(), c)).collect();

        let mut dropped: Vec<&Column> = Vec::new();
        for column in &self.columns {
            if !to_names.contains(column.name.as_str()) {
                dropped.push(column);
                clauses.push(TableAlterClause::DropColumn { column });
            }
        }

        // Simulated column order: starts as the from side minus drops, and
        // converges on the to side as add/reposition clauses are emitted.
        let mut current: Vec<&str> = self
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| to_names.contains(name))
            .collect();

        let mut supported = true;
        for (i, to_col) in other.columns.iter().enumerate() {
            let position = if i == 0 {
                ColumnPosition::First
            } else {
                ColumnPosition::After(other.columns[i - 1].name.clone())
            };
            match from_by_name.get(to_col.name.as_str()).copied() {
                None => {
                    if dropped.iter().any(|d| d.equals_ignoring_name(to_col)) {
                        debug!(
                            table = %self.name,
                            column = %to_col.name,
                            "column differs only by name; diff unsupported"
                        );
                        supported = false;
                    }
                    clauses.push(TableAlterClause::AddColumn { column: to_col, position });
                    current.insert(i, to_col.name.as_str());
                }
                Some(from_col) => {
                    let at = current.iter().position(|name| *name == to_col.name.as_str());
                    let moved = at.map_or(false, |at| at != i);
                    if let Some(at) = at {
                        if moved {
                            let name = current.remove(at);
                            current.insert(i, name);
                        }
                    }
                    if moved || from_col != to_col {
                        clauses.push(TableAlterClause::ModifyColumn {
                            from: from_col,
                            to: to_col,
                            position: if moved { Some(position) } else { None },
                        });
                    }
                }
            }
        }
        (clauses, supported)
    }

    /// Pairs indexes by name (the primary key by its distinguished slot).
    /// Index changes are always drop+add. Pairs that differ only in physical
    /// order produce reorder-only clauses, which render empty unless strict
    /// index ordering is in effect.
    fn diff_indexes<'a>(
        &'a self,
        other: &'a Table,
    ) -> (Vec<TableAlterClause<'a>>, Vec<TableAlterClause<'a>>) {
        let mut drops = Vec::new();
        let mut adds = Vec::new();

        match (self.primary_key(), other.primary_key()) {
            (Some(from_pk), Some(to_pk)) => {
                if !from_pk.functionally_equals(to_pk) {
                    drops.push(TableAlterClause::DropIndex { index: from_pk, reorder_only: false });
                    adds.push(TableAlterClause::AddIndex { index: to_pk, reorder_only: false });
                }
            }
            (Some(from_pk), None) => {
                drops.push(TableAlterClause::DropIndex { index: from_pk, reorder_only: false });
            }
            (None, Some(to_pk)) => {
                adds.push(TableAlterClause::AddIndex { index: to_pk, reorder_only: false });
            }
            (None, None) => {}
        }

        let from_by_name: HashMap<&str, &Index> = self
            .secondary_indexes()
            .map(|idx| (idx.name.as_str(), idx))
            .collect();
        let to_by_name: HashMap<&str, &Index> = other
            .secondary_indexes()
            .map(|idx| (idx.name.as_str(), idx))
            .collect();

        for index in self.secondary_indexes() {
            if !to_by_name.contains_key(index.name.as_str()) {
                drops.push(TableAlterClause::DropIndex { index, reorder_only: false });
            }
        }

        // Names retained with identical definitions, in from-side physical
        // order; once the to side departs from this sequence, every later
        // retained index needs re-creation to preserve physical order.
        let from_kept: Vec<&str> = self
            .secondary_indexes()
            .filter(|idx| {
                to_by_name
                    .get(idx.name.as_str())
                    .map_or(false, |to_idx| idx.functionally_equals(to_idx))
            })
            .map(|idx| idx.name.as_str())
            .collect();
        let mut next_kept = 0;
        let mut diverged = false;

        for to_idx in other.secondary_indexes() {
            match from_by_name.get(to_idx.name.as_str()).copied() {
                Some(from_idx) if from_idx.functionally_equals(to_idx) => {
                    if !diverged && from_kept.get(next_kept) == Some(&to_idx.name.as_str()) {
                        next_kept += 1;
                    } else {
                        diverged = true;
                        drops.push(TableAlterClause::DropIndex {
                            index: from_idx,
                            reorder_only: true,
                        });
                        adds.push(TableAlterClause::AddIndex { index: to_idx, reorder_only: true });
                    }
                }
                Some(from_idx) => {
                    diverged = true;
                    drops.push(TableAlterClause::DropIndex { index: from_idx, reorder_only: false });
                    adds.push(TableAlterClause::AddIndex { index: to_idx, reorder_only: false });
                }
                None => {
                    diverged = true;
                    adds.push(TableAlterClause::AddIndex { index: to_idx, reorder_only: false });
                }
            }
        }

        (drops, adds)
    }

    /// Pairs foreign keys by name, then pairs leftovers by functional
    /// equivalence. A pair that differs only by constraint name produces
    /// rename-only clauses, which render empty unless strict foreign key
    /// naming is in effect.
    fn diff_foreign_keys<'a>(
        &'a self,
        other: &'a Table,
    ) -> (Vec<TableAlterClause<'a>>, Vec<TableAlterClause<'a>>) {
        let from_by_name: HashMap<&str, &ForeignKey> = self
            .foreign_keys
            .iter()
            .map(|fk| (fk.name.as_str(), fk))
            .collect();
        let to_by_name: HashMap<&str, &ForeignKey> = other
            .foreign_keys
            .iter()
            .map(|fk| (fk.name.as_str(), fk))
            .collect();

        let mut unmatched_to: Vec<&ForeignKey> = other
            .foreign_keys
            .iter()
            .filter(|fk| !from_by_name.contains_key(fk.name.as_str()))
            .collect();

        let mut drops = Vec::new();
        let mut adds = Vec::new();
        for foreign_key in &self.foreign_keys {
            match to_by_name.get(foreign_key.name.as_str()).copied() {
                Some(to_fk) => {
                    if !foreign_key.functionally_equals(to_fk) {
                        drops.push(TableAlterClause::DropForeignKey {
                            foreign_key,
                            rename_only: false,
                        });
                        adds.push(TableAlterClause::AddForeignKey {
                            foreign_key: to_fk,
                            rename_only: false,
                        });
                    }
                }
                None => {
                    if let Some(pos) = unmatched_to
                        .iter()
                        .position(|to_fk| foreign_key.functionally_equals(to_fk))
                    {
                        let to_fk = unmatched_to.remove(pos);
                        drops.push(TableAlterClause::DropForeignKey {
                            foreign_key,
                            rename_only: true,
                        });
                        adds.push(TableAlterClause::AddForeignKey {
                            foreign_key: to_fk,
                            rename_only: true,
                        });
                    } else {
                        drops.push(TableAlterClause::DropForeignKey {
                            foreign_key,
                            rename_only: false,
                        });
                    }
                }
            }
        }
        for foreign_key in unmatched_to {
            adds.push(TableAlterClause::AddForeignKey { foreign_key, rename_only: false });
        }
        (drops, adds)
    }

    /// Diffs table-level attributes: charset/collation, engine, create
    /// options (as an order-insensitive token set), comment, auto-increment,
    /// partitioning.
    fn diff_options<'a>(&'a self, other: &'a Table) -> Vec<TableAlterClause<'a>> {
        let mut clauses = Vec::new();
        if (self.char_set != other.char_set || self.collation != other.collation)
            && !other.char_set.is_empty()
        {
            clauses.push(TableAlterClause::ChangeCharSet {
                char_set: &other.char_set,
                collation: &other.collation,
            });
        }
        if self.engine != other.engine && !other.engine.is_empty() {
            clauses.push(TableAlterClause::ChangeEngine { engine: &other.engine });
        }
        if let Some(clause) = create_options_clause(&self.create_options, &other.create_options) {
            clauses.push(TableAlterClause::ChangeCreateOptions { clause });
        }
        if self.comment != other.comment {
            clauses.push(TableAlterClause::ChangeComment { comment: &other.comment });
        }
        if self.next_auto_increment != other.next_auto_increment {
            clauses.push(TableAlterClause::ChangeAutoIncrement {
                from_value: self.next_auto_increment,
                to_value: other.next_auto_increment,
            });
        }
        match (&self.partitioning, &other.partitioning) {
            (Some(from_part), Some(to_part)) if from_part != to_part => {
                clauses.push(TableAlterClause::PartitioningChange(PartitioningClause::Alter {
                    clause: to_part,
                }));
            }
            (Some(_), None) => {
                clauses.push(TableAlterClause::PartitioningChange(PartitioningClause::Remove));
            }
            (None, Some(to_part)) => {
                clauses.push(TableAlterClause::PartitioningChange(PartitioningClause::Add {
                    clause: to_part,
                }));
            }
            _ => {}
        }
        clauses
    }
}

/// Strips any ` AUTO_INCREMENT=N` from a CREATE TABLE tail, returning the
/// stripped statement and the parsed value (0 when absent).
#[must_use]
pub fn parse_create_auto_inc(statement: &str) -> (String, u64) {
    const NEEDLE: &str = " AUTO_INCREMENT=";
    if let Some(pos) = statement.find(NEEDLE) {
        let rest = &statement[pos + NEEDLE.len()..];
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 {
            let value = rest[..digits].parse().unwrap_or(0);
            let mut stripped = String::with_capacity(statement.len());
            stripped.push_str(&statement[..pos]);
            stripped.push_str(&rest[digits..]);
            return (stripped, value);
        }
    }
    (statement.to_string(), 0)
}

fn parse_options(raw: &str) -> Vec<(&str, Option<&str>)> {
    raw.split_whitespace()
        .map(|token| match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        })
        .collect()
}

/// Computes the option assignments needed to move from one create-option
/// tail to another. Token reordering alone is not a diff. Options absent
/// from the target are reset with `NAME=DEFAULT`.
fn create_options_clause(from: &str, to: &str) -> Option<String> {
    let from_opts = parse_options(from);
    let to_opts = parse_options(to);
    let from_map: HashMap<&str, Option<&str>> = from_opts.iter().copied().collect();
    let to_map: HashMap<&str, Option<&str>> = to_opts.iter().copied().collect();

    let mut parts = Vec::new();
    for (name, value) in &to_opts {
        if from_map.get(name) != Some(value) {
            parts.push(match value {
                Some(value) => format!("{name}={value}"),
                None => (*name).to_string(),
            });
        }
    }
    for (name, _) in &from_opts {
        if !to_map.contains_key(name) {
            parts.push(format!("{name}=DEFAULT"));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexColumn;
    use crate::modifiers::StatementModifiers;

    fn users() -> Table {
        Table::new("users")
            .char_set("utf8mb4")
            .column(Column::new("id", "int(10) unsigned").not_null().auto_increment())
            .column(Column::new("name", "varchar(100)").not_null())
            .column(Column::new("email", "varchar(255)"))
            .index(Index::primary(vec![IndexColumn::new("id")]))
            .index(Index::new("idx_name", vec![IndexColumn::new("name")]))
            .with_reconstructed_create(Flavor::default())
    }

    #[test]
    fn test_generated_create_statement() {
        let expected = "CREATE TABLE `users` (\n  \
                        `id` int(10) unsigned NOT NULL AUTO_INCREMENT,\n  \
                        `name` varchar(100) NOT NULL,\n  \
                        `email` varchar(255),\n  \
                        PRIMARY KEY (`id`),\n  \
                        KEY `idx_name` (`name`)\n\
                        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";
        assert_eq!(users().generated_create_statement(Flavor::default()), expected);
        assert_eq!(users().create_statement, expected);
        assert!(!users().unsupported_ddl);
    }

    #[test]
    fn test_server_create_mismatch_marks_unsupported() {
        let table = Table::new("t")
            .column(Column::new("a", "int"))
            .with_server_create("CREATE TABLE `t` (\n  `a` int\n) ENGINE=InnoDB STRANGE_CLAUSE=1\n", Flavor::default());
        assert!(table.unsupported_ddl);
        assert_eq!(
            table.create_statement,
            "CREATE TABLE `t` (\n  `a` int\n) ENGINE=InnoDB STRANGE_CLAUSE=1"
        );
        let (clauses, supported) = table.diff(&table);
        assert!(clauses.is_empty());
        assert!(!supported);
    }

    #[test]
    fn test_self_diff_is_empty_and_supported() {
        let table = users();
        let (clauses, supported) = table.diff(&table);
        assert!(clauses.is_empty());
        assert!(supported);
    }

    #[test]
    fn test_diff_add_column_preserves_target_order() {
        let from = users();
        let to = users().column(Column::new("created_at", "datetime").not_null());
        let (clauses, supported) = from.diff(&to);
        assert!(supported);
        assert_eq!(clauses.len(), 1);
        let rendered = clauses[0].clause(&StatementModifiers::default());
        assert_eq!(rendered, "ADD COLUMN `created_at` datetime NOT NULL AFTER `email`");
    }

    #[test]
    fn test_rename_only_column_is_unsupported() {
        let from = Table::new("t")
            .column(Column::new("a", "int"))
            .column(Column::new("old_name", "varchar(20)").not_null());
        let to = Table::new("t")
            .column(Column::new("a", "int"))
            .column(Column::new("new_name", "varchar(20)").not_null());
        let (_, supported) = from.diff(&to);
        assert!(!supported);

        // a drop plus an add of a genuinely different column stays supported
        let to_changed = Table::new("t")
            .column(Column::new("a", "int"))
            .column(Column::new("new_name", "varchar(80)").not_null());
        let (clauses, supported) = from.diff(&to_changed);
        assert!(supported);
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn test_diff_reposition_without_attribute_change() {
        let from = Table::new("t")
            .column(Column::new("a", "int"))
            .column(Column::new("b", "int"))
            .column(Column::new("c", "int"));
        let to = Table::new("t")
            .column(Column::new("c", "int"))
            .column(Column::new("a", "int"))
            .column(Column::new("b", "int"));
        let (clauses, supported) = from.diff(&to);
        assert!(supported);
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0].clause(&StatementModifiers::default()),
            "MODIFY COLUMN `c` int FIRST"
        );
    }

    #[test]
    fn test_diff_index_order_only_is_silent_by_default() {
        let from = Table::new("t")
            .column(Column::new("a", "int"))
            .column(Column::new("b", "int"))
            .index(Index::new("idx_a", vec![IndexColumn::new("a")]))
            .index(Index::new("idx_b", vec![IndexColumn::new("b")]));
        let to = Table::new("t")
            .column(Column::new("a", "int"))
            .column(Column::new("b", "int"))
            .index(Index::new("idx_b", vec![IndexColumn::new("b")]))
            .index(Index::new("idx_a", vec![IndexColumn::new("a")]));
        let (clauses, supported) = from.diff(&to);
        assert!(supported);
        let mods = StatementModifiers::default();
        assert!(clauses.iter().all(|c| c.clause(&mods).is_empty()));

        let strict = StatementModifiers { strict_index_order: true, ..Default::default() };
        let rendered: Vec<String> =
            clauses.iter().map(|c| c.clause(&strict)).filter(|s| !s.is_empty()).collect();
        assert_eq!(
            rendered,
            vec![
                "DROP KEY `idx_b`".to_string(),
                "DROP KEY `idx_a`".to_string(),
                "ADD KEY `idx_b` (`b`)".to_string(),
                "ADD KEY `idx_a` (`a`)".to_string(),
            ]
        );
    }

    #[test]
    fn test_diff_fk_rename_pairs() {
        let fk = |name: &str| {
            ForeignKey::new(name, vec!["uid".to_string()], "users", vec!["id".to_string()])
        };
        let from = Table::new("posts")
            .column(Column::new("uid", "int"))
            .foreign_key(fk("fk_x"));
        let to = Table::new("posts")
            .column(Column::new("uid", "int"))
            .foreign_key(fk("fk_y"));
        let (clauses, supported) = from.diff(&to);
        assert!(supported);
        assert_eq!(clauses.len(), 2);

        let lax = StatementModifiers::default();
        assert!(clauses.iter().all(|c| c.clause(&lax).is_empty()));

        let strict = StatementModifiers { strict_foreign_key_naming: true, ..Default::default() };
        let rendered: Vec<String> = clauses.iter().map(|c| c.clause(&strict)).collect();
        assert_eq!(rendered[0], "DROP FOREIGN KEY `fk_x`");
        assert!(rendered[1].starts_with("ADD CONSTRAINT `fk_y` FOREIGN KEY"));
    }

    #[test]
    fn test_diff_table_options() {
        let from = Table::new("t")
            .column(Column::new("a", "int"))
            .create_options("ROW_FORMAT=COMPACT CHECKSUM=1")
            .comment("old");
        let to = Table::new("t")
            .column(Column::new("a", "int"))
            .create_options("ROW_FORMAT=DYNAMIC")
            .comment("new");
        let (clauses, supported) = from.diff(&to);
        assert!(supported);
        let mods = StatementModifiers::default();
        let rendered: Vec<String> = clauses.iter().map(|c| c.clause(&mods)).collect();
        assert_eq!(rendered, vec!["ROW_FORMAT=DYNAMIC CHECKSUM=DEFAULT", "COMMENT 'new'"]);
    }

    #[test]
    fn test_create_options_reordering_is_not_a_diff() {
        assert!(create_options_clause("A=1 B=2", "B=2 A=1").is_none());
        assert_eq!(create_options_clause("", "A=1"), Some("A=1".to_string()));
        assert_eq!(create_options_clause("A=1", ""), Some("A=DEFAULT".to_string()));
    }

    #[test]
    fn test_clustered_index_key() {
        let with_pk = users();
        assert_eq!(with_pk.clustered_index_key(), with_pk.primary_key());

        let unique_not_null = Table::new("t")
            .column(Column::new("code", "char(8)").not_null())
            .column(Column::new("note", "text"))
            .index(Index::new("uq_code", vec![IndexColumn::new("code")]).unique());
        let clustered = unique_not_null.clustered_index_key();
        assert_eq!(clustered.map(|i| i.name.as_str()), Some("uq_code"));
        assert!(unique_not_null.primary_key().is_none());

        let unique_nullable = Table::new("t")
            .column(Column::new("code", "char(8)"))
            .index(Index::new("uq_code", vec![IndexColumn::new("code")]).unique());
        assert!(unique_nullable.clustered_index_key().is_none());

        let myisam = users().engine("MyISAM");
        assert!(myisam.clustered_index_key().is_none());
    }

    #[test]
    fn test_parse_create_auto_inc() {
        let stmt = "CREATE TABLE `t` (\n  `id` int NOT NULL AUTO_INCREMENT,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB AUTO_INCREMENT=1000 DEFAULT CHARSET=utf8mb4";
        let (stripped, value) = parse_create_auto_inc(stmt);
        assert_eq!(value, 1000);
        assert!(stripped.contains("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
        assert!(stripped.contains("AUTO_INCREMENT,"));

        let (unchanged, value) = parse_create_auto_inc("CREATE TABLE `t` (\n  `a` int\n)");
        assert_eq!(value, 0);
        assert_eq!(unchanged, "CREATE TABLE `t` (\n  `a` int\n)");
    }

    #[test]
    fn test_auto_increment_tail_rendered_when_above_one() {
        let table = Table::new("t")
            .column(Column::new("id", "int").not_null().auto_increment())
            .index(Index::primary(vec![IndexColumn::new("id")]))
            .next_auto_increment(5000);
        assert!(table
            .generated_create_statement(Flavor::default())
            .contains(" AUTO_INCREMENT=5000 "));
    }

    #[test]
    fn test_partitioning_diff() {
        let plain = Table::new("events").column(Column::new("id", "bigint").not_null());
        let partitioned = plain.clone().partitioning("PARTITION BY HASH (`id`) PARTITIONS 4");

        let (clauses, _) = plain.diff(&partitioned);
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0].clause(&StatementModifiers::default()),
            "PARTITION BY HASH (`id`) PARTITIONS 4"
        );

        let (clauses, _) = partitioned.diff(&plain);
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].is_unsafe());
        assert_eq!(clauses[0].clause(&StatementModifiers::default()), "REMOVE PARTITIONING");
    }

    #[test]
    fn test_model_serialization_round_trip() {
        let table = users();
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(table, back);
    }
}
