//! Typed ALTER TABLE clauses.
//!
//! `Table::diff` expresses every detected difference as one of these
//! variants. Each variant renders its own DDL fragment via
//! [`TableAlterClause::clause`] and classifies itself via
//! [`TableAlterClause::is_unsafe`]. A clause may render to an empty string
//! when the supplied modifiers say it should be skipped (auto-increment
//! policy, index order strictness, foreign key naming strictness).

use crate::column::Column;
use crate::escape::{escape_identifier, escape_value_for_create_table};
use crate::foreign_key::ForeignKey;
use crate::index::Index;
use crate::modifiers::{NextAutoIncMode, StatementModifiers};

/// Where an added or repositioned column lands in the column sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    First,
    After(String),
}

impl ColumnPosition {
    fn clause(&self) -> String {
        match self {
            Self::First => "FIRST".to_string(),
            Self::After(name) => format!("AFTER {}", escape_identifier(name)),
        }
    }
}

/// Partition-level change. Partitioning is carried as the raw clause tail
/// from SHOW CREATE, so add/alter render that tail verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitioningClause<'a> {
    Add { clause: &'a str },
    Remove,
    Alter { clause: &'a str },
}

/// One clause of an ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAlterClause<'a> {
    AddColumn {
        column: &'a Column,
        position: ColumnPosition,
    },
    DropColumn {
        column: &'a Column,
    },
    ModifyColumn {
        from: &'a Column,
        to: &'a Column,
        /// Present when the column's ordinal position changed.
        position: Option<ColumnPosition>,
    },
    AddIndex {
        index: &'a Index,
        /// True when only physical index order differs; renders empty unless
        /// strict index ordering is in effect.
        reorder_only: bool,
    },
    DropIndex {
        index: &'a Index,
        reorder_only: bool,
    },
    AddForeignKey {
        foreign_key: &'a ForeignKey,
        /// True when the constraint differs only by name; renders empty
        /// unless strict foreign key naming is in effect.
        rename_only: bool,
    },
    DropForeignKey {
        foreign_key: &'a ForeignKey,
        rename_only: bool,
    },
    ChangeCharSet {
        char_set: &'a str,
        collation: &'a str,
    },
    ChangeEngine {
        engine: &'a str,
    },
    ChangeCreateOptions {
        /// Precomputed option assignments, including `NAME=DEFAULT` resets
        /// for options the target no longer carries.
        clause: String,
    },
    ChangeComment {
        comment: &'a str,
    },
    ChangeAutoIncrement {
        from_value: u64,
        to_value: u64,
    },
    PartitioningChange(PartitioningClause<'a>),
}

impl TableAlterClause<'_> {
    /// Renders the DDL fragment for this clause, or an empty string if the
    /// modifiers indicate it should be skipped.
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        match self {
            Self::AddColumn { column, position } => {
                format!("ADD COLUMN {} {}", column.definition(mods.flavor), position.clause())
            }
            Self::DropColumn { column } => {
                format!("DROP COLUMN {}", escape_identifier(&column.name))
            }
            Self::ModifyColumn { to, position, .. } => {
                let mut fragment = format!("MODIFY COLUMN {}", to.definition(mods.flavor));
                if let Some(position) = position {
                    fragment.push(' ');
                    fragment.push_str(&position.clause());
                }
                fragment
            }
            Self::AddIndex { index, reorder_only } => {
                if *reorder_only && !mods.strict_index_order {
                    String::new()
                } else {
                    format!("ADD {}", index.definition())
                }
            }
            Self::DropIndex { index, reorder_only } => {
                if *reorder_only && !mods.strict_index_order {
                    String::new()
                } else if index.primary_key {
                    "DROP PRIMARY KEY".to_string()
                } else {
                    format!("DROP KEY {}", escape_identifier(&index.name))
                }
            }
            Self::AddForeignKey { foreign_key, rename_only } => {
                if *rename_only && !mods.strict_foreign_key_naming {
                    String::new()
                } else {
                    format!("ADD {}", foreign_key.definition())
                }
            }
            Self::DropForeignKey { foreign_key, rename_only } => {
                if *rename_only && !mods.strict_foreign_key_naming {
                    String::new()
                } else {
                    format!("DROP FOREIGN KEY {}", escape_identifier(&foreign_key.name))
                }
            }
            Self::ChangeCharSet { char_set, collation } => {
                let mut fragment = format!("DEFAULT CHARACTER SET = {char_set}");
                if !collation.is_empty() {
                    fragment.push_str(&format!(" COLLATE = {collation}"));
                }
                fragment
            }
            Self::ChangeEngine { engine } => format!("ENGINE={engine}"),
            Self::ChangeCreateOptions { clause } => clause.clone(),
            Self::ChangeComment { comment } => {
                format!("COMMENT '{}'", escape_value_for_create_table(comment))
            }
            Self::ChangeAutoIncrement { from_value, to_value } => {
                let include = match mods.next_auto_inc {
                    NextAutoIncMode::Ignore => false,
                    NextAutoIncMode::IfIncreased => to_value > from_value,
                    NextAutoIncMode::IfAlready => *from_value > 1,
                    NextAutoIncMode::Always => true,
                };
                if include {
                    format!("AUTO_INCREMENT = {to_value}")
                } else {
                    String::new()
                }
            }
            Self::PartitioningChange(change) => match change {
                PartitioningClause::Add { clause } | PartitioningClause::Alter { clause } => {
                    clause.trim().to_string()
                }
                PartitioningClause::Remove => "REMOVE PARTITIONING".to_string(),
            },
        }
    }

    /// Returns true if executing this clause may lose data or break running
    /// queries. The classifier is conservative: a type change is safe only
    /// when it is a recognized same-family widening.
    #[must_use]
    pub fn is_unsafe(&self) -> bool {
        match self {
            Self::DropColumn { .. } | Self::ChangeEngine { .. } => true,
            Self::ModifyColumn { from, to, .. } => modify_column_is_unsafe(from, to),
            Self::PartitioningChange(PartitioningClause::Remove) => true,
            _ => false,
        }
    }
}

fn modify_column_is_unsafe(from: &Column, to: &Column) -> bool {
    if from.char_set != to.char_set || from.collation != to.collation {
        return true;
    }
    if from.type_in_db == to.type_in_db {
        return false;
    }
    !is_safe_type_widening(&from.type_in_db, &to.type_in_db)
}

/// Splits a raw type string into (base name, parenthesized args, unsigned).
fn split_type(raw: &str) -> (String, Option<String>, bool) {
    let lower = raw.trim().to_ascii_lowercase();
    let unsigned = lower.split_whitespace().any(|word| word == "unsigned");
    let head = lower.split_whitespace().next().unwrap_or("");
    match head.split_once('(') {
        Some((base, rest)) => (base.to_string(), Some(rest.trim_end_matches(')').to_string()), unsigned),
        None => (head.to_string(), None, unsigned),
    }
}

fn int_rank(base: &str) -> Option<u8> {
    match base {
        "tinyint" => Some(1),
        "smallint" => Some(2),
        "mediumint" => Some(3),
        "int" => Some(4),
        "bigint" => Some(5),
        _ => None,
    }
}

fn text_rank(base: &str) -> Option<u8> {
    match base {
        "tinytext" => Some(1),
        "text" => Some(2),
        "mediumtext" => Some(3),
        "longtext" => Some(4),
        _ => None,
    }
}

fn blob_rank(base: &str) -> Option<u8> {
    match base {
        "tinyblob" => Some(1),
        "blob" => Some(2),
        "mediumblob" => Some(3),
        "longblob" => Some(4),
        _ => None,
    }
}

fn is_safe_type_widening(old: &str, new: &str) -> bool {
    let (old_base, old_args, old_unsigned) = split_type(old);
    let (new_base, new_args, new_unsigned) = split_type(new);

    if let (Some(old_rank), Some(new_rank)) = (int_rank(&old_base), int_rank(&new_base)) {
        return old_unsigned == new_unsigned && new_rank >= old_rank;
    }
    if old_base == new_base
        && matches!(old_base.as_str(), "varchar" | "char" | "varbinary" | "binary")
    {
        let old_len = old_args.and_then(|a| a.parse::<u32>().ok());
        let new_len = new_args.and_then(|a| a.parse::<u32>().ok());
        return matches!((old_len, new_len), (Some(o), Some(n)) if n >= o);
    }
    if let (Some(old_rank), Some(new_rank)) = (text_rank(&old_base), text_rank(&new_base)) {
        return new_rank >= old_rank;
    }
    if let (Some(old_rank), Some(new_rank)) = (blob_rank(&old_base), blob_rank(&new_base)) {
        return new_rank >= old_rank;
    }
    false
}
