//! Caller-supplied options that adjust statement rendering.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::flavor::Flavor;

/// How to handle next-auto-increment discrepancies between two tables.
/// Usually these are ignored in diffs entirely, but in some cases they are
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NextAutoIncMode {
    /// Omit auto-increment value changes entirely.
    #[default]
    Ignore,
    /// Include the value only when the "to" side is greater than the "from"
    /// side.
    IfIncreased,
    /// Include the value only when the "from" side is already greater than 1.
    IfAlready,
    /// Always include the value.
    Always,
}

/// Options applied per `statement()` call to adjust the DDL emitted for a
/// particular object, and/or generate errors if certain clauses are present.
#[derive(Debug, Clone, Default)]
pub struct StatementModifiers {
    /// How to handle differences in next-auto-increment values.
    pub next_auto_inc: NextAutoIncMode,
    /// Whether to allow potentially-destructive DDL (drop table, drop column,
    /// narrowing column modifications, engine changes).
    pub allow_unsafe: bool,
    /// When non-empty, include a `LOCK=<value>` clause in generated ALTER
    /// TABLE statements.
    pub lock_clause: String,
    /// When non-empty, include an `ALGORITHM=<value>` clause in generated
    /// ALTER TABLE statements.
    pub algorithm_clause: String,
    /// Generate blank DDL if a table name on either side matches.
    pub ignore_table: Option<Regex>,
    /// Maintain physical index order even when there is no functional
    /// difference.
    pub strict_index_order: bool,
    /// Maintain foreign key names even when there is no functional
    /// difference in the constraint definition.
    pub strict_foreign_key_naming: bool,
    /// Adjust generated DDL to match a vendor/version. The zero value makes
    /// no adjustments.
    pub flavor: Flavor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mods = StatementModifiers::default();
        assert_eq!(mods.next_auto_inc, NextAutoIncMode::Ignore);
        assert!(!mods.allow_unsafe);
        assert!(mods.lock_clause.is_empty());
        assert!(mods.algorithm_clause.is_empty());
        assert!(mods.ignore_table.is_none());
        assert!(!mods.strict_index_order);
        assert!(!mods.strict_foreign_key_naming);
        assert_eq!(mods.flavor, Flavor::default());
    }

    #[test]
    fn test_clone_shares_compiled_regex() {
        let mods = StatementModifiers {
            ignore_table: Some(Regex::new("^_tmp").unwrap()),
            ..Default::default()
        };
        let copied = mods.clone();
        assert!(copied.ignore_table.unwrap().is_match("_tmp_rebuild"));
    }
}
