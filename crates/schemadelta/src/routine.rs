//! Stored procedure / function model and CREATE rendering.

use serde::{Deserialize, Serialize};

use crate::escape::{escape_identifier, escape_value_for_create_table};
use crate::flavor::Flavor;
use crate::ObjectType;

/// Distinguishes stored procedures from stored functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineType {
    Procedure,
    Function,
}

impl RoutineType {
    /// Returns the uppercase SQL keyword, e.g. `PROCEDURE`.
    #[must_use]
    pub fn caps(&self) -> &'static str {
        match self {
            Self::Procedure => "PROCEDURE",
            Self::Function => "FUNCTION",
        }
    }

    /// Returns the corresponding object type.
    #[must_use]
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Procedure => ObjectType::Proc,
            Self::Function => ObjectType::Func,
        }
    }
}

/// A stored procedure or function. All fields are scalar; two routines are
/// equal iff every field matches, and any inequality is handled by the diff
/// engine as a drop followed by a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    pub routine_type: RoutineType,
    /// Routine body, as stored in information_schema (escaping differs from
    /// the body embedded in `create_statement`).
    pub body: String,
    /// Parameter list formatted as in the original CREATE.
    pub param_string: String,
    /// Return type for functions, including charset/collation when relevant.
    pub return_data_type: String,
    /// `user@host` the routine runs as.
    pub definer: String,
    /// Schema default collation at creation time.
    pub database_collation: String,
    pub comment: String,
    pub deterministic: bool,
    /// `CONTAINS SQL`, `READS SQL DATA`, etc.
    pub sql_data_access: String,
    /// `DEFINER` or `INVOKER`.
    pub security_type: String,
    /// sql_mode in effect at creation time.
    pub sql_mode: String,
    /// Complete SHOW CREATE output obtained from a server.
    pub create_statement: String,
}

impl Routine {
    /// Creates a routine with MySQL's default characteristics.
    #[must_use]
    pub fn new(name: impl Into<String>, routine_type: RoutineType, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routine_type,
            body: body.into(),
            param_string: String::new(),
            return_data_type: String::new(),
            definer: String::new(),
            database_collation: String::new(),
            comment: String::new(),
            deterministic: false,
            sql_data_access: "CONTAINS SQL".to_string(),
            security_type: "DEFINER".to_string(),
            sql_mode: String::new(),
            create_statement: String::new(),
        }
    }

    /// Reconstructs the CREATE statement from the model's field values.
    /// Characteristics are emitted only when they differ from MySQL defaults.
    #[must_use]
    pub fn definition(&self, _flavor: Flavor) -> String {
        let definer = match self.definer.rfind('@') {
            Some(at_pos) => format!(
                "{}@{}",
                escape_identifier(&self.definer[..at_pos]),
                escape_identifier(&self.definer[at_pos + 1..])
            ),
            None => String::new(),
        };
        let return_clause = if self.routine_type == RoutineType::Function {
            format!(" RETURNS {}", self.return_data_type)
        } else {
            String::new()
        };

        let mut characteristics = String::new();
        if self.sql_data_access != "CONTAINS SQL" {
            characteristics.push_str(&format!("    {}\n", self.sql_data_access));
        }
        if self.deterministic {
            characteristics.push_str("    DETERMINISTIC\n");
        }
        if self.security_type != "DEFINER" {
            characteristics.push_str(&format!("    SQL SECURITY {}\n", self.security_type));
        }
        if !self.comment.is_empty() {
            characteristics.push_str(&format!(
                "    COMMENT '{}'\n",
                escape_value_for_create_table(&self.comment)
            ));
        }

        format!(
            "CREATE DEFINER={} {} {}({}){}\n{}{}",
            definer,
            self.routine_type.caps(),
            escape_identifier(&self.name),
            self.param_string,
            return_clause,
            characteristics,
            self.body
        )
    }

    /// Stamps `create_statement` with the model's own reconstructed CREATE.
    /// Introspection layers overwrite this with the server's SHOW CREATE
    /// output instead.
    #[must_use]
    pub fn with_reconstructed_create(mut self, flavor: Flavor) -> Self {
        self.create_statement = self.definition(flavor);
        self
    }

    /// Returns a statement that would drop this routine.
    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP {} {}", self.routine_type.caps(), escape_identifier(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_function() -> Routine {
        let mut routine = Routine::new(
            "add_tax",
            RoutineType::Function,
            "RETURN amount * 1.2",
        );
        routine.param_string = "amount decimal(10,2)".to_string();
        routine.return_data_type = "decimal(10,2)".to_string();
        routine.definer = "root@localhost".to_string();
        routine.deterministic = true;
        routine
    }

    #[test]
    fn test_function_definition() {
        let expected = "CREATE DEFINER=`root`@`localhost` FUNCTION `add_tax`(amount decimal(10,2)) RETURNS decimal(10,2)\n    DETERMINISTIC\nRETURN amount * 1.2";
        assert_eq!(sample_function().definition(Flavor::default()), expected);
    }

    #[test]
    fn test_procedure_definition_default_characteristics() {
        let mut proc = Routine::new("touch", RoutineType::Procedure, "BEGIN END");
        proc.definer = "app@%".to_string();
        assert_eq!(
            proc.definition(Flavor::default()),
            "CREATE DEFINER=`app`@`%` PROCEDURE `touch`()\nBEGIN END"
        );
    }

    #[test]
    fn test_non_default_characteristics_rendered() {
        let mut proc = Routine::new("audit", RoutineType::Procedure, "BEGIN END");
        proc.definer = "root@localhost".to_string();
        proc.sql_data_access = "READS SQL DATA".to_string();
        proc.security_type = "INVOKER".to_string();
        proc.comment = "read only".to_string();
        let definition = proc.definition(Flavor::default());
        assert!(definition.contains("    READS SQL DATA\n"));
        assert!(definition.contains("    SQL SECURITY INVOKER\n"));
        assert!(definition.contains("    COMMENT 'read only'\n"));
    }

    #[test]
    fn test_drop_statement() {
        assert_eq!(sample_function().drop_statement(), "DROP FUNCTION `add_tax`");
    }

    #[test]
    fn test_equality_is_total() {
        let a = sample_function();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.sql_mode = "STRICT_TRANS_TABLES".to_string();
        assert_ne!(a, b);
    }
}
