//! Schema-level and object-level diffs.
//!
//! [`SchemaDiff::new`] pairs the entities of two schema snapshots by name and
//! produces create/alter/drop diffs for tables and routines, ordered so the
//! resulting statements are legal to execute sequentially within one schema:
//! database-level DDL first, then drops and foreign-key-free alters, then
//! creates, then the deferred foreign-key additions, then routine DDL.
//!
//! Cross-schema foreign key dependencies are NOT resolved: the deferral only
//! orders clauses within a single schema diff. Tooling diffing multiple
//! schemas must sequence the results itself.

use tracing::debug;

use crate::alter_clause::TableAlterClause;
use crate::error::{DiffError, Result};
use crate::modifiers::{NextAutoIncMode, StatementModifiers};
use crate::routine::Routine;
use crate::schema::Schema;
use crate::table::{parse_create_auto_inc, Table};
use crate::{ObjectKey, ObjectType};

/// The kind of operation a diff represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffType {
    None,
    Create,
    Drop,
    Alter,
    /// Reserved; never produced by this crate.
    Rename,
}

impl DiffType {
    /// Returns the SQL verb for this diff type.
    ///
    /// # Panics
    ///
    /// Panics on [`DiffType::Rename`], which is reserved and never emitted;
    /// reaching it is a programmer error.
    #[must_use]
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Create => "CREATE",
            Self::Drop => "DROP",
            Self::Alter => "ALTER",
            Self::Rename => panic!("unsupported diff type Rename"),
        }
    }
}

/// Generic handle over a difference between two objects of the same type.
pub trait ObjectDiff {
    /// The kind of operation this diff represents.
    fn diff_type(&self) -> DiffType;
    /// The type and name of the object being diff'd.
    fn object_key(&self) -> ObjectKey;
    /// Renders the DDL statement for this diff under the supplied modifiers.
    ///
    /// A blank string means the modifiers indicate the statement should be
    /// skipped. A forbidden error still carries the statement that would
    /// have run; do not ignore the error value.
    fn statement(&self, mods: &StatementModifiers) -> Result<String>;
}

///// SchemaDiff ///////////////////////////////////////////////////////////////

/// The set of differences between two database schemas, encapsulating diffs
/// of the various object types. Holds shared read-only references to the
/// schemas it was built from.
#[derive(Debug)]
pub struct SchemaDiff<'a> {
    pub from_schema: Option<&'a Schema>,
    pub to_schema: Option<&'a Schema>,
    table_diffs: Vec<TableDiff<'a>>,
    routine_diffs: Vec<RoutineDiff<'a>>,
    database_diff: Option<DatabaseDiff<'a>>,
}

impl<'a> SchemaDiff<'a> {
    /// Computes the set of differences between two schemas. Either side may
    /// be absent, representing a full create or full drop of the database.
    #[must_use]
    pub fn new(from: Option<&'a Schema>, to: Option<&'a Schema>) -> Self {
        let table_diffs = if from.is_none() && to.is_none() {
            Vec::new()
        } else {
            compare_tables(from, to)
        };
        let routine_diffs = if from.is_none() && to.is_none() {
            Vec::new()
        } else {
            compare_routines(from, to)
        };
        let database_diff = {
            let dd = DatabaseDiff { from, to };
            (dd.diff_type() != DiffType::None).then_some(dd)
        };
        debug!(
            tables = table_diffs.len(),
            routines = routine_diffs.len(),
            "computed schema diff"
        );
        Self { from_schema: from, to_schema: to, table_diffs, routine_diffs, database_diff }
    }

    /// Returns the database-level diff, or `None` if no database-level DDL
    /// is necessary.
    #[must_use]
    pub fn database_diff(&self) -> Option<&DatabaseDiff<'a>> {
        self.database_diff.as_ref()
    }

    /// Returns the table-level diffs in emission order.
    #[must_use]
    pub fn table_diffs(&self) -> &[TableDiff<'a>] {
        &self.table_diffs
    }

    /// Returns the routine-level diffs in emission order.
    #[must_use]
    pub fn routine_diffs(&self) -> &[RoutineDiff<'a>] {
        &self.routine_diffs
    }

    /// Returns all object diffs, ordered such that their statements are
    /// legal to execute sequentially: database DDL first, then table DDL
    /// (with foreign key additions last), then routine DDL. The order is
    /// stable across runs for identical inputs.
    #[must_use]
    pub fn object_diffs(&self) -> Vec<&dyn ObjectDiff> {
        let mut result: Vec<&dyn ObjectDiff> = Vec::new();
        if let Some(dd) = &self.database_diff {
            result.push(dd);
        }
        for td in &self.table_diffs {
            result.push(td);
        }
        for rd in &self.routine_diffs {
            result.push(rd);
        }
        result
    }

    /// Returns any table diffs of the specified type(s).
    #[must_use]
    pub fn filtered_table_diffs(&self, only_types: &[DiffType]) -> Vec<&TableDiff<'a>> {
        self.table_diffs
            .iter()
            .filter(|td| only_types.contains(&td.diff_type))
            .collect()
    }
}

/// Renders the full set of differences as a single string, with no statement
/// modifiers applied and all errors ignored. The result may contain
/// destructive statements; it is for display purposes only, never for
/// execution.
impl std::fmt::Display for SchemaDiff<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mods = StatementModifiers::default();
        for diff in self.object_diffs() {
            let statement = match diff.statement(&mods) {
                Ok(statement) => statement,
                Err(err) => err.statement().unwrap_or_default().to_string(),
            };
            writeln!(f, "{statement};")?;
        }
        Ok(())
    }
}

fn schema_tables<'a>(schema: Option<&'a Schema>) -> &'a [Table] {
    match schema {
        Some(schema) => &schema.tables,
        None => &[],
    }
}

fn schema_routines<'a>(schema: Option<&'a Schema>) -> &'a [Routine] {
    match schema {
        Some(schema) => &schema.routines,
        None => &[],
    }
}

fn compare_tables<'a>(from: Option<&'a Schema>, to: Option<&'a Schema>) -> Vec<TableDiff<'a>> {
    let mut table_diffs = Vec::new();
    let mut add_fk_alters = Vec::new();
    let from_by_name = from.map(Schema::tables_by_name).unwrap_or_default();
    let to_by_name = to.map(Schema::tables_by_name).unwrap_or_default();

    for from_table in schema_tables(from) {
        match to_by_name.get(from_table.name.as_str()).copied() {
            None => table_diffs.push(TableDiff::new_drop_table(from_table)),
            Some(to_table) => {
                if let Some(alter) = TableDiff::new_alter_table(from_table, to_table) {
                    // Added foreign keys may rely on tables, columns, or
                    // indexes created later in the diff, so their clauses run
                    // in a trailing batch.
                    let (other_alter, add_fk_alter) = alter.split_add_foreign_keys();
                    if let Some(other_alter) = other_alter {
                        table_diffs.push(other_alter);
                    }
                    if let Some(add_fk_alter) = add_fk_alter {
                        debug!(table = %from_table.name, "deferring foreign key additions");
                        add_fk_alters.push(add_fk_alter);
                    }
                }
            }
        }
    }
    for to_table in schema_tables(to) {
        if !from_by_name.contains_key(to_table.name.as_str()) {
            table_diffs.push(TableDiff::new_create_table(to_table));
        }
    }

    table_diffs.extend(add_fk_alters);
    table_diffs
}

fn compare_routines<'a>(from: Option<&'a Schema>, to: Option<&'a Schema>) -> Vec<RoutineDiff<'a>> {
    let mut routine_diffs = Vec::new();
    for routine_type in [crate::routine::RoutineType::Procedure, crate::routine::RoutineType::Function] {
        let to_by_name = match to {
            Some(schema) => schema.routines_by_name_and_type(routine_type),
            None => Default::default(),
        };
        let from_by_name = match from {
            Some(schema) => schema.routines_by_name_and_type(routine_type),
            None => Default::default(),
        };
        for from_routine in schema_routines(from).iter().filter(|r| r.routine_type == routine_type) {
            match to_by_name.get(from_routine.name.as_str()).copied() {
                None => routine_diffs.push(RoutineDiff::drop(from_routine)),
                Some(to_routine) if from_routine != to_routine => {
                    // Changes to existing routines are handled as a drop
                    // followed by a create; there is no in-place alter.
                    routine_diffs.push(RoutineDiff::drop(from_routine));
                    routine_diffs.push(RoutineDiff::create(to_routine));
                }
                Some(_) => {}
            }
        }
        for to_routine in schema_routines(to).iter().filter(|r| r.routine_type == routine_type) {
            if !from_by_name.contains_key(to_routine.name.as_str()) {
                routine_diffs.push(RoutineDiff::create(to_routine));
            }
        }
    }
    routine_diffs
}

///// DatabaseDiff /////////////////////////////////////////////////////////////

/// Differences of schema metadata: existence of the schema, default
/// character set, default collation.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseDiff<'a> {
    pub from: Option<&'a Schema>,
    pub to: Option<&'a Schema>,
}

impl DatabaseDiff<'_> {
    fn compute_diff_type(&self) -> DiffType {
        match (self.from, self.to) {
            (None, None) => DiffType::None,
            (None, Some(_)) => DiffType::Create,
            (Some(_), None) => DiffType::Drop,
            (Some(from), Some(to)) => {
                if from.char_set != to.char_set || from.collation != to.collation {
                    DiffType::Alter
                } else {
                    DiffType::None
                }
            }
        }
    }
}

impl ObjectDiff for DatabaseDiff<'_> {
    fn diff_type(&self) -> DiffType {
        self.compute_diff_type()
    }

    /// The name is the from-side schema unless this is a create, in which
    /// case the to-side schema name is used.
    fn object_key(&self) -> ObjectKey {
        let name = match (self.from, self.to) {
            (Some(from), _) => from.name.clone(),
            (None, Some(to)) => to.name.clone(),
            (None, None) => String::new(),
        };
        ObjectKey { object_type: ObjectType::Database, name }
    }

    fn statement(&self, _mods: &StatementModifiers) -> Result<String> {
        match (self.compute_diff_type(), self.from, self.to) {
            (DiffType::Create, _, Some(to)) => Ok(to.create_statement()),
            (DiffType::Drop, Some(from), _) => {
                // No allow-unsafe escape hatch exists for dropping a
                // database.
                let statement = from.drop_statement();
                Err(DiffError::Forbidden {
                    reason: "DROP DATABASE never permitted".to_string(),
                    statement,
                })
            }
            (DiffType::Alter, Some(from), Some(to)) => {
                Ok(from.alter_statement(&to.char_set, &to.collation))
            }
            _ => Ok(String::new()),
        }
    }
}

///// TableDiff ////////////////////////////////////////////////////////////////

/// A difference between two tables: a create, alter, or drop of one table.
#[derive(Debug)]
pub struct TableDiff<'a> {
    diff_type: DiffType,
    pub from: Option<&'a Table>,
    pub to: Option<&'a Table>,
    alter_clauses: Vec<TableAlterClause<'a>>,
    supported: bool,
}

impl<'a> TableDiff<'a> {
    /// Returns a diff representing a CREATE TABLE, for a table that only
    /// exists on the to side.
    #[must_use]
    pub fn new_create_table(table: &'a Table) -> Self {
        Self {
            diff_type: DiffType::Create,
            from: None,
            to: Some(table),
            alter_clauses: Vec::new(),
            supported: true,
        }
    }

    /// Returns a diff representing an ALTER TABLE, for a table present on
    /// both sides with one or more differences. Returns `None` when the two
    /// tables are identical.
    #[must_use]
    pub fn new_alter_table(from: &'a Table, to: &'a Table) -> Option<Self> {
        let (alter_clauses, supported) = from.diff(to);
        if supported && alter_clauses.is_empty() {
            return None;
        }
        Some(Self {
            diff_type: DiffType::Alter,
            from: Some(from),
            to: Some(to),
            alter_clauses,
            supported,
        })
    }

    /// Returns a diff representing a DROP TABLE, for a table that only
    /// exists on the from side.
    #[must_use]
    pub fn new_drop_table(table: &'a Table) -> Self {
        Self {
            diff_type: DiffType::Drop,
            from: Some(table),
            to: None,
            alter_clauses: Vec::new(),
            supported: true,
        }
    }

    /// Pulls any foreign-key-addition clauses out into a separate diff.
    ///
    /// The first returned diff contains no foreign key additions; the second
    /// consists only of them. Either may be `None` when it would carry no
    /// clauses (an alter with no FK additions returns `(Some(self), None)`;
    /// one with only FK additions returns `(None, Some(self))`).
    ///
    /// Foreign keys rely on indexes on both sides, the same ALTER cannot
    /// drop and re-add an FK of the same name, and some server versions
    /// advise against mixing FK drops and adds at all, so the additions run
    /// in their own statement after everything else.
    #[must_use]
    pub fn split_add_foreign_keys(self) -> (Option<Self>, Option<Self>) {
        if self.diff_type != DiffType::Alter || !self.supported || self.alter_clauses.is_empty() {
            return (Some(self), None);
        }
        let Self { diff_type, from, to, alter_clauses, .. } = self;
        let (add_fk_clauses, other_clauses): (Vec<_>, Vec<_>) = alter_clauses
            .into_iter()
            .partition(|c| matches!(c, TableAlterClause::AddForeignKey { .. }));
        let rebuild = |alter_clauses: Vec<TableAlterClause<'a>>| Self {
            diff_type,
            from,
            to,
            alter_clauses,
            supported: true,
        };
        match (other_clauses.is_empty(), add_fk_clauses.is_empty()) {
            (_, true) => (Some(rebuild(other_clauses)), None),
            (true, false) => (None, Some(rebuild(add_fk_clauses))),
            (false, false) => (Some(rebuild(other_clauses)), Some(rebuild(add_fk_clauses))),
        }
    }

    /// Returns the statement body minus its fixed prefix: everything after
    /// `CREATE TABLE <name> ` or `ALTER TABLE <name> `, or an empty string
    /// for drops.
    pub fn clauses(&self, mods: &StatementModifiers) -> Result<String> {
        let statement = self.statement(mods)?;
        if statement.is_empty() {
            return Ok(statement);
        }
        match (self.diff_type, self.from, self.to) {
            (DiffType::Create, _, Some(to)) => {
                let prefix = format!("CREATE TABLE {} ", crate::escape::escape_identifier(&to.name));
                Ok(statement.replacen(&prefix, "", 1))
            }
            (DiffType::Alter, Some(from), _) => {
                let prefix = format!("{} ", from.alter_statement());
                Ok(statement.replacen(&prefix, "", 1))
            }
            _ => Ok(String::new()),
        }
    }

    fn alter_statement(&self, mods: &StatementModifiers) -> Result<String> {
        if !self.supported {
            return Err(self.unsupported_error(mods));
        }
        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Ok(String::new()),
        };

        let mut mods = mods.clone();
        // InnoDB tables lacking an explicit primary key cluster on another
        // unique index; physical index order then matters and must be
        // preserved.
        if !mods.strict_index_order && to.clustered_index_key() != to.primary_key() {
            mods.strict_index_order = true;
        }

        let mut pending_error: Option<String> = None;
        let mut clause_strings = Vec::with_capacity(self.alter_clauses.len());
        for clause in &self.alter_clauses {
            if pending_error.is_none() && !mods.allow_unsafe && clause.is_unsafe() {
                pending_error =
                    Some("Unsafe or potentially destructive ALTER TABLE not permitted".to_string());
            }
            let clause_string = clause.clause(&mods);
            if !clause_string.is_empty() {
                clause_strings.push(clause_string);
            }
        }
        if clause_strings.is_empty() {
            return Ok(String::new());
        }

        if !mods.lock_clause.is_empty() {
            clause_strings.insert(0, format!("LOCK={}", mods.lock_clause.to_uppercase()));
        }
        if !mods.algorithm_clause.is_empty() {
            clause_strings.insert(0, format!("ALGORITHM={}", mods.algorithm_clause.to_uppercase()));
        }

        let statement = format!("{} {}", from.alter_statement(), clause_strings.join(", "));
        match pending_error {
            Some(reason) => Err(DiffError::Forbidden { reason, statement }),
            None => Ok(statement),
        }
    }

    fn unsupported_error(&self, mods: &StatementModifiers) -> DiffError {
        let (expected_create, actual_create) = match (self.from, self.to) {
            (_, Some(to)) if to.unsupported_ddl => {
                (to.generated_create_statement(mods.flavor), to.create_statement.clone())
            }
            (Some(from), _) if from.unsupported_ddl => {
                (from.generated_create_statement(mods.flavor), from.create_statement.clone())
            }
            (Some(from), Some(to)) => (from.create_statement.clone(), to.create_statement.clone()),
            _ => (String::new(), String::new()),
        };
        DiffError::Unsupported { object_key: self.object_key(), expected_create, actual_create }
    }
}

impl ObjectDiff for TableDiff<'_> {
    fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    /// The name is the from-side table unless this is a create, in which
    /// case the to-side table name is used.
    fn object_key(&self) -> ObjectKey {
        let name = match (self.diff_type, self.from, self.to) {
            (DiffType::Create, _, Some(to)) => to.name.clone(),
            (_, Some(from), _) => from.name.clone(),
            _ => String::new(),
        };
        ObjectKey { object_type: ObjectType::Table, name }
    }

    fn statement(&self, mods: &StatementModifiers) -> Result<String> {
        if let Some(ignore) = &mods.ignore_table {
            let matched = self.from.map_or(false, |t| ignore.is_match(&t.name))
                || self.to.map_or(false, |t| ignore.is_match(&t.name));
            if matched {
                debug!(key = %self.object_key(), "table matches ignore pattern; skipping");
                return Ok(String::new());
            }
        }

        match (self.diff_type, self.from, self.to) {
            (DiffType::Create, _, Some(to)) => {
                let mut statement = to.create_statement.clone();
                if to.has_auto_increment()
                    && matches!(
                        mods.next_auto_inc,
                        NextAutoIncMode::Ignore | NextAutoIncMode::IfAlready
                    )
                {
                    statement = parse_create_auto_inc(&statement).0;
                }
                Ok(statement)
            }
            (DiffType::Alter, _, _) => self.alter_statement(mods),
            (DiffType::Drop, Some(from), _) => {
                let statement = from.drop_statement();
                if mods.allow_unsafe {
                    Ok(statement)
                } else {
                    Err(DiffError::Forbidden {
                        reason: "DROP TABLE not permitted".to_string(),
                        statement,
                    })
                }
            }
            // DiffType::Rename is reserved but never emitted.
            _ => panic!("unsupported diff type {:?}", self.diff_type),
        }
    }
}

///// RoutineDiff //////////////////////////////////////////////////////////////

/// A difference between two routines. Routine changes never alter in place:
/// a changed routine appears as a drop diff followed by a create diff.
#[derive(Debug)]
pub struct RoutineDiff<'a> {
    from: Option<&'a Routine>,
    to: Option<&'a Routine>,
}

impl<'a> RoutineDiff<'a> {
    fn drop(routine: &'a Routine) -> Self {
        Self { from: Some(routine), to: None }
    }

    fn create(routine: &'a Routine) -> Self {
        Self { from: None, to: Some(routine) }
    }

    /// The from-side routine, present for drops.
    #[must_use]
    pub fn from_routine(&self) -> Option<&'a Routine> {
        self.from
    }

    /// The to-side routine, present for creates.
    #[must_use]
    pub fn to_routine(&self) -> Option<&'a Routine> {
        self.to
    }
}

impl ObjectDiff for RoutineDiff<'_> {
    fn diff_type(&self) -> DiffType {
        match (self.from, self.to) {
            (None, None) => DiffType::None,
            (Some(_), None) => DiffType::Drop,
            (None, Some(_)) => DiffType::Create,
            (Some(_), Some(_)) => DiffType::Alter,
        }
    }

    fn object_key(&self) -> ObjectKey {
        match self.from.or(self.to) {
            Some(routine) => ObjectKey {
                object_type: routine.routine_type.object_type(),
                name: routine.name.clone(),
            },
            None => unreachable!("routine diff with no routine"),
        }
    }

    fn statement(&self, mods: &StatementModifiers) -> Result<String> {
        match (self.diff_type(), self.from, self.to) {
            (DiffType::None, _, _) => Ok(String::new()),
            (DiffType::Create, _, Some(to)) => Ok(to.create_statement.clone()),
            (DiffType::Drop, Some(from), _) => {
                let statement = from.drop_statement();
                if mods.allow_unsafe {
                    Ok(statement)
                } else {
                    Err(DiffError::Forbidden {
                        reason: format!("DROP {} not permitted", from.routine_type.caps()),
                        statement,
                    })
                }
            }
            // In-place routine alters are never produced; changed routines
            // are drop+create pairs.
            _ => panic!("unsupported diff type {:?}", self.diff_type()),
        }
    }
}
