// Schema Operation Descriptors
//
// Structural changes are data, not SQL strings. Every forward operation that can be
// undone knows its own inverse, so a step's rollback can be derived and checked.

use serde::{Deserialize, Serialize};

/// Schema version number (baseline = 1)
pub type SchemaVersion = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    /// SQL literal, already quoted (e.g. `'stable'`, `0.5`)
    pub default: Option<String>,
    pub primary_key: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: false,
            default: None,
            primary_key: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Real)
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn default_text(mut self, value: &str) -> Self {
        self.default = Some(format!("'{}'", value.replace('\'', "''")));
        self
    }

    pub fn default_number(mut self, value: f64) -> Self {
        self.default = Some(format!("{:?}", value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }
}

/// One structural change against the relational store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaOperation {
    CreateTable(TableDef),
    DropTable { table: String },
    AddColumn { table: String, column: ColumnDef },
    /// Emulated by rebuilding the table without the column
    DropColumn { table: String, column: String },
    CreateIndex(IndexDef),
    DropIndex { table: String, name: String },
}

impl SchemaOperation {
    /// The operation that undoes this one. Removals have no inverse because the
    /// definition of what was removed is not part of the descriptor.
    pub fn inverse(&self) -> Option<SchemaOperation> {
        match self {
            SchemaOperation::CreateTable(table) => Some(SchemaOperation::DropTable {
                table: table.name.clone(),
            }),
            SchemaOperation::AddColumn { table, column } => Some(SchemaOperation::DropColumn {
                table: table.clone(),
                column: column.name.clone(),
            }),
            SchemaOperation::CreateIndex(index) => Some(SchemaOperation::DropIndex {
                table: index.table.clone(),
                name: index.name.clone(),
            }),
            SchemaOperation::DropTable { .. }
            | SchemaOperation::DropColumn { .. }
            | SchemaOperation::DropIndex { .. } => None,
        }
    }

    /// Table the operation touches
    pub fn table(&self) -> &str {
        match self {
            SchemaOperation::CreateTable(table) => &table.name,
            SchemaOperation::CreateIndex(index) => &index.table,
            SchemaOperation::DropTable { table }
            | SchemaOperation::AddColumn { table, .. }
            | SchemaOperation::DropColumn { table, .. }
            | SchemaOperation::DropIndex { table, .. } => table,
        }
    }
}

impl std::fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaOperation::CreateTable(table) => write!(f, "create table {}", table.name),
            SchemaOperation::DropTable { table } => write!(f, "drop table {}", table),
            SchemaOperation::AddColumn { table, column } => {
                write!(f, "add column {}.{}", table, column.name)
            }
            SchemaOperation::DropColumn { table, column } => {
                write!(f, "drop column {}.{}", table, column)
            }
            SchemaOperation::CreateIndex(index) => {
                write!(f, "create index {} on {}", index.name, index.table)
            }
            SchemaOperation::DropIndex { name, .. } => write!(f, "drop index {}", name),
        }
    }
}

/// Reversed inverses of `forward`, or `None` if any operation cannot be undone.
pub fn derive_rollback(forward: &[SchemaOperation]) -> Option<Vec<SchemaOperation>> {
    forward.iter().rev().map(SchemaOperation::inverse).collect()
}

/// A single version transition `from -> from + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationStep {
    from: SchemaVersion,
    to: SchemaVersion,
    description: String,
    forward: Vec<SchemaOperation>,
    rollback: Option<Vec<SchemaOperation>>,
}

impl MigrationStep {
    pub fn new(from: SchemaVersion, description: impl Into<String>) -> Self {
        Self {
            from,
            to: from + 1,
            description: description.into(),
            forward: Vec::new(),
            rollback: None,
        }
    }

    pub fn create_table(mut self, table: TableDef) -> Self {
        self.forward.push(SchemaOperation::CreateTable(table));
        self
    }

    pub fn add_column(mut self, table: impl Into<String>, column: ColumnDef) -> Self {
        self.forward.push(SchemaOperation::AddColumn {
            table: table.into(),
            column,
        });
        self
    }

    pub fn create_index(mut self, index: IndexDef) -> Self {
        self.forward.push(SchemaOperation::CreateIndex(index));
        self
    }

    /// Derive the rollback from the forward operations.
    pub fn reversible(mut self) -> Self {
        self.rollback = derive_rollback(&self.forward);
        self
    }

    /// Explicit rollback. Checked against the forward list at registration.
    pub fn with_rollback(mut self, rollback: Vec<SchemaOperation>) -> Self {
        self.rollback = Some(rollback);
        self
    }

    pub fn from_version(&self) -> SchemaVersion {
        self.from
    }

    pub fn to_version(&self) -> SchemaVersion {
        self.to
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn forward(&self) -> &[SchemaOperation] {
        &self.forward
    }

    pub fn rollback(&self) -> Option<&[SchemaOperation]> {
        self.rollback.as_deref()
    }
}

impl std::fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}->v{} ({})", self.from, self.to, self.description)
    }
}
