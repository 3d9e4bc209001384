// SQLite SchemaStore Implementation
//
// Renders schema operation descriptors to DDL. SQLite refuses to drop a column
// that is indexed, so column removal rebuilds the table instead.

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use corestore_core::domain::{ColumnDef, ColumnType, IndexDef, SchemaOperation, TableDef};
use corestore_core::error::{AppError, Result};
use corestore_core::port::{SchemaStore, SchemaTransaction, Transaction};
use sqlx::{Row, Sqlite, SqlitePool, Transaction as SqlxTransaction};
use tracing::debug;

const REBUILD_SUFFIX: &str = "__rebuild";

pub struct SqliteSchemaStore {
    pool: SqlitePool,
}

impl SqliteSchemaStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaStore for SqliteSchemaStore {
    async fn begin_schema_transaction(&self) -> Result<Box<dyn SchemaTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteSchemaTransaction { tx }))
    }
}

pub(crate) struct SqliteSchemaTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteSchemaTransaction {
    async fn run(&mut self, sql: &str) -> Result<()> {
        debug!(sql = sql, "DDL");
        sqlx::query(sql)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn catalog_has(&mut self, kind: &str, name: &str) -> Result<bool> {
        // fetch_all runs the statement to completion, so no read stays open
        // on sqlite_master when a later DROP TABLE runs on this connection
        let found: Vec<i64> =
            sqlx::query_scalar("SELECT 1 FROM sqlite_master WHERE type = ? AND name = ?")
                .bind(kind)
                .bind(name)
                .fetch_all(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        Ok(!found.is_empty())
    }

    /// Column definitions as SQLite reports them, in table order
    async fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnDef>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(table)))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| -> Result<ColumnDef> {
                let declared: String = row.try_get("type").map_err(map_sqlx_error)?;
                let not_null: i64 = row.try_get("notnull").map_err(map_sqlx_error)?;
                let pk: i64 = row.try_get("pk").map_err(map_sqlx_error)?;
                Ok(ColumnDef {
                    name: row.try_get("name").map_err(map_sqlx_error)?,
                    column_type: column_type_from_decl(&declared),
                    not_null: not_null != 0,
                    default: row.try_get("dflt_value").map_err(map_sqlx_error)?,
                    primary_key: pk != 0,
                })
            })
            .collect()
    }

    /// Explicitly created indexes on `table`. Automatic (constraint) indexes are skipped.
    async fn table_indexes(&mut self, table: &str) -> Result<Vec<IndexDef>> {
        let listed = sqlx::query(&format!("PRAGMA index_list({})", quote_ident(table)))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        let mut indexes = Vec::new();
        for row in listed {
            let origin: String = row.try_get("origin").map_err(map_sqlx_error)?;
            if origin != "c" {
                continue;
            }
            let name: String = row.try_get("name").map_err(map_sqlx_error)?;
            let unique: i64 = row.try_get("unique").map_err(map_sqlx_error)?;

            let info = sqlx::query(&format!("PRAGMA index_info({})", quote_ident(&name)))
                .fetch_all(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
            let mut columns: Vec<(i64, String)> = Vec::with_capacity(info.len());
            for r in &info {
                let seqno: i64 = r.try_get("seqno").map_err(map_sqlx_error)?;
                let column: String = r.try_get("name").map_err(map_sqlx_error)?;
                columns.push((seqno, column));
            }
            columns.sort_by_key(|(seqno, _)| *seqno);

            indexes.push(IndexDef {
                name,
                table: table.to_string(),
                columns: columns.into_iter().map(|(_, column)| column).collect(),
                unique: unique != 0,
            });
        }
        Ok(indexes)
    }

    /// SQLite reads an unknown double-quoted identifier as a string literal and
    /// would index a constant, so the columns are checked first.
    async fn create_index(&mut self, index: &IndexDef) -> Result<()> {
        let columns = self.table_columns(&index.table).await?;
        if columns.is_empty() {
            return Err(AppError::Persistence(format!(
                "cannot create index {}: no such table: {}",
                index.name, index.table
            )));
        }
        if let Some(missing) = index
            .columns
            .iter()
            .find(|wanted| !columns.iter().any(|c| &c.name == *wanted))
        {
            return Err(AppError::Persistence(format!(
                "cannot create index {}: no such column: {}.{}",
                index.name, index.table, missing
            )));
        }
        self.run(&create_index_sql(index)).await
    }

    /// Recreate `table` without `column`, keeping rows and every index that
    /// does not reference the removed column.
    async fn rebuild_without_column(&mut self, table: &str, column: &str) -> Result<()> {
        let columns = self.table_columns(table).await?;
        if !columns.iter().any(|c| c.name == column) {
            return Err(AppError::Persistence(format!(
                "no such column: {}.{}",
                table, column
            )));
        }
        let indexes = self.table_indexes(table).await?;

        let kept: Vec<ColumnDef> = columns.into_iter().filter(|c| c.name != column).collect();
        if kept.is_empty() {
            return Err(AppError::Persistence(format!(
                "cannot drop {}.{}: it is the only column",
                table, column
            )));
        }

        let shadow = format!("{}{}", table, REBUILD_SUFFIX);
        let column_list = kept
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");

        self.run(&format!("DROP TABLE IF EXISTS {}", quote_ident(&shadow)))
            .await?;
        self.run(&create_table_sql(&TableDef::new(shadow.clone(), kept)))
            .await?;
        self.run(&format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            quote_ident(&shadow),
            column_list,
            column_list,
            quote_ident(table)
        ))
        .await?;
        self.run(&format!("DROP TABLE {}", quote_ident(table))).await?;
        self.run(&format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_ident(&shadow),
            quote_ident(table)
        ))
        .await?;

        for index in indexes {
            if index.columns.iter().any(|c| c == column) {
                debug!(index = %index.name, "Index referenced dropped column, not recreated");
                continue;
            }
            self.run(&create_index_sql(&index)).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for SqliteSchemaTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl SchemaTransaction for SqliteSchemaTransaction {
    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        self.catalog_has("table", table).await
    }

    async fn column_exists(&mut self, table: &str, column: &str) -> Result<bool> {
        Ok(self
            .table_columns(table)
            .await?
            .iter()
            .any(|c| c.name == column))
    }

    async fn index_exists(&mut self, name: &str) -> Result<bool> {
        self.catalog_has("index", name).await
    }

    async fn execute(&mut self, operation: &SchemaOperation) -> Result<()> {
        match operation {
            SchemaOperation::CreateTable(table) => self.run(&create_table_sql(table)).await,
            SchemaOperation::DropTable { table } => {
                self.run(&format!("DROP TABLE {}", quote_ident(table))).await
            }
            SchemaOperation::AddColumn { table, column } => {
                self.run(&format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote_ident(table),
                    column_sql(column)
                ))
                .await
            }
            SchemaOperation::DropColumn { table, column } => {
                self.rebuild_without_column(table, column).await
            }
            SchemaOperation::CreateIndex(index) => self.create_index(index).await,
            SchemaOperation::DropIndex { name, .. } => {
                self.run(&format!("DROP INDEX {}", quote_ident(name))).await
            }
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_type_from_decl(declared: &str) -> ColumnType {
    // SQLite type affinity rules, reduced to the three types we declare
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        ColumnType::Integer
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

fn column_sql(column: &ColumnDef) -> String {
    let mut sql = format!("{} {}", quote_ident(&column.name), column.column_type.as_sql());
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    }
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    sql
}

fn create_table_sql(table: &TableDef) -> String {
    let columns = table
        .columns
        .iter()
        .map(column_sql)
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(&table.name), columns)
}

fn create_index_sql(index: &IndexDef) -> String {
    let columns = index
        .columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        quote_ident(&index.name),
        quote_ident(&index.table),
        columns
    )
}
