// sqlx error classification

use corestore_core::error::AppError;

/// Convert sqlx::Error to AppError::Persistence with structured information
pub fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Persistence(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" | "3850" => AppError::Persistence(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "1299" => AppError::Persistence(format!(
                        "NOT NULL constraint violation: {}",
                        db_err.message()
                    )),
                    "5" | "6" => AppError::Persistence(format!(
                        "Database locked ({}): {}",
                        code_str,
                        db_err.message()
                    )),
                    "13" => AppError::Persistence(format!("Database full: {}", db_err.message())),
                    _ => AppError::Persistence(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Persistence(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Persistence("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Persistence(format!("Column not found: {}", col))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::Persistence(format!("Cannot decode column {}: {}", index, source))
        }
        // Connection, pool, protocol errors
        _ => AppError::Persistence(err.to_string()),
    }
}
